//! Paths that add bulk to a prompt without saying anything about intent:
//! lock files, build output, vendored trees, binaries and scratch files.

const LOCK_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "go.sum",
    "go.mod",
    "composer.lock",
    "Pipfile.lock",
    "poetry.lock",
    "Gemfile.lock",
    "mix.lock",
    "Cargo.lock",
];

const GENERATED_DIRS: &[&str] = &[
    "dist",
    "build",
    "target",
    "out",
    "node_modules",
    "vendor",
    ".git",
    "__pycache__",
    ".pytest_cache",
    ".coverage",
    ".vscode",
    ".idea",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "a", "lib", "jpg", "jpeg", "png", "gif", "bmp", "svg", "ico",
    "mp3", "mp4", "avi", "mov", "pdf", "zip", "tar", "gz", "woff", "woff2", "ttf", "eot", "otf",
];

const SCRATCH_EXTENSIONS: &[&str] = &["log", "tmp", "temp", "bak", "swp"];

/// Whether `path` should be left out of summaries and synthesized diffs.
pub fn is_noise(path: &str) -> bool {
    let path = path.replace('\\', "/");
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(file_name) = segments.pop() else {
        return false;
    };

    if LOCK_FILES.contains(&file_name) || file_name == ".DS_Store" {
        return true;
    }

    if segments.iter().any(|dir| GENERATED_DIRS.contains(dir)) {
        return true;
    }

    match extension(file_name) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            BINARY_EXTENSIONS.contains(&ext.as_str()) || SCRATCH_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Extension of the final path component, without the dot. Dotfiles such as
/// `.gitignore` have none.
pub(crate) fn extension(file_name: &str) -> Option<&str> {
    let file_name = file_name.rsplit('/').next().unwrap_or(file_name);
    match file_name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&file_name[idx + 1..]),
    }
}
