use serde::Serialize;

use crate::git::noise::extension;
use crate::git::status::FileStatus;

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "go", "py", "js", "ts", "jsx", "tsx", "java", "kt", "kts", "scala", "c", "h", "cc",
    "cpp", "cxx", "hpp", "cs", "rb", "php", "swift", "m", "mm", "dart", "lua", "ex", "exs", "erl",
    "hs", "ml", "clj", "zig", "nim", "r", "jl", "pl", "sh", "bash", "zsh", "ps1", "sql", "vue",
    "svelte", "css", "scss", "sass", "less",
];

const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "xml", "ini", "cfg", "conf", "env", "properties", "html",
    "htm", "proto", "graphql", "gradle", "tf", "hcl", "lock", "csv",
];

const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "rst", "adoc", "org"];

/// Relevance tier of a path, most informative first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Source,
    Config,
    Docs,
    Other,
}

impl FileKind {
    pub fn of(path: &str) -> Self {
        let Some(ext) = extension(path) else {
            return FileKind::Other;
        };
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();

        if SOURCE_EXTENSIONS.contains(&ext) {
            FileKind::Source
        } else if CONFIG_EXTENSIONS.contains(&ext) {
            FileKind::Config
        } else if DOC_EXTENSIONS.contains(&ext) {
            FileKind::Docs
        } else {
            FileKind::Other
        }
    }
}

/// Order files by tier, keeping discovery order within a tier.
pub fn sort_by_priority(files: &[FileStatus]) -> Vec<FileStatus> {
    let mut sorted = files.to_vec();
    sorted.sort_by_key(|f| FileKind::of(&f.path));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileStatus {
        FileStatus::untracked(path)
    }

    #[test]
    fn kinds_by_extension() {
        assert_eq!(FileKind::of("src/main.rs"), FileKind::Source);
        assert_eq!(FileKind::of("web/App.TSX"), FileKind::Source);
        assert_eq!(FileKind::of("config/app.yaml"), FileKind::Config);
        assert_eq!(FileKind::of("README.md"), FileKind::Docs);
        assert_eq!(FileKind::of("Makefile"), FileKind::Other);
        assert_eq!(FileKind::of("logo.xcf"), FileKind::Other);
    }

    #[test]
    fn tiers_first_then_discovery_order() {
        let files = vec![
            file("README.md"),
            file("b.go"),
            file("Cargo.toml"),
            file("Makefile"),
            file("a.rs"),
            file("CHANGELOG.md"),
        ];
        let sorted: Vec<_> = sort_by_priority(&files)
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(
            sorted,
            vec!["b.go", "a.rs", "Cargo.toml", "README.md", "CHANGELOG.md", "Makefile"]
        );
    }

    #[test]
    fn empty_input() {
        assert!(sort_by_priority(&[]).is_empty());
    }
}
