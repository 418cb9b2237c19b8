#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=commitscribe", "-c", "user.email=tests@example.com"])
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", dir)
        .status()
        .expect("git runs");
    assert!(status.success(), "git {args:?} failed");
}

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// A repository on `main` with one commit, a staged edit to `src/lib.rs`
/// and an untracked `newdir/a.rs`. `None` when git is not installed.
pub fn scratch_repo() -> Option<TempDir> {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return None;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();

    git(root, &["init", "-q"]);
    git(root, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    fs::create_dir_all(root.join("src")).expect("mkdir src");
    fs::write(root.join("src/lib.rs"), "pub fn answer() -> u32 {\n    41\n}\n").expect("write");
    git(root, &["add", "src/lib.rs"]);
    git(root, &["commit", "-q", "-m", "feat: initial answer"]);

    fs::write(root.join("src/lib.rs"), "pub fn answer() -> u32 {\n    42\n}\n").expect("write");
    git(root, &["add", "src/lib.rs"]);

    fs::create_dir_all(root.join("newdir")).expect("mkdir newdir");
    fs::write(root.join("newdir/a.rs"), "pub fn fresh() {}\n").expect("write");

    Some(dir)
}
