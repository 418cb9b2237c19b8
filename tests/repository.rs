mod common;

use std::time::Duration;

use commitscribe::{ChangeSource, Collector, Context, ProcessRunner, PromptBuilder};

fn ctx() -> Context {
    Context::background().with_timeout(Duration::from_secs(20))
}

#[tokio::test]
async fn gathers_a_real_repository() {
    let Some(repo) = common::scratch_repo() else {
        return;
    };
    let collector = Collector::new(ProcessRunner::in_dir(repo.path()));

    let snapshot = collector.gather(&ctx(), 3).await.unwrap();

    assert_eq!(snapshot.branch, "main");
    assert_eq!(snapshot.commits, vec!["feat: initial answer"]);
    assert!(snapshot.diff.contains("diff --git a/src/lib.rs b/src/lib.rs"));
    assert!(snapshot.diff.contains("+    42"));
    assert!(snapshot.diff.contains("diff --git a/newdir/a.rs b/newdir/a.rs"));
    assert!(snapshot.diff.contains("+pub fn fresh() {}"));

    let paths: Vec<_> = snapshot.status.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/lib.rs", "newdir/a.rs"]);
}

#[tokio::test]
async fn budgeted_prompt_from_a_real_repository() {
    let Some(repo) = common::scratch_repo() else {
        return;
    };
    let collector = Collector::new(ProcessRunner::in_dir(repo.path()));

    let pair = PromptBuilder::default()
        .build(&ctx(), &collector, "")
        .await
        .unwrap();

    assert!(pair.user.contains("Branch: main"));
    assert!(pair.user.contains("M: src/lib.rs\n??: newdir/a.rs"));
    assert!(!pair.user.contains("??: newdir/\n"));
    assert!(pair.user.contains("Recent commits:\nfeat: initial answer"));
}

#[tokio::test]
async fn changed_files_from_a_real_repository() {
    let Some(repo) = common::scratch_repo() else {
        return;
    };
    let collector = Collector::new(ProcessRunner::in_dir(repo.path()));

    let files = collector.changed_files(&ctx()).await.unwrap();
    assert_eq!(files, vec!["src/lib.rs", "newdir/a.rs"]);
}
