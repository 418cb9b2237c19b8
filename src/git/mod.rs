pub mod changes;
pub mod noise;
pub mod status;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::CollectError;
use crate::runner::Runner;
use changes::ChangesSummary;
use status::{FileStatus, FileStatusSummary, StatusMerger, parse_porcelain, parse_untracked};

/// Upper bound accepted by [`ChangeSource::recent_commits`].
pub const MAX_RECENT_COMMITS: usize = 1000;

/// Bytes of an untracked file rendered into the synthesized diff.
pub const UNTRACKED_READ_LIMIT: usize = 10 * 1024;

/// Everything one prompt needs, gathered under a single context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSnapshot {
    pub branch: String,
    pub commits: Vec<String>,
    pub diff: String,
    pub status: FileStatusSummary,
}

/// Read-only view of a working tree's pending changes.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Fails with [`CollectError::NotARepository`] outside a repository.
    async fn check_repository(&self, ctx: &Context) -> Result<(), CollectError>;

    /// Current branch, empty on a detached HEAD.
    async fn branch_name(&self, ctx: &Context) -> Result<String, CollectError>;

    /// Up to `n` commit subjects, most recent first. Empty without history.
    async fn recent_commits(&self, ctx: &Context, n: usize) -> Result<Vec<String>, CollectError>;

    /// Staged, unstaged and untracked paths, de-duplicated.
    async fn changed_files(&self, ctx: &Context) -> Result<Vec<String>, CollectError>;

    async fn file_status_summary(&self, ctx: &Context) -> Result<FileStatusSummary, CollectError>;

    /// Staged diff, unstaged diff and synthesized diffs for untracked files.
    /// Fails with [`CollectError::NoChanges`] when there is nothing at all.
    async fn comprehensive_diff(&self, ctx: &Context) -> Result<String, CollectError>;

    /// Fetch branch, commits, diff and status concurrently.
    ///
    /// The repository check runs first. A `NoChanges` result from the diff
    /// returns at once and drops the other in-flight lookups; any other
    /// outcome waits for all four. The whole fan-out is bounded by `ctx`.
    async fn gather(
        &self,
        ctx: &Context,
        commit_depth: usize,
    ) -> Result<ChangeSnapshot, CollectError> {
        self.check_repository(ctx).await?;

        let diff = async {
            match self.comprehensive_diff(ctx).await {
                Err(CollectError::NoChanges) => Err(CollectError::NoChanges),
                other => Ok(other),
            }
        };
        let rest = async {
            Ok::<_, CollectError>(tokio::join!(
                self.branch_name(ctx),
                self.recent_commits(ctx, commit_depth),
                self.file_status_summary(ctx),
            ))
        };

        let (diff, (branch, commits, status)) =
            ctx.run(async { tokio::try_join!(diff, rest) }).await??;

        Ok(ChangeSnapshot {
            diff: diff?,
            branch: branch?,
            commits: commits?,
            status: status?,
        })
    }
}

/// [`ChangeSource`] backed by the `git` command line.
#[derive(Clone)]
pub struct Collector {
    runner: Arc<dyn Runner>,
}

impl Collector {
    pub fn new(runner: impl Runner + 'static) -> Self {
        Collector {
            runner: Arc::new(runner),
        }
    }

    pub fn with_runner(runner: Arc<dyn Runner>) -> Self {
        Collector { runner }
    }

    async fn git(
        &self,
        ctx: &Context,
        operation: &'static str,
        args: &[&str],
    ) -> Result<String, CollectError> {
        let out = self
            .runner
            .run(ctx, "git", args)
            .await
            .map_err(|err| CollectError::from_run(operation, err))?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// `git diff --cached`, trimmed; empty when nothing is staged.
    pub async fn staged_diff(&self, ctx: &Context) -> Result<String, CollectError> {
        let out = self
            .git(ctx, "staged diff", &["diff", "--cached", "--no-ext-diff"])
            .await?;
        Ok(out.trim().to_string())
    }

    pub async fn unstaged_diff(&self, ctx: &Context) -> Result<String, CollectError> {
        let out = self
            .git(ctx, "unstaged diff", &["diff", "--no-ext-diff"])
            .await?;
        Ok(out.trim().to_string())
    }

    /// Raw `git status --porcelain` listing.
    pub async fn git_status(&self, ctx: &Context) -> Result<String, CollectError> {
        let out = self.git(ctx, "status", &["status", "--porcelain"]).await?;
        Ok(out.trim().to_string())
    }

    /// Untracked, non-ignored paths with noise filtered out.
    pub async fn untracked_files(&self, ctx: &Context) -> Result<Vec<String>, CollectError> {
        let out = self
            .git(
                ctx,
                "untracked files",
                &["ls-files", "--others", "--exclude-standard"],
            )
            .await?;
        let paths = parse_untracked(&out).into_iter().map(|f| f.path);
        Ok(dedupe_relevant(paths))
    }

    /// Render an untracked file as an all-additions diff. The content is read
    /// through the runner and capped at [`UNTRACKED_READ_LIMIT`] bytes.
    pub async fn untracked_file_as_diff(
        &self,
        ctx: &Context,
        path: &str,
    ) -> Result<String, CollectError> {
        let limit = UNTRACKED_READ_LIMIT.to_string();
        let content = self
            .runner
            .run(ctx, "head", &["-c", &limit, "--", path])
            .await
            .map_err(|err| CollectError::from_run("read untracked file", err))?;

        if content.contains(&0) {
            return Err(CollectError::InvalidArgument(format!(
                "{path} looks like a binary file"
            )));
        }

        let content = String::from_utf8_lossy(&content);
        let mut out = format!("diff --git a/{path} b/{path}\nnew file mode 100644\n--- /dev/null\n+++ b/{path}");
        for line in content.lines() {
            out.push_str("\n+");
            out.push_str(line);
        }
        Ok(out)
    }

    /// Vote on the change type of every changed file.
    pub async fn analyze_changes(&self, ctx: &Context) -> Result<ChangesSummary, CollectError> {
        let summary = self.file_status_summary(ctx).await?;
        Ok(changes::summarize(&summary.files))
    }
}

#[async_trait]
impl ChangeSource for Collector {
    async fn check_repository(&self, ctx: &Context) -> Result<(), CollectError> {
        self.git(ctx, "repository check", &["rev-parse", "--git-dir"])
            .await
            .map(|_| ())
    }

    async fn branch_name(&self, ctx: &Context) -> Result<String, CollectError> {
        let out = self
            .git(ctx, "branch name", &["branch", "--show-current"])
            .await?;
        let name = out.trim();

        if !name.chars().all(is_branch_char) {
            return Err(CollectError::InvalidArgument(format!(
                "invalid branch name: {}",
                name.escape_debug()
            )));
        }
        Ok(name.to_string())
    }

    async fn recent_commits(&self, ctx: &Context, n: usize) -> Result<Vec<String>, CollectError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if n > MAX_RECENT_COMMITS {
            return Err(CollectError::InvalidArgument(format!(
                "at most {MAX_RECENT_COMMITS} recent commits can be requested, got {n}"
            )));
        }

        let count = format!("-n{n}");
        let out = match self
            .runner
            .run(ctx, "git", &["log", "--pretty=format:%s", &count])
            .await
        {
            Ok(out) => out,
            Err(err) if is_empty_history(err.stderr()) => {
                log::debug!("no commits yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(CollectError::from_run("recent commits", err)),
        };

        Ok(String::from_utf8_lossy(&out)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(n)
            .map(str::to_string)
            .collect())
    }

    async fn changed_files(&self, ctx: &Context) -> Result<Vec<String>, CollectError> {
        let (staged, unstaged, untracked) = tokio::try_join!(
            self.git(ctx, "staged files", &["diff", "--cached", "--name-only"]),
            self.git(ctx, "unstaged files", &["diff", "--name-only"]),
            self.untracked_files(ctx),
        )?;

        let tracked = parse_untracked(&staged)
            .into_iter()
            .chain(parse_untracked(&unstaged))
            .map(|f| f.path);
        Ok(dedupe_relevant(tracked.chain(untracked)))
    }

    async fn file_status_summary(&self, ctx: &Context) -> Result<FileStatusSummary, CollectError> {
        let (porcelain, untracked) = tokio::try_join!(
            self.git(
                ctx,
                "status",
                &["status", "--porcelain", "-b", "--untracked-files=all"]
            ),
            self.untracked_files(ctx),
        )?;

        let parsed = parse_porcelain(&porcelain);
        let mut merger = StatusMerger::new();
        merger.extend(
            parsed
                .files
                .into_iter()
                // collapsed untracked directories are listed file by file below
                .filter(|f| !(f.is_untracked && f.path.ends_with('/')))
                .filter(|f| !noise::is_noise(&f.path)),
        );
        merger.extend(untracked.into_iter().map(FileStatus::untracked));

        let files = merger.finish();
        log::debug!("status lists {} changed file(s)", files.len());

        Ok(FileStatusSummary {
            branch_name: parsed.branch.unwrap_or_default(),
            files,
        })
    }

    async fn comprehensive_diff(&self, ctx: &Context) -> Result<String, CollectError> {
        let (staged, unstaged, untracked) = tokio::try_join!(
            self.staged_diff(ctx),
            self.unstaged_diff(ctx),
            self.untracked_files(ctx),
        )?;

        let mut parts: Vec<String> = [staged, unstaged]
            .into_iter()
            .filter(|d| !d.is_empty())
            .collect();

        for path in &untracked {
            match self.untracked_file_as_diff(ctx, path).await {
                Ok(diff) => parts.push(diff),
                Err(err) if err.is_interrupted() || err.is_not_a_repository() => return Err(err),
                Err(err) => log::warn!("skipping untracked file {path}: {err}"),
            }
        }

        let combined = parts.join("\n\n").trim().to_string();
        if !combined.is_empty() {
            log::debug!(
                "collected {} diff section(s), {} bytes",
                parts.len(),
                combined.len()
            );
            return Ok(combined);
        }

        // Nothing renderable, though status may still list changes.
        let status = self.git_status(ctx).await?;
        if status.is_empty() {
            return Err(CollectError::NoChanges);
        }
        Ok(status)
    }
}

fn is_branch_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')
}

fn is_empty_history(stderr: &str) -> bool {
    stderr.contains("does not have any commits yet") || stderr.contains("bad default revision")
}

fn dedupe_relevant(paths: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && !noise::is_noise(p))
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
