pub mod budget;
pub mod priority;
pub mod templates;
pub mod truncate;

use std::borrow::Cow;

use serde::Serialize;

use crate::context::Context;
use crate::error::CollectError;
use crate::git::ChangeSource;
use budget::TokenBudget;
use priority::sort_by_priority;
use templates::NO_CHANGES;
use truncate::{DEFAULT_BYTE_MARKER, truncate_bytes, truncate_tokens};

/// Commit depth used by the budgeted prompt.
pub const BUDGET_COMMIT_DEPTH: usize = 3;

/// Commit depth used by the plain prompt.
pub const PLAIN_COMMIT_DEPTH: usize = 10;

/// Language the generated commit message must be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Chinese,
}

impl Language {
    /// `zh` and its regional variants select Chinese; anything else is English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh-tw" | "zh_cn" | "zh_tw" | "chinese" => Language::Chinese,
            _ => Language::English,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "Chinese",
        }
    }

    fn directive(self) -> String {
        format!(
            "# LANGUAGE\nYou must respond in {}. The whole commit message MUST be written in {}.",
            self.name(),
            self.name()
        )
    }
}

/// System and user halves of one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: Language,
    /// Byte cap for the plain prompt's diff; zero disables truncation.
    diff_limit: usize,
    marker: String,
    budget: TokenBudget,
}

impl PromptBuilder {
    pub fn new(language: Language, diff_limit: usize) -> Self {
        PromptBuilder {
            language,
            diff_limit,
            marker: DEFAULT_BYTE_MARKER.to_string(),
            budget: TokenBudget::default(),
        }
    }

    pub fn with_token_budget(mut self, max_tokens: usize) -> Self {
        self.budget = TokenBudget::new(max_tokens);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    pub fn build_system_prompt(&self) -> String {
        [
            templates::ROLE.to_string(),
            templates::TASK.to_string(),
            self.language.directive(),
            templates::FORMAT_RULES.to_string(),
            templates::EXAMPLE.to_string(),
            templates::RESPONSE.to_string(),
        ]
        .join("\n\n")
    }

    /// Render already-collected inputs. Empty inputs are left out, and when
    /// everything is empty the result is [`NO_CHANGES`].
    pub fn build_user_prompt(
        &self,
        seed: &str,
        diff: &str,
        commits: &[String],
        branch: &str,
        files: &[String],
    ) -> String {
        let mut sections = Vec::new();

        push_line(&mut sections, "Seed", seed);
        push_line(&mut sections, "Branch", branch);
        if !files.is_empty() {
            sections.push(format!("Changed files: {}", files.join(", ")));
        }
        push_commits(&mut sections, commits);

        let diff = diff.trim();
        if !diff.is_empty() {
            let diff = truncate_bytes(diff, self.diff_limit, &self.marker);
            if matches!(diff, Cow::Owned(_)) {
                log::info!("diff cut to about {} bytes", self.diff_limit);
            }
            sections.push(format!("Git diff:\n```diff\n{diff}\n```"));
        }

        finish(sections)
    }

    /// Collect everything from `source` and render the plain prompt.
    pub async fn build_plain_user_prompt<S>(
        &self,
        ctx: &Context,
        source: &S,
        seed: &str,
    ) -> Result<String, CollectError>
    where
        S: ChangeSource + ?Sized,
    {
        let snapshot = match source.gather(ctx, PLAIN_COMMIT_DEPTH).await {
            Ok(snapshot) => snapshot,
            Err(err) if err.is_no_changes() => return Ok(NO_CHANGES.to_string()),
            Err(err) => return Err(err),
        };
        let files = source.changed_files(ctx).await?;

        Ok(self.build_user_prompt(
            seed,
            &snapshot.diff,
            &snapshot.commits,
            &snapshot.branch,
            &files,
        ))
    }

    /// Collect everything from `source` concurrently and render a prompt
    /// whose diff fits the available token budget.
    ///
    /// Files are listed in priority order with their status codes. A
    /// repository without changes yields [`NO_CHANGES`] rather than an error.
    pub async fn build_user_prompt_with_budget<S>(
        &self,
        ctx: &Context,
        source: &S,
        seed: &str,
    ) -> Result<String, CollectError>
    where
        S: ChangeSource + ?Sized,
    {
        let snapshot = match source.gather(ctx, BUDGET_COMMIT_DEPTH).await {
            Ok(snapshot) => snapshot,
            Err(err) if err.is_no_changes() => return Ok(NO_CHANGES.to_string()),
            Err(err) => return Err(err),
        };

        let mut sections = Vec::new();
        push_line(&mut sections, "Seed", seed);

        let branch = if snapshot.branch.is_empty() {
            snapshot.status.branch_name.as_str()
        } else {
            snapshot.branch.as_str()
        };
        push_line(&mut sections, "Branch", branch);

        if !snapshot.status.files.is_empty() {
            let lines: Vec<String> = sort_by_priority(&snapshot.status.files)
                .iter()
                .map(|f| f.summary_line())
                .collect();
            sections.push(format!("Summary of changed files:\n{}", lines.join("\n")));
        }

        push_commits(&mut sections, &snapshot.commits);

        let diff = snapshot.diff.trim();
        if !diff.is_empty() {
            let available = self.budget.available_tokens;
            let before = budget::estimate_tokens(diff);
            let diff = truncate_tokens(diff, available);
            if matches!(diff, Cow::Owned(_)) {
                log::info!(
                    "diff truncated from ~{before} to ~{} tokens (budget {available})",
                    budget::estimate_tokens(&diff)
                );
            }
            sections.push(format!(
                "Git diff (may be truncated for large files):\n```diff\n{diff}\n```"
            ));
        }

        Ok(finish(sections))
    }

    /// System prompt plus the budgeted user prompt.
    pub async fn build<S>(
        &self,
        ctx: &Context,
        source: &S,
        seed: &str,
    ) -> Result<PromptPair, CollectError>
    where
        S: ChangeSource + ?Sized,
    {
        let user = self.build_user_prompt_with_budget(ctx, source, seed).await?;
        Ok(PromptPair {
            system: self.build_system_prompt(),
            user,
        })
    }

    /// System prompt plus the plain user prompt.
    pub async fn build_plain<S>(
        &self,
        ctx: &Context,
        source: &S,
        seed: &str,
    ) -> Result<PromptPair, CollectError>
    where
        S: ChangeSource + ?Sized,
    {
        let user = self.build_plain_user_prompt(ctx, source, seed).await?;
        Ok(PromptPair {
            system: self.build_system_prompt(),
            user,
        })
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        PromptBuilder::new(Language::default(), 0)
    }
}

fn push_line(sections: &mut Vec<String>, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        sections.push(format!("{label}: {value}"));
    }
}

fn push_commits(sections: &mut Vec<String>, commits: &[String]) {
    if !commits.is_empty() {
        sections.push(format!("Recent commits:\n{}", commits.join("\n")));
    }
}

fn finish(sections: Vec<String>) -> String {
    if sections.is_empty() {
        NO_CHANGES.to_string()
    } else {
        sections.join("\n\n")
    }
}
