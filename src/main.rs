mod cli_args;
mod config;
mod logging;

use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use commitscribe::git::changes::ChangesSummary;
use commitscribe::git::status::FileStatusSummary;
use commitscribe::prompt::budget::estimate_tokens;
use commitscribe::prompt::templates::NO_CHANGES;
use commitscribe::{
    ChangeSource, CollectError, Collector, Context, Language, ProcessRunner, PromptBuilder,
    PromptPair,
};

use crate::cli_args::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose, cli.debug);

    let config = Config::from_sources(&cli);
    log::debug!("resolved config: {config:?}");

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, config.language),
    }
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let root = Context::background();
    let interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupted, stopping git commands");
            interrupt.cancel();
        }
    });

    let ctx = root.with_timeout(config.timeout);
    let collector = Collector::new(ProcessRunner::new());

    match cli.command {
        None => {
            let builder = PromptBuilder::new(config.language, config.diff_limit)
                .with_token_budget(config.max_tokens);
            let seed = cli.seed.as_deref().unwrap_or("");

            let pair = with_spinner("collecting changes...", async {
                if cli.plain {
                    builder.build_plain(&ctx, &collector, seed).await
                } else {
                    builder.build(&ctx, &collector, seed).await
                }
            })
            .await
            .context("failed to build the commit prompt")?;

            if pair.user == NO_CHANGES {
                return Err(CollectError::NoChanges.into());
            }

            if cli.debug {
                eprintln!(
                    "[DEBUG] system prompt ~{} tokens, user prompt ~{} tokens, diff budget {} tokens",
                    estimate_tokens(&pair.system),
                    estimate_tokens(&pair.user),
                    builder.budget().available_tokens
                );
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&pair)?);
            } else {
                print_prompt(&pair);
            }
        }

        Some(Command::Analyze) => {
            let summary = with_spinner("analyzing changes...", collector.analyze_changes(&ctx))
                .await
                .context("failed to analyze changes")?;

            if summary.total_files == 0 {
                return Err(CollectError::NoChanges.into());
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_analysis(&summary);
            }
        }

        Some(Command::Status) => {
            let status = with_spinner("reading status...", collector.file_status_summary(&ctx))
                .await
                .context("failed to read the working tree status")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if status.files.is_empty() {
                return Err(CollectError::NoChanges.into());
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

fn report(err: &anyhow::Error, language: Language) -> ExitCode {
    match err.downcast_ref::<CollectError>() {
        Some(CollectError::NoChanges) => {
            log::info!("no staged, unstaged or untracked changes");
            println!("Nothing to commit.");
            ExitCode::SUCCESS
        }
        Some(CollectError::NotARepository) => {
            eprintln!("{} {}", "error:".red().bold(), not_a_repository_message(language));
            ExitCode::FAILURE
        }
        Some(CollectError::DeadlineExceeded) => {
            eprintln!(
                "{} timed out while collecting changes; try a larger --timeout",
                "error:".red().bold()
            );
            ExitCode::FAILURE
        }
        _ => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn not_a_repository_message(language: Language) -> &'static str {
    match language {
        Language::English => {
            "not a git repository. Run commitscribe inside a Git working tree, or create one with `git init`."
        }
        Language::Chinese => {
            "当前目录不是 Git 仓库。请在 Git 工作目录中运行 commitscribe，或使用 `git init` 初始化仓库。"
        }
    }
}

/// Show a spinner on stderr while `fut` runs. Nothing is drawn when stderr
/// is not a terminal.
async fn with_spinner<T>(message: &'static str, fut: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));

    let out = fut.await;
    spinner.finish_and_clear();
    out
}

fn print_prompt(pair: &PromptPair) {
    println!("{}", "=== System prompt ===".bold());
    println!("{}", pair.system);
    println!();
    println!("{}", "=== User prompt ===".bold());
    println!("{}", pair.user);
}

fn print_analysis(summary: &ChangesSummary) {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    println!(
        "{} {} (prefix `{}`)",
        "Primary type:".bold(),
        summary.primary_change_type.to_string().green(),
        summary.suggested_prefix
    );
    println!(
        "{} {} ({:?})",
        "Files:".bold(),
        summary.total_files,
        summary.magnitude
    );
    println!(
        "{} staged: {}, unstaged: {}, untracked: {}",
        "Changes:".bold(),
        yes_no(summary.has_staged_changes),
        yes_no(summary.has_unstaged_changes),
        yes_no(summary.has_untracked_files)
    );
    println!("{} {}", "Areas:".bold(), summary.affected_areas.join(", "));

    let votes: Vec<String> = summary
        .change_type_counts
        .iter()
        .map(|(kind, count)| format!("{kind} {count}"))
        .collect();
    println!("{} {}", "Votes:".bold(), votes.join(", "));

    println!("{}", "Files by priority:".bold());
    for file in &summary.files_by_priority {
        println!("  {}", file.summary_line());
    }
}

fn print_status(status: &FileStatusSummary) {
    if !status.branch_name.is_empty() {
        println!("{} {}", "Branch:".bold(), status.branch_name);
    }
    for file in &status.files {
        let code = file.short_code();
        let target = if file.is_renamed {
            format!("{} -> {}", file.old_path, file.path)
        } else {
            file.path.clone()
        };
        println!("{} {}", paint_code(&format!("{code:>2}")), target);
    }
}

fn paint_code(code: &str) -> ColoredString {
    match code.trim_start().chars().next() {
        Some('?') => code.yellow(),
        Some('D') => code.red(),
        Some('A') => code.green(),
        Some('R') | Some('C') => code.blue(),
        _ => code.cyan(),
    }
}
