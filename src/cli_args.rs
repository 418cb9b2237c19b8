use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "commitscribe",
    version,
    about = "Builds commit-message prompts from the pending changes of a Git repository",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Optional hint placed at the top of the user prompt
    pub seed: Option<String>,

    /// Use the plain prompt (10 commits, changed-file list, byte-limited diff)
    #[arg(long)]
    pub plain: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Language of the commit message: en or zh
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Token budget for the budgeted prompt
    #[arg(long, global = true)]
    pub max_tokens: Option<usize>,

    /// Byte limit for the plain prompt's diff (0 = unlimited)
    #[arg(long, global = true)]
    pub diff_limit: Option<usize>,

    /// Deadline for collecting changes, e.g. 20, 20s, 1500ms or 2m
    #[arg(long, global = true, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Debug mode: debug logging plus token estimates for the prompts
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `commitscribe analyze`
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Classify the pending changes and suggest a conventional-commit type
    Analyze,

    /// List the merged staged, unstaged and untracked file states
    Status,
}

/// Parse a duration given as bare seconds or with an `ms`, `s` or `m` suffix.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (number, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {raw:?}"))?;

    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        _ => return Err(format!("unknown duration unit in {raw:?} (use ms, s or m)")),
    };

    if duration.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("20"), Ok(Duration::from_secs(20)));
        assert_eq!(parse_duration("20s"), Ok(Duration::from_secs(20)));
        assert_eq!(parse_duration("1500ms"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("ten").is_err());
        assert!(parse_duration("5h").is_err());
    }

    #[test]
    fn seed_and_subcommands() {
        let cli = Cli::try_parse_from(["commitscribe", "tighten auth", "--plain"]).unwrap();
        assert_eq!(cli.seed.as_deref(), Some("tighten auth"));
        assert!(cli.plain);
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["commitscribe", "analyze", "--json", "-vv"]).unwrap();
        assert_eq!(cli.command, Some(Command::Analyze));
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["commitscribe", "status", "--timeout", "5s", "--lang", "zh"])
                .unwrap();
        assert_eq!(cli.command, Some(Command::Status));
        assert_eq!(cli.timeout, Some(Duration::from_secs(5)));
        assert_eq!(cli.lang.as_deref(), Some("zh"));
    }
}
