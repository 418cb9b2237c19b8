use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use commitscribe::Language;
use commitscribe::prompt::budget::DEFAULT_MAX_TOKENS;
use serde::Deserialize;

use crate::cli_args::{Cli, parse_duration};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Final resolved configuration for commitscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub language: Language,
    pub max_tokens: usize,
    pub diff_limit: usize,
    pub timeout: Duration,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--lang`, `--max-tokens`, `--diff-limit`, `--timeout`)
    ///   2. Env vars `COMMITSCRIBE_LANG`, `COMMITSCRIBE_MAX_TOKENS`,
    ///      `COMMITSCRIBE_DIFF_LIMIT`, `COMMITSCRIBE_TIMEOUT`
    ///   3. TOML `~/.config/commitscribe.toml`
    ///   4. Hardcoded defaults (en, 8000 tokens, unlimited diff, 20s)
    pub fn from_sources(cli: &Cli) -> Self {
        let file_cfg = load_file_config().unwrap_or_default();
        Self::resolve(cli, file_cfg, |key| env::var(key).ok())
    }

    fn resolve(cli: &Cli, file_cfg: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let lang = cli
            .lang
            .clone()
            .or_else(|| env("COMMITSCRIBE_LANG"))
            .or(file_cfg.lang)
            .unwrap_or_else(|| "en".to_string());

        let max_tokens = cli
            .max_tokens
            .or_else(|| env_number(&env, "COMMITSCRIBE_MAX_TOKENS"))
            .or(file_cfg.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let diff_limit = cli
            .diff_limit
            .or_else(|| env_number(&env, "COMMITSCRIBE_DIFF_LIMIT"))
            .or(file_cfg.diff_limit)
            .unwrap_or(0);

        let timeout = cli
            .timeout
            .or_else(|| env_duration(&env, "COMMITSCRIBE_TIMEOUT"))
            .or(file_cfg.timeout.and_then(|raw| parse_duration(&raw).ok()))
            .unwrap_or(DEFAULT_TIMEOUT);

        Config {
            language: Language::from_code(&lang),
            max_tokens,
            diff_limit,
            timeout,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    pub lang: Option<String>,
    pub max_tokens: Option<usize>,
    pub diff_limit: Option<usize>,
    /// Same syntax as `--timeout`.
    pub timeout: Option<String>,
}

fn env_number<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {key}={raw:?}: not a number");
            None
        }
    }
}

fn env_duration(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = env(key)?;
    match parse_duration(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring {key}={raw:?}: {err}");
            None
        }
    }
}

/// Return `~/.config/commitscribe.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("commitscribe.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("ignoring {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("commitscribe").chain(args.iter().copied())).unwrap()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = Config::resolve(&cli(&[]), FileConfig::default(), env_of(&[]));
        assert_eq!(
            cfg,
            Config {
                language: Language::English,
                max_tokens: 8000,
                diff_limit: 0,
                timeout: Duration::from_secs(20),
            }
        );
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file_cfg: FileConfig =
            toml::from_str("lang = \"zh\"\nmax_tokens = 100\ndiff_limit = 10\ntimeout = \"3s\"")
                .unwrap();
        let env = env_of(&[("COMMITSCRIBE_MAX_TOKENS", "200"), ("COMMITSCRIBE_LANG", "en")]);
        let cfg = Config::resolve(&cli(&["--max-tokens", "300"]), file_cfg, env);

        assert_eq!(cfg.max_tokens, 300);
        assert_eq!(cfg.language, Language::English);
        assert_eq!(cfg.diff_limit, 10);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let env = env_of(&[
            ("COMMITSCRIBE_MAX_TOKENS", "lots"),
            ("COMMITSCRIBE_TIMEOUT", "soon"),
        ]);
        let cfg = Config::resolve(&cli(&[]), FileConfig::default(), env);
        assert_eq!(cfg.max_tokens, 8000);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
    }
}
