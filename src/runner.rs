use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::context::Context;
use crate::error::RunError;

/// Executes an external command under a shared [`Context`].
///
/// Implementations return the command's standard output on success. An
/// invocation abandoned because the context was cancelled or expired must not
/// leave the process running.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<Vec<u8>, RunError>;
}

/// Runs real processes with `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    cwd: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        ProcessRunner {
            cwd: Some(dir.into()),
        }
    }
}

#[async_trait]
impl Runner for ProcessRunner {
    async fn run(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<Vec<u8>, RunError> {
        let command_line = render_command(program, args);
        log::debug!("running `{command_line}`");

        let mut cmd = Command::new(program);
        cmd.args(args)
            // untranslated stderr, needed for error classification
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = ctx
            .run(cmd.output())
            .await?
            .map_err(|source| RunError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::debug!(
                "`{command_line}` exited with status {:?}",
                output.status.code()
            );
            return Err(RunError::Failed {
                command: command_line,
                code: output.status.code(),
                stderr,
            });
        }

        log::trace!("`{command_line}` produced {} bytes", output.stdout.len());
        Ok(output.stdout)
    }
}

pub(crate) fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}
