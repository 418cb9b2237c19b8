use std::io;

use thiserror::Error;

use crate::context::Interrupted;

/// Failure of a single external command invocation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with status {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("operation canceled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for RunError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => RunError::Cancelled,
            Interrupted::DeadlineExceeded => RunError::DeadlineExceeded,
        }
    }
}

impl RunError {
    /// stderr of a failed invocation, empty for every other kind.
    pub fn stderr(&self) -> &str {
        match self {
            RunError::Failed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

/// Errors surfaced by the change collector and the prompt assembler.
///
/// `NoChanges` is a normal terminal outcome rather than a failure; callers
/// should check [`CollectError::is_no_changes`] and report it neutrally.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("not a git repository")]
    NotARepository,

    #[error("nothing to commit")]
    NoChanges,

    #[error("{operation} failed")]
    Command {
        operation: &'static str,
        #[source]
        source: RunError,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("operation canceled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CollectError {
    /// Classify a runner failure for the named sub-operation.
    pub fn from_run(operation: &'static str, err: RunError) -> Self {
        match err {
            RunError::Cancelled => CollectError::Cancelled,
            RunError::DeadlineExceeded => CollectError::DeadlineExceeded,
            RunError::Failed { ref stderr, .. } if mentions_missing_repository(stderr) => {
                CollectError::NotARepository
            }
            other => CollectError::Command {
                operation,
                source: other,
            },
        }
    }

    pub fn is_no_changes(&self) -> bool {
        matches!(self, CollectError::NoChanges)
    }

    pub fn is_not_a_repository(&self) -> bool {
        matches!(self, CollectError::NotARepository)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            CollectError::Cancelled | CollectError::DeadlineExceeded
        )
    }
}

impl From<Interrupted> for CollectError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => CollectError::Cancelled,
            Interrupted::DeadlineExceeded => CollectError::DeadlineExceeded,
        }
    }
}

fn mentions_missing_repository(stderr: &str) -> bool {
    stderr.to_ascii_lowercase().contains("not a git repository")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> RunError {
        RunError::Failed {
            command: "git status --porcelain".into(),
            code: Some(128),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn missing_repository_is_recognised_from_stderr() {
        let err = CollectError::from_run(
            "status",
            failed("fatal: not a git repository (or any of the parent directories): .git"),
        );
        assert!(err.is_not_a_repository());

        let err = CollectError::from_run("status", failed("fatal: Not a git repository"));
        assert!(err.is_not_a_repository());
    }

    #[test]
    fn other_failures_keep_operation_name() {
        let err = CollectError::from_run("staged diff", failed("fatal: bad revision"));
        assert_eq!(err.to_string(), "staged diff failed");
        match err {
            CollectError::Command { operation, source } => {
                assert_eq!(operation, "staged diff");
                assert!(source.to_string().contains("bad revision"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn interruptions_pass_through() {
        assert!(CollectError::from_run("log", RunError::Cancelled).is_interrupted());
        assert!(matches!(
            CollectError::from_run("log", RunError::DeadlineExceeded),
            CollectError::DeadlineExceeded
        ));
    }
}
