//! Turns the pending changes of a Git working tree into a bounded prompt for
//! commit-message generation.
//!
//! [`git::Collector`] gathers branch, history, status and diff through a
//! [`runner::Runner`], and [`prompt::PromptBuilder`] renders them under a
//! token budget. Everything runs under a shared [`context::Context`].

pub mod context;
pub mod error;
pub mod git;
pub mod prompt;
pub mod runner;

pub use context::Context;
pub use error::{CollectError, RunError};
pub use git::{ChangeSnapshot, ChangeSource, Collector};
pub use prompt::{Language, PromptBuilder, PromptPair};
pub use runner::{ProcessRunner, Runner};
