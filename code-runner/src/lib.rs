//! # Snippet Runner
//!
//! Executes untrusted Python and Java snippets in disposable temporary
//! workspaces, driving the external toolchain under a wall-clock
//! timeout. Every failure class is reported as data on
//! [`ExecutionResult`] (sentinel exit codes for timeout, launch failure
//! and missing toolchain); nothing here panics past the component
//! boundary.

mod error;
mod explain;
mod languages;
mod runner;
mod types;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use explain::explain;
pub use languages::{Invocation, JavaRunner, LanguageRunner, PreparedSource, PythonRunner};
pub use runner::Runner;
pub use types::{
    ExecutionRequest, ExecutionResult, Language, ToolchainStatus, EXIT_LAUNCH_FAILURE,
    EXIT_TIMEOUT, EXIT_TOOLCHAIN_MISSING,
};

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, Error>;
