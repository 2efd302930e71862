//! Language-specific runner implementations

mod java;
mod python;

pub use java::JavaRunner;
pub use python::PythonRunner;

use crate::{error::Error, types::ToolchainStatus};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use which::which;

/// A fully resolved invocation of one external toolchain process.
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.cwd);
        command
    }
}

/// Source code written into a workspace, ready for the toolchain.
pub struct PreparedSource {
    /// Path of the written source file
    pub file: PathBuf,
    /// Entry point handed to the run phase: the script path for an
    /// interpreted language, the main class name for Java
    pub entry: String,
}

/// Trait for language-specific snippet runners
#[async_trait]
pub trait LanguageRunner: Send + Sync {
    /// Executables that must be on PATH for this language
    fn required_tools(&self) -> Vec<&str>;

    /// Write the source into the workspace
    async fn prepare(&self, workspace: &Path, code: &str) -> Result<PreparedSource, Error>;

    /// Compile phase invocation; interpreted languages return None
    fn compile_invocation(&self, workspace: &Path, source: &PreparedSource) -> Option<Invocation>;

    /// Run phase invocation
    fn run_invocation(&self, workspace: &Path, source: &PreparedSource) -> Invocation;

    /// Check tool availability without touching the filesystem.
    fn probe_toolchain(&self) -> ToolchainStatus {
        let missing: Vec<String> = self
            .required_tools()
            .iter()
            .filter(|tool| which(tool).is_err())
            .map(|s| (*s).to_string())
            .collect();

        if missing.is_empty() {
            ToolchainStatus::Available
        } else {
            ToolchainStatus::Missing(missing)
        }
    }
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(**tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}
