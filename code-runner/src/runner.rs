use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    error::Error,
    languages::{Invocation, JavaRunner, LanguageRunner, PreparedSource, PythonRunner},
    types::{ExecutionRequest, ExecutionResult, Language, EXIT_LAUNCH_FAILURE},
};

/// Disposable per-run working directory. Removal on every exit path,
/// timeouts and panics included, is delegated to [`TempDir`].
struct Workspace {
    dir: TempDir,
    id: Uuid,
}

impl Workspace {
    fn create() -> Result<Self, Error> {
        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("run-{}-", id))
            .tempdir()
            .map_err(|e| Error::Workspace(format!("failed to create workspace: {}", e)))?;

        debug!("Created workspace {} at {}", id, dir.path().display());
        Ok(Self { dir, id })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Captured output of one external process phase.
struct PhaseOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

/// Drives snippet execution: workspace setup, toolchain probing,
/// compile/run phases and timeout enforcement.
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Execute a request, mapping every failure class onto the sentinel
    /// exit codes of [`ExecutionResult`]. Never returns an error; the
    /// presentation layer decides how to surface failures.
    pub async fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        match request.language {
            Language::Python => self.run_with(&PythonRunner::new(None), request).await,
            Language::Java => self.run_with(&JavaRunner::new(), request).await,
        }
    }

    /// Execute with an explicit language runner.
    pub async fn run_with(
        &self,
        language: &dyn LanguageRunner,
        request: &ExecutionRequest,
    ) -> ExecutionResult {
        // Probe before any per-run artifacts exist.
        let status = language.probe_toolchain();
        if !status.is_available() {
            warn!("Toolchain unavailable: {}", status.describe());
            return ExecutionResult::toolchain_missing(status.describe());
        }

        let result = match self.run_phases(language, request).await {
            Ok(result) => result,
            Err(e) => {
                error!("Execution failed before the process could report: {}", e);
                ExecutionResult::launch_failure(e.to_string())
            }
        };

        if result.success() {
            info!("Execution completed successfully");
        } else {
            info!("Execution finished with exit code {}", result.exit_code);
        }
        result
    }

    async fn run_phases(
        &self,
        language: &dyn LanguageRunner,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, Error> {
        let workspace = Workspace::create()?;
        let source: PreparedSource = language.prepare(workspace.path(), &request.code).await?;

        // Each phase gets the full wall-clock budget; a slow compile
        // does not starve the run.
        if let Some(compile) = language.compile_invocation(workspace.path(), &source) {
            let compiled = self.execute_phase(&workspace, compile, request.timeout).await?;
            if compiled.exit_code != 0 {
                // Compiler diagnostics are returned verbatim and the
                // run phase is skipped.
                return Ok(ExecutionResult {
                    exit_code: compiled.exit_code,
                    stdout: compiled.stdout,
                    stderr: compiled.stderr,
                });
            }
        }

        let run = language.run_invocation(workspace.path(), &source);
        let output = self.execute_phase(&workspace, run, request.timeout).await?;
        Ok(ExecutionResult {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn execute_phase(
        &self,
        workspace: &Workspace,
        invocation: Invocation,
        budget: Duration,
    ) -> Result<PhaseOutput, Error> {
        debug!(
            "Workspace {} - spawning {} {:?}",
            workspace.id, invocation.program, invocation.args
        );

        let mut command = invocation.command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            Error::Launch(format!("failed to spawn {}: {}", invocation.program, e))
        })?;

        // Reading the pipes concurrently keeps partial output available
        // when the wait is cut short by the timeout.
        let stdout_task = tokio::spawn(drain_pipe(child.stdout.take()));
        let stderr_task = tokio::spawn(drain_pipe(child.stderr.take()));

        match time::timeout(budget, child.wait()).await {
            Ok(Ok(status)) => Ok(PhaseOutput {
                exit_code: status.code().unwrap_or(EXIT_LAUNCH_FAILURE),
                stdout: stdout_task.await.unwrap_or_default(),
                stderr: stderr_task.await.unwrap_or_default(),
            }),
            Ok(Err(e)) => Err(Error::Launch(format!("process error: {}", e))),
            Err(_) => {
                warn!(
                    "Workspace {} - {} exceeded {}s budget, killing",
                    workspace.id,
                    invocation.program,
                    budget.as_secs()
                );
                // Kill and reap so no orphan survives the timeout.
                let _ = child.start_kill();
                let _ = child.wait().await;

                let partial = stdout_task.await.unwrap_or_default();
                let _ = stderr_task.await;

                let result = ExecutionResult::timed_out(partial, budget);
                Ok(PhaseOutput {
                    exit_code: result.exit_code,
                    stdout: result.stdout,
                    stderr: result.stderr,
                })
            }
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

async fn drain_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).to_string()
}
