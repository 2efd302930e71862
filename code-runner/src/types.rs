use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Exit code reported when the process exceeded its wall-clock budget.
pub const EXIT_TIMEOUT: i32 = -1;
/// Exit code reported when the process could not be launched or died abnormally.
pub const EXIT_LAUNCH_FAILURE: i32 = -2;
/// Exit code reported when the required toolchain is not on PATH.
pub const EXIT_TOOLCHAIN_MISSING: i32 = -3;

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

/// One user-triggered execution. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source language
    pub language: Language,
    /// Source code to execute
    pub code: String,
    /// Wall-clock budget for each external process
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
}

/// Captured result of one execution. Produced exactly once per request;
/// every failure class is carried as data rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Process exit code, or one of the negative sentinels
    pub exit_code: i32,
    /// Captured stdout (partial on timeout)
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn timed_out(partial_stdout: String, budget: Duration) -> Self {
        Self {
            exit_code: EXIT_TIMEOUT,
            stdout: partial_stdout,
            stderr: format!("execution timed out after {} seconds", budget.as_secs()),
        }
    }

    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: EXIT_LAUNCH_FAILURE,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn toolchain_missing(message: impl Into<String>) -> Self {
        Self {
            exit_code: EXIT_TOOLCHAIN_MISSING,
            stdout: String::new(),
            stderr: message.into(),
        }
    }
}

/// Outcome of probing the external toolchain before a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainStatus {
    Available,
    Missing(Vec<String>),
    VersionMismatch {
        tool: String,
        found: String,
        required: String,
    },
}

impl ToolchainStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ToolchainStatus::Available)
    }

    pub fn describe(&self) -> String {
        match self {
            ToolchainStatus::Available => "toolchain available".to_string(),
            ToolchainStatus::Missing(tools) => {
                format!("required tools not found on PATH: {}", tools.join(", "))
            }
            ToolchainStatus::VersionMismatch {
                tool,
                found,
                required,
            } => format!("{} version {} found, {} required", tool, found, required),
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
