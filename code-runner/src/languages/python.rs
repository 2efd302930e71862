use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::{
    error::Error,
    languages::{Invocation, LanguageRunner, PreparedSource},
};

pub struct PythonRunner {
    interpreter: String,
}

impl PythonRunner {
    pub fn new(interpreter: Option<String>) -> Self {
        Self {
            interpreter: interpreter.unwrap_or_else(|| "python3".to_string()),
        }
    }
}

#[async_trait]
impl LanguageRunner for PythonRunner {
    fn required_tools(&self) -> Vec<&str> {
        vec![self.interpreter.as_str()]
    }

    async fn prepare(&self, workspace: &Path, code: &str) -> Result<PreparedSource, Error> {
        let file = workspace.join("snippet.py");
        fs::write(&file, code).await.map_err(Error::Io)?;
        debug!("Wrote source file to: {}", file.display());

        Ok(PreparedSource {
            entry: file.display().to_string(),
            file,
        })
    }

    fn compile_invocation(&self, _workspace: &Path, _source: &PreparedSource) -> Option<Invocation> {
        None
    }

    fn run_invocation(&self, workspace: &Path, source: &PreparedSource) -> Invocation {
        Invocation {
            program: self.interpreter.clone(),
            args: vec![source.entry.clone()],
            cwd: workspace.to_path_buf(),
        }
    }
}
