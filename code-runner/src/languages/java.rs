use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;
use tracing::debug;

use crate::{
    error::Error,
    languages::{Invocation, LanguageRunner, PreparedSource},
};

pub struct JavaRunner;

impl JavaRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn public_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"public\s+class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

fn any_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bclass\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

/// Decide the main class name for a snippet and whether it needs to be
/// wrapped in a generated class shell. Statement-only snippets become
/// the body of `Main.main`.
pub(crate) fn classify_source(code: &str) -> (String, bool) {
    if let Some(captures) = public_class_re().captures(code) {
        return (captures[1].to_string(), false);
    }
    if let Some(captures) = any_class_re().captures(code) {
        return (captures[1].to_string(), false);
    }
    ("Main".to_string(), true)
}

fn wrap_in_main(code: &str) -> String {
    format!(
        "public class Main {{\n    public static void main(String[] args) {{\n{}\n    }}\n}}\n",
        code
    )
}

#[async_trait]
impl LanguageRunner for JavaRunner {
    fn required_tools(&self) -> Vec<&str> {
        vec!["javac", "java"]
    }

    async fn prepare(&self, workspace: &Path, code: &str) -> Result<PreparedSource, Error> {
        let (class_name, needs_wrap) = classify_source(code);
        let source = if needs_wrap {
            wrap_in_main(code)
        } else {
            code.to_string()
        };

        let file = workspace.join(format!("{}.java", class_name));
        fs::write(&file, source).await.map_err(Error::Io)?;
        debug!("Wrote source file to: {}", file.display());

        Ok(PreparedSource {
            file,
            entry: class_name,
        })
    }

    fn compile_invocation(&self, workspace: &Path, source: &PreparedSource) -> Option<Invocation> {
        Some(Invocation {
            program: "javac".to_string(),
            args: vec![source.file.display().to_string()],
            cwd: workspace.to_path_buf(),
        })
    }

    fn run_invocation(&self, workspace: &Path, source: &PreparedSource) -> Invocation {
        Invocation {
            program: "java".to_string(),
            args: vec![
                "-cp".to_string(),
                workspace.display().to_string(),
                source.entry.clone(),
            ],
            cwd: workspace.to_path_buf(),
        }
    }
}
