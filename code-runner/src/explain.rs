//! Turns captured stderr/stdout into a single explanatory sentence.
//!
//! Pure and deterministic: identical input always yields the identical
//! sentence. Heuristics are prioritized per language family; the first
//! match wins.

use crate::types::Language;
use regex::Regex;
use std::sync::OnceLock;

const NO_ERRORS_PYTHON: &str = "No runtime errors detected.";
const NO_ERRORS_JAVA: &str = "No compilation or runtime errors detected.";

/// Derive a one-sentence explanation from captured process output.
pub fn explain(output: &str, language: Language) -> String {
    match language {
        Language::Python => explain_python(output),
        Language::Java => explain_java(output),
    }
}

fn explain_python(output: &str) -> String {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return NO_ERRORS_PYTHON.to_string();
    }

    if let Some(line) = lines.iter().find(|l| l.contains("SyntaxError")) {
        return format!(
            "Syntax error detected: {}. Fix the indicated line before running.",
            line.trim()
        );
    }

    if output.contains("Traceback") {
        // The last "Type: message" line names the raised exception.
        if let Some(line) = lines.iter().rev().find(|l| python_exception_line(l)) {
            return format!(
                "Detected runtime exception: {}. Inspect the traceback above to find the offending line.",
                line.trim()
            );
        }
    }

    format!("Runtime stderr: {}", lines.last().unwrap_or(&"").trim())
}

fn explain_java(output: &str) -> String {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return NO_ERRORS_JAVA.to_string();
    }

    if let Some(line) = lines.iter().find(|l| l.contains("error:")) {
        return format!(
            "Compilation error detected: {}. Check the indicated file and line.",
            line.trim()
        );
    }

    if let Some(line) = lines
        .iter()
        .rev()
        .find(|l| l.contains("Exception") || l.contains("Error"))
    {
        return format!(
            "Runtime exception detected: {}. Inspect the stack trace above for the root cause.",
            line.trim()
        );
    }

    format!("Java stderr: {}", lines.last().unwrap_or(&"").trim())
}

fn python_exception_line(line: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*(Error|Exception|Interrupt|Exit)\b").unwrap()
    });
    re.is_match(line.trim())
}
