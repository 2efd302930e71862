//! Locating the downloaded artifact after the extractor returns.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Filename-safe derivation of a media title: alphanumerics, spaces,
/// dashes and underscores survive, everything else is dropped.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Resolve the output artifact. First existing match wins:
/// 1. the expected path computed from returned metadata,
/// 2. the newest file whose name contains the sanitized title,
/// 3. the newest file in the output directory overall.
pub fn resolve_output(dir: &Path, expected: Option<&Path>, title: &str) -> Option<PathBuf> {
    if let Some(expected) = expected {
        if expected.exists() {
            return Some(expected.to_path_buf());
        }
    }

    let needle = sanitize_title(title);
    if !needle.is_empty() {
        if let Some(found) = newest_matching(dir, |name| name.contains(&needle)) {
            return Some(found);
        }
    }

    newest_matching(dir, |_| true)
}

/// Resolve using the metadata of a finished operation: the reported
/// output path first, then the title-based fallbacks.
pub fn resolve_artifact(dir: &Path, info: &crate::types::MediaInfo) -> Option<PathBuf> {
    resolve_output(dir, info.output_path.as_deref(), &info.title)
}

fn newest_matching(dir: &Path, matches: impl Fn(&str) -> bool) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if !matches(&name) {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path)
}
