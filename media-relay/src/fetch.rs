//! yt-dlp driven media extraction.
//!
//! The extractor is an external tool located via PATH; this module
//! builds the invocation plan for the user's format choice, degrades
//! it when ffmpeg is missing, and parses the newline-delimited JSON
//! progress stream into [`ProgressEvent`]s.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};
use which::which;

use crate::{
    error::Error,
    relay::{ExtractionJob, ProgressSink},
    types::{MediaInfo, ProgressEvent},
};

/// Output format requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    /// Best available video+audio
    Best,
    /// mp4 video
    Mp4,
    /// Audio only, transcoded to mp3
    Mp3,
}

/// Concrete plan for one extractor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    /// Format selector handed to the extractor
    pub format: String,
    /// Output template substituting title and extension
    pub output_template: String,
    /// Whether an extract-audio post-processing step is requested
    pub extract_mp3: bool,
    /// Set when a missing ffmpeg forced a degraded plan
    pub degraded: Option<String>,
}

impl DownloadPlan {
    /// Build the plan for a choice, degrading it when ffmpeg is not on
    /// PATH: merged-format selectors fall back to a single-file `best`
    /// and the mp3 transcode step is dropped.
    pub fn build(choice: FormatChoice, output_dir: &Path) -> Self {
        Self::build_with(choice, output_dir, which("ffmpeg").is_ok())
    }

    fn build_with(choice: FormatChoice, output_dir: &Path, has_ffmpeg: bool) -> Self {
        let output_template = output_dir
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned();

        let mut plan = match choice {
            FormatChoice::Best => Self {
                format: "bestvideo+bestaudio/best".to_string(),
                output_template,
                extract_mp3: false,
                degraded: None,
            },
            FormatChoice::Mp4 => Self {
                format: "bestvideo[ext=mp4]+bestaudio[ext=m4a]/mp4".to_string(),
                output_template,
                extract_mp3: false,
                degraded: None,
            },
            FormatChoice::Mp3 => Self {
                format: "bestaudio/best".to_string(),
                output_template,
                extract_mp3: true,
                degraded: None,
            },
        };

        if !has_ffmpeg {
            match choice {
                FormatChoice::Best | FormatChoice::Mp4 => {
                    plan.format = "best".to_string();
                    plan.degraded = Some(
                        "ffmpeg not found; downloading a single-file 'best' format instead of merging"
                            .to_string(),
                    );
                }
                FormatChoice::Mp3 => {
                    plan.extract_mp3 = false;
                    plan.degraded = Some(
                        "ffmpeg not found; mp3 conversion skipped, raw audio file kept".to_string(),
                    );
                }
            }
        }

        plan
    }
}

/// One progress line as printed by the extractor's progress template.
/// Byte counts arrive as floats when the total is an estimate.
#[derive(Debug, Deserialize)]
struct ProgressLine {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    downloaded_bytes: Option<f64>,
    #[serde(default)]
    total_bytes: Option<f64>,
    #[serde(default)]
    total_bytes_estimate: Option<f64>,
    #[serde(default)]
    filename: Option<String>,
}

fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    let parsed: ProgressLine = serde_json::from_str(line).ok()?;

    match parsed.status.as_deref() {
        Some("downloading") => Some(ProgressEvent::Downloading {
            downloaded_bytes: parsed.downloaded_bytes.unwrap_or(0.0) as u64,
            total_bytes: parsed
                .total_bytes
                .or(parsed.total_bytes_estimate)
                .map(|b| b as u64),
            filename: parsed.filename,
        }),
        Some("finished") => Some(ProgressEvent::Finished {
            filename: parsed.filename,
        }),
        Some("error") => Some(ProgressEvent::Error {
            message: "error reported during download".to_string(),
        }),
        _ => None,
    }
}

/// Extraction job backed by the `yt-dlp` executable.
pub struct YtDlpJob {
    url: String,
    plan: DownloadPlan,
}

impl YtDlpJob {
    pub fn new(url: impl Into<String>, plan: DownloadPlan) -> Self {
        Self {
            url: url.into(),
            plan,
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--quiet",
            "--no-warnings",
            "--no-playlist",
            "--restrict-filenames",
            "--newline",
            "--progress",
            "--progress-template",
            "download:%(progress)j",
            "--print",
            "after_move:filepath",
            "-f",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.push(self.plan.format.clone());
        args.push("-o".to_string());
        args.push(self.plan.output_template.clone());

        if self.plan.extract_mp3 {
            args.extend(
                ["--extract-audio", "--audio-format", "mp3", "--audio-quality", "192K"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }

        args.push(self.url.clone());
        args
    }
}

#[async_trait]
impl ExtractionJob for YtDlpJob {
    async fn run(self: Box<Self>, progress: ProgressSink) -> Result<MediaInfo, Error> {
        let yt_dlp = which("yt-dlp").map_err(|_| Error::ToolMissing("yt-dlp".to_string()))?;

        if let Some(reason) = &self.plan.degraded {
            warn!("{}", reason);
        }
        debug!("Spawning {} {:?}", yt_dlp.display(), self.args());

        let mut child = Command::new(&yt_dlp)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr_task = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).to_string()
            })
        });

        // Progress lines are JSON objects; the single non-JSON line is
        // the final filepath requested via --print.
        let mut reported_path: Option<PathBuf> = None;
        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_progress_line(&line) {
                    Some(event) => progress.emit(event),
                    None if !line.trim().is_empty() => {
                        reported_path = Some(PathBuf::from(line.trim()));
                    }
                    None => {}
                }
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            let message = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("extractor exited with a failure status")
                .trim()
                .to_string();
            progress.emit(ProgressEvent::Error {
                message: message.clone(),
            });
            return Err(Error::Extraction(message));
        }

        progress.emit(ProgressEvent::Finished {
            filename: reported_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        });

        Ok(MediaInfo {
            title: reported_path
                .as_ref()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ext: reported_path
                .as_ref()
                .and_then(|p| p.extension())
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
            output_path: reported_path,
        })
    }
}

/// Fetch the media title without downloading, used by fallback file
/// resolution when the reported path is unusable.
pub async fn probe_title(url: &str) -> Result<String, Error> {
    let yt_dlp = which("yt-dlp").map_err(|_| Error::ToolMissing("yt-dlp".to_string()))?;

    let output = Command::new(&yt_dlp)
        .args(["--quiet", "--no-warnings", "--no-playlist", "--skip-download"])
        .args(["--print", "%(title)s", url])
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::Extraction(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
