use super::{
    engine::MediaEngine,
    error::{classify_engine_stderr, MediaError},
    profile::ExtractorProfile,
};
use crate::config::EngineConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

const NOT_INSTALLED: &str = "yt-dlp is not installed. Please install yt-dlp to continue.";

pub struct YtDlpEngine {
    binary: String,
    info_timeout: Duration,
    download_timeout: Duration,
}

impl YtDlpEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            info_timeout: Duration::from_secs(config.info_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        }
    }

    async fn run(
        &self,
        args: &[String],
        timeout: Duration,
        failure_message: &str,
    ) -> Result<Output, MediaError> {
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = tokio::time::timeout(
            timeout,
            Command::new(&self.binary)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            MediaError::extraction(format!(
                "{} (timed out after {}s)",
                failure_message,
                timeout.as_secs()
            ))
        })?
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => MediaError::Extraction {
                message: NOT_INSTALLED.to_string(),
                details: Some(e.to_string()),
            },
            _ => MediaError::Extraction {
                message: failure_message.to_string(),
                details: Some(e.to_string()),
            },
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} exited with {}: {}", self.binary, output.status, stderr);
            return Err(MediaError::Extraction {
                message: classify_engine_stderr(&stderr, failure_message),
                details: (!stderr.is_empty()).then_some(stderr),
            });
        }

        Ok(output)
    }
}

/// Flags shared by every invocation, derived from the call's profile.
pub fn profile_args(profile: &ExtractorProfile) -> Vec<String> {
    let mut args = vec![
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
        "--no-check-certificate".to_string(),
        "--geo-bypass".to_string(),
        "--socket-timeout".to_string(),
        profile.socket_timeout_secs.to_string(),
        "--retries".to_string(),
        profile.retries.to_string(),
        "--extractor-retries".to_string(),
        profile.extractor_retries.to_string(),
        "--fragment-retries".to_string(),
        profile.fragment_retries.to_string(),
    ];

    for (name, value) in &profile.headers {
        args.push("--add-header".to_string());
        args.push(format!("{}:{}", name, value));
    }

    for extractor_arg in &profile.extractor_args {
        args.push("--extractor-args".to_string());
        args.push(extractor_arg.clone());
    }

    args
}

/// Locates the file yt-dlp produced inside `output_dir`, preferring the path
/// it printed.
async fn find_downloaded_file(
    output_dir: &Path,
    printed: Option<&str>,
) -> Result<PathBuf, MediaError> {
    if let Some(printed) = printed {
        let candidate = PathBuf::from(printed);
        let is_file = tokio::fs::metadata(&candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if candidate.starts_with(output_dir) && is_file {
            return Ok(candidate);
        }
        warn!("Ignoring unusable printed path: {}", printed);
    }

    let mut entries = tokio::fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            return Ok(entry.path());
        }
    }

    Err(MediaError::extraction("Downloaded file not found"))
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn version(&self) -> Result<String, MediaError> {
        let output = self
            .run(
                &["--version".to_string()],
                self.info_timeout,
                "yt-dlp version check failed",
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn extract_info(
        &self,
        url: &str,
        profile: &ExtractorProfile,
    ) -> Result<Value, MediaError> {
        debug!(
            "Extracting metadata with yt-dlp for: {} ({} profile, UA {:?})",
            url,
            profile.platform,
            profile.header("User-Agent")
        );

        let mut args = vec!["--dump-single-json".to_string(), "--no-download".to_string()];
        args.extend(profile_args(profile));
        args.push(url.to_string());

        let output = self
            .run(&args, self.info_timeout, "Failed to fetch video information")
            .await?;

        let json_str = String::from_utf8_lossy(&output.stdout);
        if json_str.trim().is_empty() {
            return Err(MediaError::EmptyResult);
        }

        serde_json::from_str(&json_str).map_err(|e| MediaError::Extraction {
            message: "Failed to parse video information".to_string(),
            details: Some(e.to_string()),
        })
    }

    async fn download(
        &self,
        url: &str,
        profile: &ExtractorProfile,
        format: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, MediaError> {
        info!("Downloading media with yt-dlp: {} (format {})", url, format);

        let template = output_dir.join("%(id)s.%(ext)s");
        let mut args = vec![
            "--format".to_string(),
            format.to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--no-part".to_string(),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];
        args.extend(profile_args(profile));
        args.push(url.to_string());

        let output = self
            .run(&args, self.download_timeout, "Error downloading video")
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let printed = stdout.lines().map(str::trim).rfind(|l| !l.is_empty());
        find_downloaded_file(output_dir, printed).await
    }

    async fn list_formats(
        &self,
        url: &str,
        profile: &ExtractorProfile,
    ) -> Result<String, MediaError> {
        debug!("Listing formats with yt-dlp for: {}", url);

        let mut args = vec!["--list-formats".to_string()];
        args.extend(profile_args(profile));
        args.push(url.to_string());

        let output = self
            .run(&args, self.info_timeout, "Failed to list video formats")
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
