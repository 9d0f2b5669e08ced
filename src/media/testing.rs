//! Scripted engine for tests.

use super::{engine::MediaEngine, error::MediaError, profile::ExtractorProfile, types::Platform};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct Call {
    pub op: &'static str,
    pub url: String,
    pub platform: Platform,
    pub format: Option<String>,
    pub output_dir: Option<PathBuf>,
}

pub struct FakeEngine {
    info: Result<Value, String>,
    listing: Result<String, String>,
    download_error: Option<String>,
    file_bytes: Vec<u8>,
    calls: Mutex<Vec<Call>>,
}

impl FakeEngine {
    pub fn with_info(info: Value) -> Self {
        Self {
            info: Ok(info),
            listing: Ok(String::new()),
            download_error: None,
            file_bytes: b"fake video bytes".to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_info(message: &str) -> Self {
        Self {
            info: Err(message.to_string()),
            ..Self::with_info(Value::Null)
        }
    }

    pub fn listing(mut self, listing: &str) -> Self {
        self.listing = Ok(listing.to_string());
        self
    }

    pub fn failing_listing(mut self, message: &str) -> Self {
        self.listing = Err(message.to_string());
        self
    }

    pub fn failing_download(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, op: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    fn record(
        &self,
        op: &'static str,
        url: &str,
        profile: &ExtractorProfile,
        format: Option<&str>,
        output_dir: Option<&Path>,
    ) {
        self.calls.lock().unwrap().push(Call {
            op,
            url: url.to_string(),
            platform: profile.platform,
            format: format.map(str::to_string),
            output_dir: output_dir.map(Path::to_path_buf),
        });
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn version(&self) -> Result<String, MediaError> {
        Ok("2024.01.01".to_string())
    }

    async fn extract_info(
        &self,
        url: &str,
        profile: &ExtractorProfile,
    ) -> Result<Value, MediaError> {
        self.record("extract_info", url, profile, None, None);
        self.info
            .clone()
            .map_err(|message| MediaError::Extraction {
                message,
                details: Some("ERROR: scripted failure".to_string()),
            })
    }

    async fn download(
        &self,
        url: &str,
        profile: &ExtractorProfile,
        format: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, MediaError> {
        self.record("download", url, profile, Some(format), Some(output_dir));
        if let Some(message) = &self.download_error {
            return Err(MediaError::extraction(message.clone()));
        }

        let path = output_dir.join("fake123.mp4");
        tokio::fs::write(&path, &self.file_bytes).await?;
        Ok(path)
    }

    async fn list_formats(
        &self,
        url: &str,
        profile: &ExtractorProfile,
    ) -> Result<String, MediaError> {
        self.record("list_formats", url, profile, None, None);
        self.listing.clone().map_err(MediaError::extraction)
    }
}
