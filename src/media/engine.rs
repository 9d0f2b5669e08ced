use super::{error::MediaError, profile::ExtractorProfile};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Human-readable name of the engine
    fn name(&self) -> &'static str;

    /// Engine version, or an error if the engine cannot be run
    async fn version(&self) -> Result<String, MediaError>;

    /// Extract metadata for the given URL without downloading anything
    async fn extract_info(&self, url: &str, profile: &ExtractorProfile)
        -> Result<Value, MediaError>;

    /// Download `url` with the given format selector into `output_dir`,
    /// returning the path of the produced file
    async fn download(
        &self,
        url: &str,
        profile: &ExtractorProfile,
        format: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, MediaError>;

    /// Human-readable format table, as printed by `--list-formats`
    async fn list_formats(&self, url: &str, profile: &ExtractorProfile)
        -> Result<String, MediaError>;
}
