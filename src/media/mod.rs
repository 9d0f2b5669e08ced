mod download;
mod engine;
mod error;
mod listing;
mod normalize;
mod platform;
mod profile;
mod types;
mod ytdlp;

#[cfg(test)]
pub mod testing;

pub use download::{DownloadGuard, DownloadedFile};
pub use engine::MediaEngine;
pub use error::MediaError;
pub use types::{Platform, TikTokInfo, VideoInfo};
pub use ytdlp::YtDlpEngine;

use crate::config::{DownloadConfig, EngineConfig};
use listing::pick_mp4_format;
use normalize::build_video_info;
use platform::{normalize_url, platform_for_url};
use profile::ExtractorProfile;
use std::sync::Arc;
use tracing::{info, warn};

/// Format selector for ordinary downloads, capped at `max_height`.
pub fn capped_format_selector(max_height: u32) -> String {
    format!(
        "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best",
        h = max_height
    )
}

pub struct MediaService {
    engine: Arc<dyn MediaEngine>,
    engine_config: EngineConfig,
    downloads: DownloadConfig,
}

impl MediaService {
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        engine_config: EngineConfig,
        downloads: DownloadConfig,
    ) -> Self {
        info!(
            "Media service initialized - engine {}, downloads in {}",
            engine.name(),
            downloads.dir.display()
        );

        Self {
            engine,
            engine_config,
            downloads,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    fn profile(&self, platform: Platform) -> ExtractorProfile {
        ExtractorProfile::for_platform(platform, &self.engine_config)
    }

    fn profile_for_url(&self, url: &str) -> ExtractorProfile {
        self.profile(platform_for_url(url).unwrap_or(Platform::Other))
    }

    async fn extract(
        &self,
        url: &str,
        profile: &ExtractorProfile,
    ) -> Result<VideoInfo, MediaError> {
        let raw = self.engine.extract_info(url, profile).await?;
        build_video_info(&raw, url)
    }

    pub async fn fetch_metadata(&self, raw_url: &str) -> Result<VideoInfo, MediaError> {
        let url = normalize_url(raw_url)?;
        info!("Fetching metadata for URL: {}", url);

        let profile = self.profile_for_url(&url);
        self.extract(&url, &profile).await
    }

    pub async fn download(&self, raw_url: &str) -> Result<DownloadedFile, MediaError> {
        let url = normalize_url(raw_url)?;
        info!("Starting download for URL: {}", url);

        let profile = self.profile_for_url(&url);
        let selector = capped_format_selector(self.downloads.max_height);
        let guard = DownloadGuard::create_in(&self.downloads.dir).await?;
        let path = self
            .engine
            .download(&url, &profile, &selector, guard.path())
            .await?;

        Ok(DownloadedFile::new(path, guard))
    }

    pub async fn tiktok_info(&self, raw_url: &str) -> Result<TikTokInfo, MediaError> {
        let url = normalize_url(raw_url)?;
        info!("Fetching TikTok metadata for URL: {}", url);

        let info = self.extract(&url, &self.profile(Platform::TikTok)).await?;
        let direct_url = info
            .best_playable()
            .and_then(|f| f.url.clone())
            .ok_or(MediaError::NoSuitableFormat)?;

        Ok(TikTokInfo { info, direct_url })
    }

    /// Downloads a TikTok video, falling back to the engine's format listing
    /// when metadata extraction yields nothing playable.
    pub async fn tiktok_download(&self, raw_url: &str) -> Result<DownloadedFile, MediaError> {
        let url = normalize_url(raw_url)?;
        info!("Starting TikTok download for URL: {}", url);

        let profile = self.profile(Platform::TikTok);
        let primary = match self.extract(&url, &profile).await {
            Ok(info) => info.best_playable().map(|f| f.format_id.clone()),
            Err(e) => {
                warn!("TikTok extraction failed, trying format listing: {}", e);
                None
            }
        };

        match primary {
            Some(format_id) => {
                let selector = format!("{}/best[ext=mp4]/best", format_id);
                let guard = DownloadGuard::create_in(&self.downloads.dir).await?;
                let path = self
                    .engine
                    .download(&url, &profile, &selector, guard.path())
                    .await?;
                Ok(DownloadedFile::new(path, guard))
            }
            None => self.tiktok_fallback(&url, &profile).await,
        }
    }

    async fn tiktok_fallback(
        &self,
        url: &str,
        profile: &ExtractorProfile,
    ) -> Result<DownloadedFile, MediaError> {
        let listing = self
            .engine
            .list_formats(url, profile)
            .await
            .map_err(MediaError::into_subprocess)?;
        let format_id = pick_mp4_format(&listing).ok_or(MediaError::NoSuitableFormat)?;
        info!("TikTok fallback picked format {}", format_id);

        let guard = DownloadGuard::create_in(&self.downloads.dir).await?;
        let path = self
            .engine
            .download(url, profile, &format_id, guard.path())
            .await
            .map_err(MediaError::into_subprocess)?;

        Ok(DownloadedFile::new(path, guard))
    }

    /// Reports the engine version, logging whether it is usable.
    pub async fn test_setup(&self) -> Result<String, MediaError> {
        info!("Testing media engine setup...");

        match self.engine.version().await {
            Ok(version) => {
                info!("✅ {} is available, version: {}", self.engine.name(), version);
                Ok(version)
            }
            Err(e) => {
                warn!("❌ {} is not available: {}", self.engine.name(), e);
                Err(e)
            }
        }
    }
}
