use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub downloads: DownloadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Settings handed to the extraction engine on every call.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Path or name of the yt-dlp executable
    pub binary: String,
    pub socket_timeout_secs: u64,
    pub retries: u32,
    pub extractor_retries: u32,
    pub fragment_retries: u32,
    /// Upper bound for a metadata or format-listing process
    pub info_timeout_secs: u64,
    /// Upper bound for a download process
    pub download_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            socket_timeout_secs: 30,
            retries: 3,
            extractor_retries: 3,
            fragment_retries: 3,
            info_timeout_secs: 60,
            download_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DownloadConfig {
    /// Parent directory for per-request temporary download directories
    pub dir: PathBuf,
    /// Maximum video height requested from the engine
    pub max_height: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir().join("clipfetch"),
            max_height: 480,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Applies `PORT` from the environment on top of the file values.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_port_var(std::env::var("PORT").ok())
    }

    fn with_port_var(mut self, port: Option<String>) -> Result<Self> {
        if let Some(port) = port {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        Ok(self)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
