use thiserror::Error;

/// Failures surfaced by the media pipeline.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("No URL provided")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not extract video information")]
    EmptyResult,

    #[error("{message}")]
    Extraction {
        message: String,
        details: Option<String>,
    },

    #[error("No suitable video format found")]
    NoSuitableFormat,

    #[error("{message}")]
    Subprocess {
        message: String,
        details: Option<String>,
    },

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
            details: None,
        }
    }

    /// Raw engine output attached to the error, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Extraction { details, .. } | Self::Subprocess { details, .. } => {
                details.as_deref()
            }
            _ => None,
        }
    }

    /// Re-labels an engine failure as a failure of the fallback subprocess.
    pub fn into_subprocess(self) -> Self {
        match self {
            Self::Extraction { message, details } => Self::Subprocess { message, details },
            other => other,
        }
    }
}

/// Maps yt-dlp stderr onto a message fit for an end user.
pub fn classify_engine_stderr(stderr: &str, fallback: &str) -> String {
    const KNOWN: &[(&str, &str)] = &[
        (
            "Unsupported URL",
            "Unsupported URL. Please check if the video is available.",
        ),
        (
            "Private video",
            "This video is private and cannot be accessed.",
        ),
        (
            "Video unavailable",
            "The video is unavailable. It may have been removed or made private.",
        ),
        (
            "This video is not available",
            "This video is not available in your country or has been removed.",
        ),
        (
            "command not found",
            "yt-dlp is not installed. Please install yt-dlp to continue.",
        ),
    ];

    KNOWN
        .iter()
        .find(|(needle, _)| stderr.contains(needle))
        .map(|(_, message)| message.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_errors() {
        assert_eq!(
            classify_engine_stderr("ERROR: Unsupported URL: https://a.b", "x"),
            "Unsupported URL. Please check if the video is available."
        );
        assert_eq!(
            classify_engine_stderr("ERROR: [youtube] abc: Private video. Sign in", "x"),
            "This video is private and cannot be accessed."
        );
        assert_eq!(
            classify_engine_stderr("ERROR: [youtube] abc: Video unavailable", "x"),
            "The video is unavailable. It may have been removed or made private."
        );
    }

    #[test]
    fn test_classify_unknown_uses_fallback() {
        assert_eq!(
            classify_engine_stderr("ERROR: something odd", "Failed to fetch video information"),
            "Failed to fetch video information"
        );
    }

    #[test]
    fn test_details_and_relabel() {
        let err = MediaError::Extraction {
            message: "boom".to_string(),
            details: Some("stderr".to_string()),
        };
        assert_eq!(err.details(), Some("stderr"));

        let err = err.into_subprocess();
        assert!(matches!(err, MediaError::Subprocess { .. }));
        assert_eq!(err.to_string(), "boom");

        assert_eq!(MediaError::MissingUrl.details(), None);
        assert!(matches!(
            MediaError::NoSuitableFormat.into_subprocess(),
            MediaError::NoSuitableFormat
        ));
    }
}
