use super::{error::MediaError, types::Platform};
use url::Url;

/// Short-domain aliases rewritten to their canonical host before the engine sees them.
const HOST_ALIASES: &[(&str, &str)] = &[("x.com", "twitter.com")];

/// Ordered pattern table. Earlier rows win.
///
/// Patterns containing a dot are matched as a domain suffix against URL hosts;
/// bare words match a single host label. Extractor names are matched by substring.
const PLATFORM_TABLE: &[(&str, Platform)] = &[
    ("youtube", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("twitter", Platform::Twitter),
    ("x.com", Platform::Twitter),
    ("reddit", Platform::Reddit),
    ("redd.it", Platform::Reddit),
    ("tiktok", Platform::TikTok),
];

fn host_matches(host: &str, pattern: &str) -> bool {
    if pattern.contains('.') {
        host == pattern || host.ends_with(&format!(".{}", pattern))
    } else {
        host.split('.').any(|label| label == pattern)
    }
}

/// Trims and validates the URL, then rewrites alias hosts to their canonical form.
pub fn normalize_url(raw: &str) -> Result<String, MediaError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MediaError::MissingUrl);
    }

    let mut url = Url::parse(raw).map_err(|e| MediaError::InvalidUrl(format!("{raw} ({e})")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(MediaError::InvalidUrl(raw.to_string()));
    }

    let host = url.host_str().map(|h| h.to_ascii_lowercase());
    if let Some(host) = host {
        for (alias, canonical) in HOST_ALIASES {
            let rewritten = if host == *alias {
                Some(canonical.to_string())
            } else {
                host.strip_suffix(&format!(".{}", alias))
                    .map(|prefix| format!("{}.{}", prefix, canonical))
            };

            if let Some(rewritten) = rewritten {
                url.set_host(Some(&rewritten))
                    .map_err(|e| MediaError::InvalidUrl(format!("{raw} ({e})")))?;
                break;
            }
        }
    }

    Ok(url.to_string())
}

/// Platform implied by the host of a URL.
pub fn platform_for_url(url: &str) -> Option<Platform> {
    let host = Url::parse(url).ok()?.host_str()?.to_ascii_lowercase();
    PLATFORM_TABLE
        .iter()
        .find(|(pattern, _)| host_matches(&host, pattern))
        .map(|(_, platform)| *platform)
}

/// Platform implied by an engine extractor name such as `TikTok` or `youtube:tab`.
pub fn platform_for_extractor(extractor: &str) -> Option<Platform> {
    let extractor = extractor.to_ascii_lowercase();
    PLATFORM_TABLE
        .iter()
        .find(|(pattern, _)| extractor.contains(pattern))
        .map(|(_, platform)| *platform)
}

/// Resolves the platform of an extraction result: the extractor name first,
/// then the canonical page URL.
pub fn detect_platform(extractor: Option<&str>, webpage_url: Option<&str>) -> Platform {
    extractor
        .and_then(platform_for_extractor)
        .or_else(|| webpage_url.and_then(platform_for_url))
        .unwrap_or(Platform::Other)
}

/// Extracts an 11-character YouTube video id from the common URL shapes.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    let candidate = if host_matches(&host, "youtu.be") {
        parsed.path_segments()?.next().map(str::to_string)
    } else if host_matches(&host, "youtube") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                let mut segments = parsed.path_segments()?;
                match segments.next()? {
                    "embed" | "v" | "shorts" | "live" => segments.next().map(str::to_string),
                    _ => None,
                }
            })
    } else {
        None
    };

    candidate.filter(|id| {
        id.len() == 11
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_x_to_twitter() {
        assert_eq!(
            normalize_url("https://x.com/user/status/123").unwrap(),
            "https://twitter.com/user/status/123"
        );
        assert_eq!(
            normalize_url("  https://mobile.x.com/user/status/123?s=20 ").unwrap(),
            "https://mobile.twitter.com/user/status/123?s=20"
        );
        assert_eq!(
            normalize_url("https://X.com/user/status/9").unwrap(),
            "https://twitter.com/user/status/9"
        );
    }

    #[test]
    fn test_normalize_leaves_lookalikes() {
        assert_eq!(
            normalize_url("https://netflix.com/title/1").unwrap(),
            "https://netflix.com/title/1"
        );
        assert_eq!(
            normalize_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(matches!(normalize_url(""), Err(MediaError::MissingUrl)));
        assert!(matches!(normalize_url("   "), Err(MediaError::MissingUrl)));
        assert!(matches!(
            normalize_url("not a url"),
            Err(MediaError::InvalidUrl(_))
        ));
        assert!(matches!(
            normalize_url("ftp://x.com/file"),
            Err(MediaError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_platform_for_url() {
        assert_eq!(
            platform_for_url("https://www.youtube.com/watch?v=abc"),
            Some(Platform::YouTube)
        );
        assert_eq!(platform_for_url("https://youtu.be/abc"), Some(Platform::YouTube));
        assert_eq!(
            platform_for_url("https://twitter.com/a/status/1"),
            Some(Platform::Twitter)
        );
        assert_eq!(platform_for_url("https://x.com/a/status/1"), Some(Platform::Twitter));
        assert_eq!(
            platform_for_url("https://old.reddit.com/r/videos/comments/1"),
            Some(Platform::Reddit)
        );
        assert_eq!(platform_for_url("https://v.redd.it/xyz"), Some(Platform::Reddit));
        assert_eq!(
            platform_for_url("https://vm.tiktok.com/ZM123/"),
            Some(Platform::TikTok)
        );
        assert_eq!(platform_for_url("https://netflix.com/watch/1"), None);
        assert_eq!(platform_for_url("https://vimeo.com/1"), None);
    }

    #[test]
    fn test_platform_for_extractor() {
        assert_eq!(platform_for_extractor("Youtube"), Some(Platform::YouTube));
        assert_eq!(platform_for_extractor("youtube:tab"), Some(Platform::YouTube));
        assert_eq!(platform_for_extractor("TikTok"), Some(Platform::TikTok));
        assert_eq!(platform_for_extractor("twitter:broadcast"), Some(Platform::Twitter));
        assert_eq!(platform_for_extractor("Reddit"), Some(Platform::Reddit));
        assert_eq!(platform_for_extractor("Vimeo"), None);
    }

    #[test]
    fn test_detect_platform_order() {
        // Extractor name takes precedence over the page URL.
        assert_eq!(
            detect_platform(Some("TikTok"), Some("https://www.youtube.com/watch?v=a")),
            Platform::TikTok
        );
        assert_eq!(
            detect_platform(Some("generic"), Some("https://v.redd.it/abc")),
            Platform::Reddit
        );
        assert_eq!(detect_platform(None, None), Platform::Other);
        assert_eq!(
            detect_platform(Some("Vimeo"), Some("https://vimeo.com/1")),
            Platform::Other
        );
    }

    #[test]
    fn test_youtube_video_id() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(youtube_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(youtube_video_id("https://vimeo.com/dQw4w9WgXcQ"), None);
    }
}
