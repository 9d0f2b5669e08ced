use super::types::Platform;
use crate::config::EngineConfig;

const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";

/// Engine settings for one call, derived from the static engine config and
/// the target platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorProfile {
    pub platform: Platform,
    pub socket_timeout_secs: u64,
    pub retries: u32,
    pub extractor_retries: u32,
    pub fragment_retries: u32,
    pub headers: Vec<(String, String)>,
    /// Values for `--extractor-args`, e.g. `youtube:player_client=default`
    pub extractor_args: Vec<String>,
}

impl ExtractorProfile {
    pub fn for_platform(platform: Platform, engine: &EngineConfig) -> Self {
        let mut headers = vec![
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                    .to_string(),
            ),
            ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
        ];

        let user_agent = match platform {
            Platform::TikTok => MOBILE_USER_AGENT,
            _ => DESKTOP_USER_AGENT,
        };
        headers.insert(0, ("User-Agent".to_string(), user_agent.to_string()));

        let referer = match platform {
            Platform::Twitter => Some("https://twitter.com/"),
            Platform::TikTok => Some("https://www.tiktok.com/"),
            Platform::Reddit => Some("https://www.reddit.com/"),
            Platform::YouTube | Platform::Other => None,
        };
        if let Some(referer) = referer {
            headers.push(("Referer".to_string(), referer.to_string()));
        }

        let extractor_args = match platform {
            Platform::YouTube => vec!["youtube:player_client=default".to_string()],
            Platform::Twitter => vec!["twitter:api=graphql".to_string()],
            _ => Vec::new(),
        };

        let extractor_retries = match platform {
            Platform::TikTok => engine.extractor_retries.max(5),
            _ => engine.extractor_retries,
        };

        Self {
            platform,
            socket_timeout_secs: engine.socket_timeout_secs,
            retries: engine.retries,
            extractor_retries,
            fragment_retries: engine.fragment_retries,
            headers,
            extractor_args,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
