//! Reshapes raw yt-dlp JSON into [`VideoInfo`].
//!
//! Extractors disagree on where they put things: thumbnails may be a single
//! field or a ranked list, uploaders go by several names, and formats may live
//! in `formats`, `requested_formats` or on the top-level object itself. This
//! module is the single place those shapes are reconciled.

use super::{
    error::MediaError,
    platform::{detect_platform, youtube_video_id},
    types::{MediaFormat, Platform, VideoInfo},
};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

pub const CONTAINER_WHITELIST: &[&str] = &["mp4", "webm"];

const TITLE_KEYS: &[&str] = &["title", "fulltitle"];
const THUMBNAIL_KEYS: &[&str] = &["thumbnail", "thumbnail_url"];
const UPLOADER_KEYS: &[&str] = &["uploader", "channel", "creator", "uploader_id"];
const EXTRACTOR_KEYS: &[&str] = &["extractor_key", "extractor"];
const PAGE_URL_KEYS: &[&str] = &["webpage_url", "original_url"];
const FORMAT_LISTS: &[&str] = &["requested_formats", "formats"];

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value[*key].as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
}

fn as_u32(value: &Value) -> Option<u32> {
    as_u64(value).and_then(|n| u32::try_from(n).ok())
}

fn has_own_formats(value: &Value) -> bool {
    FORMAT_LISTS.iter().any(|key| value[*key].is_array()) || value["url"].is_string()
}

/// Playlist results are reduced to their first real entry.
fn primary_entry(raw: &Value) -> Option<&Value> {
    if !raw.is_object() || raw.as_object().is_some_and(|o| o.is_empty()) {
        return None;
    }

    match raw["entries"].as_array() {
        Some(entries) if !has_own_formats(raw) => entries.iter().find(|e| e.is_object()),
        _ => Some(raw),
    }
}

fn thumbnail(entry: &Value) -> Option<String> {
    first_str(entry, THUMBNAIL_KEYS).or_else(|| {
        entry["thumbnails"]
            .as_array()?
            .iter()
            .rev()
            .find_map(|t| t["url"].as_str())
            .map(str::to_string)
    })
}

pub fn resolution_label(
    existing: Option<&str>,
    width: Option<u32>,
    height: Option<u32>,
) -> Option<String> {
    if let Some(existing) = existing.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(existing.to_string());
    }

    match (width, height) {
        (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
        (None, Some(h)) => Some(format!("{}p", h)),
        _ => None,
    }
}

/// Parses one format object. Returns `None` for anything outside the
/// container whitelist or without a height.
fn parse_format(value: &Value) -> Option<MediaFormat> {
    let ext = value["ext"].as_str()?.to_ascii_lowercase();
    if !CONTAINER_WHITELIST.contains(&ext.as_str()) {
        return None;
    }

    let height = as_u32(&value["height"]).filter(|h| *h > 0)?;
    let width = as_u32(&value["width"]).filter(|w| *w > 0);

    let format_id = value["format_id"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}p-{}", height, ext));

    Some(MediaFormat {
        format_id,
        resolution: resolution_label(value["resolution"].as_str(), width, Some(height)),
        filesize: as_u64(&value["filesize"]).or_else(|| as_u64(&value["filesize_approx"])),
        url: value["url"].as_str().map(str::to_string),
        width,
        height: Some(height),
        vcodec: value["vcodec"].as_str().map(str::to_string),
        acodec: value["acodec"].as_str().map(str::to_string),
        ext,
    })
}

/// Descending by pixel area, then width, then height. Stable.
pub fn sort_formats(formats: &mut [MediaFormat]) {
    formats.sort_by(|a, b| {
        b.pixel_area()
            .cmp(&a.pixel_area())
            .then_with(|| b.width.cmp(&a.width))
            .then_with(|| b.height.cmp(&a.height))
    });
}

/// Merges every candidate format list, drops duplicates and unsupported
/// containers, and sorts the remainder.
pub fn collect_formats(entry: &Value) -> Vec<MediaFormat> {
    let mut seen = HashSet::new();
    let mut formats = Vec::new();

    let listed = FORMAT_LISTS
        .iter()
        .filter_map(|key| entry[*key].as_array())
        .flatten();
    let top_level = entry["url"].is_string().then_some(entry);

    for candidate in listed.chain(top_level) {
        let dedup_key = candidate["format_id"]
            .as_str()
            .or_else(|| candidate["url"].as_str())
            .map(str::to_string);
        if let Some(key) = &dedup_key {
            if seen.contains(key) {
                continue;
            }
        }

        if let Some(format) = parse_format(candidate) {
            if let Some(key) = dedup_key {
                seen.insert(key);
            }
            formats.push(format);
        }
    }

    sort_formats(&mut formats);
    formats
}

/// Builds the response model from one engine result.
pub fn build_video_info(raw: &Value, requested_url: &str) -> Result<VideoInfo, MediaError> {
    let entry = primary_entry(raw).ok_or(MediaError::EmptyResult)?;

    let extractor = first_str(entry, EXTRACTOR_KEYS);
    let webpage_url =
        first_str(entry, PAGE_URL_KEYS).unwrap_or_else(|| requested_url.to_string());
    let platform = detect_platform(extractor.as_deref(), Some(&webpage_url));
    let id = first_str(entry, &["id"]);

    let thumbnail = thumbnail(entry).or_else(|| {
        if platform != Platform::YouTube {
            return None;
        }
        id.clone()
            .filter(|id| id.len() == 11)
            .or_else(|| youtube_video_id(&webpage_url))
            .map(|id| format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", id))
    });

    let formats = collect_formats(entry);
    debug!(
        "Normalized {} formats for {} ({})",
        formats.len(),
        webpage_url,
        platform
    );

    Ok(VideoInfo {
        title: first_str(entry, TITLE_KEYS).unwrap_or_else(|| "No title available".to_string()),
        thumbnail,
        duration: entry["duration"].as_f64().map(|d| d as u64),
        uploader: first_str(entry, UPLOADER_KEYS),
        webpage_url,
        platform,
        extractor,
        upload_date: first_str(entry, &["upload_date"]),
        view_count: as_u64(&entry["view_count"]),
        description: first_str(entry, &["description"]),
        id,
        formats,
    })
}
