/// Picks the first video-bearing mp4 format id from `--list-formats` output.
///
/// The table looks like:
///
/// ```text
/// [info] Available formats for 7311:
/// ID              EXT RESOLUTION │ FILESIZE  TBR PROTO │ VCODEC
/// ──────────────────────────────────────────────────────────────
/// download        mp4 720x1280   │ 1.98MiB       https │ h264
/// ```
pub fn pick_mp4_format(listing: &str) -> Option<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('['))
        .filter(|line| !line.starts_with("ID ") && !line.starts_with(&['─', '-'][..]))
        .filter(|line| line.contains("mp4") && !line.contains("audio only"))
        .find_map(|line| line.split_whitespace().next().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
[TikTok] Extracting URL: https://www.tiktok.com/@user/video/7311
[TikTok] 7311: Downloading webpage
[info] Available formats for 7311:
ID                           EXT RESOLUTION │   FILESIZE   TBR PROTO │ VCODEC ACODEC
─────────────────────────────────────────────────────────────────────────────────────
audio-0                      m4a audio only │  312.11KiB  128k https │ audio only aac
audio-mp4                    mp4 audio only │  312.11KiB  128k https │ audio only aac
bytevc1_540p_580197-0        mp4 576x1024   │    1.39MiB  580k https │ h265   aac
h264_540p_1054553-0          mp4 576x1024   │    2.53MiB 1054k https │ h264   aac
";

    #[test]
    fn test_picks_first_video_mp4() {
        assert_eq!(
            pick_mp4_format(LISTING).as_deref(),
            Some("bytevc1_540p_580197-0")
        );
    }

    #[test]
    fn test_skips_header_lines() {
        let listing = "[info] Available formats for mp4clip:\nID EXT RESOLUTION mp4\n";
        assert_eq!(pick_mp4_format(listing), None);
    }

    #[test]
    fn test_no_candidates() {
        let listing = "\
ID   EXT  RESOLUTION
a    webm 1280x720
b    m4a  audio only
";
        assert_eq!(pick_mp4_format(listing), None);
        assert_eq!(pick_mp4_format(""), None);
    }
}
