use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").unwrap()
});

/// Extracts the 11-character video id from the usual YouTube URL shapes
pub fn youtube_video_id(url: &str) -> Option<String> {
    let caps = YOUTUBE_ID.captures(url.trim())?;
    let id = caps.get(2)?.as_str();
    (id.len() == 11).then(|| id.to_string())
}
