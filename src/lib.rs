pub mod config;
pub mod error;
pub mod output;
pub mod page;
pub mod quota;
pub mod server;
pub mod session;
pub mod summarize;
pub mod youtube;

pub use error::{Error, Result};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

const VIDEO_ID_MARKER: &str = "v=";

/// Extract the video ID from a pasted URL.
///
/// Returns everything after the last `v=`. Input without the marker comes
/// back unchanged and will fail once it reaches the transcript service.
pub fn extract_video_id(url: &str) -> &str {
    match url.rfind(VIDEO_ID_MARKER) {
        Some(pos) => &url[pos + VIDEO_ID_MARKER.len()..],
        None => url,
    }
}

/// Thumbnail image for a video. The image host is never contacted here.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_url_keeps_trailing_params() {
        // everything after the marker is the identifier
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            "dQw4w9WgXcQ&t=120"
        );
    }

    #[test]
    fn test_last_marker_wins() {
        assert_eq!(extract_video_id("https://example.com/?v=first&v=second"), "second");
    }

    #[test]
    fn test_no_marker_returns_input() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(extract_video_id("not-a-valid-id"), "not-a-valid-id");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), "");
    }

    #[test]
    fn test_marker_at_end() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), "");
    }

    #[test]
    fn test_no_whitespace_trimming() {
        assert_eq!(extract_video_id("  v=abc  "), "abc  ");
    }

    #[test]
    fn test_thumbnail_url() {
        assert_eq!(
            thumbnail_url("dQw4w9WgXcQ"),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
    }

    #[test]
    fn test_thumbnail_url_is_deterministic() {
        assert_eq!(thumbnail_url("abc"), thumbnail_url("abc"));
        assert_ne!(thumbnail_url("abc"), thumbnail_url("abd"));
    }
}
