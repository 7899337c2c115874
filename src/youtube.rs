use async_trait::async_trait;
use eyre::{bail, eyre};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::{Error, Result, Segment};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Source of timed transcript segments for a video
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<Segment>>;
}

/// Fetch a transcript and join its segments into one space-separated string,
/// preserving the provider's order.
pub async fn fetch_transcript(provider: &dyn TranscriptProvider, video_id: &str) -> Result<String> {
    let segments = provider.fetch(video_id).await?;
    let text = join_segments(&segments);
    debug!("Transcript for {video_id}: {} segments, {} chars", segments.len(), text.len());
    Ok(text)
}

fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Captions scraped from YouTube via the InnerTube player API
pub struct YouTubeCaptions {
    client: reqwest::Client,
    lang: String,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client, lang: impl Into<String>) -> Self {
        Self {
            client,
            lang: lang.into(),
        }
    }

    async fn fetch_captions(&self, video_id: &str) -> eyre::Result<Vec<Segment>> {
        // The watch page carries the InnerTube key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;

        // Player response lists the caption tracks
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": self.lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        let track = select_track(&tracks, &self.lang).ok_or_else(|| eyre!("captions are disabled for this video"))?;
        debug!("Using caption track: lang={}", track.language_code);

        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_caption_xml(&caption_xml)?;
        if let Some(last) = segments.last() {
            debug!("Parsed {} caption lines covering {:.0}s", segments.len(), last.start + last.duration);
        }
        Ok(segments)
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeCaptions {
    async fn fetch(&self, video_id: &str) -> Result<Vec<Segment>> {
        self.fetch_captions(video_id)
            .await
            .map_err(|e| Error::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Requested language if present, otherwise the first available track
fn select_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    tracks.iter().find(|t| t.language_code == lang).or_else(|| tracks.first())
}

/// The watch page embeds the InnerTube key either as JSON config or as a
/// script assignment.
fn extract_api_key(html: &str) -> eyre::Result<String> {
    if html.contains("g-recaptcha") {
        bail!("YouTube answered with a captcha, too many requests from this address");
    }

    let re = Regex::new(r#"(?:"INNERTUBE_API_KEY"|innertubeApiKey)\s*[=:]\s*"([\w-]+)""#)?;
    re.captures(html)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| eyre!("watch page carries no InnerTube API key"))
}

/// `<transcript>` document of `<text start=".." dur="..">` lines
#[derive(Debug, Deserialize)]
struct CaptionDocument {
    #[serde(rename = "text", default)]
    lines: Vec<CaptionLine>,
}

#[derive(Debug, Deserialize)]
struct CaptionLine {
    #[serde(rename = "@start")]
    start: f64,
    #[serde(rename = "@dur", default)]
    dur: f64,
    #[serde(rename = "$text", default)]
    text: String,
}

/// Caption text arrives HTML-escaped inside the XML escaping, so entities are
/// decoded twice. Lines that end up empty are dropped.
fn parse_caption_xml(xml: &str) -> eyre::Result<Vec<Segment>> {
    let document: CaptionDocument = quick_xml::de::from_str(xml).map_err(|e| eyre!("malformed caption XML: {e}"))?;

    Ok(document
        .lines
        .into_iter()
        .filter_map(|line| {
            let text = html_escape::decode_html_entities(&line.text).trim().to_string();
            (!text.is_empty()).then_some(Segment {
                text,
                start: line.start,
                duration: line.dur,
            })
        })
        .collect())
}
