use async_trait::async_trait;
use log::debug;

use crate::config::{API_KEY_ENV, ConfigError};
use crate::{Error, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Instructions placed in front of every transcript. The response layout is
/// relied upon by readers of the summaries; keep it verbatim.
pub const INPUT_PROMPT: &str = r#"
You are an expert video transcriber. Given the transcript of a YouTube video, provide a concise and informative summary of the video in approximately 250 words.
Export the response in the following format:

**Video Topic:**
[Insert video topic here]

**Detailed Summary:**
[Insert detailed summary here]

**Key Points:**
1. [Key point 1]
2. [Key point 2]
3. [Key point 3]
"#;

/// Maps a prompt to generated text
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Prompt first, then the transcript, with no separator
pub fn build_prompt(prompt: &str, transcript_text: &str) -> String {
    format!("{prompt}{transcript_text}")
}

/// Summarize a transcript with the given instructional prompt
pub async fn get_response(generator: &dyn Generator, transcript_text: &str, prompt: &str) -> Result<String> {
    generator.generate(&build_prompt(prompt, transcript_text)).await
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            model: model.into(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ConfigError::MissingApiKey {
            env_var: API_KEY_ENV.to_string(),
        })?;

        let url = self.endpoint();
        debug!("Summarizing via Gemini: {url} ({} prompt chars)", prompt.len());

        let body = serde_json::json!({
            "contents": [
                {
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::GenerationFailure(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::GenerationFailure(format!("Gemini API returned {status}: {body}")));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::GenerationFailure(format!("invalid response body: {e}")))?;
        extract_gemini_text(&json)
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text")?.as_str())
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    if let Some(reason) = json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(Error::GenerationFailure(format!("prompt blocked by Gemini: {reason}")));
    }
    Err(Error::GenerationFailure("unexpected Gemini API response format".to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::extract::{Query, State};
    use axum::http::{StatusCode, Uri};
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for Recording {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            Ok("summary".to_string())
        }
    }

    #[test]
    fn test_build_prompt_has_no_separator() {
        assert_eq!(build_prompt("P:", "T"), "P:T");
    }

    #[tokio::test]
    async fn test_get_response_sends_prompt_then_transcript() {
        let generator = Recording::default();
        let out = get_response(&generator, "T", "P:").await.unwrap();
        assert_eq!(out, "summary");
        assert_eq!(*generator.prompts.lock(), vec!["P:T".to_string()]);
    }

    #[test]
    fn test_input_prompt_template() {
        assert!(INPUT_PROMPT.starts_with("\nYou are an expert video transcriber."));
        assert!(INPUT_PROMPT.contains(
            "**Video Topic:**\n[Insert video topic here]\n\n**Detailed Summary:**\n[Insert detailed summary here]\n\n**Key Points:**\n1. [Key point 1]\n2. [Key point 2]\n3. [Key point 3]\n"
        ));
        assert!(INPUT_PROMPT.ends_with("3. [Key point 3]\n"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_generation_failure() {
        let client = GeminiClient::new(reqwest::Client::new(), "gemini-1.5-flash-002", None);
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailure(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(reqwest::Client::new(), "gemini-1.5-flash-002", None)
            .with_base_url("http://localhost:1234/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-1.5-flash-002:generateContent"
        );
    }

    #[test]
    fn test_extract_gemini_text() {
        let json = serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "**Video Topic:**\n" }, { "text": "Rust" }]
                    }
                }
            ]
        });
        assert_eq!(extract_gemini_text(&json).unwrap(), "**Video Topic:**\nRust");
    }

    #[test]
    fn test_extract_gemini_text_empty() {
        let json = serde_json::json!({ "candidates": [] });
        assert!(matches!(extract_gemini_text(&json), Err(Error::GenerationFailure(_))));
    }

    #[test]
    fn test_extract_gemini_text_blocked_prompt() {
        let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = extract_gemini_text(&json).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    /// What the local Gemini stand-in saw: path, query and JSON body
    type Captured = Arc<Mutex<Option<(String, HashMap<String, String>, Value)>>>;

    async fn capture(
        State(captured): State<Captured>,
        uri: Uri,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        *captured.lock() = Some((uri.path().to_string(), query, body));
        Json(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "**Video Topic:**\n" }, { "text": "Rust" }] } }
            ]
        }))
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn local_client(base_url: &str) -> GeminiClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GeminiClient::new(http, "gemini-1.5-flash-002", Some("secret".to_string())).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_gemini_request_shape() {
        let captured = Captured::default();
        let base_url = serve(Router::new().fallback(capture).with_state(captured.clone())).await;
        let client = local_client(&base_url);

        let out = get_response(&client, "T", "P:").await.unwrap();
        assert_eq!(out, "**Video Topic:**\nRust");

        let (path, query, body) = captured.lock().take().unwrap();
        assert_eq!(path, "/v1beta/models/gemini-1.5-flash-002:generateContent");
        assert_eq!(query.get("key").map(String::as_str), Some("secret"));
        assert_eq!(query.len(), 1);
        assert_eq!(body, json!({ "contents": [{ "parts": [{ "text": "P:T" }] }] }));
    }

    #[tokio::test]
    async fn test_gemini_server_error_is_generation_failure() {
        let app = Router::new().fallback(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") });
        let client = local_client(&serve(app).await);

        let message = match client.generate("prompt").await {
            Err(Error::GenerationFailure(message)) => message,
            other => panic!("expected GenerationFailure, got {other:?}"),
        };
        assert!(message.contains("500"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn test_gemini_blocked_prompt_is_generation_failure() {
        let app = Router::new().fallback(|| async {
            Json(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
        });
        let client = local_client(&serve(app).await);

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailure(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_gemini_empty_candidate_is_generation_failure() {
        let app = Router::new().fallback(|| async {
            Json(json!({ "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }] }))
        });
        let client = local_client(&serve(app).await);

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailure(_)));
    }
}
