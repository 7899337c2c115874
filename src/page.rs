use std::sync::Arc;

use log::{debug, warn};

use crate::quota::Admission;
use crate::session::{SessionId, SessionStore};
use crate::summarize::{self, Generator};
use crate::youtube::{self, TranscriptProvider};
use crate::{Result, extract_video_id, thumbnail_url};

/// One interaction with the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub submit: bool,
}

/// Everything the renderer needs to draw the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub url: String,
    pub thumbnail: Option<String>,
    pub submit_disabled: bool,
    pub warning: Option<String>,
    pub response: Option<String>,
    pub error: Option<String>,
}

/// Runs one interaction: thumbnail preview, quota check, then transcript and
/// summary in sequence.
pub struct PageController {
    transcripts: Arc<dyn TranscriptProvider>,
    generator: Arc<dyn Generator>,
    prompt: String,
}

impl PageController {
    pub fn new(transcripts: Arc<dyn TranscriptProvider>, generator: Arc<dyn Generator>) -> Self {
        Self {
            transcripts,
            generator,
            prompt: summarize::INPUT_PROMPT.to_string(),
        }
    }

    #[cfg(test)]
    fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Handle one interaction for `session_id`. The quota is checked and
    /// counted in the store before any external call is made.
    pub async fn handle(&self, sessions: &SessionStore, session_id: SessionId, request: &PageRequest) -> PageView {
        let mut view = PageView {
            url: request.url.clone(),
            ..PageView::default()
        };

        if !request.url.is_empty() {
            let video_id = extract_video_id(&request.url);
            view.thumbnail = Some(thumbnail_url(video_id));

            if request.submit {
                match sessions.try_submit(session_id) {
                    Admission::Rejected => {
                        debug!("Session {session_id} is over its query limit");
                    }
                    Admission::Admitted => {
                        debug!("Session {session_id} submitted {video_id}");
                        match self.summarize(video_id).await {
                            Ok(response) => view.response = Some(response),
                            Err(e) => {
                                warn!("Summary failed for {video_id}: {e}");
                                view.error = Some(format!("An error occurred: {e}"));
                            }
                        }
                    }
                }
            }
        }

        let quota = sessions.quota(session_id);
        view.submit_disabled = quota.submit_disabled();
        if view.submit_disabled {
            view.warning = Some(quota.limit_message());
        }
        view
    }

    async fn summarize(&self, video_id: &str) -> Result<String> {
        let transcript_text = youtube::fetch_transcript(self.transcripts.as_ref(), video_id).await?;
        summarize::get_response(self.generator.as_ref(), &transcript_text, &self.prompt).await
    }
}
