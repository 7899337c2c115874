use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("transcript unavailable for video {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("summary generation failed: {0}")]
    GenerationFailure(String),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::GenerationFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
