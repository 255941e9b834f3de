use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("media storage error: {0}")]
    Storage(String),

    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VoiceError {
    /// Wraps a `reqwest` failure, separating timeouts from other transport
    /// errors so the HTTP layer can report them distinctly.
    pub(crate) fn from_reqwest(
        service: &'static str,
        err: reqwest::Error,
        wrap: fn(String) -> Self,
    ) -> Self {
        if err.is_timeout() {
            Self::Timeout { service }
        } else {
            wrap(err.to_string())
        }
    }
}
