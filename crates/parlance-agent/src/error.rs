use parlance_db::StoreError;
use parlance_voice::VoiceError;
use thiserror::Error;

/// Errors surfaced by turn orchestration and analysis.
///
/// The server boundary maps these onto HTTP statuses: `Store` follows the
/// store taxonomy, `Voice(VoiceError::Timeout)` and `Timeout` become 504,
/// everything else is an opaque 500 with the detail kept in the logs.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("chat completion failed: {0}")]
    Chat(String),

    #[error("chat completion timed out")]
    Timeout,

    #[error("connection pool failure: {0}")]
    Pool(String),

    #[error("blocking task failed: {0}")]
    Join(String),
}

impl AgentError {
    /// True when the underlying cause was a collaborator timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            AgentError::Timeout | AgentError::Voice(VoiceError::Timeout { .. })
        )
    }
}
