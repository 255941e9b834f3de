//! Request-level brains of the Parlance platform.
//!
//! Ties the storage layer and the speech collaborators together: wake-phrase
//! segmentation, participant identity resolution, chat completion, the
//! per-request turn orchestrator, and the conversation-analysis aggregator.

pub mod analysis;
pub mod chat;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod wake;

pub use analysis::{analyze, combine_conversations, TextAnalysis, NO_DATA};
pub use chat::{ChatClient, ChatConfig};
pub use error::AgentError;
pub use identity::{classify_participant, resolve_participants};
pub use orchestrator::TurnOrchestrator;
pub use wake::{Segmentation, WakePhraseSegmenter, END_COMMAND};
