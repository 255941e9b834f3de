//! Shared domain types for the Parlance platform.
//!
//! This crate provides the foundational types used across all Parlance
//! crates: conversation turns, conversation records, participant
//! identifiers, and guest-id helpers.
//!
//! No crate in the workspace depends on anything *except* `parlance-types`
//! for cross-cutting type definitions. This keeps the dependency graph
//! clean and prevents circular dependencies.
//!
//! Wire-format note: the JSON field names (`Prompt`, `PromptsAndAnswers`,
//! `ConversationId`, ...) are preserved from the original client contract so
//! existing frontends keep working against this server.

use serde::{Deserialize, Serialize};

/// Prefix for session-scoped guest identifiers (`Guest-1`, `Guest-2`, ...).
pub const GUEST_ID_PREFIX: &str = "Guest-";

/// One logged prompt/answer pair within a conversation.
///
/// A listen-only turn carries an empty `answer_text` and
/// `answer_audio_url`; an answered turn carries all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// What the speaker said (the transcribed segment).
    #[serde(rename = "Prompt")]
    pub prompt_text: String,
    /// The assistant reply, or empty for listen-only turns.
    #[serde(rename = "Answer")]
    pub answer_text: String,
    /// Public URL of the prompt audio blob.
    #[serde(rename = "PromptAudioURL")]
    pub prompt_audio_url: String,
    /// Public URL of the answer audio blob, or empty for listen-only turns.
    #[serde(rename = "AnswerAudioURL")]
    pub answer_audio_url: String,
}

impl Turn {
    /// Returns `true` if this turn may be persisted.
    ///
    /// Turns with an empty or whitespace-only prompt are never stored.
    pub fn is_persistable(&self) -> bool {
        !self.prompt_text.trim().is_empty()
    }
}

/// Whether a conversation belongs to a single owner or a participant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// Owned by one user id (or a guest id); keyed by owner.
    Single,
    /// Shared by two or more users; keyed by the exact participant set.
    Multi,
}

impl ConversationKind {
    /// Returns the string stored in the `conversations.kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }

    /// Parses the stored column value back into a kind.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Self::Single),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }
}

/// A conversation record: an append-only sequence of turns plus lifecycle
/// metadata. At most one conversation per owner (single) or per exact
/// participant set (multi) may have `ended = false` at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "ConversationId")]
    pub id: String,
    #[serde(skip)]
    pub kind: ConversationKind,
    /// Owner for single-user conversations; `None` for multi-user.
    #[serde(rename = "UserId", skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,
    /// Participant ids for multi-user conversations; empty for single-user.
    #[serde(rename = "Users", skip_serializing_if = "Vec::is_empty", default)]
    pub participants: Vec<String>,
    #[serde(rename = "PromptsAndAnswers")]
    pub turns: Vec<Turn>,
    #[serde(rename = "Date")]
    pub started_at: String,
    #[serde(rename = "Ended")]
    pub ended: bool,
    #[serde(rename = "EndedAt")]
    pub ended_at: Option<String>,
}

impl Default for ConversationKind {
    fn default() -> Self {
        Self::Single
    }
}

/// A caller-supplied participant identifier, classified once at the
/// boundary instead of shape-sniffed repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participant {
    /// A raw user id (or guest id) passed through unchanged.
    RawId(String),
    /// An email address that must be resolved against the user index.
    Email(String),
}

impl Participant {
    /// Returns the underlying identifier string.
    pub fn value(&self) -> &str {
        match self {
            Self::RawId(v) | Self::Email(v) => v,
        }
    }
}

/// A pair of audio blob URLs extracted from a stored turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRefs {
    #[serde(rename = "promptAudioURL")]
    pub prompt_audio_url: String,
    #[serde(rename = "answerAudioURL")]
    pub answer_audio_url: String,
}

/// Formats a guest number as its external identifier (`Guest-<n>`).
pub fn guest_id(n: u64) -> String {
    format!("{GUEST_ID_PREFIX}{n}")
}

/// Parses `Guest-<n>` back into its number. Returns `None` for anything
/// that is not exactly a guest id.
pub fn parse_guest_number(id: &str) -> Option<u64> {
    id.strip_prefix(GUEST_ID_PREFIX)?.parse().ok()
}
