//! Per-request turn orchestration.
//!
//! One `handle_audio` call is one turn of the state machine:
//! transcribe the snippet, resolve the conversation target, split the text
//! around the wake phrase, persist the logged segment, and — when the wake
//! phrase asked for it — generate, speak, and persist an answer.
//!
//! Writes for the same conversation target are serialized through a
//! per-target async mutex, so two concurrent snippets from the same user
//! (or the same multi-user set) cannot both create a conversation or
//! interleave their find-and-append sequences.

use crate::chat::ChatClient;
use crate::error::AgentError;
use crate::identity::resolve_participants;
use crate::wake::WakePhraseSegmenter;
use parlance_db::{DbPool, StoreError};
use parlance_types::Turn;
use parlance_voice::{MediaStore, SttService, TtsService};
use regex::Regex;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;

/// Spoken when the user ends a conversation.
const END_ACKNOWLEDGEMENT: &str = "The conversation has ended. Goodbye!";

/// The conversation a snippet belongs to, decided before any store write.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Single(String),
    Multi(Vec<String>),
}

impl Target {
    /// Stable key for write serialization. Multi-user keys sort the ids so
    /// the same participant set always maps to the same lock regardless of
    /// the order the caller listed them in.
    fn lock_key(&self) -> String {
        match self {
            Target::Single(id) => format!("single:{id}"),
            Target::Multi(ids) => {
                let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                format!("multi:{}", sorted.join(","))
            }
        }
    }
}

pub struct TurnOrchestrator {
    pool: DbPool,
    stt: SttService,
    tts: TtsService,
    chat: ChatClient,
    media: MediaStore,
    segmenter: WakePhraseSegmenter,
    session_guest_id: OnceCell<String>,
    target_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TurnOrchestrator {
    pub fn new(
        pool: DbPool,
        stt: SttService,
        tts: TtsService,
        chat: ChatClient,
        media: MediaStore,
    ) -> Self {
        Self {
            pool,
            stt,
            tts,
            chat,
            media,
            segmenter: WakePhraseSegmenter::new(),
            session_guest_id: OnceCell::new(),
            target_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The guest identity for this process. Allocated from the store's
    /// guest counter on first use, then reused for the process lifetime so
    /// repeated anonymous snippets land in the same conversation thread.
    pub async fn guest_id(&self) -> Result<String, AgentError> {
        self.session_guest_id
            .get_or_try_init(|| async {
                let id = self.with_conn(parlance_db::next_guest_id).await?;
                tracing::info!(guest_id = %id, "assigned session guest id");
                Ok(id)
            })
            .await
            .cloned()
    }

    /// Processes one audio snippet end to end. Returns the MP3 bytes to
    /// play back, which are empty whenever no answer was produced.
    pub async fn handle_audio(
        &self,
        audio: Vec<u8>,
        raw_participants: Vec<String>,
    ) -> Result<Vec<u8>, AgentError> {
        let transcription = self.stt.transcribe(&audio).await?;
        if transcription.is_empty() {
            tracing::debug!("empty transcription, nothing to do");
            return Ok(Vec::new());
        }
        tracing::debug!(text = %transcription, "transcribed snippet");

        let target = self.resolve_target(raw_participants).await?;

        if WakePhraseSegmenter::is_end_command(&transcription) {
            return self.terminate(&target).await;
        }

        let segmentation = self.segmenter.segment(&transcription);
        if segmentation.logged.is_empty() && !segmentation.should_answer {
            return Ok(Vec::new());
        }

        let lock = self.lock_for(&target);
        let _guard = lock.lock().await;

        let conversation_id = self.open_or_create(&target).await?;
        let (prompt_name, answer_name) = turn_blob_names();
        let prompt_audio_url = self
            .media
            .store(&media_segments(&target, &conversation_id), &prompt_name, &audio)
            .await?;

        if !segmentation.logged.is_empty() {
            let turn = Turn {
                prompt_text: segmentation.logged.clone(),
                answer_text: String::new(),
                prompt_audio_url: prompt_audio_url.clone(),
                answer_audio_url: String::new(),
            };
            let id = conversation_id.clone();
            self.with_conn(move |conn| parlance_db::append_turn(conn, &id, &turn))
                .await?;
        }

        if !segmentation.should_answer {
            return Ok(Vec::new());
        }

        let reply = self.chat.complete(&segmentation.answer).await?;
        let (language, reply_text) = split_language_tag(&reply, self.tts.fallback_language());
        tracing::debug!(language = %language, "synthesizing answer");

        let answer_audio = self.tts.synthesize(&reply_text, &language).await?;
        let answer_audio_url = self
            .media
            .store(
                &media_segments(&target, &conversation_id),
                &answer_name,
                &answer_audio,
            )
            .await?;

        let turn = Turn {
            prompt_text: segmentation.answer.clone(),
            answer_text: reply_text,
            prompt_audio_url,
            answer_audio_url,
        };
        let id = conversation_id.clone();
        self.with_conn(move |conn| parlance_db::append_turn(conn, &id, &turn))
            .await?;

        Ok(answer_audio)
    }

    /// Ends the open conversation for the given participants without going
    /// through audio. Returns the ended conversation id, if one was open.
    pub async fn end_conversation(
        &self,
        raw_participants: Vec<String>,
    ) -> Result<Option<String>, AgentError> {
        let target = self.resolve_target(raw_participants).await?;
        self.end_target(&target).await
    }

    /// Termination via the spoken command: end the conversation and speak
    /// a short acknowledgement. No turn is persisted.
    async fn terminate(&self, target: &Target) -> Result<Vec<u8>, AgentError> {
        self.end_target(target).await?;
        let audio = self
            .tts
            .synthesize(END_ACKNOWLEDGEMENT, self.tts.fallback_language())
            .await?;
        Ok(audio)
    }

    async fn end_target(&self, target: &Target) -> Result<Option<String>, AgentError> {
        let lock = self.lock_for(target);
        let _guard = lock.lock().await;

        let target = target.clone();
        let ended = self
            .with_conn(move |conn| match &target {
                Target::Single(id) => parlance_db::end_single(conn, id),
                Target::Multi(ids) => parlance_db::end_multi(conn, ids),
            })
            .await?;
        if let Some(id) = &ended {
            tracing::info!(conversation_id = %id, "ended conversation");
        }
        Ok(ended)
    }

    /// Zero resolved ids fall back to the session guest id; one id is a
    /// single-user conversation; two or more are a multi-user set.
    async fn resolve_target(&self, raw_participants: Vec<String>) -> Result<Target, AgentError> {
        let ids = self
            .with_conn(move |conn| Ok(resolve_participants(conn, &raw_participants)))
            .await?;
        match ids.len() {
            0 => Ok(Target::Single(self.guest_id().await?)),
            1 => Ok(Target::Single(ids.into_iter().next().expect("one id"))),
            _ => Ok(Target::Multi(ids)),
        }
    }

    async fn open_or_create(&self, target: &Target) -> Result<String, AgentError> {
        let target = target.clone();
        self.with_conn(move |conn| match &target {
            Target::Single(id) => parlance_db::open_or_create_single(conn, id),
            Target::Multi(ids) => parlance_db::open_or_create_multi(conn, ids),
        })
        .await
    }

    fn lock_for(&self, target: &Target) -> Arc<tokio::sync::Mutex<()>> {
        let key = target.lock_key();
        let mut locks = self.target_locks.lock().expect("lock map poisoned");
        locks.entry(key).or_default().clone()
    }

    /// Runs store work on the blocking pool with a pooled connection.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, AgentError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| AgentError::Pool(e.to_string()))?;
            f(&conn).map_err(AgentError::from)
        })
        .await
        .map_err(|e| AgentError::Join(e.to_string()))?;
        result
    }
}

/// Blob names for one snippet's audio. Each snippet gets a fresh id so
/// successive turns in a conversation never overwrite each other's audio.
fn turn_blob_names() -> (String, String) {
    let id = uuid::Uuid::new_v4();
    (format!("{id}-prompt.mp3"), format!("{id}-answer.mp3"))
}

/// Media directory segments for a conversation's audio blobs.
fn media_segments<'a>(target: &'a Target, conversation_id: &'a str) -> Vec<&'a str> {
    match target {
        Target::Single(owner) => vec![owner.as_str(), "conversations", conversation_id],
        Target::Multi(_) => vec!["multiUserConversations", conversation_id],
    }
}

/// Splits an optional `[lang:xx-YY]` tag off the start of a model reply.
/// Returns the language to synthesize in (tag value, or `fallback`) and
/// the reply text with the tag removed.
fn split_language_tag(reply: &str, fallback: &str) -> (String, String) {
    static LANG_TAG: OnceLock<Regex> = OnceLock::new();
    let pattern = LANG_TAG.get_or_init(|| {
        Regex::new(r"^\s*\[lang:([A-Za-z]{2}(?:-[A-Za-z]{2})?)\]\s*").expect("valid pattern")
    });

    match pattern.captures(reply) {
        Some(caps) => {
            let language = caps.get(1).expect("capture group").as_str().to_string();
            let rest = reply[caps.get(0).expect("whole match").end()..]
                .trim()
                .to_string();
            (language, rest)
        }
        None => (fallback.to_string(), reply.trim().to_string()),
    }
}
