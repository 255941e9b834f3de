//! Speech service clients and audio storage for parlance.
//!
//! This crate owns the HTTP clients for the external speech collaborators
//! (transcription and synthesis) and the filesystem-backed media store that
//! holds per-turn audio blobs. Orchestration of a full voice turn lives in
//! `parlance-agent`; this crate only knows how to talk to one service at a
//! time.

pub mod config;
pub mod error;
pub mod media;
pub mod stt;
pub mod tts;

pub use config::SpeechConfig;
pub use error::VoiceError;
pub use media::MediaStore;
pub use stt::SttService;
pub use tts::TtsService;
