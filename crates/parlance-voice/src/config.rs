use serde::{Deserialize, Serialize};
use std::fmt;

fn default_language() -> String {
    "sv-SE".to_string()
}

fn default_voice() -> String {
    "neutral".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for the speech collaborators (STT and TTS).
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Transcription endpoint (multipart upload, returns `{"text": ...}`).
    #[serde(default)]
    pub stt_url: String,
    /// Synthesis endpoint (JSON request, returns MP3 bytes).
    #[serde(default)]
    pub tts_url: String,
    /// Bearer token sent to both endpoints.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// BCP-47 code used as the transcription hint and the synthesis
    /// fallback when a reply carries no language tag. Default: `sv-SE`.
    #[serde(default = "default_language")]
    pub language: String,
    /// Synthesis voice name. Default: `neutral`.
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Per-request timeout in seconds for both services. Default: 30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_url: String::new(),
            tts_url: String::new(),
            api_key: String::new(),
            language: default_language(),
            voice: default_voice(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("stt_url", &self.stt_url)
            .field("tts_url", &self.tts_url)
            .field("api_key", &"[REDACTED]")
            .field("language", &self.language)
            .field("voice", &self.voice)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = SpeechConfig {
            api_key: "secret-token".to_string(),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn defaults_from_empty_toml() {
        let config: SpeechConfig = serde_json::from_str(
            r#"{"stt_url": "http://stt", "tts_url": "http://tts", "api_key": ""}"#,
        )
        .unwrap();
        assert_eq!(config.language, "sv-SE");
        assert_eq!(config.timeout_secs, 30);
    }
}
