use crate::config::SpeechConfig;
use crate::error::VoiceError;
use serde_json::json;
use std::time::Duration;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion
/// from oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// HTTP client for the speech-synthesis collaborator.
///
/// Sends `{"input", "language", "voice", "format": "mp3"}` and receives the
/// MP3 bytes directly in the response body.
#[derive(Debug, Clone)]
pub struct TtsService {
    client: reqwest::Client,
    url: String,
    api_key: String,
    voice: String,
    fallback_language: String,
}

impl TtsService {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if config.tts_url.is_empty() {
            return Err(VoiceError::Config("tts_url is not configured".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build TTS client: {e}")))?;

        Ok(Self {
            client,
            url: config.tts_url.clone(),
            api_key: config.api_key.clone(),
            voice: config.voice.clone(),
            fallback_language: config.language.clone(),
        })
    }

    /// The language used when the caller has none (reply carried no tag).
    pub fn fallback_language(&self) -> &str {
        &self.fallback_language
    }

    /// Synthesizes speech for `text` in the given language (BCP-47 code).
    /// Returns MP3 bytes.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, VoiceError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let body = json!({
            "input": text,
            "language": language,
            "voice": self.voice,
            "format": "mp3",
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::from_reqwest("TTS", e, VoiceError::Tts))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "synthesis service returned {status}: {detail}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Tts(format!("failed to read synthesis response: {e}")))?;

        Ok(audio.to_vec())
    }
}
