use crate::config::SpeechConfig;
use crate::error::VoiceError;
use serde::Deserialize;
use std::time::Duration;

/// Maximum audio input size for STT (10 MiB). Prevents OOM from oversized
/// payloads.
const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// HTTP client for the transcription collaborator.
///
/// Speaks the common multipart transcription contract: a `file` part with
/// the audio bytes plus a `language` hint, answered with `{"text": ...}`.
#[derive(Debug, Clone)]
pub struct SttService {
    client: reqwest::Client,
    url: String,
    api_key: String,
    language: String,
}

impl SttService {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if config.stt_url.is_empty() {
            return Err(VoiceError::Config("stt_url is not configured".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build STT client: {e}")))?;

        Ok(Self {
            client,
            url: config.stt_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// Transcribes one audio snippet. Returns the trimmed transcription,
    /// which may be empty when the collaborator heard nothing.
    pub async fn transcribe(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        if audio_data.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio_data.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        let file_part = reqwest::multipart::Part::bytes(audio_data.to_vec())
            .file_name("snippet.webm")
            .mime_str("application/octet-stream")
            .map_err(|e| VoiceError::Stt(format!("invalid multipart payload: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("language", self.language.clone());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::from_reqwest("STT", e, VoiceError::Stt))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!(
                "transcription service returned {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("malformed transcription response: {e}")))?;

        Ok(parsed.text.trim().to_string())
    }
}
