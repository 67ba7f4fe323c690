//! Remote transcription client for OpenAI-compatible speech endpoints.
//!
//! Sends one multipart request per utterance to `{base_url}/audio/transcriptions`
//! with the WAV bytes as a file part. Single attempt, no retry: delivery to the
//! service is at most once per utterance.

use crate::config::SttConfig;
use crate::error::{CallscribeError, Result};
use crate::stt::transcriber::Transcriber;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Response body of a successful `response_format=json` transcription request.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Transcriber backed by a remote OpenAI-compatible `/audio/transcriptions` API.
pub struct RemoteTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl RemoteTranscriber {
    /// Create a client from configuration.
    ///
    /// Fails immediately if no API key resolves; a session must never discover
    /// a missing credential at its first flush.
    pub fn new(config: &SttConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or(CallscribeError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

/// Trim the service's text field; whitespace-only output counts as no transcript.
fn normalize(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[async_trait]
impl Transcriber for RemoteTranscriber {
    async fn transcribe(&self, wav: &[u8]) -> Result<Option<String>> {
        let part = reqwest::multipart::Part::bytes(wav.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);

        debug!(
            model = %self.model,
            wav_bytes = wav.len(),
            "Sending utterance for transcription"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CallscribeError::TranscriptionApi { status, body });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(normalize(parsed.text))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    fn config_with_key() -> SttConfig {
        SttConfig {
            api_key: Some("test-key".to_string()),
            model: defaults::DEFAULT_MODEL.to_string(),
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
        }
    }

    #[test]
    fn test_construction_fails_fast_without_api_key() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap();
        let saved = std::env::var(defaults::API_KEY_ENV).ok();
        // SAFETY: serialized by ENV_LOCK; no concurrent environment access.
        unsafe { std::env::remove_var(defaults::API_KEY_ENV) };

        let config = SttConfig {
            api_key: None,
            ..config_with_key()
        };
        let result = RemoteTranscriber::new(&config);
        assert!(matches!(result, Err(CallscribeError::MissingApiKey)));

        if let Some(val) = saved {
            unsafe { std::env::set_var(defaults::API_KEY_ENV, val) };
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = RemoteTranscriber::new(&config_with_key()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let config = SttConfig {
            base_url: "https://example.com/v1/".to_string(),
            ..config_with_key()
        };
        let client = RemoteTranscriber::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://example.com/v1/audio/transcriptions");
    }

    #[test]
    fn test_model_name_comes_from_config() {
        let client = RemoteTranscriber::new(&config_with_key()).unwrap();
        assert_eq!(client.model_name(), "whisper-large-v3-turbo");
    }

    #[test]
    fn test_response_parsing_with_text() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "  hello world  "}"#).unwrap();
        assert_eq!(normalize(parsed.text).as_deref(), Some("hello world"));
    }

    #[test]
    fn test_response_parsing_without_text_field() {
        let parsed: TranscriptionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(normalize(parsed.text), None);
    }

    #[test]
    fn test_whitespace_only_text_is_absent_not_error() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "   \n  "}"#).unwrap();
        assert_eq!(normalize(parsed.text), None);
    }

    #[test]
    fn test_response_parsing_ignores_extra_fields() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "ok", "x_groq": {"id": "req_1"}}"#).unwrap();
        assert_eq!(normalize(parsed.text).as_deref(), Some("ok"));
    }
}
