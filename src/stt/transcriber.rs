use crate::error::{CallscribeError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Trait for batch speech-to-text transcription.
///
/// This trait allows swapping implementations (real remote API vs mock).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a complete WAV-encoded utterance.
    ///
    /// # Returns
    /// * `Ok(Some(text))` - trimmed, non-empty transcript
    /// * `Ok(None)` - the service returned empty or whitespace-only text;
    ///   nothing was said, but nothing broke
    /// * `Err(_)` - transport or HTTP failure
    async fn transcribe(&self, wav: &[u8]) -> Result<Option<String>>;

    /// Get the model identifier this transcriber sends requests for.
    fn model_name(&self) -> &str;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
#[async_trait]
impl<T: Transcriber> Transcriber for Arc<T> {
    async fn transcribe(&self, wav: &[u8]) -> Result<Option<String>> {
        (**self).transcribe(wav).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Scripted outcome for [`MockTranscriber`].
#[derive(Debug, Clone)]
enum MockOutcome {
    Text(String),
    Empty,
    Fail { status: u16, body: String },
}

/// Mock transcriber for testing.
///
/// Records every request so tests can assert on dispatch counts and on the
/// exact WAV bytes an utterance produced.
pub struct MockTranscriber {
    model_name: String,
    outcome: MockOutcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_wav: Mutex<Option<Vec<u8>>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            outcome: MockOutcome::Text("mock transcription".to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_wav: Mutex::new(None),
        }
    }

    /// Configure the mock to return a specific transcript.
    pub fn with_response(mut self, response: &str) -> Self {
        self.outcome = MockOutcome::Text(response.to_string());
        self
    }

    /// Configure the mock to return empty text (an absent transcript).
    pub fn with_empty_response(mut self) -> Self {
        self.outcome = MockOutcome::Empty;
        self
    }

    /// Configure the mock to fail with an API error.
    pub fn with_failure(mut self, status: u16, body: &str) -> Self {
        self.outcome = MockOutcome::Fail {
            status,
            body: body.to_string(),
        };
        self
    }

    /// Configure the mock to take this long before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of transcription requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The WAV bytes of the most recent request, if any.
    pub fn last_wav(&self) -> Option<Vec<u8>> {
        self.last_wav.lock().clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, wav: &[u8]) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_wav.lock() = Some(wav.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            MockOutcome::Text(text) => Ok(Some(text.clone())),
            MockOutcome::Empty => Ok(None),
            MockOutcome::Fail { status, body } => Err(CallscribeError::TranscriptionApi {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transcriber_returns_response() {
        let transcriber = MockTranscriber::new("test-model").with_response("Hello, this is a test");

        let result = transcriber.transcribe(&[0u8; 100]).await.unwrap();
        assert_eq!(result.as_deref(), Some("Hello, this is a test"));
    }

    #[tokio::test]
    async fn test_mock_transcriber_empty_response_is_none() {
        let transcriber = MockTranscriber::new("test-model").with_empty_response();

        let result = transcriber.transcribe(&[0u8; 100]).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure(500, "server exploded");

        let result = transcriber.transcribe(&[0u8; 100]).await;
        match result {
            Err(CallscribeError::TranscriptionApi { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "server exploded");
            }
            other => panic!("Expected TranscriptionApi error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_mock_transcriber_counts_calls_and_captures_wav() {
        let transcriber = MockTranscriber::new("test-model");
        assert_eq!(transcriber.calls(), 0);
        assert_eq!(transcriber.last_wav(), None);

        transcriber.transcribe(&[1u8, 2, 3]).await.unwrap();
        transcriber.transcribe(&[4u8, 5]).await.unwrap();

        assert_eq!(transcriber.calls(), 2);
        assert_eq!(transcriber.last_wav(), Some(vec![4u8, 5]));
    }

    #[test]
    fn test_mock_transcriber_model_name() {
        let transcriber = MockTranscriber::new("whisper-large-v3-turbo");
        assert_eq!(transcriber.model_name(), "whisper-large-v3-turbo");
    }

    #[tokio::test]
    async fn test_transcriber_trait_is_object_safe() {
        // Verify that we can use Arc<dyn Transcriber>.
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.model_name(), "test-model");
        let result = transcriber.transcribe(&[0u8; 10]).await.unwrap();
        assert_eq!(result.as_deref(), Some("boxed test"));
    }

    #[tokio::test]
    async fn test_mock_transcriber_builder_pattern() {
        let transcriber = MockTranscriber::new("model")
            .with_response("first response")
            .with_response("second response");

        let result = transcriber.transcribe(&[0u8; 10]).await.unwrap();
        assert_eq!(result.as_deref(), Some("second response"));
    }
}
