//! Speech segmentation state machine.
//!
//! Drives voice activity detection over a push-stream of mu-law frames,
//! buffers one utterance at a time, ends it on a silence timeout, and hands
//! the buffered audio to a [`Transcriber`].
//!
//! Two independent event sources feed the machine: synchronous frame arrival
//! ([`SpeechSegmentSession::send_audio`]) and the asynchronous silence timer.
//! The in-flight guard ensures at most one transcription request is
//! outstanding per session, while the utterance buffer is decoupled from the
//! guard so new speech can accumulate during a previous utterance's request.

use crate::audio::{energy, mulaw, wav};
use crate::config::AudioConfig;
use crate::defaults;
use crate::error::{CallscribeError, Result};
use crate::session::event::SessionEvent;
use crate::stt::Transcriber;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Configuration for a speech segmentation session, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub vad_threshold: f32,
    /// Duration of silence before an utterance is considered ended (milliseconds).
    pub silence_duration_ms: u32,
    /// Sample rate of the incoming mu-law stream in Hz.
    pub sample_rate: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            vad_threshold: defaults::VAD_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl From<&AudioConfig> for SessionConfig {
    fn from(audio: &AudioConfig) -> Self {
        Self {
            vad_threshold: audio.vad_threshold,
            silence_duration_ms: audio.silence_duration_ms,
            sample_rate: audio.sample_rate,
        }
    }
}

/// Current state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not speaking: before the first utterance or after a flush.
    Idle,
    /// Speech detected; an utterance is being buffered.
    Speaking,
    /// Terminal. All further input is ignored.
    Closed,
}

/// Mutable session state. Guarded by the session mutex; never locked across
/// an await point.
struct SessionInner {
    state: SessionState,
    /// Raw mu-law frames of the current utterance, in arrival order.
    buffer: Vec<Vec<u8>>,
    /// Running sample count of the buffer (mu-law: one byte per sample).
    buffered_samples: usize,
    /// Pending silence timer task, if any. At most one per session.
    silence_timer: Option<JoinHandle<()>>,
    /// Generation token: a timer fire whose token no longer matches is stale
    /// and must do nothing. Bumped on every cancel.
    timer_token: u64,
    /// True while a transcription request is outstanding.
    transcription_in_flight: bool,
    /// Single-shot listener for the next final transcript.
    waiter: Option<oneshot::Sender<String>>,
}

struct Shared {
    config: SessionConfig,
    min_utterance_samples: usize,
    transcriber: Arc<dyn Transcriber>,
    events: mpsc::UnboundedSender<SessionEvent>,
    inner: Mutex<SessionInner>,
}

/// Streaming speech segmentation session.
///
/// Cheap to clone; clones share the same underlying session.
#[derive(Clone)]
pub struct SpeechSegmentSession {
    shared: Arc<Shared>,
}

impl SpeechSegmentSession {
    /// Create a session and the receiver its events are delivered on.
    ///
    /// Construction is the `connect` bracket of the session lifecycle;
    /// [`close`](Self::close) is the other end.
    pub fn new(
        config: SessionConfig,
        transcriber: Arc<dyn Transcriber>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let min_utterance_samples =
            (config.sample_rate as usize * defaults::MIN_UTTERANCE_MS as usize) / 1000;

        let session = Self {
            shared: Arc::new(Shared {
                config,
                min_utterance_samples,
                transcriber,
                events,
                inner: Mutex::new(SessionInner {
                    state: SessionState::Idle,
                    buffer: Vec::new(),
                    buffered_samples: 0,
                    silence_timer: None,
                    timer_token: 0,
                    transcription_in_flight: false,
                    waiter: None,
                }),
            }),
        };
        (session, events_rx)
    }

    /// Feed one frame of compressed audio into the session.
    ///
    /// Synchronous and non-blocking: safe to call in a tight push loop while
    /// a transcription is in flight. A no-op after [`close`](Self::close).
    ///
    /// Must be called from within a Tokio runtime (the silence timer is
    /// scheduled on it).
    pub fn send_audio(&self, frame: &[u8]) {
        let pcm = mulaw::decode(frame);
        let level = energy::rms(&pcm);

        let mut inner = self.shared.inner.lock();
        match inner.state {
            SessionState::Closed => {}
            _ if level > self.shared.config.vad_threshold => {
                if inner.state == SessionState::Idle {
                    inner.state = SessionState::Speaking;
                    self.emit(SessionEvent::SpeechStart);
                }
                Self::cancel_silence_timer(&mut inner);
                inner.buffer.push(frame.to_vec());
                inner.buffered_samples += frame.len();
            }
            SessionState::Speaking => {
                // Below threshold, but keep buffering through the silence
                // window so the trailing speech tail is not clipped.
                inner.buffer.push(frame.to_vec());
                inner.buffered_samples += frame.len();
                if inner.silence_timer.is_none() {
                    self.start_silence_timer(&mut inner);
                }
            }
            SessionState::Idle => {
                // Silence before any speech is discarded.
            }
        }
    }

    /// Close the session. Idempotent.
    ///
    /// Cancels any pending silence timer and discards buffered audio. An
    /// already-dispatched transcription is not cancelled, but its result is
    /// dropped when it resolves.
    pub fn close(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state == SessionState::Closed {
            return;
        }
        inner.state = SessionState::Closed;
        Self::cancel_silence_timer(&mut inner);
        inner.buffer.clear();
        inner.buffered_samples = 0;
        // Dropping the sender wakes any pending waiter with a closed error.
        inner.waiter = None;
    }

    /// Returns true until the session is closed.
    pub fn is_connected(&self) -> bool {
        self.shared.inner.lock().state != SessionState::Closed
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().state
    }

    /// Wait for the next final transcript, up to `timeout`.
    ///
    /// Single-shot: the listener is detached on timeout, so a transcript
    /// arriving later will not fire a stale callback. A timeout is a distinct
    /// error from a transcription failure.
    pub async fn wait_for_transcript(&self, timeout: Duration) -> Result<String> {
        let receiver = {
            let mut inner = self.shared.inner.lock();
            if inner.state == SessionState::Closed {
                return Err(CallscribeError::SessionClosed);
            }
            let (sender, receiver) = oneshot::channel();
            inner.waiter = Some(sender);
            receiver
        };

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(_)) => Err(CallscribeError::SessionClosed),
            Err(_) => {
                self.shared.inner.lock().waiter = None;
                Err(CallscribeError::TranscriptTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Cancel the pending silence timer, if any. A no-op when the timer is
    /// absent or has already fired.
    fn cancel_silence_timer(inner: &mut SessionInner) {
        inner.timer_token += 1;
        if let Some(handle) = inner.silence_timer.take() {
            handle.abort();
        }
    }

    /// Arm the silence timer. Caller must hold the lock and have verified
    /// that no timer is pending.
    fn start_silence_timer(&self, inner: &mut SessionInner) {
        inner.timer_token += 1;
        let token = inner.timer_token;
        let silence = Duration::from_millis(self.shared.config.silence_duration_ms as u64);
        let session = self.clone();

        inner.silence_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(silence).await;
            session.on_silence_elapsed(token).await;
        }));
    }

    /// The silence deadline passed: end the current utterance.
    async fn on_silence_elapsed(&self, token: u64) {
        let frames = {
            let mut inner = self.shared.inner.lock();
            // A cancelled timer may still get here if it woke right before
            // the cancel; the token mismatch makes it a no-op.
            if token != inner.timer_token {
                return;
            }
            inner.silence_timer = None;

            // A stale fire after a flush-and-restart, or a fire while the
            // previous utterance is still being transcribed, changes nothing:
            // the next below-threshold frame re-arms the timer.
            if inner.state != SessionState::Speaking || inner.transcription_in_flight {
                return;
            }
            inner.state = SessionState::Idle;

            let samples = inner.buffered_samples;
            let frames = std::mem::take(&mut inner.buffer);
            inner.buffered_samples = 0;

            if samples < self.shared.min_utterance_samples {
                debug!(
                    samples,
                    floor = self.shared.min_utterance_samples,
                    "Utterance below minimum duration, discarding"
                );
                return;
            }

            inner.transcription_in_flight = true;
            frames
        };

        self.emit(SessionEvent::Partial(
            defaults::PARTIAL_PLACEHOLDER.to_string(),
        ));
        self.transcribe_utterance(frames).await;
    }

    /// Encode the utterance and run the single transcription attempt.
    ///
    /// All completions (success, empty, failure) resume here: the in-flight
    /// guard is cleared exactly once, and only a non-empty transcript on a
    /// still-open session reaches the caller.
    async fn transcribe_utterance(&self, frames: Vec<Vec<u8>>) {
        let pcm: Vec<i16> = frames
            .iter()
            .flat_map(|frame| frame.iter().map(|&byte| mulaw::decode_sample(byte)))
            .collect();

        let result = match wav::encode_wav(&pcm, self.shared.config.sample_rate) {
            Ok(wav_bytes) => self.shared.transcriber.transcribe(&wav_bytes).await,
            Err(e) => Err(e),
        };

        let transcript = {
            let mut inner = self.shared.inner.lock();
            inner.transcription_in_flight = false;

            match result {
                Ok(Some(text)) => {
                    if inner.state == SessionState::Closed {
                        debug!("Session closed before transcription resolved, dropping result");
                        None
                    } else {
                        if let Some(waiter) = inner.waiter.take() {
                            let _ = waiter.send(text.clone());
                        }
                        Some(text)
                    }
                }
                Ok(None) => {
                    debug!("Transcription returned no text");
                    None
                }
                Err(e) => {
                    // Failures never reach the caller's event surface; the
                    // session keeps serving the next utterance.
                    warn!(error = %e, "Transcription failed");
                    None
                }
            }
        };

        if let Some(text) = transcript {
            self.emit(SessionEvent::Transcript(text));
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The receiver may be gone; events are then dropped on the floor.
        let _ = self.shared.events.send(event);
    }
}
