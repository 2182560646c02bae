//! Fallback to a platform speech recognizer when acoustic scoring is not
//! confident enough to decide.

use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

/// A general-purpose recognizer asked for at most one hypothesis.
pub trait NativeRecognizer: Send + Sync {
    /// Best single-word transcript, or `None` on timeout, failure or silence.
    fn recognize_once(&self, timeout: Duration) -> Option<String>;
}

/// Stand-in used when no recognizer is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNativeRecognizer;

impl NativeRecognizer for NoNativeRecognizer {
    fn recognize_once(&self, _timeout: Duration) -> Option<String> {
        None
    }
}

/// Wraps a blocking backend and races it against a deadline.
///
/// The backend runs on its own named thread and reports through a single
/// rendezvous channel, so whichever of "result" or "timeout" happens first
/// decides the outcome and the other can never fire a second time. A backend
/// that overruns is left to finish in the background; its late result is
/// dropped.
pub struct TimedRecognizer<F> {
    backend: Arc<F>,
    name: String,
}

impl<F> TimedRecognizer<F>
where
    F: Fn() -> anyhow::Result<Option<String>> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, backend: F) -> Self {
        Self {
            backend: Arc::new(backend),
            name: name.into(),
        }
    }
}

impl<F> NativeRecognizer for TimedRecognizer<F>
where
    F: Fn() -> anyhow::Result<Option<String>> + Send + Sync + 'static,
{
    fn recognize_once(&self, timeout: Duration) -> Option<String> {
        let (tx, rx) = sync_channel(1);
        let backend = Arc::clone(&self.backend);
        let spawned = thread::Builder::new()
            .name(format!("native-asr-{}", self.name))
            .spawn(move || {
                let _ = tx.send(backend());
            });
        if let Err(err) = spawned {
            warn!(error = %err, "failed to start native recognizer thread");
            return None;
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(Some(text))) => first_word(&text),
            Ok(Ok(None)) => None,
            Ok(Err(err)) => {
                warn!(recognizer = %self.name, error = %err, "native recognizer failed");
                None
            }
            Err(err) => {
                debug!(recognizer = %self.name, ?timeout, reason = %err, "native recognizer gave no result");
                None
            }
        }
    }
}

/// First alphabetic word of a transcript, lowercased.
pub fn first_word(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphabetic() || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .find(|word| !word.is_empty())
}

#[cfg(feature = "whisper")]
pub use whisper::WhisperRecognizer;

#[cfg(feature = "whisper")]
mod whisper {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use anyhow::{Context, Result};
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    use super::{NativeRecognizer, TimedRecognizer};
    use crate::types::AudioData;

    /// Transcribes a captured clip with a local Whisper model.
    pub struct WhisperRecognizer {
        inner: TimedRecognizer<Box<dyn Fn() -> Result<Option<String>> + Send + Sync>>,
    }

    impl WhisperRecognizer {
        pub fn new(model_path: &Path, clip: AudioData) -> Self {
            let model_path: PathBuf = model_path.to_path_buf();
            let backend: Box<dyn Fn() -> Result<Option<String>> + Send + Sync> =
                Box::new(move || transcribe(&model_path, &clip));
            Self {
                inner: TimedRecognizer::new("whisper", backend),
            }
        }
    }

    impl NativeRecognizer for WhisperRecognizer {
        fn recognize_once(&self, timeout: Duration) -> Option<String> {
            self.inner.recognize_once(timeout)
        }
    }

    fn transcribe(model_path: &Path, clip: &AudioData) -> Result<Option<String>> {
        let path = model_path
            .to_str()
            .context("Whisper model path is not valid UTF-8")?;
        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .context("Failed to load Whisper model")?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_single_segment(true);

        let mut state = ctx
            .create_state()
            .context("Failed to create Whisper state")?;
        state
            .full(params, &clip.samples)
            .context("Failed to transcribe audio")?;

        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(segment.to_str().context("Failed to get segment text")?);
            text.push(' ');
        }
        Ok(Some(text))
    }
}
