pub mod alignment;
pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod distractors;
pub mod environment;
pub mod features;
pub mod metrics;
pub mod native;
pub mod phonetics;
pub mod recognizer;
pub mod reference;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;

use crate::audio::pause_detector::PauseReport;
use environment::EnvironmentReport;
use features::pitch::PitchReport;

pub use analyzer::{CandidateScorer, PhonemeAnalyzer, PreparedUtterance};
pub use distractors::{DistractorGenerator, ShadowType, ShadowWord};
pub use native::{NativeRecognizer, NoNativeRecognizer, TimedRecognizer};
pub use recognizer::{RecognitionOutcome, RecognitionPath, RecognitionResult, WordRecognizer};

/// Convenient alias for results returned by pronunciation modules.
pub type Result<T> = std::result::Result<T, PronunciationError>;

/// Broad category of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The audio buffer is not a WAV file we can read.
    Format,
    /// The recording is silent or nearly so; nothing to score.
    MicrophoneIssue,
    InvalidInput,
    Config,
    Analysis,
}

/// Lightweight, cloneable error type for the scoring pipeline.
#[derive(Debug, Clone)]
pub struct PronunciationError {
    kind: ErrorKind,
    message: Arc<str>,
}

impl PronunciationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Analysis, message)
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Arc::from(message.into()),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Format, message)
    }

    pub fn microphone(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::MicrophoneIssue, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::InvalidInput, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Config, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_microphone_issue(&self) -> bool {
        self.kind == ErrorKind::MicrophoneIssue
    }
}

impl Display for PronunciationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::Format => write!(f, "format error: {}", self.message),
            ErrorKind::MicrophoneIssue => write!(f, "microphone issue: {}", self.message),
            ErrorKind::InvalidInput => write!(f, "invalid input: {}", self.message),
            ErrorKind::Config => write!(f, "config error: {}", self.message),
            ErrorKind::Analysis => write!(f, "{}", self.message),
        }
    }
}

impl Error for PronunciationError {}

/// Score for one phoneme of the target word, in phoneme-sequence order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PhonemeScore {
    pub phoneme: String,
    /// 0-100
    pub score: f32,
    /// Seconds into the cleaned utterance.
    pub start_time: f32,
    pub end_time: f32,
    pub feedback: String,
}

/// Full breakdown of one (utterance, candidate word) comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PronunciationAnalysis {
    pub word: String,
    pub phonemes: Vec<String>,
    pub overall_score: f32,
    /// DTW similarity against the synthesized reference.
    pub rhythm_score: f32,
    /// Mean of the per-phoneme scores.
    pub articulation_score: f32,
    /// Pitch variation and pause behaviour.
    pub expression_score: f32,
    pub phoneme_scores: Vec<PhonemeScore>,
    pub dtw_distance: f32,
    pub normalized_distance: f32,
    pub environment: EnvironmentReport,
    pub pitch: PitchReport,
    pub pauses: PauseReport,
    pub feedback: String,
}

impl PronunciationAnalysis {
    pub fn weakest_phoneme(&self) -> Option<&PhonemeScore> {
        self.phoneme_scores
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_error_kind() {
        let err = PronunciationError::format("missing RIFF header");
        assert_eq!(err.to_string(), "format error: missing RIFF header");
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(!err.is_microphone_issue());
        assert_eq!(PronunciationError::new("plain").to_string(), "plain");
    }

    #[test]
    fn weakest_phoneme_picks_lowest_score() {
        let analysis = PronunciationAnalysis {
            phoneme_scores: vec![
                PhonemeScore {
                    phoneme: "K".into(),
                    score: 90.0,
                    ..PhonemeScore::default()
                },
                PhonemeScore {
                    phoneme: "AE".into(),
                    score: 40.0,
                    ..PhonemeScore::default()
                },
            ],
            ..PronunciationAnalysis::default()
        };
        assert_eq!(analysis.weakest_phoneme().map(|p| p.phoneme.as_str()), Some("AE"));
    }
}
