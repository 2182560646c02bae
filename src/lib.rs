//! Children's pronunciation scoring.
//!
//! Decoded audio goes through spectral noise cleanup and MFCC, formant and
//! pitch analysis, is aligned with DTW against a synthesized rendition of the
//! target word, and finally races a handful of phonetically similar
//! distractor words to decide what the child actually said.

pub mod audio;
pub mod config;
pub mod dsp;
pub mod pronunciation;
pub mod types;

pub use pronunciation::{
    PhonemeAnalyzer, PronunciationAnalysis, PronunciationError, RecognitionResult,
    WordRecognizer,
};
pub use types::AudioData;
