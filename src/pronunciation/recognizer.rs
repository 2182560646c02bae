//! Closed-vocabulary decision: did the child say the target word, one of
//! its shadow words, or something we can't place?

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{EngineConfig, RecognitionConfig};
use crate::pronunciation::analyzer::{CandidateScorer, PhonemeAnalyzer};
use crate::pronunciation::distractors::{DistractorGenerator, ShadowWord};
use crate::pronunciation::native::{NativeRecognizer, NoNativeRecognizer};
use crate::pronunciation::{PronunciationAnalysis, PronunciationError, Result};
use crate::types::AudioData;

/// Label reported when neither scoring nor the native recognizer could
/// identify the word.
pub const UNCLEAR_WORD: &str = "??? (Unclear)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecognitionOutcome {
    Pass,
    Fail,
    Unclear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NativeVerdict {
    Resolved(String),
    Unclear,
}

/// Which branch of the decision produced the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecognitionPath {
    TargetWon,
    DistractorWon,
    NativeFallback(NativeVerdict),
}

#[derive(Debug, Clone, Serialize)]
pub struct RecognitionResult {
    pub captured_word: String,
    pub is_pass: bool,
    pub outcome: RecognitionOutcome,
    pub path: RecognitionPath,
    /// Utterance length was implausible for the word; every score was cut.
    pub duration_rejected: bool,
    pub winning_score: f32,
    pub target_score: f32,
    pub distractor_scores: Vec<(String, f32)>,
    /// Breakdown for the target word.
    pub full_analysis: PronunciationAnalysis,
}

pub struct WordRecognizer {
    scorer: Arc<dyn CandidateScorer>,
    native: Arc<dyn NativeRecognizer>,
    distractors: DistractorGenerator,
    config: RecognitionConfig,
}

impl WordRecognizer {
    pub fn new(
        scorer: Arc<dyn CandidateScorer>,
        native: Arc<dyn NativeRecognizer>,
        config: RecognitionConfig,
    ) -> Self {
        Self {
            distractors: DistractorGenerator::new(&config),
            scorer,
            native,
            config,
        }
    }

    /// Recognizer backed by a fresh [`PhonemeAnalyzer`] and no native fallback.
    pub fn from_config(config: EngineConfig) -> Self {
        let recognition = config.recognition.clone();
        Self::new(
            Arc::new(PhonemeAnalyzer::new(config)),
            Arc::new(NoNativeRecognizer),
            recognition,
        )
    }

    pub fn with_native(mut self, native: Arc<dyn NativeRecognizer>) -> Self {
        self.native = native;
        self
    }

    pub fn distractor_generator(&self) -> &DistractorGenerator {
        &self.distractors
    }

    pub fn recognize(
        &self,
        audio: &AudioData,
        target_word: &str,
        phonemes: &[String],
        age: u32,
    ) -> Result<RecognitionResult> {
        let distractors = self.distractors.generate(phonemes);
        self.recognize_against(audio, target_word, phonemes, &distractors, age)
    }

    /// Race the target against an explicit set of shadow words.
    pub fn recognize_against(
        &self,
        audio: &AudioData,
        target_word: &str,
        phonemes: &[String],
        distractors: &[ShadowWord],
        age: u32,
    ) -> Result<RecognitionResult> {
        let utterance = self.scorer.prepare(audio)?;
        let duration_rejected = self.duration_out_of_range(audio, phonemes.len());

        let mut candidates: Vec<(&str, &[String])> = vec![(target_word, phonemes)];
        candidates.extend(
            distractors
                .iter()
                .map(|d| (d.word.as_str(), d.phonemes.as_slice())),
        );
        let scorer = &self.scorer;
        let mut analyses = candidates
            .par_iter()
            .map(|&(word, symbols)| scorer.score(&utterance, word, symbols, age))
            .collect::<Result<Vec<_>>>()?;

        if duration_rejected {
            for analysis in &mut analyses {
                analysis.overall_score =
                    (analysis.overall_score - self.config.duration_penalty).max(0.0);
            }
        }

        let mut analyses = analyses.into_iter();
        let Some(target) = analyses.next() else {
            return Err(PronunciationError::new("target analysis missing"));
        };
        let distractor_scores: Vec<(String, f32)> = analyses
            .map(|analysis| (analysis.word, analysis.overall_score))
            .collect();
        let target_score = target.overall_score;
        let best_distractor = distractor_scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|(_, score)| *score > target_score + self.config.distractor_margin);

        let (winner, winning_score, path) = match best_distractor {
            Some((word, score)) => (word.clone(), *score, RecognitionPath::DistractorWon),
            None => (target_word.to_string(), target_score, RecognitionPath::TargetWon),
        };

        let (captured_word, path) = if winning_score < self.config.fallback_threshold {
            let heard = self.native.recognize_once(self.config.native_timeout());
            info!(winning_score, heard = ?heard, "low confidence, asked native recognizer");
            match heard {
                Some(word) => (
                    word.clone(),
                    RecognitionPath::NativeFallback(NativeVerdict::Resolved(word)),
                ),
                None => (
                    UNCLEAR_WORD.to_string(),
                    RecognitionPath::NativeFallback(NativeVerdict::Unclear),
                ),
            }
        } else {
            (winner, path)
        };

        let is_pass =
            path == RecognitionPath::TargetWon && target_score >= self.config.pass_threshold;
        let outcome = match &path {
            RecognitionPath::NativeFallback(NativeVerdict::Unclear) => RecognitionOutcome::Unclear,
            _ if is_pass => RecognitionOutcome::Pass,
            _ => RecognitionOutcome::Fail,
        };
        info!(
            word = target_word,
            captured = %captured_word,
            target_score,
            winning_score,
            ?outcome,
            duration_rejected,
            "recognition decided"
        );

        Ok(RecognitionResult {
            captured_word,
            is_pass,
            outcome,
            path,
            duration_rejected,
            winning_score,
            target_score,
            distractor_scores,
            full_analysis: target,
        })
    }

    /// Judged on the clip as recorded; trimming would hide trailing silence.
    fn duration_out_of_range(&self, audio: &AudioData, phoneme_count: usize) -> bool {
        let expected = self.config.seconds_per_phoneme * phoneme_count as f32;
        if expected <= 0.0 {
            return false;
        }
        let actual = audio.duration_secs();
        let ratio = actual / expected;
        let rejected =
            ratio < self.config.min_duration_ratio || ratio > self.config.max_duration_ratio;
        if rejected {
            warn!(
                actual_secs = actual,
                expected_secs = expected,
                ratio,
                "utterance length implausible for word"
            );
        }
        rejected
    }
}
