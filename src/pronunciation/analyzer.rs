use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::audio::pause_detector::{detect_micro_pauses, PauseReport};
use crate::audio::preprocess::{normalize, trim_silence};
use crate::audio::resample::resample_audio;
use crate::config::EngineConfig;
use crate::dsp::NoiseReducer;
use crate::pronunciation::alignment::{project_regions, DtwComparator, DtwResult, PhonemeRegion};
use crate::pronunciation::cache::{ReferenceCache, ReferenceKey};
use crate::pronunciation::environment::{
    EnvironmentChecker, EnvironmentCondition, EnvironmentReport,
};
use crate::pronunciation::features::{
    FormantAnalyzer, MfccExtractor, MfccFeatures, PitchAnalyzer, PitchReport,
};
use crate::pronunciation::metrics::{phoneme_feedback, MetricCalculator};
use crate::pronunciation::phonetics::{self, canonical_sequence};
use crate::pronunciation::reference::ReferenceGenerator;
use crate::pronunciation::{
    PhonemeScore, PronunciationAnalysis, PronunciationError, Result,
};
use crate::types::AudioData;

/// An utterance after cleanup, with every feature the scorer needs.
///
/// Built once per recording and shared by every candidate word.
#[derive(Debug, Clone)]
pub struct PreparedUtterance {
    /// Resampled, denoised, normalized and trimmed audio.
    pub audio: AudioData,
    pub features: MfccFeatures,
    pub pitch: PitchReport,
    pub pauses: PauseReport,
    pub environment: EnvironmentReport,
}

impl PreparedUtterance {
    pub fn duration_secs(&self) -> f32 {
        self.audio.duration_secs()
    }
}

/// Scoring seam used by the word recognizer.
pub trait CandidateScorer: Send + Sync {
    fn prepare(&self, audio: &AudioData) -> Result<PreparedUtterance>;

    fn score(
        &self,
        utterance: &PreparedUtterance,
        word: &str,
        phonemes: &[String],
        age: u32,
    ) -> Result<PronunciationAnalysis>;
}

/// Scores an utterance against a synthesized rendition of the target word.
#[derive(Debug)]
pub struct PhonemeAnalyzer {
    config: EngineConfig,
    environment: EnvironmentChecker,
    noise: NoiseReducer,
    mfcc: MfccExtractor,
    pitch: PitchAnalyzer,
    formants: FormantAnalyzer,
    dtw: DtwComparator,
    metrics: MetricCalculator,
    generator: ReferenceGenerator,
    cache: ReferenceCache,
}

impl Default for PhonemeAnalyzer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PhonemeAnalyzer {
    pub fn new(config: EngineConfig) -> Self {
        let rate = config.audio.target_sample_rate;
        Self {
            environment: EnvironmentChecker::new(config.environment.clone(), &config.audio),
            noise: NoiseReducer::new(config.noise.clone()),
            mfcc: MfccExtractor::new(config.mfcc.clone(), rate),
            pitch: PitchAnalyzer::new(config.pitch.clone(), rate),
            formants: FormantAnalyzer::new(rate),
            dtw: DtwComparator::new(),
            metrics: MetricCalculator::new(config.scoring.clone()),
            generator: ReferenceGenerator::new(rate),
            cache: ReferenceCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    pub fn generator(&self) -> &ReferenceGenerator {
        &self.generator
    }

    /// Environment check only, without cleanup or feature extraction.
    pub fn check_environment(&self, audio: &AudioData) -> EnvironmentReport {
        self.environment.check(audio)
    }

    /// Run the cleanup chain and extract features.
    ///
    /// Fails with `MicrophoneIssue` when the recording is silent; any other
    /// environment verdict is attached to the result but does not stop it.
    pub fn prepare(&self, audio: &AudioData) -> Result<PreparedUtterance> {
        if audio.sample_rate == 0 {
            return Err(PronunciationError::invalid_input("sample rate must be positive"));
        }
        let environment = self.environment.check(audio);
        if environment.condition == EnvironmentCondition::MicrophoneIssue {
            warn!(peak = environment.peak, "recording is silent");
            return Err(PronunciationError::microphone(environment.message.clone()));
        }

        let resampled = resample_audio(audio, self.config.audio.target_sample_rate)
            .map_err(|err| PronunciationError::new(err.to_string()))?;
        let denoised = self.noise.reduce(&resampled);
        let cleaned = trim_silence(&normalize(&denoised), self.config.audio.trim_threshold);
        if cleaned.is_empty() {
            return Err(PronunciationError::microphone(
                "no speech left after noise reduction",
            ));
        }

        let features = self.mfcc.extract(&cleaned.samples);
        let pitch = self.pitch.analyze(&cleaned.samples);
        let pc = &self.config.pitch;
        let pauses = detect_micro_pauses(
            &cleaned,
            pc.pause_window_ms,
            pc.pause_threshold,
            pc.min_pause_ms,
        );
        debug!(
            raw_secs = audio.duration_secs(),
            cleaned_secs = cleaned.duration_secs(),
            frames = features.frame_count(),
            voiced = pitch.voiced_frames,
            pauses = pauses.count(),
            "prepared utterance"
        );

        Ok(PreparedUtterance {
            audio: cleaned,
            features,
            pitch,
            pauses,
            environment,
        })
    }

    /// Synthesized rendition of `phonemes`, cleaned exactly like a learner's
    /// recording so both sides of the comparison share the same processing.
    pub fn reference_for<S: AsRef<str>>(
        &self,
        phonemes: &[S],
        age: u32,
    ) -> Result<Arc<PreparedUtterance>> {
        let key = ReferenceKey::new(phonemes, age);
        self.cache.get_or_try_insert(key, || {
            let audio = self.generator.synthesize(phonemes, age)?;
            self.prepare(&audio)
        })
    }

    pub fn score(
        &self,
        utterance: &PreparedUtterance,
        word: &str,
        phonemes: &[String],
        age: u32,
    ) -> Result<PronunciationAnalysis> {
        if phonemes.is_empty() {
            return Err(PronunciationError::invalid_input(format!(
                "no phonemes given for \"{word}\""
            )));
        }
        let phonemes = canonical_sequence(phonemes);
        let reference = self.reference_for(&phonemes, age)?;

        let alignment = self.dtw.compare(&reference.features, &utterance.features);
        let rhythm = alignment.similarity;
        let regions = project_regions(&phonemes, reference.features.frame_count(), &alignment);
        let phoneme_scores: Vec<PhonemeScore> = regions
            .iter()
            .map(|region| self.score_region(region, &reference, utterance, age))
            .collect();

        let articulation = self.metrics.articulation_score(&phoneme_scores);
        let expression = self
            .metrics
            .expression_score(&utterance.pitch, &utterance.pauses);
        let overall = self.metrics.overall_score(rhythm, articulation, expression);
        let feedback = self.metrics.feedback(
            overall,
            &utterance.environment,
            &utterance.pitch,
            &utterance.pauses,
            &phoneme_scores,
        );
        info!(
            word,
            overall,
            rhythm,
            articulation,
            expression,
            "scored candidate"
        );

        Ok(PronunciationAnalysis {
            word: word.to_string(),
            phonemes,
            overall_score: overall,
            rhythm_score: rhythm,
            articulation_score: articulation,
            expression_score: expression,
            phoneme_scores,
            dtw_distance: alignment.distance,
            normalized_distance: alignment.normalized_distance,
            environment: utterance.environment.clone(),
            pitch: utterance.pitch.clone(),
            pauses: utterance.pauses.clone(),
            feedback,
        })
    }

    /// Prepare and score in one call.
    pub fn analyze(
        &self,
        audio: &AudioData,
        word: &str,
        phonemes: &[String],
        age: u32,
    ) -> Result<PronunciationAnalysis> {
        let utterance = self.prepare(audio)?;
        self.score(&utterance, word, phonemes, age)
    }

    fn score_region(
        &self,
        region: &PhonemeRegion,
        reference: &PreparedUtterance,
        utterance: &PreparedUtterance,
        age: u32,
    ) -> PhonemeScore {
        let features = &utterance.features;
        let start_time = features.frame_time(region.learner.start);
        let end_time = features.frame_time(region.learner.end);
        if region.is_empty() {
            return PhonemeScore {
                phoneme: region.phoneme.clone(),
                score: 0.0,
                start_time,
                end_time,
                feedback: phoneme_feedback(0.0).to_string(),
            };
        }

        let local: DtwResult = self.dtw.compare_region(
            &reference.features,
            region.reference.clone(),
            features,
            region.learner.clone(),
        );
        let formant = phonetics::vowel_formants(&region.phoneme).map(|target| {
            let frame = self.formant_frame(utterance, region);
            let measured = self.formants.analyze_for_age(frame, age);
            self.metrics.formant_score(target, &measured)
        });
        let score = self.metrics.phoneme_score(local.similarity, formant);

        PhonemeScore {
            phoneme: region.phoneme.clone(),
            score,
            start_time,
            end_time,
            feedback: phoneme_feedback(score).to_string(),
        }
    }

    /// Fixed-size sample window centred on the learner's side of `region`.
    fn formant_frame<'a>(&self, utterance: &'a PreparedUtterance, region: &PhonemeRegion) -> &'a [f32] {
        let samples = &utterance.audio.samples;
        let mfcc = self.mfcc.config();
        let centre_frame = (region.learner.start + region.learner.end) / 2;
        let centre = centre_frame * mfcc.hop_size + mfcc.frame_size / 2;
        let half = self.config.scoring.formant_frame_size / 2;
        let end = (centre + half).min(samples.len());
        let start = end.saturating_sub(half * 2);
        &samples[start..end]
    }
}

impl CandidateScorer for PhonemeAnalyzer {
    fn prepare(&self, audio: &AudioData) -> Result<PreparedUtterance> {
        PhonemeAnalyzer::prepare(self, audio)
    }

    fn score(
        &self,
        utterance: &PreparedUtterance,
        word: &str,
        phonemes: &[String],
        age: u32,
    ) -> Result<PronunciationAnalysis> {
        PhonemeAnalyzer::score(self, utterance, word, phonemes, age)
    }
}
