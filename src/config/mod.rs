//! Tunables for every pipeline stage.
//!
//! Defaults are the calibrated constants the scorer ships with. A JSON file
//! can override any subset of them; missing keys keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_override(path: Option<PathBuf>) -> Result<Self> {
        let engine = match path.as_deref() {
            Some(custom) => EngineConfig::from_file(custom)?,
            None => EngineConfig::default(),
        };
        engine.validate()?;
        Ok(Self {
            engine,
            source: path,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub audio: AudioConfig,
    pub environment: EnvironmentConfig,
    pub noise: NoiseConfig,
    pub mfcc: MfccConfig,
    pub pitch: PitchConfig,
    pub scoring: ScoringConfig,
    pub recognition: RecognitionConfig,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(anyhow!("config path {:?} is not a file", path));
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_json(&raw).with_context(|| format!("invalid config file {:?}", path))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("failed to parse engine config JSON")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.audio.target_sample_rate > 0,
            "audio.target_sample_rate must be positive"
        );
        ensure!(
            self.environment.frame_size > 0,
            "environment.frame_size must be positive"
        );
        ensure!(
            self.noise.frame_size > 0 && self.noise.hop_size > 0,
            "noise frame and hop sizes must be positive"
        );
        ensure!(
            self.noise.hop_size <= self.noise.frame_size,
            "noise.hop_size must not exceed noise.frame_size"
        );
        ensure!(
            self.mfcc.frame_size > 0 && self.mfcc.hop_size > 0,
            "mfcc frame and hop sizes must be positive"
        );
        ensure!(
            self.mfcc.coefficients > 0 && self.mfcc.coefficients <= self.mfcc.filters,
            "mfcc.coefficients must be between 1 and mfcc.filters"
        );
        ensure!(
            self.pitch.min_hz > 0.0 && self.pitch.max_hz > self.pitch.min_hz,
            "pitch range must be positive and increasing"
        );
        let weights = self.scoring.rhythm_weight
            + self.scoring.articulation_weight
            + self.scoring.expression_weight;
        ensure!(
            (weights - 1.0).abs() < 1e-3,
            "scoring weights must sum to 1.0 (got {weights:.3})"
        );
        ensure!(
            self.recognition.min_duration_ratio < self.recognition.max_duration_ratio,
            "recognition duration ratio bounds must be increasing"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub target_sample_rate: u32,
    /// Peak amplitude below which a recording counts as silent.
    pub silence_peak: f32,
    /// Relative amplitude used when trimming a normalized utterance.
    pub trim_threshold: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: crate::types::TARGET_SAMPLE_RATE,
            silence_peak: 0.01,
            trim_threshold: 0.02,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub frame_size: usize,
    pub tail_fraction: f32,
    pub too_noisy_db: f32,
    pub slightly_noisy_db: f32,
    pub min_signal_level: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            frame_size: 512,
            tail_fraction: 0.15,
            too_noisy_db: 10.0,
            slightly_noisy_db: 15.0,
            min_signal_level: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub frame_size: usize,
    pub hop_size: usize,
    pub noise_window_ms: f32,
    pub oversubtraction: f32,
    /// Fraction of the original magnitude kept as a floor.
    pub spectral_floor: f32,
    pub gate_threshold: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            frame_size: 512,
            hop_size: 256,
            noise_window_ms: 200.0,
            oversubtraction: 2.0,
            spectral_floor: 0.01,
            gate_threshold: 0.005,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MfccConfig {
    pub frame_size: usize,
    pub hop_size: usize,
    pub filters: usize,
    pub coefficients: usize,
    pub delta_window: usize,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            frame_size: 400,
            hop_size: 160,
            filters: 26,
            coefficients: 13,
            delta_window: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    pub frame_size: usize,
    pub hop_size: usize,
    pub min_hz: f32,
    pub max_hz: f32,
    pub voicing_threshold: f32,
    pub monotone_std_hz: f32,
    pub pause_window_ms: f32,
    pub pause_threshold: f32,
    pub min_pause_ms: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            frame_size: 640,
            hop_size: 320,
            min_hz: 75.0,
            max_hz: 600.0,
            voicing_threshold: 0.1,
            monotone_std_hz: 15.0,
            pause_window_ms: 10.0,
            pause_threshold: 0.1,
            min_pause_ms: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub rhythm_weight: f32,
    pub articulation_weight: f32,
    pub expression_weight: f32,
    pub monotone_penalty: f32,
    pub pause_penalty: f32,
    pub max_pause_penalty: f32,
    pub local_similarity_weight: f32,
    pub formant_weight: f32,
    pub f1_tolerance_hz: f32,
    pub f1_penalty_per_hz: f32,
    pub f2_tolerance_hz: f32,
    pub f2_penalty_per_hz: f32,
    pub mushy_vowel_penalty: f32,
    pub excellent_threshold: f32,
    pub excessive_pauses: usize,
    pub formant_frame_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rhythm_weight: 0.5,
            articulation_weight: 0.3,
            expression_weight: 0.2,
            monotone_penalty: 20.0,
            pause_penalty: 10.0,
            max_pause_penalty: 30.0,
            local_similarity_weight: 0.6,
            formant_weight: 0.4,
            f1_tolerance_hz: 150.0,
            f1_penalty_per_hz: 0.2,
            f2_tolerance_hz: 250.0,
            f2_penalty_per_hz: 0.1,
            mushy_vowel_penalty: 20.0,
            excellent_threshold: 85.0,
            excessive_pauses: 2,
            formant_frame_size: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub seconds_per_phoneme: f32,
    pub min_duration_ratio: f32,
    pub max_duration_ratio: f32,
    pub duration_penalty: f32,
    pub distractor_margin: f32,
    pub fallback_threshold: f32,
    pub pass_threshold: f32,
    pub native_timeout_ms: u64,
    pub max_distractors: usize,
    /// Fixed shuffle seed; `None` draws a fresh one per request.
    pub distractor_seed: Option<u64>,
    pub default_age: u32,
}

impl RecognitionConfig {
    pub fn native_timeout(&self) -> Duration {
        Duration::from_millis(self.native_timeout_ms)
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            seconds_per_phoneme: 0.12,
            min_duration_ratio: 0.4,
            max_duration_ratio: 2.5,
            duration_penalty: 30.0,
            distractor_margin: 10.0,
            fallback_threshold: 45.0,
            pass_threshold: 50.0,
            native_timeout_ms: 5_000,
            max_distractors: 4,
            distractor_seed: None,
            default_age: 7,
        }
    }
}
