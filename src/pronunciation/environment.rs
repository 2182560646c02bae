//! Recording-environment check.
//!
//! Advisory only: the report rides along with the analysis. The one
//! exception is a dead microphone, which the analyzer turns into an error.

use serde::Serialize;
use tracing::debug;

use crate::config::{AudioConfig, EnvironmentConfig};
use crate::types::AudioData;

const NOISE_FLOOR: f32 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EnvironmentCondition {
    #[default]
    Acceptable,
    SlightlyNoisy,
    TooNoisy,
    MicrophoneIssue,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvironmentReport {
    pub condition: EnvironmentCondition,
    pub snr_db: f32,
    pub noise_level: f32,
    pub signal_level: f32,
    pub peak: f32,
    pub message: String,
}

impl EnvironmentReport {
    pub fn is_noisy(&self) -> bool {
        matches!(
            self.condition,
            EnvironmentCondition::SlightlyNoisy | EnvironmentCondition::TooNoisy
        )
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentChecker {
    config: EnvironmentConfig,
    silence_peak: f32,
}

impl EnvironmentChecker {
    pub fn new(config: EnvironmentConfig, audio: &AudioConfig) -> Self {
        Self {
            config,
            silence_peak: audio.silence_peak,
        }
    }

    pub fn check(&self, audio: &AudioData) -> EnvironmentReport {
        let peak = audio.peak();
        let mut levels: Vec<f32> = audio
            .samples
            .chunks(self.config.frame_size.max(1))
            .map(frame_rms)
            .collect();
        levels.sort_by(|a, b| a.total_cmp(b));

        let tail = ((levels.len() as f32 * self.config.tail_fraction).floor() as usize)
            .max(1)
            .min(levels.len());
        let noise_level = mean(&levels[..tail]);
        let signal_level = mean(&levels[levels.len() - tail..]);
        let snr_db = 20.0 * (signal_level / noise_level.max(NOISE_FLOOR)).log10();

        let condition = if peak < self.silence_peak || signal_level < self.config.min_signal_level
        {
            EnvironmentCondition::MicrophoneIssue
        } else if snr_db < self.config.too_noisy_db {
            EnvironmentCondition::TooNoisy
        } else if snr_db < self.config.slightly_noisy_db {
            EnvironmentCondition::SlightlyNoisy
        } else {
            EnvironmentCondition::Acceptable
        };
        debug!(?condition, snr_db, signal_level, noise_level, "environment checked");

        EnvironmentReport {
            condition,
            snr_db,
            noise_level,
            signal_level,
            peak,
            message: message_for(condition).to_string(),
        }
    }
}

fn message_for(condition: EnvironmentCondition) -> &'static str {
    match condition {
        EnvironmentCondition::Acceptable => "Recording environment sounds good.",
        EnvironmentCondition::SlightlyNoisy => "It's a bit noisy. Try moving somewhere quieter.",
        EnvironmentCondition::TooNoisy => {
            "It's too noisy to hear clearly. Please find a quiet place."
        }
        EnvironmentCondition::MicrophoneIssue => {
            "I couldn't hear anything. Check that the microphone is working."
        }
    }
}

fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}
