//! Core types shared by every stage of the scoring pipeline

use std::sync::Arc;
use std::time::Duration;

/// Sample rate every analysis stage works at.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Immutable mono audio buffer.
///
/// Stages never mutate a buffer in place; each one hands back a new
/// `AudioData`. Samples live behind an `Arc` so a cleaned utterance can be
/// shared across candidate-word analyses without copying.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Arc<[f32]>,
    /// Sample rate in Hz (e.g., 16000)
    pub sample_rate: u32,
    pub duration: Duration,
}

impl AudioData {
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64)
        };
        Self {
            samples: Arc::from(samples),
            sample_rate,
            duration,
        }
    }

    pub fn silence(duration_secs: f32, sample_rate: u32) -> Self {
        let len = (duration_secs.max(0.0) * sample_rate as f32).round() as usize;
        Self::from_samples(vec![0.0; len], sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration.as_secs_f32()
    }

    /// Largest absolute sample value, 0.0 for an empty buffer.
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .fold(0.0_f32, |acc, sample| acc.max(sample.abs()))
    }

    /// Copy of the samples in `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> AudioData {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        Self::from_samples(self.samples[start..end].to_vec(), self.sample_rate)
    }
}
