use serde::Serialize;

use crate::config::PitchConfig;

use super::statistics::mean_and_std;

const MIN_FRAME_ENERGY: f32 = 1e-6;
/// Fraction of the strongest lag a candidate peak must reach.
const PEAK_TOLERANCE: f32 = 0.9;

/// Fundamental-frequency summary of an utterance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PitchReport {
    /// Mean over voiced frames, Hz.
    pub mean_hz: f32,
    pub std_dev_hz: f32,
    pub voiced_frames: usize,
    pub total_frames: usize,
    /// Flat delivery: at least two voiced frames and little variation.
    pub monotone: bool,
    /// Per-frame estimate; `None` for unvoiced frames.
    pub contour: Vec<Option<f32>>,
}

/// Autocorrelation pitch tracker.
#[derive(Debug, Clone)]
pub struct PitchAnalyzer {
    config: PitchConfig,
    sample_rate: u32,
}

impl PitchAnalyzer {
    pub fn new(config: PitchConfig, sample_rate: u32) -> Self {
        Self {
            config,
            sample_rate,
        }
    }

    pub fn analyze(&self, samples: &[f32]) -> PitchReport {
        let frame_size = self.config.frame_size;
        let hop = self.config.hop_size.max(1);
        if samples.len() < frame_size || frame_size == 0 {
            return PitchReport::default();
        }

        let contour: Vec<Option<f32>> = (0..=(samples.len() - frame_size) / hop)
            .map(|index| {
                let start = index * hop;
                self.estimate_frame(&samples[start..start + frame_size])
            })
            .collect();
        let voiced: Vec<f32> = contour.iter().flatten().copied().collect();
        let (mean_hz, std_dev_hz) = mean_and_std(&voiced);

        PitchReport {
            mean_hz,
            std_dev_hz,
            voiced_frames: voiced.len(),
            total_frames: contour.len(),
            monotone: voiced.len() >= 2 && std_dev_hz < self.config.monotone_std_hz,
            contour,
        }
    }

    /// F0 of one frame, or `None` when the frame is unvoiced.
    pub fn estimate_frame(&self, frame: &[f32]) -> Option<f32> {
        if frame.len() < 2 {
            return None;
        }
        let sample_rate = self.sample_rate as f32;
        let min_lag = ((sample_rate / self.config.max_hz).floor() as usize).max(1);
        let max_lag = ((sample_rate / self.config.min_hz).ceil() as usize).min(frame.len() - 1);
        if min_lag > max_lag {
            return None;
        }

        let energy = normalized_autocorrelation(frame, 0);
        if energy <= MIN_FRAME_ENERGY {
            return None;
        }

        let values: Vec<f32> = (min_lag..=max_lag)
            .map(|lag| normalized_autocorrelation(frame, lag))
            .collect();
        let best_value = values.iter().copied().fold(f32::MIN, f32::max);
        if best_value < self.config.voicing_threshold * energy {
            return None;
        }
        // Earliest peak close to the best one, so multiples of the period
        // never win over the period itself.
        let best_index = (0..values.len()).find(|&i| {
            let left = i.checked_sub(1).map_or(f32::MIN, |l| values[l]);
            let right = values.get(i + 1).copied().unwrap_or(f32::MIN);
            values[i] >= left && values[i] >= right && values[i] >= PEAK_TOLERANCE * best_value
        })?;
        Some(sample_rate / (min_lag + best_index) as f32)
    }
}

/// Lag product averaged over the overlapping samples.
fn normalized_autocorrelation(frame: &[f32], lag: usize) -> f32 {
    let overlap = frame.len().saturating_sub(lag);
    if overlap == 0 {
        return 0.0;
    }
    autocorrelation(frame, lag) / overlap as f32
}

fn autocorrelation(frame: &[f32], lag: usize) -> f32 {
    frame
        .iter()
        .zip(frame.iter().skip(lag))
        .map(|(a, b)| a * b)
        .sum()
}
