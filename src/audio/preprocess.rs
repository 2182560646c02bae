//! Amplitude clean-up stages applied before feature extraction.

use crate::types::AudioData;

pub const PRE_EMPHASIS: f32 = 0.97;

/// Scale so the loudest sample sits at ±1.0.
///
/// Silent clips and clips already peaking at 1.0 are returned as-is, which
/// keeps the operation exactly idempotent.
pub fn normalize(audio: &AudioData) -> AudioData {
    let peak = audio.peak();
    if peak <= f32::EPSILON || (peak - 1.0).abs() <= f32::EPSILON {
        return audio.clone();
    }
    let samples = audio.samples.iter().map(|s| s / peak).collect();
    AudioData::from_samples(samples, audio.sample_rate)
}

/// Strip leading and trailing samples whose magnitude stays below `threshold`.
pub fn trim_silence(audio: &AudioData, threshold: f32) -> AudioData {
    let loud = |sample: &f32| sample.abs() >= threshold;
    match (
        audio.samples.iter().position(loud),
        audio.samples.iter().rposition(loud),
    ) {
        (Some(start), Some(end)) => audio.slice(start, end + 1),
        _ => AudioData::from_samples(Vec::new(), audio.sample_rate),
    }
}

/// First-order high-pass `y[n] = x[n] - a * x[n-1]`.
pub fn pre_emphasis(samples: &[f32], coefficient: f32) -> Vec<f32> {
    let mut previous = 0.0;
    samples
        .iter()
        .map(|&sample| {
            let emphasized = sample - coefficient * previous;
            previous = sample;
            emphasized
        })
        .collect()
}
