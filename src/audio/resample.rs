use anyhow::{ensure, Result};

use crate::types::AudioData;

/// Linearly resample `samples` from `source_rate` to `target_rate`.
///
/// Returns the input untouched when the rates already match.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    let step = source_rate as f64 / target_rate as f64;
    let output_len = ((samples.len() as f64) / step).ceil().max(1.0) as usize;
    let last_index = samples.len() - 1;
    let output = (0..output_len)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last_index);
            let right = (left + 1).min(last_index);
            let t = (position - left as f64).clamp(0.0, 1.0) as f32;
            samples[left] * (1.0 - t) + samples[right] * t
        })
        .collect();
    Ok(output)
}

/// Resample a whole clip, sharing the buffer when no conversion is needed.
pub fn resample_audio(audio: &AudioData, target_rate: u32) -> Result<AudioData> {
    if audio.sample_rate == target_rate {
        return Ok(audio.clone());
    }
    let samples = linear_resample(&audio.samples, audio.sample_rate, target_rate)?;
    Ok(AudioData::from_samples(samples, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn preserves_constant_signal_after_resample() {
        let input = vec![0.5; 480];
        let resampled = linear_resample(&input, 48_000, 16_000).unwrap();
        assert_eq!(resampled.len(), 160);
        assert!(resampled.iter().all(|&sample| (sample - 0.5).abs() < 1e-6));
    }

    #[test]
    fn matching_rate_is_identity() {
        let audio = AudioData::from_samples(vec![0.1, -0.2, 0.3], 16_000);
        let same = resample_audio(&audio, 16_000).unwrap();
        assert!(Arc::ptr_eq(&audio.samples, &same.samples));
    }

    #[test]
    fn upsampling_interpolates_midpoints() {
        let resampled = linear_resample(&[0.0, 1.0], 8_000, 16_000).unwrap();
        assert_eq!(resampled.len(), 4);
        assert!((resampled[1] - 0.5).abs() < 1e-6);
        assert!((resampled[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_zero_rates() {
        assert!(linear_resample(&[0.0], 0, 16_000).is_err());
    }
}
