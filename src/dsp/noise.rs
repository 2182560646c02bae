//! Spectral-subtraction denoiser.
//!
//! The leading window of a recording is assumed to hold only ambient noise.
//! Its average magnitude spectrum is subtracted from every overlapping frame
//! of the signal, the original phase is kept, and the frames are overlap-added
//! back together. Steady hiss is removed; transient noise during speech is not.

use num_complex::Complex32;
use tracing::debug;

use crate::config::NoiseConfig;
use crate::types::AudioData;

use super::{fft, window};

#[derive(Debug, Clone)]
pub struct NoiseReducer {
    config: NoiseConfig,
    window: Vec<f32>,
}

/// Mean magnitude per frequency bin learned from the leading noise window.
#[derive(Debug, Clone)]
pub struct NoiseProfile {
    pub magnitudes: Vec<f32>,
    pub frames: usize,
}

impl Default for NoiseReducer {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

impl NoiseReducer {
    pub fn new(config: NoiseConfig) -> Self {
        let window = window::hann(config.frame_size);
        Self { config, window }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Learns the noise spectrum from the first `noise_window_ms` of `audio`.
    pub fn learn_profile(&self, audio: &AudioData) -> Option<NoiseProfile> {
        let frame_size = self.config.frame_size;
        let noise_len = ((self.config.noise_window_ms / 1000.0) * audio.sample_rate as f32) as usize;
        let noise_len = noise_len.min(audio.len());
        if noise_len == 0 || frame_size == 0 {
            return None;
        }
        let region = &audio.samples[..noise_len];

        let mut magnitudes = vec![0.0_f32; fft::padded_len(frame_size)];
        let mut frames = 0;
        let mut start = 0;
        loop {
            let spectrum = self.frame_spectrum(region, start);
            for (acc, bin) in magnitudes.iter_mut().zip(&spectrum) {
                *acc += bin.norm();
            }
            frames += 1;
            start += self.config.hop_size.max(1);
            if start + frame_size > region.len() {
                break;
            }
        }
        magnitudes.iter_mut().for_each(|m| *m /= frames as f32);
        Some(NoiseProfile { magnitudes, frames })
    }

    /// Returns a denoised copy of `audio` with the same length and rate.
    pub fn reduce(&self, audio: &AudioData) -> AudioData {
        let frame_size = self.config.frame_size;
        if audio.len() < frame_size || self.config.hop_size == 0 {
            debug!(
                samples = audio.len(),
                frame_size, "signal shorter than one frame; skipping noise reduction"
            );
            return audio.clone();
        }
        let profile = match self.learn_profile(audio) {
            Some(profile) => profile,
            None => return audio.clone(),
        };
        debug!(
            noise_frames = profile.frames,
            oversubtraction = self.config.oversubtraction,
            "learned noise profile"
        );

        let samples = &audio.samples;
        let mut output = vec![0.0_f32; samples.len() + frame_size];
        let mut start = 0;
        while start < samples.len() {
            let cleaned = self.subtract(&self.frame_spectrum(samples, start), &profile);
            let frame = fft::ifft(&cleaned);
            for (offset, value) in frame.iter().take(frame_size).enumerate() {
                output[start + offset] += value;
            }
            start += self.config.hop_size;
        }
        output.truncate(samples.len());
        self.gate(&mut output);
        AudioData::from_samples(output, audio.sample_rate)
    }

    fn frame_spectrum(&self, samples: &[f32], start: usize) -> Vec<Complex32> {
        let frame_size = self.config.frame_size;
        let end = (start + frame_size).min(samples.len());
        let mut frame = vec![0.0_f32; frame_size];
        frame[..end - start].copy_from_slice(&samples[start..end]);
        fft::fft(&window::apply(&frame, &self.window))
    }

    fn subtract(&self, spectrum: &[Complex32], profile: &NoiseProfile) -> Vec<Complex32> {
        spectrum
            .iter()
            .zip(&profile.magnitudes)
            .map(|(bin, noise)| {
                let magnitude = bin.norm();
                let reduced = (magnitude - self.config.oversubtraction * noise)
                    .max(self.config.spectral_floor * magnitude);
                Complex32::from_polar(reduced, bin.arg())
            })
            .collect()
    }

    fn gate(&self, samples: &mut [f32]) {
        let threshold = self.config.gate_threshold;
        for sample in samples.iter_mut() {
            if sample.abs() < threshold {
                *sample = 0.0;
            }
        }
    }
}
