//! Formant-style synthesis of a "native" rendition of a phoneme sequence.
//!
//! The output is not meant to sound natural. It only needs to land in the
//! same region of MFCC space as a child saying the word, with the durations
//! and spectral envelope of each sound roughly right.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::pronunciation::phonetics::{self, AgeBracket, PhonemeClass};
use crate::pronunciation::{PronunciationError, Result};
use crate::types::AudioData;

const VOWEL_SECS: f32 = 0.200;
const FRICATIVE_SECS: f32 = 0.150;
const CONSONANT_SECS: f32 = 0.080;
const BOOKEND_SECS: f32 = 0.100;
const RAMP_SAMPLES: usize = 400;
const OUTPUT_PEAK: f32 = 0.9;

const VOWEL_F0_AMP: f32 = 0.3;
const FORMANT_AMPS: [f32; 3] = [1.0, 0.5, 0.25];
const FRICATIVE_AMP: f32 = 0.3;
const VOICED_AMP: f32 = 0.4;
const BURST_AMP: f32 = 0.15;
const NOISE_SEED: u64 = 0x5eed_cafe;

#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    sample_rate: u32,
    seed: u64,
}

impl ReferenceGenerator {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            seed: NOISE_SEED,
        }
    }

    /// Render `phonemes` for a speaker of `age`. The same input always
    /// produces the same samples.
    pub fn synthesize<S: AsRef<str>>(&self, phonemes: &[S], age: u32) -> Result<AudioData> {
        if phonemes.is_empty() {
            return Err(PronunciationError::invalid_input(
                "cannot synthesize an empty phoneme sequence",
            ));
        }
        if self.sample_rate == 0 {
            return Err(PronunciationError::invalid_input("sample rate must be positive"));
        }

        let bracket = AgeBracket::from_age(age);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let bookend = self.samples_for(BOOKEND_SECS);
        let mut samples = vec![0.0_f32; bookend];
        for phoneme in phonemes {
            let mut segment = self.render(phoneme.as_ref(), bracket, &mut rng);
            apply_ramps(&mut segment);
            samples.extend(segment);
        }
        samples.extend(std::iter::repeat(0.0).take(bookend));

        let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        if peak > 0.0 {
            let gain = OUTPUT_PEAK / peak;
            samples.iter_mut().for_each(|s| *s *= gain);
        }
        debug!(
            phonemes = phonemes.len(),
            ?bracket,
            samples = samples.len(),
            "synthesized reference"
        );
        Ok(AudioData::from_samples(samples, self.sample_rate))
    }

    fn render(&self, phoneme: &str, bracket: AgeBracket, rng: &mut StdRng) -> Vec<f32> {
        let f0 = bracket.fundamental_hz();
        match phonetics::classify(phoneme) {
            PhonemeClass::Vowel => {
                let targets = phonetics::vowel_formants(phoneme).unwrap_or([500.0, 1500.0, 2500.0]);
                let factor = bracket.vtln_factor();
                let mut partials = vec![(f0, VOWEL_F0_AMP)];
                partials.extend(
                    targets
                        .iter()
                        .zip(FORMANT_AMPS)
                        .map(|(&freq, amp)| (freq * factor, amp)),
                );
                self.tone(VOWEL_SECS, &partials)
            }
            PhonemeClass::Fricative => self.noise(FRICATIVE_SECS, FRICATIVE_AMP, rng),
            PhonemeClass::UnvoicedStop => self.noise(CONSONANT_SECS, BURST_AMP, rng),
            PhonemeClass::VoicedConsonant => self.tone(CONSONANT_SECS, &[(f0, VOICED_AMP)]),
        }
    }

    fn tone(&self, secs: f32, partials: &[(f32, f32)]) -> Vec<f32> {
        let rate = self.sample_rate as f32;
        (0..self.samples_for(secs))
            .map(|n| {
                let t = n as f32 / rate;
                partials
                    .iter()
                    .map(|&(freq, amp)| amp * (2.0 * PI * freq * t).sin())
                    .sum::<f32>()
            })
            .collect()
    }

    fn noise(&self, secs: f32, amp: f32, rng: &mut StdRng) -> Vec<f32> {
        (0..self.samples_for(secs))
            .map(|_| amp * rng.gen_range(-1.0_f32..1.0))
            .collect()
    }

    fn samples_for(&self, secs: f32) -> usize {
        (secs * self.sample_rate as f32).round() as usize
    }
}

/// Linear fade in and out, at most half the segment each way.
fn apply_ramps(segment: &mut [f32]) {
    let len = segment.len();
    let ramp = RAMP_SAMPLES.min(len / 2);
    if ramp == 0 {
        return;
    }
    for n in 0..ramp {
        let gain = n as f32 / ramp as f32;
        segment[n] *= gain;
        segment[len - 1 - n] *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ReferenceGenerator {
        ReferenceGenerator::new(16_000)
    }

    #[test]
    fn duration_sums_segments_and_bookends() {
        let audio = generator().synthesize(&["K", "AE1", "T"], 7).unwrap();
        let expected = 1_600 + 1_280 + 3_200 + 1_280 + 1_600;
        assert_eq!(audio.len(), expected);
    }

    #[test]
    fn fricatives_are_longer_than_stops() {
        let fricative = generator().synthesize(&["S"], 7).unwrap();
        let stop = generator().synthesize(&["T"], 7).unwrap();
        assert_eq!(fricative.len() - stop.len(), 1_120);
    }

    #[test]
    fn output_is_peak_normalized_with_silent_edges() {
        let audio = generator().synthesize(&["SH", "IH", "P"], 7).unwrap();
        assert!((audio.peak() - OUTPUT_PEAK).abs() < 1e-5);
        assert!(audio.samples[..1_600].iter().all(|&s| s == 0.0));
        assert!(audio.samples[audio.len() - 1_600..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn synthesis_is_deterministic() {
        let a = generator().synthesize(&["F", "IH", "SH"], 6).unwrap();
        let b = generator().synthesize(&["F", "IH", "SH"], 6).unwrap();
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn age_changes_the_rendering() {
        let child = generator().synthesize(&["AA"], 6).unwrap();
        let adult = generator().synthesize(&["AA"], 30).unwrap();
        assert_eq!(child.len(), adult.len());
        assert_ne!(child.samples, adult.samples);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = generator().synthesize::<&str>(&[], 7).unwrap_err();
        assert_eq!(err.kind(), crate::pronunciation::ErrorKind::InvalidInput);
    }
}
