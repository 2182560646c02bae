pub mod formant;
mod mel;
pub mod pitch;
mod statistics;

use ndarray::{s, Array1, Array2, Axis};
use tracing::debug;

use crate::config::MfccConfig;
use crate::dsp::{fft, window};

pub use formant::{FormantAnalyzer, Formants};
pub use pitch::{PitchAnalyzer, PitchReport};

const LOG_FLOOR: f32 = 1e-10;

/// Cepstral features of one utterance. All three matrices are indexed by
/// analysis frame and always have the same number of rows.
#[derive(Debug, Clone)]
pub struct MfccFeatures {
    /// `(frames, coefficients)`
    pub coefficients: Array2<f32>,
    /// Log energy per frame.
    pub energy: Array1<f32>,
    /// First-order regression deltas of `coefficients`.
    pub deltas: Array2<f32>,
    pub hop_size: usize,
    pub sample_rate: u32,
}

impl MfccFeatures {
    pub fn frame_count(&self) -> usize {
        self.coefficients.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Length of a flattened frame vector.
    pub fn dimension(&self) -> usize {
        self.coefficients.len_of(Axis(1)) * 2 + 1
    }

    /// Coefficients, energy, then deltas of frame `index`.
    pub fn frame_vector(&self, index: usize) -> Vec<f32> {
        let mut vector = Vec::with_capacity(self.dimension());
        vector.extend(self.coefficients.row(index).iter().copied());
        vector.push(self.energy[index]);
        vector.extend(self.deltas.row(index).iter().copied());
        vector
    }

    pub fn frame_vectors(&self) -> Vec<Vec<f32>> {
        (0..self.frame_count()).map(|i| self.frame_vector(i)).collect()
    }

    /// Frames `[start, end)` as a standalone feature set, clamped to bounds.
    pub fn slice(&self, start: usize, end: usize) -> MfccFeatures {
        let end = end.min(self.frame_count());
        let start = start.min(end);
        MfccFeatures {
            coefficients: self.coefficients.slice(s![start..end, ..]).to_owned(),
            energy: self.energy.slice(s![start..end]).to_owned(),
            deltas: self.deltas.slice(s![start..end, ..]).to_owned(),
            hop_size: self.hop_size,
            sample_rate: self.sample_rate,
        }
    }

    /// Start time of frame `index` in seconds.
    pub fn frame_time(&self, index: usize) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop_size) as f32 / self.sample_rate as f32
    }
}

/// Frames a signal and turns it into MFCCs.
///
/// The mel filterbank and DCT basis are built once here and reused by every
/// extraction, so one extractor should be shared per engine.
#[derive(Debug, Clone)]
pub struct MfccExtractor {
    config: MfccConfig,
    sample_rate: u32,
    window: Vec<f32>,
    filterbank: Array2<f32>,
    dct: Array2<f32>,
}

impl MfccExtractor {
    pub fn new(config: MfccConfig, sample_rate: u32) -> Self {
        let fft_size = fft::padded_len(config.frame_size);
        let filterbank = mel::mel_filterbank(config.filters, fft_size, sample_rate);
        let dct = mel::dct_matrix(config.coefficients, config.filters);
        let window = window::hamming(config.frame_size);
        debug!(
            fft_size,
            filters = config.filters,
            coefficients = config.coefficients,
            "built MFCC extractor"
        );
        Self {
            config,
            sample_rate,
            window,
            filterbank,
            dct,
        }
    }

    pub fn config(&self) -> &MfccConfig {
        &self.config
    }

    /// `floor((len - frame) / hop) + 1`, or zero when the signal is shorter
    /// than one frame.
    pub fn frame_count(&self, len: usize) -> usize {
        if len < self.config.frame_size || self.config.hop_size == 0 {
            return 0;
        }
        (len - self.config.frame_size) / self.config.hop_size + 1
    }

    pub fn extract(&self, samples: &[f32]) -> MfccFeatures {
        let frames = self.frame_count(samples.len());
        let coeffs = self.config.coefficients;
        let mut coefficients = Array2::zeros((frames, coeffs));
        let mut energy = Array1::zeros(frames);

        for (index, mut row) in coefficients.outer_iter_mut().enumerate() {
            let start = index * self.config.hop_size;
            let frame = &samples[start..start + self.config.frame_size];
            energy[index] = frame
                .iter()
                .map(|s| s * s)
                .sum::<f32>()
                .max(LOG_FLOOR)
                .ln();

            let windowed = window::apply(frame, &self.window);
            let power = Array1::from_vec(fft::power_spectrum(&windowed));
            let log_mel = self.filterbank.dot(&power).mapv(|e| e.max(LOG_FLOOR).ln());
            row.assign(&self.dct.dot(&log_mel));
        }

        let deltas = statistics::compute_delta_matrix(&coefficients, self.config.delta_window);
        MfccFeatures {
            coefficients,
            energy,
            deltas,
            hop_size: self.config.hop_size,
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn extractor() -> MfccExtractor {
        MfccExtractor::new(MfccConfig::default(), 16_000)
    }

    #[test]
    fn frame_count_follows_hop_formula() {
        let extractor = extractor();
        assert_eq!(extractor.frame_count(399), 0);
        assert_eq!(extractor.frame_count(400), 1);
        assert_eq!(extractor.frame_count(16_000), (16_000 - 400) / 160 + 1);
    }

    #[test]
    fn matrices_stay_in_lockstep() {
        let samples: Vec<f32> = (0..8_000)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 16_000.0).sin())
            .collect();
        let features = extractor().extract(&samples);
        let frames = features.frame_count();
        assert_eq!(frames, (8_000 - 400) / 160 + 1);
        assert_eq!(features.energy.len(), frames);
        assert_eq!(features.deltas.dim(), (frames, 13));
        assert_eq!(features.frame_vector(0).len(), 27);
        assert_eq!(features.dimension(), 27);
    }

    #[test]
    fn short_input_gives_empty_features() {
        let features = extractor().extract(&[0.1; 100]);
        assert!(features.is_empty());
        assert!(features.frame_vectors().is_empty());
    }

    #[test]
    fn slice_clamps_to_bounds() {
        let features = extractor().extract(&vec![0.2; 4_000]);
        let part = features.slice(3, 1_000);
        assert_eq!(part.frame_count(), features.frame_count() - 3);
        assert!(features.slice(50, 10).is_empty());
    }
}
