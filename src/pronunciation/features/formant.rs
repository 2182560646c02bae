//! LPC formant tracking.
//!
//! A frame is pre-emphasized and Hamming-windowed, an all-pole model is fit
//! with Levinson-Durbin, and the predictor polynomial is factored with a
//! fixed number of Durand-Kerner sweeps. Each complex root in the upper half
//! plane is a resonance candidate.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use crate::audio::preprocess::{pre_emphasis, PRE_EMPHASIS};
use crate::dsp::window;
use crate::pronunciation::phonetics::AgeBracket;

pub const LPC_ORDER: usize = 12;
const ROOT_ITERATIONS: usize = 20;
const INITIAL_RADIUS: f64 = 0.9;
const MIN_FORMANT_HZ: f64 = 90.0;
const MAX_BANDWIDTH_HZ: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Formant {
    pub frequency: f32,
    pub bandwidth: f32,
}

/// Lowest three valid resonances of a frame. Missing ones are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Formants {
    pub f1: Option<Formant>,
    pub f2: Option<Formant>,
    pub f3: Option<Formant>,
}

impl Formants {
    pub fn f1_hz(&self) -> Option<f32> {
        self.f1.map(|f| f.frequency)
    }

    pub fn f2_hz(&self) -> Option<f32> {
        self.f2.map(|f| f.frequency)
    }

    /// Divide every frequency by the age group's vocal tract factor.
    pub fn normalized_for(self, bracket: AgeBracket) -> Formants {
        let factor = bracket.vtln_factor();
        let scale = |formant: Option<Formant>| {
            formant.map(|f| Formant {
                frequency: f.frequency / factor,
                bandwidth: f.bandwidth,
            })
        };
        Formants {
            f1: scale(self.f1),
            f2: scale(self.f2),
            f3: scale(self.f3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormantAnalyzer {
    sample_rate: u32,
    order: usize,
}

impl FormantAnalyzer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            order: LPC_ORDER,
        }
    }

    pub fn analyze(&self, frame: &[f32]) -> Formants {
        if frame.len() <= self.order || self.sample_rate == 0 {
            return Formants::default();
        }
        let emphasized = pre_emphasis(frame, PRE_EMPHASIS);
        let windowed = window::apply(&emphasized, &window::hamming(emphasized.len()));
        let Some(lpc) = lpc_coefficients(&windowed, self.order) else {
            return Formants::default();
        };

        let sample_rate = self.sample_rate as f64;
        let mut candidates: Vec<Formant> = durand_kerner(&lpc)
            .into_iter()
            .filter(|root| root.re.is_finite() && root.im.is_finite() && root.im > 0.0)
            .map(|root| {
                let frequency = root.arg() * sample_rate / (2.0 * PI);
                let bandwidth = -root.norm().ln() * sample_rate / PI;
                (frequency, bandwidth)
            })
            .filter(|&(frequency, bandwidth)| {
                frequency > MIN_FORMANT_HZ && bandwidth < MAX_BANDWIDTH_HZ
            })
            .map(|(frequency, bandwidth)| Formant {
                frequency: frequency as f32,
                bandwidth: bandwidth as f32,
            })
            .collect();
        candidates.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));

        let mut lowest = candidates.into_iter();
        Formants {
            f1: lowest.next(),
            f2: lowest.next(),
            f3: lowest.next(),
        }
    }

    /// Formants scaled back to adult-equivalent frequencies.
    pub fn analyze_for_age(&self, frame: &[f32], age: u32) -> Formants {
        self.analyze(frame).normalized_for(AgeBracket::from_age(age))
    }
}

/// Predictor polynomial `[1, a1, .., ap]` via autocorrelation and
/// Levinson-Durbin. `None` for a silent frame.
fn lpc_coefficients(frame: &[f32], order: usize) -> Option<Vec<f64>> {
    let autocorr: Vec<f64> = (0..=order)
        .map(|lag| {
            frame
                .iter()
                .zip(frame.iter().skip(lag))
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum()
        })
        .collect();
    if autocorr[0] <= f64::EPSILON {
        return None;
    }

    let mut coeffs = vec![0.0_f64; order + 1];
    coeffs[0] = 1.0;
    let mut error = autocorr[0];
    for i in 1..=order {
        let acc: f64 = autocorr[i]
            + (1..i)
                .map(|j| coeffs[j] * autocorr[i - j])
                .sum::<f64>();
        let reflection = -acc / error;
        let previous = coeffs.clone();
        for j in 1..i {
            coeffs[j] = previous[j] + reflection * previous[i - j];
        }
        coeffs[i] = reflection;
        error *= 1.0 - reflection * reflection;
        if error <= 0.0 {
            break;
        }
    }
    Some(coeffs)
}

/// Simultaneous root refinement for a monic polynomial, highest power first.
///
/// Runs exactly `ROOT_ITERATIONS` sweeps with no convergence test. Initial
/// guesses sit on a circle of radius 0.9, rotated so none is real and the set
/// is not conjugate-symmetric.
fn durand_kerner(coeffs: &[f64]) -> Vec<Complex64> {
    let degree = coeffs.len().saturating_sub(1);
    if degree == 0 {
        return Vec::new();
    }
    let n = degree as f64;
    let mut roots: Vec<Complex64> = (0..degree)
        .map(|k| {
            let angle = 2.0 * PI * k as f64 / n + PI / (2.0 * n);
            Complex64::from_polar(INITIAL_RADIUS, angle)
        })
        .collect();

    for _ in 0..ROOT_ITERATIONS {
        for i in 0..degree {
            let current = roots[i];
            let value = evaluate(coeffs, current);
            let denominator = roots
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(Complex64::new(1.0, 0.0), |acc, (_, &other)| {
                    acc * (current - other)
                });
            roots[i] = current - value / denominator;
        }
    }
    roots
}

fn evaluate(coeffs: &[f64], z: Complex64) -> Complex64 {
    coeffs
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
}
