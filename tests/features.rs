use std::f32::consts::PI;

use approx::assert_abs_diff_eq;
use phonic_check::config::{MfccConfig, PitchConfig};
use phonic_check::pronunciation::features::{FormantAnalyzer, MfccExtractor, PitchAnalyzer};
use phonic_check::pronunciation::phonetics::AgeBracket;
use phonic_check::pronunciation::reference::ReferenceGenerator;

const SAMPLE_RATE: u32 = 16_000;

fn tone(freq: f32, seconds: f32) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    (0..len)
        .map(|n| 0.6 * (2.0 * PI * freq * n as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

#[test]
fn mfcc_matrices_stay_in_lockstep() {
    let extractor = MfccExtractor::new(MfccConfig::default(), SAMPLE_RATE);
    let features = extractor.extract(&tone(440.0, 0.5));

    // floor((8000 - 400) / 160) + 1
    assert_eq!(features.frame_count(), 48);
    assert_eq!(features.coefficients.dim(), (48, 13));
    assert_eq!(features.deltas.dim(), (48, 13));
    assert_eq!(features.energy.len(), 48);
    assert_eq!(features.dimension(), 27);
    assert_eq!(features.frame_vector(10).len(), 27);
    assert!(features.coefficients.iter().all(|c| c.is_finite()));
}

#[test]
fn short_signal_yields_no_frames() {
    let extractor = MfccExtractor::new(MfccConfig::default(), SAMPLE_RATE);
    let features = extractor.extract(&[0.1; 399]);
    assert!(features.is_empty());
    assert_eq!(features.deltas.dim(), (0, 13));
}

#[test]
fn different_vowels_have_different_cepstra() {
    let generator = ReferenceGenerator::new(SAMPLE_RATE);
    let extractor = MfccExtractor::new(MfccConfig::default(), SAMPLE_RATE);
    let ee = generator.synthesize(&["IY"], 30).expect("synth");
    let ah = generator.synthesize(&["AA"], 30).expect("synth");
    let mid = |samples: &[f32]| {
        let features = extractor.extract(samples);
        features.frame_vector(features.frame_count() / 2)
    };
    let (a, b) = (mid(&ee.samples), mid(&ah.samples));
    let distance: f32 = a
        .iter()
        .zip(&b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt();
    assert!(distance > 1.0, "distance {distance}");
}

#[test]
fn pitch_tracks_a_child_fundamental() {
    let analyzer = PitchAnalyzer::new(PitchConfig::default(), SAMPLE_RATE);
    let report = analyzer.analyze(&tone(300.0, 0.5));

    assert!(report.voiced_frames > 0);
    assert_abs_diff_eq!(report.mean_hz, 300.0, epsilon = 10.0);
    assert!(report.monotone);
    assert_eq!(report.contour.len(), report.total_frames);
}

#[test]
fn silence_has_no_pitch() {
    let analyzer = PitchAnalyzer::new(PitchConfig::default(), SAMPLE_RATE);
    let report = analyzer.analyze(&vec![0.0; 8_000]);
    assert_eq!(report.voiced_frames, 0);
    assert!(!report.monotone);
}

#[test]
fn formants_of_silence_are_absent() {
    let formants = FormantAnalyzer::new(SAMPLE_RATE).analyze(&[0.0; 512]);
    assert!(formants.f1.is_none());
    assert!(formants.f2.is_none());
}

#[test]
fn child_vocal_tract_scaling() {
    assert_abs_diff_eq!(AgeBracket::from_age(4).vtln_factor(), 1.30);
    assert_abs_diff_eq!(AgeBracket::from_age(7).vtln_factor(), 1.22);
    assert_abs_diff_eq!(AgeBracket::from_age(11).vtln_factor(), 1.15);
    assert_abs_diff_eq!(AgeBracket::from_age(13).vtln_factor(), 1.0);
}
