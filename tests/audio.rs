use std::io::Cursor;

use approx::assert_abs_diff_eq;
use hound::{SampleFormat, WavSpec, WavWriter};
use phonic_check::audio::decoder::{decode_wav, has_wav_magic};
use phonic_check::audio::pause_detector::detect_micro_pauses;
use phonic_check::audio::preprocess::{normalize, pre_emphasis, trim_silence};
use phonic_check::audio::resample::linear_resample;
use phonic_check::dsp::NoiseReducer;
use phonic_check::pronunciation::ErrorKind;
use phonic_check::types::AudioData;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn wav_24bit(samples: &[i32], sample_rate: u32) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("writer");
        for &s in samples {
            writer.write_sample(s).expect("sample");
        }
        writer.finalize().expect("finalize");
    }
    cursor.into_inner()
}

#[test]
fn decodes_24_bit_and_resamples_to_16k() {
    let bytes = wav_24bit(&vec![4_194_304; 3_200], 32_000);
    let audio = decode_wav(&bytes).expect("decodes");

    assert_eq!(audio.sample_rate, 16_000);
    assert_eq!(audio.len(), 1_600);
    assert!(audio.samples.iter().all(|&s| (s - 0.5).abs() < 1e-5));
}

#[test]
fn truncated_header_is_a_format_error() {
    let mut bytes = wav_24bit(&[0, 1, 2], 16_000);
    bytes.truncate(20);
    assert!(has_wav_magic(&bytes));
    let err = decode_wav(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn resample_is_identity_at_same_rate() {
    let samples = vec![0.1, -0.2, 0.3];
    assert_eq!(linear_resample(&samples, 16_000, 16_000).unwrap(), samples);
    assert!(linear_resample(&samples, 0, 16_000).is_err());
}

#[test]
fn normalize_is_idempotent_and_trim_strips_edges() {
    let audio = AudioData::from_samples(vec![0.0, 0.001, 0.2, -0.4, 0.1, 0.0005, 0.0], 16_000);
    let once = normalize(&audio);
    let twice = normalize(&once);
    assert_eq!(&*once.samples, &*twice.samples);

    let trimmed = trim_silence(&once, 0.02);
    assert_eq!(&*trimmed.samples, &[0.5, -1.0, 0.25]);
    assert!(trim_silence(&AudioData::silence(0.1, 16_000), 0.02).is_empty());
}

#[test]
fn pre_emphasis_differences_samples() {
    let out = pre_emphasis(&[1.0, 1.0, 0.0], 0.97);
    assert_abs_diff_eq!(out[0], 1.0);
    assert_abs_diff_eq!(out[1], 0.03, epsilon = 1e-6);
    assert_abs_diff_eq!(out[2], -0.97, epsilon = 1e-6);
}

#[test]
fn noise_reducer_quiets_hiss_and_keeps_length() {
    let mut rng = StdRng::seed_from_u64(3);
    let samples: Vec<f32> = (0..16_000)
        .map(|_| 0.02 * rng.gen_range(-1.0_f32..1.0))
        .collect();
    let noisy = AudioData::from_samples(samples, 16_000);
    let cleaned = NoiseReducer::default().reduce(&noisy);

    assert_eq!(cleaned.len(), noisy.len());
    let energy = |audio: &AudioData| audio.samples.iter().map(|s| s * s).sum::<f32>();
    assert!(energy(&cleaned) < energy(&noisy) * 0.5);
}

#[test]
fn short_clip_skips_noise_reduction() {
    let clip = AudioData::from_samples(vec![0.3; 100], 16_000);
    let out = NoiseReducer::default().reduce(&clip);
    assert_eq!(&*out.samples, &*clip.samples);
}

#[test]
fn interior_gap_is_a_pause_but_edges_are_not() {
    let loud = vec![0.5_f32; 1_600];
    let mut samples = vec![0.0; 3_200];
    samples.extend(&loud);
    samples.extend(vec![0.0; 4_000]);
    samples.extend(&loud);
    samples.extend(vec![0.0; 3_200]);
    let report = detect_micro_pauses(&AudioData::from_samples(samples, 16_000), 10.0, 0.1, 150.0);

    assert_eq!(report.count(), 1);
    let pause = report.pauses[0];
    assert_abs_diff_eq!(pause.start, 0.3, epsilon = 1e-4);
    assert_abs_diff_eq!(pause.duration(), 0.25, epsilon = 1e-4);
}
