use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn phonic_check() -> Command {
    Command::cargo_bin("phonic-check").expect("binary is built")
}

fn synth(word: &str, output: &Path) {
    phonic_check()
        .args(["synth", "--word", word, "--age", "7", "--output"])
        .arg(output)
        .assert()
        .success();
}

#[test]
fn synth_writes_a_wav_file() {
    let dir = tempdir().expect("temp dir");
    let output = dir.path().join("cat.wav");
    synth("cat", &output);

    let bytes = std::fs::read(&output).expect("output exists");
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
}

#[test]
fn check_env_reports_clean_recording() {
    let dir = tempdir().expect("temp dir");
    let wav = dir.path().join("dog.wav");
    synth("dog", &wav);

    phonic_check()
        .arg("check-env")
        .arg("--input")
        .arg(&wav)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"condition\": \"Acceptable\""));
}

#[test]
fn reference_rendition_passes_scoring() {
    let dir = tempdir().expect("temp dir");
    let wav = dir.path().join("cat.wav");
    synth("cat", &wav);

    phonic_check()
        .args(["score", "--word", "cat", "--phonemes", "K,AE1,T", "--input"])
        .arg(&wav)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"captured_word\": \"cat\""))
        .stdout(predicate::str::contains("\"is_pass\": true"));
}

#[test]
fn analyze_prints_phoneme_breakdown() {
    let dir = tempdir().expect("temp dir");
    let wav = dir.path().join("lamp.wav");
    synth("lamp", &wav);

    phonic_check()
        .args(["analyze", "--word", "lamp", "--input"])
        .arg(&wav)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phoneme_scores\""))
        .stdout(predicate::str::contains("\"phoneme\": \"M\""));
}

#[test]
fn distractors_are_repeatable_with_seed() {
    let run = || {
        phonic_check()
            .args(["distractors", "--word", "cat", "--seed", "9"])
            .output()
            .expect("command runs")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stdout).contains("\"type\""));
}

#[test]
fn missing_input_fails() {
    phonic_check()
        .args(["check-env", "--input", "does-not-exist.wav"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open audio file"));
}

#[test]
fn unknown_word_needs_explicit_phonemes() {
    phonic_check()
        .args(["distractors", "--word", "xylophonic"])
        .assert()
        .failure();
}

#[test]
fn config_override_is_applied() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("engine.json");
    std::fs::write(&config, r#"{"recognition": {"max_distractors": 1}}"#).expect("write config");

    let output = phonic_check()
        .args(["distractors", "--word", "cat", "--seed", "1", "--config"])
        .arg(&config)
        .output()
        .expect("command runs");
    assert!(output.status.success());
    let shadows: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(shadows.as_array().map(Vec::len), Some(1));
}
