use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use phonic_check::audio::decoder::decode_file;
use phonic_check::audio::encoder::write_wav;
use phonic_check::config::AppConfig;
use phonic_check::pronunciation::cli::{
    CheckEnvArgs, Cli, Command, DistractorArgs, ScoreArgs, SynthArgs,
};
use phonic_check::pronunciation::{
    DistractorGenerator, NativeRecognizer, NoNativeRecognizer, PhonemeAnalyzer, WordRecognizer,
};
use phonic_check::types::AudioData;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let app = AppConfig::from_override(cli.config.clone())?;
    if let Some(source) = &app.source {
        info!(path = %source.display(), "loaded engine config override");
    }

    match &cli.command {
        Command::Score(args) => handle_score(&app, args),
        Command::Analyze(args) => handle_analyze(&app, args),
        Command::Distractors(args) => handle_distractors(&app, args),
        Command::Synth(args) => handle_synth(&app, args),
        Command::CheckEnv(args) => handle_check_env(&app, args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_score(app: &AppConfig, args: &ScoreArgs) -> Result<()> {
    let phonemes = args.target.resolve_phonemes()?;
    let audio = decode_file(&args.input)?;
    let age = args.age.unwrap_or(app.engine.recognition.default_age);
    let recognizer = WordRecognizer::from_config(app.engine.clone())
        .with_native(native_recognizer(args, &audio)?);
    let result = recognizer
        .recognize(&audio, &args.target.word, &phonemes, age)
        .with_context(|| format!("failed to score {}", args.input.display()))?;
    print_json(&result)
}

fn handle_analyze(app: &AppConfig, args: &ScoreArgs) -> Result<()> {
    let phonemes = args.target.resolve_phonemes()?;
    let audio = decode_file(&args.input)?;
    let age = args.age.unwrap_or(app.engine.recognition.default_age);
    let analyzer = PhonemeAnalyzer::new(app.engine.clone());
    let analysis = analyzer
        .analyze(&audio, &args.target.word, &phonemes, age)
        .with_context(|| format!("failed to analyze {}", args.input.display()))?;
    print_json(&analysis)
}

fn handle_distractors(app: &AppConfig, args: &DistractorArgs) -> Result<()> {
    let phonemes = args.target.resolve_phonemes()?;
    let mut generator = DistractorGenerator::new(&app.engine.recognition);
    if let Some(seed) = args.seed {
        generator = generator.with_seed(seed);
    }
    print_json(&generator.generate(&phonemes))
}

fn handle_synth(app: &AppConfig, args: &SynthArgs) -> Result<()> {
    let phonemes = args.target.resolve_phonemes()?;
    let age = args.age.unwrap_or(app.engine.recognition.default_age);
    let analyzer = PhonemeAnalyzer::new(app.engine.clone());
    let audio = analyzer.generator().synthesize(&phonemes, age)?;
    write_wav(&audio, &args.output)?;
    info!(
        path = %args.output.display(),
        secs = audio.duration_secs(),
        "wrote reference rendition"
    );
    Ok(())
}

fn handle_check_env(app: &AppConfig, args: &CheckEnvArgs) -> Result<()> {
    let audio = decode_file(&args.input)?;
    let analyzer = PhonemeAnalyzer::new(app.engine.clone());
    print_json(&analyzer.check_environment(&audio))
}

#[cfg(feature = "whisper")]
fn native_recognizer(args: &ScoreArgs, audio: &AudioData) -> Result<Arc<dyn NativeRecognizer>> {
    use phonic_check::pronunciation::native::WhisperRecognizer;
    Ok(match &args.whisper_model {
        Some(model) => Arc::new(WhisperRecognizer::new(model, audio.clone())),
        None => Arc::new(NoNativeRecognizer),
    })
}

#[cfg(not(feature = "whisper"))]
fn native_recognizer(args: &ScoreArgs, _audio: &AudioData) -> Result<Arc<dyn NativeRecognizer>> {
    anyhow::ensure!(
        args.whisper_model.is_none(),
        "--whisper-model requires building with the `whisper` feature"
    );
    Ok(Arc::new(NoNativeRecognizer))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize result")?;
    println!("{rendered}");
    Ok(())
}
