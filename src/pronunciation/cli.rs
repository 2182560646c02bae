use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};

use crate::pronunciation::alignment::PronunciationDictionary;

#[derive(Parser, Debug)]
#[command(
    name = "phonic-check",
    version,
    about = "Score a child's reading of a single word against a synthesized reference"
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// JSON file overriding engine tunables.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide whether the recording is the target word, a near miss, or unclear.
    Score(ScoreArgs),
    /// Full scoring breakdown against the target word only.
    Analyze(ScoreArgs),
    /// List the shadow words the recognizer would race against.
    Distractors(DistractorArgs),
    /// Write the synthesized reference rendition as a WAV file.
    Synth(SynthArgs),
    /// Report recording-environment quality.
    CheckEnv(CheckEnvArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WordArgs {
    /// Target word as written.
    #[arg(long)]
    pub word: String,
    /// ARPAbet phonemes, comma separated (e.g. K,AE1,T). Looked up in the
    /// bundled lexicon when omitted.
    #[arg(long, value_delimiter = ',')]
    pub phonemes: Vec<String>,
}

impl WordArgs {
    pub fn resolve_phonemes(&self) -> Result<Vec<String>> {
        let phonemes: Vec<String> = if self.phonemes.is_empty() {
            PronunciationDictionary::shared()?.primary(&self.word)?
        } else {
            self.phonemes
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        };
        ensure!(
            !phonemes.is_empty(),
            "no phonemes for \"{}\"; pass --phonemes",
            self.word
        );
        Ok(phonemes)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Recording to score (WAV, or any format symphonia can decode).
    #[arg(long, short)]
    pub input: PathBuf,
    #[command(flatten)]
    pub target: WordArgs,
    /// Speaker age in years; picks pitch and vocal-tract scaling.
    #[arg(long)]
    pub age: Option<u32>,
    /// Local Whisper model used when acoustic scoring is inconclusive.
    #[arg(long = "whisper-model", value_name = "PATH")]
    pub whisper_model: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DistractorArgs {
    #[command(flatten)]
    pub target: WordArgs,
    /// Shuffle seed for a repeatable selection.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    #[command(flatten)]
    pub target: WordArgs,
    #[arg(long)]
    pub age: Option<u32>,
    /// Destination WAV path.
    #[arg(long, short)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CheckEnvArgs {
    #[arg(long, short)]
    pub input: PathBuf,
}
