use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::pronunciation::phonetics::canonical;
use crate::pronunciation::{PronunciationError, Result};

const RAW_LEXICON: &str = include_str!("../../../assets/phonemes/lexicon.txt");

static DEFAULT_DICTIONARY: Lazy<Result<PronunciationDictionary>> =
    Lazy::new(|| PronunciationDictionary::from_lexicon(RAW_LEXICON));

/// Word to ARPAbet pronunciations, plus the inverse map used to give
/// distractors real-word labels.
#[derive(Debug, Clone)]
pub struct PronunciationDictionary {
    entries: HashMap<String, Vec<Box<[&'static str]>>>,
    /// Stress-free phoneme key -> first word listed with that pronunciation.
    by_pronunciation: HashMap<String, String>,
}

pub type PronunciationVariants<'dict> = Vec<&'dict [&'static str]>;

impl PronunciationDictionary {
    /// Parse CMU-style lines: `WORD  PH1 PH2 ..`, `;` comments, and
    /// `WORD(2)` alternates.
    pub fn from_lexicon(data: &'static str) -> Result<Self> {
        let mut entries: HashMap<String, Vec<Box<[&'static str]>>> = HashMap::new();
        let mut by_pronunciation = HashMap::new();

        for (idx, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let raw_word = parts.next().ok_or_else(|| {
                PronunciationError::config(format!("lexicon line {idx} missing word column"))
            })?;
            let key = normalize_token(trim_variant(raw_word)).ok_or_else(|| {
                PronunciationError::config(format!(
                    "lexicon line {idx} produced empty normalization: {raw_word}"
                ))
            })?;

            let phonemes: Vec<&'static str> = parts.collect();
            if phonemes.is_empty() {
                return Err(PronunciationError::config(format!(
                    "lexicon line {idx} missing phoneme sequence for {raw_word}"
                )));
            }

            by_pronunciation
                .entry(pronunciation_key(&phonemes))
                .or_insert_with(|| key.to_ascii_lowercase());
            entries
                .entry(key)
                .or_default()
                .push(phonemes.into_boxed_slice());
        }

        if entries.is_empty() {
            return Err(PronunciationError::config(
                "pronunciation dictionary contained no entries",
            ));
        }

        Ok(Self {
            entries,
            by_pronunciation,
        })
    }

    /// The bundled lexicon, parsed once.
    pub fn shared() -> Result<&'static Self> {
        DEFAULT_DICTIONARY.as_ref().map_err(Clone::clone)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All known pronunciations of `token`.
    pub fn lookup<'dict>(&'dict self, token: &str) -> Result<PronunciationVariants<'dict>> {
        let normalized = normalize_token(token).ok_or_else(|| {
            PronunciationError::invalid_input(format!(
                "unable to normalize token \"{token}\" for pronunciation lookup"
            ))
        })?;

        let variants = self.entries.get(&normalized).ok_or_else(|| {
            PronunciationError::invalid_input(format!("no pronunciation for \"{token}\""))
        })?;

        Ok(variants.iter().map(|seq| seq.as_ref()).collect())
    }

    /// First listed pronunciation of `token` as owned symbols.
    pub fn primary(&self, token: &str) -> Result<Vec<String>> {
        let variants = self.lookup(token)?;
        let first = variants.first().ok_or_else(|| {
            PronunciationError::invalid_input(format!("no pronunciation for \"{token}\""))
        })?;
        Ok(first.iter().map(|p| p.to_string()).collect())
    }

    /// Word whose pronunciation matches `phonemes`, ignoring stress marks.
    pub fn reverse_lookup<S: AsRef<str>>(&self, phonemes: &[S]) -> Option<&str> {
        self.by_pronunciation
            .get(&pronunciation_key(phonemes))
            .map(String::as_str)
    }
}

/// Normalizes transcript tokens by removing punctuation and uppercasing.
pub fn normalize_token(token: &str) -> Option<String> {
    let normalized: String = token
        .chars()
        .filter_map(|ch| match ch {
            'A'..='Z' | '\'' => Some(ch),
            'a'..='z' => Some(ch.to_ascii_uppercase()),
            _ => None,
        })
        .collect();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn pronunciation_key<S: AsRef<str>>(phonemes: &[S]) -> String {
    phonemes
        .iter()
        .map(|p| canonical(p.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn trim_variant(raw_word: &str) -> &str {
    raw_word
        .split_once('(')
        .map(|(base, _)| base)
        .unwrap_or(raw_word)
}
