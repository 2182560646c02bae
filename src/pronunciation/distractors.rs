//! "Shadow words": near misses of the target that a child might produce
//! instead. Scoring them alongside the target turns pass/fail into a small
//! closed-vocabulary recognition problem.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use crate::config::RecognitionConfig;
use crate::pronunciation::alignment::PronunciationDictionary;
use crate::pronunciation::phonetics::{
    self, canonical_sequence, consonant_neighbors, vowel_neighbors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShadowType {
    VowelSwap,
    ConsonantSwap,
    Deletion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowWord {
    pub word: String,
    pub phonemes: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ShadowType,
}

#[derive(Debug, Clone)]
pub struct DistractorGenerator {
    max_distractors: usize,
    seed: Option<u64>,
    dictionary: Option<&'static PronunciationDictionary>,
}

impl DistractorGenerator {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            max_distractors: config.max_distractors,
            seed: config.distractor_seed,
            dictionary: PronunciationDictionary::shared().ok(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Shuffled, truncated selection of shadow words for `phonemes`.
    pub fn generate<S: AsRef<str>>(&self, phonemes: &[S]) -> Vec<ShadowWord> {
        let mut candidates = self.candidates(phonemes);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        candidates.shuffle(&mut rng);
        candidates.truncate(self.max_distractors);
        debug!(
            target_len = phonemes.len(),
            selected = candidates.len(),
            "generated distractors"
        );
        candidates
    }

    /// Every single-edit neighbour, in generation order, without duplicates
    /// and without the target itself.
    pub fn candidates<S: AsRef<str>>(&self, phonemes: &[S]) -> Vec<ShadowWord> {
        let target = canonical_sequence(phonemes);
        let mut variants: Vec<(Vec<String>, ShadowType)> = Vec::new();

        for (index, symbol) in target.iter().enumerate() {
            if !phonetics::is_vowel(symbol) {
                continue;
            }
            for neighbor in vowel_neighbors(symbol) {
                variants.push((replaced(&target, index, neighbor), ShadowType::VowelSwap));
            }
        }

        let consonants: Vec<usize> = (0..target.len())
            .filter(|&i| !phonetics::is_vowel(&target[i]))
            .collect();
        let mut edges: Vec<usize> = consonants.first().into_iter().copied().collect();
        if let Some(&last) = consonants.last() {
            if edges.first() != Some(&last) {
                edges.push(last);
            }
        }
        for index in edges {
            for neighbor in consonant_neighbors(&target[index]) {
                variants.push((replaced(&target, index, neighbor), ShadowType::ConsonantSwap));
            }
        }

        if target.len() > 3 {
            let mut shortened = target.clone();
            shortened.remove(1);
            variants.push((shortened, ShadowType::Deletion));
        }

        let mut seen: Vec<&Vec<String>> = vec![&target];
        let mut unique = Vec::with_capacity(variants.len());
        for (sequence, kind) in &variants {
            if seen.contains(&sequence) {
                continue;
            }
            seen.push(sequence);
            unique.push(ShadowWord {
                word: self.label(sequence),
                phonemes: sequence.clone(),
                kind: *kind,
            });
        }
        unique
    }

    fn label(&self, phonemes: &[String]) -> String {
        self.dictionary
            .and_then(|dict| dict.reverse_lookup(phonemes))
            .map(str::to_string)
            .unwrap_or_else(|| phonetics::spell(phonemes))
    }
}

fn replaced(target: &[String], index: usize, symbol: &str) -> Vec<String> {
    let mut sequence = target.to_vec();
    sequence[index] = symbol.to_string();
    sequence
}
