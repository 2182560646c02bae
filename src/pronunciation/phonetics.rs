//! ARPAbet symbol tables used across synthesis, scoring and distractor
//! generation.

use serde::Serialize;

/// Acoustic class of a phoneme, which decides both how the reference
/// synthesizer renders it and how the scorer judges it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonemeClass {
    Vowel,
    /// Fricatives and affricates: rendered as sustained noise.
    Fricative,
    /// Voiced stops, nasals and approximants.
    VoicedConsonant,
    /// P, T, K.
    UnvoicedStop,
}

/// Strip stress digits and uppercase: `ae1` -> `AE`.
pub fn canonical(phoneme: &str) -> String {
    phoneme
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .to_ascii_uppercase()
}

pub fn canonical_sequence<S: AsRef<str>>(phonemes: &[S]) -> Vec<String> {
    phonemes.iter().map(|p| canonical(p.as_ref())).collect()
}

pub fn classify(phoneme: &str) -> PhonemeClass {
    let symbol = canonical(phoneme);
    match symbol.as_str() {
        s if vowel_formants(s).is_some() => PhonemeClass::Vowel,
        "F" | "V" | "TH" | "DH" | "S" | "Z" | "SH" | "ZH" | "HH" | "CH" | "JH" => {
            PhonemeClass::Fricative
        }
        "P" | "T" | "K" => PhonemeClass::UnvoicedStop,
        _ => PhonemeClass::VoicedConsonant,
    }
}

pub fn is_vowel(phoneme: &str) -> bool {
    classify(phoneme) == PhonemeClass::Vowel
}

/// Adult (F1, F2, F3) targets in Hz.
pub fn vowel_formants(phoneme: &str) -> Option<[f32; 3]> {
    let formants = match canonical(phoneme).as_str() {
        "IY" => [270.0, 2290.0, 3010.0],
        "IH" => [390.0, 1990.0, 2550.0],
        "EH" => [530.0, 1840.0, 2480.0],
        "AE" => [660.0, 1720.0, 2410.0],
        "AH" | "AX" => [520.0, 1190.0, 2390.0],
        "AA" => [730.0, 1090.0, 2440.0],
        "AO" => [570.0, 840.0, 2410.0],
        "UH" => [440.0, 1020.0, 2240.0],
        "UW" => [300.0, 870.0, 2240.0],
        "ER" => [490.0, 1350.0, 1690.0],
        "EY" => [480.0, 2090.0, 2690.0],
        "AY" => [710.0, 1200.0, 2500.0],
        "OW" => [500.0, 900.0, 2400.0],
        "AW" => [700.0, 1250.0, 2500.0],
        "OY" => [570.0, 840.0, 2410.0],
        _ => return None,
    };
    Some(formants)
}

/// Vowels a young reader commonly confuses with `vowel`.
pub fn vowel_neighbors(vowel: &str) -> &'static [&'static str] {
    match canonical(vowel).as_str() {
        "IY" => &["IH", "EY"],
        "IH" => &["IY", "EH", "AH"],
        "EH" => &["IH", "AE", "EY"],
        "AE" => &["EH", "AH", "AA"],
        "AH" | "AX" => &["AE", "AA", "UH"],
        "AA" => &["AE", "AH", "AO"],
        "AO" => &["AA", "OW"],
        "UH" => &["UW", "AH"],
        "UW" => &["UH", "OW"],
        "ER" => &["AH", "EH"],
        "EY" => &["EH", "IY", "AY"],
        "AY" => &["AA", "EY"],
        "OW" => &["AO", "UW", "AH"],
        "AW" => &["AA", "OW"],
        "OY" => &["OW", "AO"],
        _ => &[],
    }
}

/// Consonants sharing voicing or place with `consonant`.
pub fn consonant_neighbors(consonant: &str) -> &'static [&'static str] {
    match canonical(consonant).as_str() {
        "B" => &["P", "D"],
        "P" => &["B", "T"],
        "D" => &["T", "B"],
        "T" => &["D", "K"],
        "G" => &["K", "D"],
        "K" => &["G", "T"],
        "F" => &["V", "TH"],
        "V" => &["F", "B"],
        "TH" => &["F", "S"],
        "DH" => &["D", "V"],
        "S" => &["Z", "SH"],
        "Z" => &["S"],
        "SH" => &["S", "CH"],
        "ZH" => &["SH", "Z"],
        "CH" => &["SH", "JH"],
        "JH" => &["CH", "D"],
        "M" => &["N", "B"],
        "N" => &["M", "NG"],
        "NG" => &["N"],
        "L" => &["R", "W"],
        "R" => &["W", "L"],
        "W" => &["R"],
        "Y" => &["L"],
        "HH" => &["F"],
        _ => &[],
    }
}

/// Phonics-style spelling used to label distractors missing from the lexicon.
pub fn spelling(phoneme: &str) -> &'static str {
    match canonical(phoneme).as_str() {
        "AA" => "o",
        "AE" => "a",
        "AH" | "AX" => "u",
        "AO" => "aw",
        "AW" => "ow",
        "AY" => "igh",
        "EH" => "e",
        "ER" => "er",
        "EY" => "ay",
        "IH" => "i",
        "IY" => "ee",
        "OW" => "oa",
        "OY" => "oy",
        "UH" => "oo",
        "UW" => "oo",
        "B" => "b",
        "CH" => "ch",
        "D" => "d",
        "DH" => "th",
        "F" => "f",
        "G" => "g",
        "HH" => "h",
        "JH" => "j",
        "K" => "k",
        "L" => "l",
        "M" => "m",
        "N" => "n",
        "NG" => "ng",
        "P" => "p",
        "R" => "r",
        "S" => "s",
        "SH" => "sh",
        "T" => "t",
        "TH" => "th",
        "V" => "v",
        "W" => "w",
        "Y" => "y",
        "Z" => "z",
        "ZH" => "zh",
        _ => "?",
    }
}

pub fn spell<S: AsRef<str>>(phonemes: &[S]) -> String {
    phonemes.iter().map(|p| spelling(p.as_ref())).collect()
}

/// Speaker age groups. Vocal-tract length and fundamental frequency both
/// change at these boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBracket {
    /// 5 and under.
    Preschool,
    /// 6 to 8.
    EarlyReader,
    /// 9 to 12.
    Preteen,
    /// 13 and over.
    Adult,
}

impl AgeBracket {
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=5 => Self::Preschool,
            6..=8 => Self::EarlyReader,
            9..=12 => Self::Preteen,
            _ => Self::Adult,
        }
    }

    /// Vocal tract length normalization factor relative to an adult.
    pub fn vtln_factor(self) -> f32 {
        match self {
            Self::Preschool => 1.30,
            Self::EarlyReader => 1.22,
            Self::Preteen => 1.15,
            Self::Adult => 1.0,
        }
    }

    pub fn fundamental_hz(self) -> f32 {
        match self {
            Self::Preschool | Self::EarlyReader => 300.0,
            Self::Preteen => 250.0,
            Self::Adult => 120.0,
        }
    }
}
