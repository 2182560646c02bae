//! Frame alignment between a learner's utterance and a reference, and the
//! lexicon that supplies phoneme sequences.

pub mod dictionary;
pub mod dtw;
pub mod templates;

pub use dictionary::PronunciationDictionary;
pub use dtw::{DtwComparator, DtwResult};
pub use templates::{partition_frames, project_regions, PhonemeRegion};
