//! Memoized, fully processed reference renditions.
//!
//! Entries are keyed by the stress-free phoneme sequence and the speaker's
//! age bracket, which together determine the synthesized audio. The map is
//! unbounded: a long-running service scoring an open vocabulary should call
//! [`ReferenceCache::clear`] periodically.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::pronunciation::analyzer::PreparedUtterance;
use crate::pronunciation::phonetics::{canonical_sequence, AgeBracket};
use crate::pronunciation::Result;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    pub phonemes: Vec<String>,
    pub bracket: AgeBracket,
}

impl ReferenceKey {
    pub fn new<S: AsRef<str>>(phonemes: &[S], age: u32) -> Self {
        Self {
            phonemes: canonical_sequence(phonemes),
            bracket: AgeBracket::from_age(age),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: RwLock<HashMap<ReferenceKey, Arc<PreparedUtterance>>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ReferenceKey) -> Option<Arc<PreparedUtterance>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Return the cached entry for `key`, building it with `build` on a miss.
    ///
    /// `build` runs without the lock held, so two threads missing on the same
    /// key may both build; the first insert wins.
    pub fn get_or_try_insert<F>(&self, key: ReferenceKey, build: F) -> Result<Arc<PreparedUtterance>>
    where
        F: FnOnce() -> Result<PreparedUtterance>,
    {
        if let Some(hit) = self.get(&key) {
            trace!(phonemes = ?key.phonemes, "reference cache hit");
            return Ok(hit);
        }
        let built = Arc::new(build()?);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(key).or_insert(built).clone())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pronunciation::PronunciationError;

    #[test]
    fn key_ignores_stress_and_groups_ages() {
        assert_eq!(
            ReferenceKey::new(&["K", "AE1", "T"], 6),
            ReferenceKey::new(&["k", "AE", "T"], 8)
        );
        assert_ne!(
            ReferenceKey::new(&["K", "AE", "T"], 6),
            ReferenceKey::new(&["K", "AE", "T"], 10)
        );
    }

    #[test]
    fn failed_build_is_not_cached() {
        let cache = ReferenceCache::new();
        let key = ReferenceKey::new(&["AA"], 7);
        let result = cache.get_or_try_insert(key.clone(), || {
            Err(PronunciationError::new("synthesis failed"))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }
}
