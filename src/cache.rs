// File: src/cache.rs
use crate::store::HebrewAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hebrew analyses recorded during one run, keyed by the looked-up token.
///
/// Owned by the caller and passed to the ranker explicitly; a snapshot can
/// be saved with [`crate::persistence::save_cache`] to seed a later run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultCache {
    entries: HashMap<String, Vec<HebrewAnalysis>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<&[HebrewAnalysis]> {
        self.entries.get(token).map(Vec::as_slice)
    }

    pub fn record(&mut self, token: &str, analyses: Vec<HebrewAnalysis>) {
        self.entries.insert(token.to_string(), analyses);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds every entry of `other` this cache does not have yet.
    pub fn merge(&mut self, other: ResultCache) {
        for (token, analyses) in other.entries {
            self.entries.entry(token).or_insert(analyses);
        }
    }
}
