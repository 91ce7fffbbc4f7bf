// File: src/resolver.rs
use crate::core::normalizer::has_nikkud;
use crate::store::{RootField, RootRecord, RootStore};
use tracing::warn;

/// Looks decomposed forms up in the Aramaic verb and noun root tables.
///
/// Pointed words are matched on the pointed field, bare words on the
/// unvoweled one. Store failures are logged and read as "no match".
pub struct RootResolver<'a> {
    verbs: &'a dyn RootStore,
    nouns: &'a dyn RootStore,
}

impl<'a> RootResolver<'a> {
    pub fn new(verbs: &'a dyn RootStore, nouns: &'a dyn RootStore) -> Self {
        Self { verbs, nouns }
    }

    /// Distinct `(root, binyan)` pairs, in first-seen order.
    pub fn lookup_verb_root(&self, inner_word: &str) -> Vec<(String, String)> {
        let mut roots: Vec<(String, String)> = Vec::new();
        for record in query(self.verbs, "verb", inner_word) {
            let pair = (record.root, record.binyan.unwrap_or_default());
            if !roots.contains(&pair) {
                roots.push(pair);
            }
        }
        roots
    }

    /// Distinct noun roots, in first-seen order.
    pub fn lookup_noun_root(&self, inner_word: &str) -> Vec<String> {
        let mut roots: Vec<String> = Vec::new();
        for record in query(self.nouns, "noun", inner_word) {
            if !roots.contains(&record.root) {
                roots.push(record.root);
            }
        }
        roots
    }
}

fn query(store: &dyn RootStore, table: &str, word: &str) -> Vec<RootRecord> {
    if word.is_empty() {
        return Vec::new();
    }
    let field = if has_nikkud(word) {
        RootField::Word
    } else {
        RootField::Unvoweled
    };
    store.find(field, word).unwrap_or_else(|e| {
        warn!(table, word, error = %e, "root lookup failed");
        Vec::new()
    })
}
