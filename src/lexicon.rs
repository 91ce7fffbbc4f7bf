// File: src/lexicon.rs
//! Citation sets attached to one chunk: the verses it quotes, the mishna it
//! discusses and the Tannaitic parallels (Tosefta, Sifra, Sifrei).

use crate::core::alphabet::{is_consonant, is_nikkud};
use crate::core::normalizer::{hebrew_plural, normalize, strip_nikkud};
use crate::core::types::{SourceChunk, WordForms};
use std::collections::HashSet;

/// Whole-token lookup sets built from the raw citation strings of a chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkSources {
    bible: HashSet<String>,
    mishna: HashSet<String>,
    tannaitic: HashSet<String>,
}

impl ChunkSources {
    pub fn new(bible: &str, mishna: &str, tannaitic: &[&str]) -> Self {
        let mut sources = Self::default();
        for token in tokenize(bible) {
            insert_both(&mut sources.bible, &token);
        }
        for token in tokenize(mishna) {
            insert_both(&mut sources.mishna, &token);
        }
        for text in tannaitic {
            sources
                .tannaitic
                .extend(tokenize(text).iter().map(|t| strip_nikkud(t)));
        }
        sources
    }

    pub fn from_chunk(chunk: &SourceChunk) -> Self {
        Self::new(
            &chunk.bible,
            &chunk.mishna,
            &[&chunk.tosefta, &chunk.sifra, &chunk.sifrei],
        )
    }

    pub fn is_empty(&self) -> bool {
        self.bible.is_empty() && self.mishna.is_empty() && self.tannaitic.is_empty()
    }

    /// Either surface variant appears in a quoted verse.
    pub fn in_bible(&self, forms: &WordForms) -> bool {
        forms
            .surface_variants()
            .iter()
            .map(|w| clean(w))
            .any(|w| !w.is_empty() && self.bible.contains(&normalize(&w)))
    }

    /// Any form, or its naive plural, appears in the mishna text.
    pub fn in_mishna(&self, forms: &WordForms) -> bool {
        forms.all().iter().map(|w| clean(w)).any(|w| {
            !w.is_empty()
                && (self.mishna.contains(&normalize(&w))
                    || self.mishna.contains(&normalize(&hebrew_plural(&w))))
        })
    }

    /// Any form, or its naive plural, appears in a Tannaitic parallel.
    /// Compared without nikkud.
    pub fn in_tannaitic(&self, forms: &WordForms) -> bool {
        forms.all().iter().map(|w| strip_nikkud(&clean(w))).any(|w| {
            !w.is_empty() && (self.tannaitic.contains(&w) || self.tannaitic.contains(&hebrew_plural(&w)))
        })
    }
}

fn insert_both(set: &mut HashSet<String>, token: &str) {
    set.insert(normalize(token));
    set.insert(strip_nikkud(token));
}

/// Letters and nikkud only. Citation words and looked-up words both pass
/// through here, so geresh and punctuation never decide membership.
fn clean(word: &str) -> String {
    word.chars()
        .filter(|&c| is_consonant(c) || is_nikkud(c))
        .collect()
}

/// Splits citation text into words, dropping punctuation and cantillation.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == '־')
        .map(clean)
        .filter(|t| !t.is_empty())
        .collect()
}
