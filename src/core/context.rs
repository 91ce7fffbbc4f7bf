// File: src/core/context.rs
use crate::core::types::{Chunk, Language, WordClassification};
use crate::lexicon::ChunkSources;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds of the language tagger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisambiguationConfig {
    /// Weight of the current word's own probability in the trigram score.
    pub weight: f64,
    /// Half-width of the undecided band around 1.0.
    pub boundary: f64,
    /// Classifier probability above which a gemara word is tagged Hebrew outright.
    pub high_confidence: f64,
    /// Classifier probability below which a gemara word is tagged Aramaic outright.
    pub low_confidence: f64,
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            weight: 1.2,
            boundary: 0.1,
            high_confidence: 0.8,
            low_confidence: 0.2,
        }
    }
}

/// Scores within this distance of a band edge count as on the edge.
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// `mean(prev, next) + weight * curr`, where every argument is P(Hebrew).
/// Non-decreasing in `curr`.
pub fn trigram_score(prev: f64, curr: f64, next: f64, weight: f64) -> f64 {
    (prev + next) / 2.0 + weight * curr
}

/// Aramaic strictly below `1 - boundary`, Rabbinic Hebrew strictly above
/// `1 + boundary`, Unknown otherwise (including both edges, up to
/// [`BOUNDARY_EPSILON`] of rounding).
pub fn trigram_language(prev: f64, curr: f64, next: f64, config: &DisambiguationConfig) -> Language {
    let score = trigram_score(prev, curr, next, config.weight);
    if score < 1.0 - config.boundary - BOUNDARY_EPSILON {
        Language::Aramaic
    } else if score > 1.0 + config.boundary + BOUNDARY_EPSILON {
        Language::RabbinicHebrew
    } else {
        Language::Unknown
    }
}

/// Trigram smoothing only applies when no neighbour is already Biblical.
pub fn is_valid_trigram(prev: Language, next: Language) -> bool {
    prev != Language::BiblicalHebrew && next != Language::BiblicalHebrew
}

/// Resolves the Unknown words of a gemara chunk from citation membership
/// and the probabilities of their neighbours.
#[derive(Debug, Clone, Default)]
pub struct Disambiguator {
    config: DisambiguationConfig,
}

impl Disambiguator {
    pub fn new(config: DisambiguationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisambiguationConfig {
        &self.config
    }

    /// Words that already carry a tag are left alone. Runs left to right,
    /// so a word resolved here is visible as a neighbour to the next one.
    pub fn disambiguate(&self, mut chunk: Chunk, sources: &ChunkSources) -> Chunk {
        let words = &mut chunk.words;
        for i in 0..words.len() {
            if words[i].language.is_resolved() {
                continue;
            }
            let resolved = self.resolve(words, i, sources);
            if resolved.is_resolved() {
                debug!(position = i, word = %words[i].forms.primary(), lang = %resolved.code(), "disambiguated");
            }
            words[i].language = resolved;
        }
        chunk
    }

    fn resolve(&self, words: &[WordClassification], i: usize, sources: &ChunkSources) -> Language {
        let word = &words[i];
        if sources.in_bible(&word.forms) {
            return Language::BiblicalHebrew;
        }
        if sources.in_tannaitic(&word.forms) {
            return Language::RabbinicHebrew;
        }
        let (Some(prev), Some(next)) = (i.checked_sub(1).map(|p| &words[p]), words.get(i + 1)) else {
            return Language::Unknown;
        };
        if prev.language == Language::BiblicalHebrew && next.language == Language::BiblicalHebrew {
            return Language::BiblicalHebrew;
        }
        if is_valid_trigram(prev.language, next.language) {
            return trigram_language(
                prev.hebrew_probability,
                word.hebrew_probability,
                next.hebrew_probability,
                &self.config,
            );
        }
        Language::Unknown
    }
}
