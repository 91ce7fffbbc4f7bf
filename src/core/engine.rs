// File: src/core/engine.rs
use crate::classifier::{ConstantClassifier, LanguageClassifier};
use crate::core::context::{is_valid_trigram, trigram_language, DisambiguationConfig, Disambiguator};
use crate::core::types::{
    Chunk, ChunkType, Language, SourceChunk, SourcePage, TaggedPage, WordClassification,
};
use crate::lexicon::ChunkSources;
use tracing::{debug, info, warn};

/// Probability and tag of a word left at the end of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarriedWord {
    pub language: Language,
    pub hebrew_probability: f64,
}

impl From<&WordClassification> for CarriedWord {
    fn from(word: &WordClassification) -> Self {
        Self {
            language: word.language,
            hebrew_probability: word.hebrew_probability,
        }
    }
}

/// The last two words of a gemara chunk that runs over onto the next page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCarry {
    pub second_to_last: CarriedWord,
    pub last: CarriedWord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub page: TaggedPage,
    /// State to hand to the next page, if this page ends mid-gemara.
    pub carry: Option<BoundaryCarry>,
    /// New tag for the last word of the previous page, when the carry could
    /// be re-evaluated.
    pub carried_resolution: Option<Language>,
}

/// Tags the words of aligned pages by language.
pub struct TaggingEngine {
    pub disambiguator: Disambiguator,
    classifier: Box<dyn LanguageClassifier>,
}

impl Default for TaggingEngine {
    fn default() -> Self {
        Self::new(DisambiguationConfig::default(), Box::new(ConstantClassifier(0.5)))
    }
}

impl TaggingEngine {
    pub fn new(config: DisambiguationConfig, classifier: Box<dyn LanguageClassifier>) -> Self {
        Self {
            disambiguator: Disambiguator::new(config),
            classifier,
        }
    }

    fn config(&self) -> &DisambiguationConfig {
        self.disambiguator.config()
    }

    /// Initial tagging followed, for gemara chunks, by disambiguation.
    pub fn tag_chunk(&self, chunk: &SourceChunk) -> Chunk {
        let sources = ChunkSources::from_chunk(chunk);
        if chunk.kind.is_mishna() {
            let words = chunk
                .text
                .iter()
                .map(|forms| {
                    let language = if sources.in_bible(forms) {
                        Language::BiblicalHebrew
                    } else {
                        Language::RabbinicHebrew
                    };
                    WordClassification::new(forms.clone(), language, 1.0)
                })
                .collect();
            return Chunk::new(chunk.kind, words);
        }

        let probabilities = self.probabilities(chunk);
        let config = self.config();
        let words = chunk
            .text
            .iter()
            .zip(probabilities)
            .map(|(forms, prob)| {
                let language = if sources.in_bible(forms) {
                    Language::BiblicalHebrew
                } else if sources.in_mishna(forms) || prob > config.high_confidence {
                    Language::RabbinicHebrew
                } else if prob < config.low_confidence {
                    Language::Aramaic
                } else {
                    Language::Unknown
                };
                WordClassification::new(forms.clone(), language, prob)
            })
            .collect();
        self.disambiguator
            .disambiguate(Chunk::new(chunk.kind, words), &sources)
    }

    /// Precomputed probabilities win when they cover every word.
    fn probabilities(&self, chunk: &SourceChunk) -> Vec<f64> {
        match &chunk.probs {
            Some(probs) if probs.len() == chunk.text.len() => probs.clone(),
            Some(probs) => {
                warn!(
                    expected = chunk.text.len(),
                    found = probs.len(),
                    "precomputed probabilities do not match chunk; using classifier"
                );
                self.classify(chunk)
            }
            None => self.classify(chunk),
        }
    }

    fn classify(&self, chunk: &SourceChunk) -> Vec<f64> {
        let words: Vec<&str> = chunk.text.iter().map(|f| f.primary()).collect();
        self.classifier.classify_all(&words)
    }

    pub fn tag_page(&self, page: &SourcePage, carry: Option<&BoundaryCarry>) -> PageOutcome {
        let content: Vec<Chunk> = page.content.iter().map(|c| self.tag_chunk(c)).collect();

        let carried_resolution = carry.and_then(|carry| self.resolve_carry(carry, &content));
        let carry = content
            .last()
            .filter(|chunk| chunk.kind == ChunkType::GemaraContinued && chunk.words.len() >= 2)
            .map(|chunk| {
                let n = chunk.words.len();
                BoundaryCarry {
                    second_to_last: (&chunk.words[n - 2]).into(),
                    last: (&chunk.words[n - 1]).into(),
                }
            });

        let unknown = content
            .iter()
            .flat_map(|c| &c.words)
            .filter(|w| w.language == Language::Unknown)
            .count();
        info!(page = %page.page, chunks = content.len(), unknown, "tagged page");

        PageOutcome {
            page: TaggedPage {
                page: page.page.clone(),
                content,
            },
            carry,
            carried_resolution,
        }
    }

    /// Re-scores the previous page's last word once the first word of its
    /// continuation is known.
    fn resolve_carry(&self, carry: &BoundaryCarry, content: &[Chunk]) -> Option<Language> {
        let first_chunk = content.first()?;
        if first_chunk.kind != ChunkType::GemaraContinued || carry.last.language.is_resolved() {
            return None;
        }
        let next = first_chunk.words.first()?;
        if !is_valid_trigram(carry.second_to_last.language, next.language) {
            return None;
        }
        let language = trigram_language(
            carry.second_to_last.hebrew_probability,
            carry.last.hebrew_probability,
            next.hebrew_probability,
            self.config(),
        );
        debug!(lang = %language.code(), "resolved word across page boundary");
        Some(language)
    }

    /// Tags consecutive pages, threading the boundary carry between them.
    pub fn tag_masekhet(&self, pages: &[SourcePage]) -> Vec<TaggedPage> {
        let mut tagged: Vec<TaggedPage> = Vec::with_capacity(pages.len());
        let mut carry = None;
        for page in pages {
            let outcome = self.tag_page(page, carry.as_ref());
            if let Some(language) = outcome.carried_resolution {
                if let Some(word) = tagged
                    .last_mut()
                    .and_then(|p| p.content.last_mut())
                    .and_then(|c| c.words.last_mut())
                {
                    word.language = language;
                }
            }
            carry = outcome.carry;
            tagged.push(outcome.page);
        }
        tagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WordForms;

    fn forms(word: &str) -> WordForms {
        WordForms::new(word, word, word)
    }

    fn source_chunk(kind: ChunkType, words: &[&str], probs: Option<Vec<f64>>) -> SourceChunk {
        SourceChunk {
            kind,
            text: words.iter().map(|w| forms(w)).collect(),
            bible: String::new(),
            mishna: String::new(),
            tosefta: String::new(),
            sifra: String::new(),
            sifrei: String::new(),
            probs,
        }
    }

    fn page(name: &str, content: Vec<SourceChunk>) -> SourcePage {
        SourcePage {
            page: name.to_string(),
            content,
        }
    }

    #[test]
    fn test_mishna_chunk() {
        let mut chunk = source_chunk(ChunkType::Mishna, &["שנאמר", "ואהבת"], None);
        chunk.bible = "ואהבת את ה׳".to_string();
        let tagged = TaggingEngine::default().tag_chunk(&chunk);
        assert_eq!(
            tagged.languages(),
            vec![Language::RabbinicHebrew, Language::BiblicalHebrew]
        );
    }

    #[test]
    fn test_gemara_initial_tagging() {
        let mut chunk = source_chunk(
            ChunkType::Gemara,
            &["כתיב", "אמר", "תנן", "ליה", "דברין"],
            Some(vec![0.5, 0.1, 0.9, 0.5, 0.5]),
        );
        chunk.bible = "כתיב".to_string();
        chunk.mishna = "דברים".to_string();
        let tagged = TaggingEngine::default().tag_chunk(&chunk);
        assert_eq!(
            tagged.languages(),
            vec![
                Language::BiblicalHebrew,
                Language::Aramaic,
                Language::RabbinicHebrew,
                // 0.9 and 0.5 around 0.5: score 1.3
                Language::RabbinicHebrew,
                Language::RabbinicHebrew,
            ]
        );
        assert_eq!(tagged.words[1].hebrew_probability, 0.1);
    }

    #[test]
    fn test_mismatched_probabilities_fall_back_to_classifier() {
        let chunk = source_chunk(ChunkType::Gemara, &["הא", "מני"], Some(vec![0.9]));
        let engine = TaggingEngine::new(DisambiguationConfig::default(), Box::new(ConstantClassifier(0.1)));
        let tagged = engine.tag_chunk(&chunk);
        assert_eq!(tagged.languages(), vec![Language::Aramaic, Language::Aramaic]);
    }

    #[test]
    fn test_carry_is_recorded_for_trailing_continuation() {
        let engine = TaggingEngine::default();
        let first = page(
            "2a",
            vec![source_chunk(ChunkType::GemaraContinued, &["אמר", "ליה"], Some(vec![0.1, 0.5]))],
        );
        let outcome = engine.tag_page(&first, None);
        let carry = outcome.carry.unwrap();
        assert_eq!(carry.last.language, Language::Unknown);
        assert_eq!(carry.second_to_last.language, Language::Aramaic);
        assert_eq!(outcome.carried_resolution, None);

        let ends_in_mishna = page("2b", vec![source_chunk(ChunkType::MishnaContinued, &["א", "ב"], None)]);
        assert!(engine.tag_page(&ends_in_mishna, None).carry.is_none());
    }

    #[test]
    fn test_masekhet_resolves_word_across_pages() {
        let engine = TaggingEngine::default();
        let pages = vec![
            page(
                "2a",
                vec![source_chunk(ChunkType::GemaraContinued, &["אמר", "ליה"], Some(vec![0.1, 0.5]))],
            ),
            page(
                "2b",
                vec![source_chunk(ChunkType::GemaraContinued, &["רבא", "הכי"], Some(vec![0.1, 0.1]))],
            ),
        ];
        let tagged = engine.tag_masekhet(&pages);
        // mean(0.1, 0.1) + 1.2 * 0.5 = 0.7
        assert_eq!(tagged[0].content[0].words[1].language, Language::Aramaic);
        assert_eq!(tagged[1].page, "2b");
    }

    #[test]
    fn test_carry_needs_continuation_on_next_page() {
        let engine = TaggingEngine::default();
        let carry = BoundaryCarry {
            second_to_last: CarriedWord { language: Language::Aramaic, hebrew_probability: 0.1 },
            last: CarriedWord { language: Language::Unknown, hebrew_probability: 0.5 },
        };
        let fresh = page("3a", vec![source_chunk(ChunkType::Gemara, &["רבא"], Some(vec![0.1]))]);
        assert_eq!(engine.tag_page(&fresh, Some(&carry)).carried_resolution, None);

        let biblical = {
            let mut chunk = source_chunk(ChunkType::GemaraContinued, &["כתיב"], Some(vec![0.1]));
            chunk.bible = "כתיב".to_string();
            page("3a", vec![chunk])
        };
        assert_eq!(engine.tag_page(&biblical, Some(&carry)).carried_resolution, None);
    }
}
