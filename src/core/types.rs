// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Language tag of a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "A")]
    Aramaic,
    #[serde(rename = "R")]
    RabbinicHebrew,
    #[serde(rename = "B")]
    BiblicalHebrew,
    #[serde(rename = "U")]
    Unknown,
}

impl Language {
    pub fn code(self) -> char {
        match self {
            Language::Aramaic => 'A',
            Language::RabbinicHebrew => 'R',
            Language::BiblicalHebrew => 'B',
            Language::Unknown => 'U',
        }
    }

    pub fn is_resolved(self) -> bool {
        self != Language::Unknown
    }
}

/// Which language's prefixes a decomposition may strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageScope {
    Hebrew,
    Aramaic,
    #[default]
    Both,
}

impl LanguageScope {
    /// True when a rule declared for `rule_scope` may be used under `self`.
    pub fn includes(self, rule_scope: LanguageScope) -> bool {
        self == LanguageScope::Both || rule_scope == LanguageScope::Both || self == rule_scope
    }
}

impl From<Language> for LanguageScope {
    fn from(language: Language) -> Self {
        match language {
            Language::Aramaic => LanguageScope::Aramaic,
            Language::RabbinicHebrew | Language::BiblicalHebrew => LanguageScope::Hebrew,
            Language::Unknown => LanguageScope::Both,
        }
    }
}

/// Structural tag of a chunk: start of a mishna or gemara, or a
/// continuation of either across a page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkType {
    #[serde(rename = "m")]
    Mishna,
    #[serde(rename = "mc")]
    MishnaContinued,
    #[serde(rename = "g")]
    Gemara,
    #[serde(rename = "gc")]
    GemaraContinued,
}

impl ChunkType {
    pub fn is_mishna(self) -> bool {
        matches!(self, ChunkType::Mishna | ChunkType::MishnaContinued)
    }

    pub fn is_gemara(self) -> bool {
        !self.is_mishna()
    }

    pub fn is_continued(self) -> bool {
        matches!(self, ChunkType::MishnaContinued | ChunkType::GemaraContinued)
    }

    pub fn continued(self) -> Self {
        if self.is_mishna() {
            ChunkType::MishnaContinued
        } else {
            ChunkType::GemaraContinued
        }
    }

    pub fn base(self) -> Self {
        if self.is_mishna() {
            ChunkType::Mishna
        } else {
            ChunkType::Gemara
        }
    }
}

/// The three aligned spellings of one word: the pointed Sefaria text,
/// the Dicta maleh (full) spelling and the Dicta haser (defective) spelling.
/// Either Dicta variant may be empty when alignment failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WordForms(pub String, pub String, pub String);

impl WordForms {
    pub fn new(pointed: &str, maleh: &str, haser: &str) -> Self {
        Self(pointed.to_string(), maleh.to_string(), haser.to_string())
    }

    pub fn pointed(&self) -> &str {
        &self.0
    }

    pub fn maleh(&self) -> &str {
        &self.1
    }

    pub fn haser(&self) -> &str {
        &self.2
    }

    /// The form fed to the classifier: maleh, falling back to the pointed text.
    pub fn primary(&self) -> &str {
        if self.1.is_empty() {
            &self.0
        } else {
            &self.1
        }
    }

    /// The two surface variants checked against citation sets.
    pub fn surface_variants(&self) -> [&str; 2] {
        [&self.0, &self.1]
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.0, &self.1, &self.2]
    }
}

fn neutral_probability() -> f64 {
    0.5
}

/// A word's language tag together with the classifier's estimate that it
/// is Hebrew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordClassification {
    #[serde(rename = "word")]
    pub forms: WordForms,
    #[serde(rename = "lang")]
    pub language: Language,
    #[serde(rename = "prob", default = "neutral_probability")]
    pub hebrew_probability: f64,
    /// Part-of-speech tag from the Hebrew tagger, when one has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
}

impl WordClassification {
    pub fn new(forms: WordForms, language: Language, hebrew_probability: f64) -> Self {
        Self {
            forms,
            language,
            hebrew_probability: hebrew_probability.clamp(0.0, 1.0),
            pos: None,
        }
    }

    pub fn unknown(forms: WordForms, hebrew_probability: f64) -> Self {
        Self::new(forms, Language::Unknown, hebrew_probability)
    }
}

/// One structural unit of text with its per-word classifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(rename = "type")]
    pub kind: ChunkType,
    #[serde(rename = "text")]
    pub words: Vec<WordClassification>,
}

impl Chunk {
    pub fn new(kind: ChunkType, words: Vec<WordClassification>) -> Self {
        Self { kind, words }
    }

    pub fn languages(&self) -> Vec<Language> {
        self.words.iter().map(|w| w.language).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedPage {
    pub page: String,
    pub content: Vec<Chunk>,
}

/// An aligned chunk together with the texts Sefaria links to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceChunk {
    #[serde(rename = "type")]
    pub kind: ChunkType,
    pub text: Vec<WordForms>,
    #[serde(default)]
    pub bible: String,
    #[serde(default)]
    pub mishna: String,
    #[serde(default)]
    pub tosefta: String,
    #[serde(default)]
    pub sifra: String,
    #[serde(default)]
    pub sifrei: String,
    /// Precomputed classifier output, one value per word.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probs: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    pub page: String,
    pub content: Vec<SourceChunk>,
}

/// A token with zero or more leading prefixes detached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Decomposition {
    /// What remains after stripping: the root candidate.
    pub inner: String,
    /// Detached prefixes, outermost first.
    pub prefixes: Vec<String>,
}

impl Decomposition {
    pub fn whole(token: &str) -> Self {
        Self {
            inner: token.to_string(),
            prefixes: Vec::new(),
        }
    }
}
