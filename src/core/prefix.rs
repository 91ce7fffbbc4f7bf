// File: src/core/prefix.rs
//! Prefix rules: surface form, language applicability and the phonological
//! trigger each kind of prefix needs from the syllable after it.

use crate::core::alphabet::{
    is_consonant, reduced_correspondent, DAGESH, HATAF_KAMATZ, HATAF_PATAH, HIRIK, KAMATZ,
    NON_DOUBLING, PATAH, SEGOL, SHIN_DOT, SHVA, TSERE, VAV, VIRTUAL_DOUBLING, YOD,
};
use crate::core::normalizer::{normalize, syllables, Syllable};
use crate::core::types::LanguageScope;
use crate::error::{LinkerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixKind {
    Conjunction,
    Preposition,
    Min,
    Article,
    HebrewRelative,
    AramaicRelative,
    AramaicOn,
    AramaicInterrogative,
    AramaicIntensifier,
}

impl PrefixKind {
    /// Whether the prefix syllable agrees with the syllable that follows it.
    ///
    /// The conjunction's only constraint is positional and is enforced by the
    /// decomposer.
    pub fn admits(self, prefix: &Syllable<'_>, next: &Syllable<'_>) -> bool {
        let vowel = prefix.vowel();
        match self {
            PrefixKind::Conjunction
            | PrefixKind::AramaicRelative
            | PrefixKind::AramaicInterrogative
            | PrefixKind::AramaicIntensifier => true,
            PrefixKind::Preposition => preposition_agrees(vowel, next),
            PrefixKind::Min => match vowel {
                Some(TSERE) => next.is_guttural(),
                Some(HIRIK) => next.has_dagesh(),
                _ => false,
            },
            PrefixKind::Article => next.has_dagesh() || article_agrees(vowel, next),
            PrefixKind::HebrewRelative => next.has_dagesh() || next.is_guttural(),
            PrefixKind::AramaicOn => next.has_dagesh(),
        }
    }
}

fn preposition_agrees(vowel: Option<char>, next: &Syllable<'_>) -> bool {
    match vowel {
        Some(SHVA) => carries_full_vowel(next),
        Some(HIRIK) => {
            next.has_shva()
                || (next.consonant == Some(YOD) && matches!(next.vowel(), None | Some(HIRIK)))
        }
        Some(v) => {
            let before_reduced = next
                .vowel()
                .and_then(reduced_correspondent)
                .is_some_and(|full| full == v);
            // vowel of an absorbed definite article
            before_reduced || article_agrees(Some(v), next)
        }
        None => false,
    }
}

fn article_agrees(vowel: Option<char>, next: &Syllable<'_>) -> bool {
    let Some(c) = next.consonant else {
        return false;
    };
    match vowel {
        Some(PATAH) => next.has_dagesh() || VIRTUAL_DOUBLING.contains(c),
        Some(KAMATZ) => NON_DOUBLING.contains(c),
        Some(SEGOL) => "החע".contains(c) && matches!(next.vowel(), Some(KAMATZ | HATAF_KAMATZ)),
        _ => false,
    }
}

/// A full vowel, or a shuruk (vav with dagesh and no point).
fn carries_full_vowel(next: &Syllable<'_>) -> bool {
    next.has_full_vowel()
        || (next.consonant == Some(VAV) && next.has_dagesh() && next.vowel().is_none())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub form: String,
    pub consonant: char,
    pub kind: PrefixKind,
    pub scope: LanguageScope,
}

impl PrefixRule {
    fn new(form: &str, kind: PrefixKind, scope: LanguageScope) -> Result<Self> {
        let form = normalize(form);
        let parts = syllables(&form);
        let consonant = match parts.as_slice() {
            [single] => single.consonant,
            _ => None,
        }
        .ok_or_else(|| {
            LinkerError::PrefixTable(format!("'{}' must be exactly one consonant", form))
        })?;
        if parts[0].vowel().is_none() {
            return Err(LinkerError::PrefixTable(format!(
                "'{}' carries no vowel",
                form
            )));
        }
        Ok(Self { form, consonant, kind, scope })
    }
}

#[derive(Deserialize)]
struct RawTable {
    prefix: Vec<RawRule>,
}

#[derive(Deserialize)]
struct RawRule {
    form: String,
    kind: PrefixKind,
    scope: LanguageScope,
}

/// The table of prefix surface forms. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    rules: Vec<PrefixRule>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PrefixTable {
    /// The forms of Hebrew and Aramaic prefixes used across the Talmud.
    pub fn builtin() -> Self {
        use LanguageScope::{Aramaic, Both, Hebrew};
        use PrefixKind::*;

        let d = DAGESH;
        let rows: &[(char, &[char], PrefixKind, LanguageScope)] = &[
            ('ד', &[d, HIRIK], AramaicRelative, Aramaic),
            ('ד', &[d, SHVA], AramaicRelative, Aramaic),
            ('א', &[PATAH], AramaicOn, Aramaic),
            ('ה', &[HATAF_PATAH], AramaicInterrogative, Aramaic),
            ('ק', &[KAMATZ], AramaicIntensifier, Aramaic),
            ('ש', &[SHIN_DOT, SEGOL], HebrewRelative, Hebrew),
            ('ו', &[SHVA], Conjunction, Both),
            ('ו', &[d], Conjunction, Both),
            ('ו', &[KAMATZ], Conjunction, Both),
            ('ה', &[SEGOL], Article, Both),
            ('ה', &[KAMATZ], Article, Both),
            ('ה', &[PATAH], Article, Both),
            ('ל', &[SHVA], Preposition, Both),
            ('ל', &[KAMATZ], Preposition, Both),
            ('ל', &[PATAH], Preposition, Both),
            ('ל', &[HIRIK], Preposition, Both),
            ('ל', &[SEGOL], Preposition, Both),
            ('כ', &[KAMATZ], Preposition, Both),
            ('כ', &[SHVA], Preposition, Both),
            ('כ', &[HIRIK], Preposition, Both),
            ('כ', &[d, KAMATZ], Preposition, Both),
            ('כ', &[d, SHVA], Preposition, Both),
            ('כ', &[d, HIRIK], Preposition, Both),
            ('ב', &[HIRIK], Preposition, Both),
            ('ב', &[PATAH], Preposition, Both),
            ('ב', &[SHVA], Preposition, Both),
            ('ב', &[d, HIRIK], Preposition, Both),
            ('ב', &[d, KAMATZ], Preposition, Both),
            ('ב', &[d, SHVA], Preposition, Both),
            ('ב', &[d, PATAH], Preposition, Both),
            ('מ', &[TSERE], Min, Both),
            ('מ', &[HIRIK], Min, Both),
        ];

        let rules = rows
            .iter()
            .map(|(consonant, marks, kind, scope)| {
                let form: String = std::iter::once(*consonant).chain(marks.iter().copied()).collect();
                PrefixRule {
                    form: normalize(&form),
                    consonant: *consonant,
                    kind: *kind,
                    scope: *scope,
                }
            })
            .collect();
        Self { rules }
    }

    /// Parses a `[[prefix]]` TOML table. Any malformed row fails the whole load.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawTable = toml_edit::de::from_str(source)
            .map_err(|e| LinkerError::PrefixTable(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(raw.prefix.len());
        for (row, entry) in raw.prefix.into_iter().enumerate() {
            let rule = PrefixRule::new(&entry.form, entry.kind, entry.scope)
                .map_err(|e| LinkerError::PrefixTable(format!("row {}: {}", row + 1, e)))?;
            if !seen.insert((rule.form.clone(), rule.kind)) {
                return Err(LinkerError::PrefixTable(format!(
                    "row {}: duplicate form '{}'",
                    row + 1,
                    rule.form
                )));
            }
            rules.push(rule);
        }
        if rules.is_empty() {
            return Err(LinkerError::PrefixTable("table has no rows".to_string()));
        }
        Ok(Self { rules })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(LinkerError::PathIsDirectory(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn rules(&self) -> &[PrefixRule] {
        &self.rules
    }

    /// Rules whose surface form equals `form` and that apply within `scope`.
    pub fn matching<'a>(
        &'a self,
        form: &'a str,
        scope: LanguageScope,
    ) -> impl Iterator<Item = &'a PrefixRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.form == form && scope.includes(rule.scope))
    }

    /// Rules for a bare consonant, used when a token has no nikkud.
    pub fn matching_letter(
        &self,
        letter: char,
        scope: LanguageScope,
    ) -> impl Iterator<Item = &PrefixRule> + '_ {
        self.rules
            .iter()
            .filter(move |rule| rule.consonant == letter && scope.includes(rule.scope))
    }

    pub fn is_prefix_letter(&self, letter: char, scope: LanguageScope) -> bool {
        is_consonant(letter) && self.matching_letter(letter, scope).next().is_some()
    }
}
