// File: src/core/suffix.rs
//! Aramaic pronominal suffixes: possessives on nouns and direct objects on
//! verbs, with generation and stripping, plus the hitpael/nitpael respelling.

use crate::core::alphabet::{medial_form, DAGESH, HIRIK, HOLAM, KAMATZ, PATAH, SHVA, TSERE};
use crate::core::normalizer::{consonants_only, has_nikkud, normalize, strip_nikkud, to_final_form};

/// A stem left by suffix stripping keeps at least this many consonants.
const MIN_STEM_CONSONANTS: usize = 2;

/// Which table a suffix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixKind {
    /// Possessive on a singular noun.
    SingularPossessive,
    /// Possessive on a plural noun.
    PluralPossessive,
    /// Direct object on a verb.
    Object,
}

fn s(parts: &[char]) -> String {
    parts.iter().collect()
}

fn dedup(suffixes: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(suffixes.len());
    for suffix in suffixes {
        if !out.contains(&suffix) {
            out.push(suffix);
        }
    }
    out
}

/// Suffixes of the given table in person order (1s, 2ms, 2fs, 3ms, 3fs,
/// 1p, 2mp, 2fp, 3mp, 3fp). A leading vowel belongs to the stem's last
/// consonant.
pub fn suffixes(kind: SuffixKind) -> Vec<String> {
    let table = match kind {
        SuffixKind::SingularPossessive => vec![
            s(&[PATAH, 'י']),
            s(&[PATAH, 'א', 'י']),
            s(&[KAMATZ, 'ך', SHVA]),
            s(&[HIRIK, 'י', 'ך', SHVA]),
            s(&[TSERE, 'י', 'ה', DAGESH]),
            s(&[PATAH, 'ה', DAGESH]),
            s(&[PATAH, 'ן']),
            s(&[HIRIK, 'י', 'ן']),
            s(&['כ', 'ו', HOLAM, 'ן']),
            s(&['כ', 'ו', DAGESH]),
            s(&['כ', HIRIK, 'י']),
            s(&['כ', TSERE, 'י', 'ן']),
            s(&['ה', 'ו', HOLAM, 'ן']),
            s(&['ה', 'ו', DAGESH]),
            s(&['ה', HIRIK, 'י']),
            s(&['ה', TSERE, 'י', 'ן']),
        ],
        SuffixKind::PluralPossessive => vec![
            s(&[PATAH, 'א', 'י']),
            s(&[PATAH, 'י', 'ך', SHVA]),
            s(&[HIRIK, 'י', 'ך', SHVA]),
            s(&[PATAH, 'י', SHVA, 'י', 'כ', HIRIK, 'י']),
            s(&[TSERE, 'י', 'ה', DAGESH]),
            s(&['ה', HIRIK, 'י']),
            s(&[PATAH, 'ה', KAMATZ, 'א']),
            s(&[HIRIK, 'י', 'ן']),
            s(&[PATAH, 'י', SHVA, 'י', 'כ', HIRIK, 'ו', DAGESH]),
            s(&[PATAH, 'י', SHVA, 'י', 'כ', HIRIK, 'י']),
            s(&[PATAH, 'י', SHVA, 'י', 'ה', 'ו', HOLAM, 'ן']),
            s(&[PATAH, 'י', SHVA, 'י', 'ה', 'ו', DAGESH]),
            s(&[PATAH, 'י', SHVA, 'י', 'ה', HIRIK, 'י']),
        ],
        SuffixKind::Object => vec![
            s(&[PATAH, 'ן']),
            s(&[PATAH, 'נ', HIRIK, 'י']),
            s(&[KAMATZ, 'ך', SHVA]),
            s(&[HIRIK, 'י', 'ך', SHVA]),
            s(&[TSERE, 'י', 'ה', DAGESH]),
            s(&[PATAH, 'ה', DAGESH]),
            s(&[PATAH, 'ן']),
            s(&[HIRIK, 'י', 'נ', DAGESH, PATAH, 'ן']),
            s(&['כ', 'ו', HOLAM, 'ן']),
            s(&[HIRIK, 'נ', SHVA, 'ה', 'ו', DAGESH]),
            s(&[HIRIK, 'י', 'נ', DAGESH, 'ו', DAGESH, 'ן']),
            s(&[HIRIK, 'נ', SHVA, 'ה', HIRIK, 'י']),
            s(&[HIRIK, 'י', 'נ', DAGESH, HIRIK, 'י', 'ן']),
        ],
    };
    dedup(table)
}

/// Both possessive tables, singular first, without repeats.
pub fn possessive_suffixes() -> Vec<String> {
    let mut all = suffixes(SuffixKind::SingularPossessive);
    all.extend(suffixes(SuffixKind::PluralPossessive));
    dedup(all)
}

/// A pointed verb with every direct-object suffix attached. A final letter
/// at the end of the verb takes its medial form first.
pub fn add_object_suffixes(verb: &str) -> Vec<String> {
    let stem: String = verb.chars().map(medial_form).collect();
    suffixes(SuffixKind::Object)
        .iter()
        .map(|suffix| normalize(&format!("{}{}", stem, suffix)))
        .collect()
}

/// Stems left after removing one suffix of the given kind, longest suffix
/// first. Pointed words match pointed suffixes; unpointed words match the
/// suffix letters. The stem's last letter takes its final form.
pub fn strip_suffixes(word: &str, kind: SuffixKind) -> Vec<String> {
    let pointed = has_nikkud(word);
    let word = if pointed { normalize(word) } else { word.to_string() };

    let mut table: Vec<String> = suffixes(kind)
        .into_iter()
        .map(|suffix| if pointed { normalize(&suffix) } else { strip_nikkud(&suffix) })
        .filter(|suffix| !suffix.is_empty())
        .collect();
    table.sort_by_key(|suffix| std::cmp::Reverse(suffix.chars().count()));

    let mut stems: Vec<String> = Vec::new();
    for suffix in &table {
        let Some(stem) = word.strip_suffix(suffix.as_str()) else {
            continue;
        };
        if consonants_only(stem).chars().count() < MIN_STEM_CONSONANTS {
            continue;
        }
        let stem = to_final_form(stem);
        if !stems.contains(&stem) {
            stems.push(stem);
        }
    }
    stems
}

fn respell(word: &str, from: char, to: char) -> String {
    let pointed = s(&[from, HIRIK, 'ת', SHVA]);
    let bare = s(&[from, 'ת']);
    if word.starts_with(&pointed) || word.starts_with(&bare) {
        let mut out = String::with_capacity(word.len());
        out.push(to);
        out.extend(word.chars().skip(1));
        out
    } else {
        word.to_string()
    }
}

/// Rewrites a nitpael form (נִתְ־) as the hitpael (הִתְ־) the Hebrew
/// tools know. Anything else is returned unchanged.
pub fn to_hitpael(word: &str) -> String {
    respell(word, 'נ', 'ה')
}

/// The inverse of [`to_hitpael`].
pub fn to_nitpael(word: &str) -> String {
    respell(word, 'ה', 'נ')
}
