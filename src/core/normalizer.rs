// File: src/core/normalizer.rs
use crate::core::alphabet::{
    final_form, is_consonant, is_full_vowel, is_guttural, is_nikkud, is_reduced, is_vowel,
    DAGESH, HOLAM, KAMATZ, KAMATZ_KATAN, SHIN_DOT, SHVA, SIN_DOT,
};

/// Marks that are pulled to the front of a run, in this order.
const MARK_PRIORITY: [char; 4] = [SHIN_DOT, SIN_DOT, DAGESH, HOLAM];

/// One consonant and the run of marks written after it.
///
/// Marks that appear before the first consonant of a token form a syllable
/// of their own with no consonant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syllable<'a> {
    pub consonant: Option<char>,
    pub marks: &'a str,
    pub text: &'a str,
}

impl<'a> Syllable<'a> {
    /// The first vowel point of the run, if any.
    pub fn vowel(&self) -> Option<char> {
        self.marks.chars().find(|&c| is_vowel(c))
    }

    pub fn has_dagesh(&self) -> bool {
        self.marks.contains(DAGESH)
    }

    pub fn has_shva(&self) -> bool {
        self.vowel() == Some(SHVA)
    }

    pub fn has_full_vowel(&self) -> bool {
        self.vowel().is_some_and(is_full_vowel)
    }

    pub fn has_reduced_vowel(&self) -> bool {
        self.vowel().is_some_and(is_reduced)
    }

    pub fn is_guttural(&self) -> bool {
        self.consonant.is_some_and(is_guttural)
    }

    /// A syllable with no nikkud at all.
    pub fn is_bare(&self) -> bool {
        !self.marks.chars().any(is_nikkud)
    }
}

/// Splits a token into consonant + marks steps.
pub fn syllables(token: &str) -> Vec<Syllable<'_>> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut consonant = None;

    for (idx, c) in token.char_indices() {
        if is_consonant(c) {
            if idx > start || consonant.is_some() {
                result.push(make_syllable(token, start, idx, consonant));
            }
            start = idx;
            consonant = Some(c);
        }
    }
    if token.len() > start || consonant.is_some() {
        result.push(make_syllable(token, start, token.len(), consonant));
    }
    result
}

fn make_syllable(token: &str, start: usize, end: usize, consonant: Option<char>) -> Syllable<'_> {
    let text = &token[start..end];
    let marks = match consonant {
        Some(c) => &text[c.len_utf8()..],
        None => text,
    };
    Syllable { consonant, marks, text }
}

/// Canonicalises the order of the marks after every consonant: shin/sin dot,
/// then dagesh, then holam, then the remaining marks in their original
/// order. The alternate kamatz codepoint is replaced first.
///
/// The output is a normal form, so normalising twice changes nothing.
pub fn normalize(token: &str) -> String {
    let substituted: String = token
        .chars()
        .map(|c| if c == KAMATZ_KATAN { KAMATZ } else { c })
        .collect();

    let mut result = String::with_capacity(substituted.len());
    for syllable in syllables(&substituted) {
        if let Some(c) = syllable.consonant {
            result.push(c);
        }
        push_ordered_marks(syllable.marks, &mut result);
    }
    result
}

fn push_ordered_marks(marks: &str, out: &mut String) {
    let mut rest: Vec<char> = marks.chars().collect();
    for priority in MARK_PRIORITY {
        if let Some(pos) = rest.iter().position(|&c| c == priority) {
            out.push(rest.remove(pos));
        }
    }
    out.extend(rest);
}

pub fn has_nikkud(token: &str) -> bool {
    token.chars().any(is_nikkud)
}

/// Removes nikkud, leaving letters and punctuation.
pub fn strip_nikkud(token: &str) -> String {
    token.chars().filter(|&c| !is_nikkud(c)).collect()
}

/// Keeps only the consonants.
pub fn consonants_only(token: &str) -> String {
    token.chars().filter(|&c| is_consonant(c)).collect()
}

/// Naive Hebrew plural: the gemara's ־ין ending rewritten as ־ים.
/// Words without that ending come back unchanged.
pub fn hebrew_plural(word: &str) -> String {
    match word.strip_suffix('ן') {
        Some(stem) if stem.ends_with('י') => format!("{}ם", stem),
        _ => word.to_string(),
    }
}

/// Replaces a medial last letter with its final form.
pub fn to_final_form(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    if let Some(pos) = chars.iter().rposition(|&c| is_consonant(c)) {
        chars[pos] = final_form(chars[pos]);
    }
    chars.into_iter().collect()
}

/// Reversed, unpointed rendering for terminals without bidi support.
pub fn rtl_display(text: &str) -> String {
    strip_nikkud(text).chars().rev().collect()
}
