// File: src/core/alphabet.rs
//! Static character classes for Hebrew and Aramaic text.

/// The consonants, including the five final forms.
pub const ALPHABET: &str = "אבגדהוזחטיכךלמםנןסעפףצץקרשת";

/// Letters that can open a word as a prefix in either language.
pub const PREFIX_LETTERS: &str = "אבדהוכלמקש";

pub const GUTTURALS: &str = "אחהער";

/// Gutturals that never take a dagesh and lengthen the preceding vowel.
pub const NON_DOUBLING: &str = "אער";

/// Gutturals with virtual doubling (the preceding vowel stays short).
pub const VIRTUAL_DOUBLING: &str = "הח";

pub const LABIALS: &str = "בומפ";

pub const YOD: char = 'י';
pub const VAV: char = 'ו';
pub const HE: char = 'ה';

pub const SHVA: char = '\u{05B0}';
pub const HATAF_SEGOL: char = '\u{05B1}';
pub const HATAF_PATAH: char = '\u{05B2}';
pub const HATAF_KAMATZ: char = '\u{05B3}';
pub const HIRIK: char = '\u{05B4}';
pub const TSERE: char = '\u{05B5}';
pub const SEGOL: char = '\u{05B6}';
pub const PATAH: char = '\u{05B7}';
pub const KAMATZ: char = '\u{05B8}';
pub const HOLAM: char = '\u{05B9}';
pub const HOLAM_HASER_FOR_VAV: char = '\u{05BA}';
pub const KUBUTZ: char = '\u{05BB}';
pub const DAGESH: char = '\u{05BC}';
pub const SHIN_DOT: char = '\u{05C1}';
pub const SIN_DOT: char = '\u{05C2}';
pub const METEG: char = '\u{05BD}';

/// Alternate encoding of the long kamatz, replaced system-wide.
pub const KAMATZ_KATAN: char = '\u{05C7}';

pub const GERESH: char = '׳';
pub const GERSHAYIM: char = '״';

/// Full (non-reduced) vowels.
/// Shuruk is written as vav + dagesh and has no point of its own.
pub const FULL_VOWELS: [char; 9] = [
    HIRIK,
    TSERE,
    SEGOL,
    PATAH,
    KAMATZ,
    HOLAM,
    HOLAM_HASER_FOR_VAV,
    KUBUTZ,
    KAMATZ_KATAN,
];

/// Reduced (hataf) vowels paired with the full vowel a prefix takes before them.
pub const REDUCED_CORRESPONDENCE: [(char, char); 3] = [
    (HATAF_SEGOL, SEGOL),
    (HATAF_PATAH, PATAH),
    (HATAF_KAMATZ, KAMATZ),
];

pub fn is_consonant(c: char) -> bool {
    ALPHABET.contains(c)
}

/// Points in the nikkud block, U+05B0 through U+05C7.
pub fn is_nikkud(c: char) -> bool {
    ('\u{05B0}'..='\u{05C7}').contains(&c)
}

/// Vowels, dagesh and the shin/sin dots. Cantillation-like marks such as
/// meteg, rafe and paseq are not.
pub fn is_phonetic_point(c: char) -> bool {
    is_vowel(c) || matches!(c, DAGESH | SHIN_DOT | SIN_DOT)
}

pub fn is_vowel(c: char) -> bool {
    c == SHVA || is_reduced(c) || FULL_VOWELS.contains(&c)
}

pub fn is_reduced(c: char) -> bool {
    matches!(c, HATAF_SEGOL | HATAF_PATAH | HATAF_KAMATZ)
}

pub fn is_full_vowel(c: char) -> bool {
    FULL_VOWELS.contains(&c)
}

pub fn is_guttural(c: char) -> bool {
    GUTTURALS.contains(c)
}

/// The vowel a prefix carries before the given reduced vowel.
pub fn reduced_correspondent(reduced: char) -> Option<char> {
    REDUCED_CORRESPONDENCE
        .iter()
        .find(|(r, _)| *r == reduced)
        .map(|(_, full)| *full)
}

/// Maps a medial letter to its final form.
pub fn final_form(c: char) -> char {
    match c {
        'כ' => 'ך',
        'מ' => 'ם',
        'נ' => 'ן',
        'פ' => 'ף',
        'צ' => 'ץ',
        other => other,
    }
}

/// Maps a final letter back to its medial form.
pub fn medial_form(c: char) -> char {
    match c {
        'ך' => 'כ',
        'ם' => 'מ',
        'ן' => 'נ',
        'ף' => 'פ',
        'ץ' => 'צ',
        other => other,
    }
}
