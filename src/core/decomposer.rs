// --- File: src/core/decomposer.rs
use crate::core::alphabet::is_phonetic_point;
use crate::core::normalizer::{has_nikkud, normalize, syllables, Syllable};
use crate::core::prefix::{PrefixKind, PrefixTable};
use crate::core::types::{Decomposition, LanguageScope};
use std::collections::HashSet;
use tracing::debug;

/// A strip must leave at least this many consonants behind.
const MIN_INNER_CONSONANTS: usize = 2;

/// Enumerates the prefix-stripped forms of a token.
///
/// Each pass scans the word one syllable at a time, tentatively detaching
/// every syllable that matches a prefix form of the requested scope, then
/// walks the detached stack from the innermost prefix outward and emits the
/// next-inner form whenever a prefix agrees with what follows it. Emitted
/// forms are queued in an arena and scanned in turn, so the result is closed
/// under further valid stripping.
#[derive(Debug, Clone, Default)]
pub struct Decomposer {
    table: PrefixTable,
}

impl Decomposer {
    pub fn new(table: PrefixTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PrefixTable {
        &self.table
    }

    /// Every candidate for `token`, the unstripped token first (exactly as
    /// given), then by increasing number of detached prefixes. Stripped forms
    /// are in normal mark order. Never empty.
    pub fn decompose(&self, token: &str, scope: LanguageScope) -> Vec<Decomposition> {
        let normalized = normalize(token);
        let mut arena = vec![Decomposition::whole(token)];
        if syllables(&normalized).len() < 2 {
            return arena;
        }

        let mut seen: HashSet<String> = HashSet::from([token.to_string(), normalized.clone()]);
        let mut cursor = 0;
        while cursor < arena.len() {
            let current = arena[cursor].clone();
            let scanned = if cursor == 0 { normalized.as_str() } else { current.inner.as_str() };
            cursor += 1;
            for (detached, inner) in self.valid_strips(scanned, scope) {
                if seen.insert(inner.clone()) {
                    let mut prefixes = current.prefixes.clone();
                    prefixes.extend(detached);
                    arena.push(Decomposition { inner, prefixes });
                }
            }
        }

        arena.sort_by_key(|d| d.prefixes.len());
        debug!(token = %token, candidates = arena.len(), "decomposed");
        arena
    }

    /// The inner forms only, in the same order as [`Decomposer::decompose`].
    pub fn candidate_forms(&self, token: &str, scope: LanguageScope) -> Vec<String> {
        self.decompose(token, scope)
            .into_iter()
            .map(|d| d.inner)
            .collect()
    }

    /// One scan-and-validate pass over `word`.
    fn valid_strips(&self, word: &str, scope: LanguageScope) -> Vec<(Vec<String>, String)> {
        let units = syllables(word);
        if units.first().map_or(true, |u| u.consonant.is_none()) {
            return Vec::new();
        }
        let bare = !has_nikkud(word);

        let mut stack: Vec<Vec<PrefixKind>> = Vec::new();
        while units.len() - stack.len() > MIN_INNER_CONSONANTS {
            let kinds = self.kinds_for(&units[stack.len()], scope, bare);
            if kinds.is_empty() {
                break;
            }
            stack.push(kinds);
        }

        let mut strips = Vec::new();
        for depth in (0..stack.len()).rev() {
            let prefix = &units[depth];
            let next = &units[depth + 1];
            let outermost = depth == 0;
            let valid = stack[depth].iter().any(|kind| match kind {
                PrefixKind::Conjunction => outermost,
                // no vowels to check against in an unpointed word
                _ if bare => true,
                other => other.admits(prefix, next),
            });
            if valid {
                let detached: Vec<String> = units[..=depth].iter().map(|u| u.text.to_string()).collect();
                let inner: String = units[depth + 1..].iter().map(|u| u.text).collect();
                strips.push((detached, inner));
            }
        }
        strips
    }

    fn kinds_for(&self, unit: &Syllable<'_>, scope: LanguageScope, bare: bool) -> Vec<PrefixKind> {
        let Some(consonant) = unit.consonant else {
            return Vec::new();
        };
        if bare {
            return self
                .table
                .matching_letter(consonant, scope)
                .map(|rule| rule.kind)
                .collect();
        }
        let pointed: String = std::iter::once(consonant)
            .chain(unit.marks.chars().filter(|&c| is_phonetic_point(c)))
            .collect();
        self.table
            .matching(&pointed, scope)
            .map(|rule| rule.kind)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alphabet::{DAGESH, HIRIK, KAMATZ, METEG, PATAH, SHVA, TSERE};

    fn s(parts: &[char]) -> String {
        parts.iter().collect()
    }

    fn forms(decomposer: &Decomposer, token: &str, scope: LanguageScope) -> Vec<String> {
        decomposer.candidate_forms(token, scope)
    }

    #[test]
    fn test_trivial_tokens() {
        let decomposer = Decomposer::default();
        assert_eq!(forms(&decomposer, "", LanguageScope::Both), vec![String::new()]);
        assert_eq!(forms(&decomposer, "ו", LanguageScope::Both), vec!["ו"]);
        let single = s(&['ב', SHVA]);
        assert_eq!(forms(&decomposer, &single, LanguageScope::Both), vec![single.clone()]);
        assert_eq!(forms(&decomposer, "!?", LanguageScope::Both), vec!["!?"]);
    }

    #[test]
    fn test_unpointed_conjunction_and_preposition() {
        let decomposer = Decomposer::default();
        let result = forms(&decomposer, "ובבית", LanguageScope::Hebrew);
        assert_eq!(result[0], "ובבית");
        assert!(result.contains(&"בבית".to_string()));
        assert!(result.contains(&"בית".to_string()));
        assert!(result.len() >= 3);
    }

    #[test]
    fn test_pointed_conjunction_and_preposition() {
        let decomposer = Decomposer::default();
        let bayit = s(&['ב', PATAH, 'י', HIRIK, 'ת']);
        let token = s(&['ו', DAGESH, 'ב', SHVA]) + &bayit;
        let result = decomposer.decompose(&token, LanguageScope::Hebrew);

        let inner: Vec<&str> = result.iter().map(|d| d.inner.as_str()).collect();
        assert_eq!(inner.len(), 3);
        assert_eq!(inner[0], token);
        assert!(inner.contains(&bayit.as_str()));

        let deepest = result.iter().find(|d| d.inner == bayit).unwrap();
        assert_eq!(deepest.prefixes, vec![s(&['ו', DAGESH]), s(&['ב', SHVA])]);
    }

    #[test]
    fn test_min_before_article() {
        let decomposer = Decomposer::default();
        let ir = s(&['ע', HIRIK, 'י', 'ר']);
        let ha_ir = s(&['ה', KAMATZ]) + &ir;
        let token = s(&['מ', TSERE]) + &ha_ir;
        let result = forms(&decomposer, &token, LanguageScope::Both);
        assert_eq!(result, vec![token, ha_ir, ir]);
    }

    #[test]
    fn test_scope_limits_prefixes() {
        let decomposer = Decomposer::default();
        let amar = s(&['א', KAMATZ, 'מ', PATAH, 'ר']);
        let token = s(&['ד', DAGESH, SHVA]) + &amar;
        assert_eq!(forms(&decomposer, &token, LanguageScope::Aramaic), vec![token.clone(), amar]);
        assert_eq!(forms(&decomposer, &token, LanguageScope::Hebrew), vec![token]);
    }

    #[test]
    fn test_prefix_without_agreement_is_kept() {
        let decomposer = Decomposer::default();
        // shva preposition before another shva is not a valid strip
        let token = s(&['ב', SHVA, 'ש', SHVA, 'ב', PATAH, 'ת']);
        assert_eq!(forms(&decomposer, &token, LanguageScope::Hebrew), vec![token]);
    }

    #[test]
    fn test_candidates_contain_original_and_are_closed() {
        let decomposer = Decomposer::default();
        let tokens = [
            "ובבית".to_string(),
            "ולהמבית".to_string(),
            s(&['ו', SHVA, 'ל', PATAH, 'ב', DAGESH, KAMATZ, 'י', 'ת']),
            s(&['ו', DAGESH, 'ב', SHVA, 'ב', PATAH, 'י', HIRIK, 'ת']),
        ];
        for scope in [LanguageScope::Hebrew, LanguageScope::Aramaic, LanguageScope::Both] {
            for token in &tokens {
                let all = forms(&decomposer, token, scope);
                assert_eq!(&all[0], token);
                for candidate in &all {
                    for further in forms(&decomposer, candidate, scope) {
                        assert!(all.contains(&further), "{} not closed", further);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unordered_marks_keep_original() {
        let decomposer = Decomposer::default();
        // patah typed before dagesh, as NFC orders them
        let token = s(&['ו', SHVA, 'ב', PATAH, DAGESH, 'י', 'ת']);
        assert_ne!(normalize(&token), token);
        let all = forms(&decomposer, &token, LanguageScope::Hebrew);
        assert_eq!(all[0], token);
        assert!(all.contains(&s(&['ב', DAGESH, PATAH, 'י', 'ת'])));
        assert_eq!(all.iter().filter(|f| f.starts_with('ו')).count(), 1);
    }

    #[test]
    fn test_meteg_does_not_block_prefix() {
        let decomposer = Decomposer::default();
        let bayit = s(&['ב', PATAH, 'י', HIRIK, 'ת']);
        let plain = s(&['ו', DAGESH, 'ב', SHVA]) + &bayit;
        let with_meteg = s(&['ו', DAGESH, METEG, 'ב', SHVA]) + &bayit;
        let result = forms(&decomposer, &with_meteg, LanguageScope::Hebrew);
        assert_eq!(result.len(), forms(&decomposer, &plain, LanguageScope::Hebrew).len());
        assert_eq!(result.len(), 3);
        assert!(result.contains(&bayit));
    }

    #[test]
    fn test_inner_conjunction_is_not_stripped() {
        let decomposer = Decomposer::default();
        // בְּוְ...: the conjunction would sit inside the preposition
        let tail = s(&['ב', PATAH, 'י', HIRIK, 'ת']);
        let inner_vav = s(&['ו', SHVA]) + &tail;
        let token = s(&['ב', SHVA]) + &inner_vav;
        let result = decomposer.decompose(&token, LanguageScope::Hebrew);
        assert!(result.iter().all(|d| d.inner != tail));
        assert!(result
            .iter()
            .all(|d| !d.prefixes.contains(&s(&['ו', SHVA]))));

        // outermost, the same conjunction comes off
        assert!(forms(&decomposer, &inner_vav, LanguageScope::Hebrew).contains(&tail));
    }
}
