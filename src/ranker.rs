// File: src/ranker.rs
use crate::cache::ResultCache;
use crate::core::decomposer::Decomposer;
use crate::core::normalizer::{has_nikkud, normalize, strip_nikkud};
use crate::core::suffix::{strip_suffixes, SuffixKind};
use crate::core::types::{LanguageScope, WordClassification};
use crate::pos::prefer_tag;
use crate::resolver::RootResolver;
use crate::store::{DictionaryField, DictionaryStore, HebrewAnalysis, HebrewRootService, RootStore};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Headwords kept from the Hebrew tier of [`HeadwordRanker::smart_search`].
const SMART_HEBREW_LIMIT: usize = 3;

/// Headwords gathered so far, unique, in discovery order.
struct Headwords {
    found: Vec<String>,
    limit: usize,
}

impl Headwords {
    fn new(limit: usize) -> Self {
        Self { found: Vec::new(), limit }
    }

    /// Adds new headwords up to the limit. Returns true once full.
    fn extend(&mut self, headwords: impl IntoIterator<Item = String>) -> bool {
        for headword in headwords {
            if self.is_full() {
                break;
            }
            if !self.found.contains(&headword) {
                self.found.push(headword);
            }
        }
        self.is_full()
    }

    fn is_full(&self) -> bool {
        self.found.len() >= self.limit
    }
}

/// Links a word to dictionary headwords through a cascade of lookups:
/// headword field, full-forms field, Aramaic noun roots, Aramaic verb roots
/// and finally the Hebrew root service. Every tier runs over all the
/// decompositions of the word before the next tier starts. Pointed words
/// also try their suffix-stripped stems, after the prefix decompositions.
pub struct HeadwordRanker<'a> {
    decomposer: &'a Decomposer,
    dictionary: &'a dyn DictionaryStore,
    roots: RootResolver<'a>,
    hebrew: Option<&'a dyn HebrewRootService>,
    static_words: HashMap<String, String>,
}

impl<'a> HeadwordRanker<'a> {
    pub fn new(
        decomposer: &'a Decomposer,
        dictionary: &'a dyn DictionaryStore,
        verbs: &'a dyn RootStore,
        nouns: &'a dyn RootStore,
    ) -> Self {
        Self {
            decomposer,
            dictionary,
            roots: RootResolver::new(verbs, nouns),
            hebrew: None,
            static_words: HashMap::new(),
        }
    }

    pub fn with_hebrew_service(mut self, service: &'a dyn HebrewRootService) -> Self {
        self.hebrew = Some(service);
        self
    }

    /// Words that always link to one fixed headword, bypassing every tier.
    pub fn with_static_words(mut self, words: &BTreeMap<String, String>) -> Self {
        self.static_words = words
            .iter()
            .map(|(word, headword)| (normalize(word), headword.clone()))
            .collect();
        self
    }

    pub fn rank_headwords(&self, word: &str, n: usize, cache: &mut ResultCache) -> Vec<String> {
        self.rank_headwords_in(word, LanguageScope::Both, n, cache)
    }

    /// Ranks a tagged word, decomposing it with the prefixes of its language.
    /// A part-of-speech tag on the word puts the agreeing Hebrew analyses
    /// first.
    pub fn rank_classified(
        &self,
        word: &WordClassification,
        n: usize,
        cache: &mut ResultCache,
    ) -> Vec<String> {
        self.rank(word.forms.primary(), word.language.into(), word.pos.as_deref(), n, cache)
    }

    pub fn rank_headwords_in(
        &self,
        word: &str,
        scope: LanguageScope,
        n: usize,
        cache: &mut ResultCache,
    ) -> Vec<String> {
        self.rank(word, scope, None, n, cache)
    }

    fn rank(
        &self,
        word: &str,
        scope: LanguageScope,
        pos: Option<&str>,
        n: usize,
        cache: &mut ResultCache,
    ) -> Vec<String> {
        if n == 0 || word.is_empty() {
            return Vec::new();
        }
        if let Some(headword) = self.static_word(word) {
            return vec![headword];
        }
        let candidates = self.candidates(word, scope);
        let [headword_field, forms_field] = DictionaryField::pair_for(has_nikkud(word));
        let mut heads = Headwords::new(n);

        for (tier, field) in [("headword", headword_field), ("all_forms", forms_field)] {
            for candidate in &candidates {
                if heads.extend(self.lookup(field, candidate)) {
                    debug!(word, tier, "headwords complete");
                    return heads.found;
                }
            }
        }

        for candidate in &candidates {
            for root in self.roots.lookup_noun_root(candidate) {
                if self.match_root(&root, &mut heads) {
                    debug!(word, tier = "noun_root", "headwords complete");
                    return heads.found;
                }
            }
        }

        for candidate in &candidates {
            for (root, _binyan) in self.roots.lookup_verb_root(candidate) {
                if self.match_root(&root, &mut heads) {
                    debug!(word, tier = "verb_root", "headwords complete");
                    return heads.found;
                }
            }
        }

        if let Some(service) = self.hebrew {
            for candidate in &candidates {
                let mut analyses = hebrew_roots(service, candidate, cache);
                if let Some(tag) = pos {
                    analyses = prefer_tag(analyses, tag);
                }
                for analysis in analyses {
                    if self.match_root(&analysis.root, &mut heads) {
                        debug!(word, tier = "hebrew_root", "headwords complete");
                        return heads.found;
                    }
                }
            }
        }

        heads.found
    }

    /// An alternative strategy that trusts the first source with any answer
    /// instead of filling a quota:
    ///
    /// 1. the Aramaic decompositions in the dictionary, then through noun
    ///    roots, then through verb roots;
    /// 2. the Hebrew decompositions through the root service, keeping the
    ///    headwords reached most often;
    /// 3. step 1 again on the unpointed decompositions.
    pub fn smart_search(&self, word: &str, cache: &mut ResultCache) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }
        if let Some(headword) = self.static_word(word) {
            return vec![headword];
        }

        let aramaic = self.decomposer.candidate_forms(word, LanguageScope::Aramaic);
        let found = self.aramaic_lookup(&aramaic, has_nikkud(word));
        if !found.is_empty() {
            return found;
        }

        if let Some(service) = self.hebrew {
            let mut counts: Vec<(String, usize)> = Vec::new();
            for candidate in self.decomposer.candidate_forms(word, LanguageScope::Hebrew) {
                for analysis in hebrew_roots(service, &candidate, cache) {
                    for headword in self.lookup_pair(&analysis.root, has_nikkud(&analysis.root)) {
                        match counts.iter_mut().find(|(h, _)| *h == headword) {
                            Some((_, count)) => *count += 1,
                            None => counts.push((headword, 1)),
                        }
                    }
                }
            }
            if !counts.is_empty() {
                // stable: ties keep discovery order
                counts.sort_by(|a, b| b.1.cmp(&a.1));
                return counts
                    .into_iter()
                    .take(SMART_HEBREW_LIMIT)
                    .map(|(headword, _)| headword)
                    .collect();
            }
        }

        let unpointed: Vec<String> = aramaic.iter().map(|c| strip_nikkud(c)).collect();
        self.aramaic_lookup(&unpointed, false)
    }

    /// Dictionary, then noun roots, then verb roots; the first tier with any
    /// headword wins.
    fn aramaic_lookup(&self, candidates: &[String], voweled: bool) -> Vec<String> {
        let mut heads = Headwords::new(usize::MAX);
        for candidate in candidates {
            heads.extend(self.lookup_pair(candidate, voweled));
        }
        if !heads.found.is_empty() {
            return heads.found;
        }
        for candidate in candidates {
            for root in self.roots.lookup_noun_root(candidate) {
                heads.extend(self.lookup_pair(&root, voweled));
            }
        }
        if !heads.found.is_empty() {
            return heads.found;
        }
        for candidate in candidates {
            for (root, _binyan) in self.roots.lookup_verb_root(candidate) {
                heads.extend(self.lookup_pair(&root, voweled));
            }
        }
        heads.found
    }

    fn lookup_pair(&self, value: &str, voweled: bool) -> Vec<String> {
        DictionaryField::pair_for(voweled)
            .into_iter()
            .flat_map(|field| self.lookup(field, value))
            .collect()
    }

    fn static_word(&self, word: &str) -> Option<String> {
        self.static_words.get(&normalize(word)).cloned()
    }

    /// Prefix decompositions, then suffix stems of pointed candidates.
    fn candidates(&self, word: &str, scope: LanguageScope) -> Vec<String> {
        let mut candidates = self.decomposer.candidate_forms(word, scope);
        if has_nikkud(word) {
            let stems: Vec<String> = candidates
                .iter()
                .flat_map(|candidate| {
                    [SuffixKind::SingularPossessive, SuffixKind::PluralPossessive, SuffixKind::Object]
                        .into_iter()
                        .flat_map(move |kind| strip_suffixes(candidate, kind))
                })
                .collect();
            for stem in stems {
                if !candidates.contains(&stem) {
                    candidates.push(stem);
                }
            }
        }
        candidates
    }

    /// Headword field, then full-forms field, for a resolved root.
    fn match_root(&self, root: &str, heads: &mut Headwords) -> bool {
        DictionaryField::pair_for(has_nikkud(root))
            .into_iter()
            .any(|field| heads.extend(self.lookup(field, root)))
    }

    fn lookup(&self, field: DictionaryField, value: &str) -> Vec<String> {
        if value.is_empty() {
            return Vec::new();
        }
        match self.dictionary.find(field, value) {
            Ok(records) => records.into_iter().map(|r| r.headword).collect(),
            Err(e) => {
                warn!(?field, value, error = %e, "dictionary lookup failed");
                Vec::new()
            }
        }
    }
}

/// Cached service lookup. Failures are not cached.
fn hebrew_roots(
    service: &dyn HebrewRootService,
    word: &str,
    cache: &mut ResultCache,
) -> Vec<HebrewAnalysis> {
    if let Some(known) = cache.get(word) {
        return known.to_vec();
    }
    match service.hebrew_roots(word) {
        Ok(analyses) => {
            cache.record(word, analyses.clone());
            analyses
        }
        Err(e) => {
            warn!(word, error = %e, "hebrew root service failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{
        DictionaryRecord, MemoryDictionary, MemoryRootTable, MockDictionaryStore,
        MockHebrewRootService, MockRootStore, RootRecord,
    };
    use mockall::predicate::{always, eq};

    fn entry(headword: &str, forms: &[&str]) -> DictionaryRecord {
        DictionaryRecord {
            headword: headword.to_string(),
            all_forms: forms.iter().map(|f| f.to_string()).collect(),
            definition: serde_json::Value::Null,
        }
    }

    fn records(heads: &[&str]) -> Vec<DictionaryRecord> {
        heads.iter().map(|h| entry(h, &[])).collect()
    }

    fn noun(word: &str, root: &str) -> RootRecord {
        RootRecord {
            word: word.to_string(),
            root: root.to_string(),
            binyan: None,
        }
    }

    #[test]
    fn test_first_tier_fills_quota_alone() {
        let mut dictionary = MockDictionaryStore::new();
        dictionary
            .expect_find()
            .with(eq(DictionaryField::Unvoweled), always())
            .times(1)
            .returning(|_, _| Ok(records(&["אמר I", "אמר II", "אמרא"])));
        let mut verbs = MockRootStore::new();
        verbs.expect_find().times(0);
        let mut nouns = MockRootStore::new();
        nouns.expect_find().times(0);
        let mut service = MockHebrewRootService::new();
        service.expect_hebrew_roots().times(0);

        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &verbs, &nouns)
            .with_hebrew_service(&service);
        let heads = ranker.rank_headwords("אמר", 3, &mut ResultCache::new());
        assert_eq!(heads, vec!["אמר I", "אמר II", "אמרא"]);
    }

    #[test]
    fn test_tiers_in_order() {
        let dictionary = MemoryDictionary::new(vec![
            entry("בית", &[]),
            entry("ביתא", &["בית"]),
            entry("בי", &[]),
            entry("בית I", &[]),
        ]);
        let verbs = MemoryRootTable::default();
        let nouns = MemoryRootTable::new(vec![noun("בבית", "בי")]);
        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &verbs, &nouns);

        let heads = ranker.rank_headwords("ובבית", 3, &mut ResultCache::new());
        assert_eq!(heads, vec!["בית", "ביתא", "בי"]);

        let heads = ranker.rank_headwords("ובבית", 10, &mut ResultCache::new());
        assert_eq!(heads, vec!["בית", "ביתא", "בי"]);
        assert!(ranker.rank_headwords("ובבית", 0, &mut ResultCache::new()).is_empty());
    }

    #[test]
    fn test_failing_collaborators_fall_through() {
        let dictionary = MemoryDictionary::new(vec![entry("בַּיִת", &[])]);
        let mut verbs = MockRootStore::new();
        verbs
            .expect_find()
            .returning(|_, _| Err(StoreError::Unavailable("down".into())));
        let nouns = MemoryRootTable::default();
        let mut service = MockHebrewRootService::new();
        service
            .expect_hebrew_roots()
            .with(eq("בתים"))
            .times(1)
            .returning(|_| {
                Ok(vec![HebrewAnalysis {
                    root: "בַּיִת".to_string(),
                    part_of_speech: "noun".to_string(),
                }])
            });
        service
            .expect_hebrew_roots()
            .returning(|_| Err(StoreError::Status(503)));

        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &verbs, &nouns)
            .with_hebrew_service(&service);
        let mut cache = ResultCache::new();
        assert_eq!(ranker.rank_headwords("בתים", 3, &mut cache), vec!["בַּיִת"]);
        assert!(cache.contains("בתים"));
        assert!(!cache.contains("תים"));

        // second run is served from the cache
        assert_eq!(ranker.rank_headwords("בתים", 3, &mut cache), vec!["בַּיִת"]);
    }

    #[test]
    fn test_rank_classified_uses_language_scope() {
        use crate::core::types::{Language, WordForms};

        let dictionary = MemoryDictionary::new(vec![entry("אמר", &[])]);
        let roots = MemoryRootTable::default();
        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &roots, &roots);
        let mut cache = ResultCache::new();

        let aramaic = WordClassification::new(WordForms::new("", "דאמר", ""), Language::Aramaic, 0.1);
        assert_eq!(ranker.rank_classified(&aramaic, 3, &mut cache), vec!["אמר"]);

        let hebrew = WordClassification::new(WordForms::new("", "דאמר", ""), Language::RabbinicHebrew, 0.9);
        assert!(ranker.rank_classified(&hebrew, 3, &mut cache).is_empty());
    }

    fn hebrew(root: &str, part_of_speech: &str) -> HebrewAnalysis {
        HebrewAnalysis {
            root: root.to_string(),
            part_of_speech: part_of_speech.to_string(),
        }
    }

    #[test]
    fn test_static_words_bypass_tiers() {
        let mut dictionary = MockDictionaryStore::new();
        dictionary.expect_find().times(0);
        let roots = MemoryRootTable::default();
        let decomposer = Decomposer::default();
        let statics = BTreeMap::from([("מַאי".to_string(), "מַאי I".to_string())]);
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &roots, &roots)
            .with_static_words(&statics);
        let mut cache = ResultCache::new();
        assert_eq!(ranker.rank_headwords("מַאי", 3, &mut cache), vec!["מַאי I"]);
        assert_eq!(ranker.smart_search("מַאי", &mut cache), vec!["מַאי I"]);
    }

    #[test]
    fn test_pointed_suffix_stem_is_tried_last() {
        let dictionary = MemoryDictionary::new(vec![entry("בַּיְתָא", &["בַּיְת"])]);
        let roots = MemoryRootTable::default();
        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &roots, &roots);
        // בַּיְתֵיהּ: his house
        let word = "בַּיְתֵיהּ";
        assert_eq!(ranker.rank_headwords(word, 3, &mut ResultCache::new()), vec!["בַּיְתָא"]);
    }

    #[test]
    fn test_part_of_speech_orders_hebrew_tier() {
        use crate::core::types::{Language, WordForms};

        let dictionary = MemoryDictionary::new(vec![entry("ספר", &[]), entry("ספר II", &["סֵפֶר"])]);
        let roots = MemoryRootTable::default();
        let mut service = MockHebrewRootService::new();
        service
            .expect_hebrew_roots()
            .returning(|_| Ok(vec![hebrew("ספר", "פ' פיעל"), hebrew("סֵפֶר", "שֵם ז'")]));
        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &roots, &roots)
            .with_hebrew_service(&service);

        let mut word = WordClassification::new(WordForms::new("", "ספרים", ""), Language::RabbinicHebrew, 0.9);
        assert_eq!(ranker.rank_classified(&word, 1, &mut ResultCache::new()), vec!["ספר"]);
        word.pos = Some("NNS".to_string());
        assert_eq!(ranker.rank_classified(&word, 1, &mut ResultCache::new()), vec!["ספר II"]);
    }

    #[test]
    fn test_smart_search_stops_at_first_source() {
        let dictionary = MemoryDictionary::new(vec![entry("אמר", &[]), entry("מימרא", &[])]);
        let verbs = MemoryRootTable::new(vec![RootRecord {
            word: "אמר".to_string(),
            root: "מימרא".to_string(),
            binyan: Some("פעל".to_string()),
        }]);
        let nouns = MemoryRootTable::default();
        let mut service = MockHebrewRootService::new();
        service.expect_hebrew_roots().times(0);
        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &verbs, &nouns)
            .with_hebrew_service(&service);

        // found directly: the verb root is never consulted
        assert_eq!(ranker.smart_search("דאמר", &mut ResultCache::new()), vec!["אמר"]);
    }

    #[test]
    fn test_smart_search_counts_hebrew_headwords() {
        let dictionary = MemoryDictionary::new(vec![
            entry("שמר", &[]),
            entry("שמר II", &["שמר"]),
            entry("משמר", &[]),
        ]);
        let roots = MemoryRootTable::default();
        let mut service = MockHebrewRootService::new();
        service.expect_hebrew_roots().returning(|word| {
            Ok(match word {
                "ושמרו" => vec![hebrew("משמר", "")],
                _ => vec![hebrew("שמר", "")],
            })
        });
        let decomposer = Decomposer::default();
        let ranker = HeadwordRanker::new(&decomposer, &dictionary, &roots, &roots)
            .with_hebrew_service(&service);

        let heads = ranker.smart_search("ושמרו", &mut ResultCache::new());
        assert_eq!(heads, vec!["שמר", "שמר II", "משמר"]);
    }
}
