// File: src/pos.rs
//! Part-of-speech tagging of the Rabbinic Hebrew words through an external
//! morphological tagger that answers with a YAP-style lattice.

use crate::core::alphabet::GERESH;
use crate::core::normalizer::{consonants_only, hebrew_plural};
use crate::core::suffix::to_hitpael;
use crate::core::types::{Language, TaggedPage, WordClassification};
use crate::error::StoreError;
use crate::store::HebrewAnalysis;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Stands in for every word the tagger should not see.
pub const PLACEHOLDER: &str = ".";

/// INDEX, INDEX+1, TOKEN, LEMMA, CPOS, POS, FEATURES, TOKEN_INDEX.
const LATTICE_FIELDS: usize = 8;
const POS_FIELD: usize = 4;

const VERB_TAGS: &[&str] = &["VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "MD", "VB-M"];
const NOUN_TAGS: &[&str] = &["NN", "NNS", "NNP", "NNPS", "NNG", "NNGT", "NNT"];

/// Tags a phrase, one tag per input word.
#[cfg_attr(test, mockall::automock)]
pub trait PosTagger {
    fn tag(&self, words: &[String]) -> Result<Vec<String>, StoreError>;
}

/// Reads the tag of each input token from a morphological lattice. A token
/// split into several morphemes (prefixes first) takes the tag of its last
/// morpheme.
pub fn parse_lattice(lattice: &str) -> Result<Vec<String>, StoreError> {
    let mut tags: Vec<String> = Vec::new();
    let mut current: Option<&str> = None;
    for line in lattice.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() == 1 {
            continue;
        }
        if fields.len() < LATTICE_FIELDS {
            return Err(StoreError::Malformed(format!("lattice line '{}'", line)));
        }
        let pos = fields[POS_FIELD];
        let token = fields[fields.len() - 1];
        match tags.last_mut() {
            Some(last) if current == Some(token) => *last = pos.to_string(),
            _ => {
                current = Some(token);
                tags.push(pos.to_string());
            }
        }
    }
    Ok(tags)
}

/// The phrase sent to the tagger: the consonants of each Rabbinic Hebrew
/// word, respelled as hitpael and pluralised the Hebrew way, with every
/// other word (and any abbreviation) replaced by [`PLACEHOLDER`].
pub fn prepare_phrase(words: &[WordClassification]) -> Vec<String> {
    words
        .iter()
        .map(|word| {
            let form = hebrew_plural(&to_hitpael(word.forms.primary()));
            if word.language == Language::RabbinicHebrew && !form.contains(GERESH) {
                consonants_only(&form)
            } else {
                PLACEHOLDER.to_string()
            }
        })
        .collect()
}

fn assign(words: &mut [WordClassification], tags: &[String]) {
    for (word, tag) in words.iter_mut().zip(tags) {
        word.pos = Some(tag.clone());
    }
}

/// Tags every chunk of a tractate in place. A continued chunk whose last
/// word is Hebrew is tagged again together with the chunk that follows, so
/// a phrase cut by the page break is seen whole. Chunks whose tagging fails
/// are left untagged. Returns the number of chunks tagged.
pub fn tag_parts_of_speech(tagger: &dyn PosTagger, pages: &mut [TaggedPage]) -> usize {
    let mut pending: Option<(usize, usize)> = None;
    let mut tagged = 0;

    for p in 0..pages.len() {
        for c in 0..pages[p].content.len() {
            let mut words: Vec<WordClassification> = Vec::new();
            if let Some((pp, pc)) = pending {
                words.extend(pages[pp].content[pc].words.iter().cloned());
            }
            let carried = words.len();
            words.extend(pages[p].content[c].words.iter().cloned());

            let phrase = prepare_phrase(&words);
            if phrase.is_empty() {
                pending = None;
                continue;
            }
            match tagger.tag(&phrase) {
                Ok(tags) if tags.len() == phrase.len() => {
                    let (before, current) = tags.split_at(carried);
                    if let Some((pp, pc)) = pending {
                        assign(&mut pages[pp].content[pc].words, before);
                    }
                    assign(&mut pages[p].content[c].words, current);
                    tagged += 1;
                }
                Ok(tags) => warn!(
                    page = %pages[p].page,
                    chunk = c,
                    expected = phrase.len(),
                    got = tags.len(),
                    "tag count mismatch, chunk left untagged"
                ),
                Err(e) => warn!(page = %pages[p].page, chunk = c, error = %e, "pos tagger failed"),
            }

            let joins_next = pending.is_none()
                && pages[p].content[c].kind.is_continued()
                && phrase.last().is_some_and(|w| w != PLACEHOLDER);
            pending = joins_next.then_some((p, c));
        }
        info!(page = %pages[p].page, "pos tagged page");
    }
    tagged
}

/// Lattice tags compatible with a dictionary part of speech. `None` when the
/// part of speech says nothing (empty or unrecognised).
pub fn lattice_tags_for(part_of_speech: &str) -> Option<&'static [&'static str]> {
    let tags: &'static [&'static str] = match part_of_speech {
        "תואר" => &["JJ", "JJR", "JJS", "JJT"],
        "תואר הפועל" => &["RB", "RBR", "RBS"],
        "מילת קישור" => &["CC", "IN"],
        "מילת קריאה" => &["UH"],
        "מילת שאלה" => &["HAM", "QW", "WDT"],
        "תחילית" => &["Prefix"],
        "שֵם ז'" => NOUN_TAGS,
        "שֵם נ'" => &["NN", "NNS", "NNP", "NNPS"],
        "מספר מונה" | "מספר סודר" => &["CDT", "CD"],
        "מילת יחס" => &["IN"],
        "כינוי נפרד" => &["PRP", "PRP$"],
        "שֵם כמות" => &["MOD"],
        "פ' קל" | "פ' פיעל" | "פ' הפעיל" | "פ' התפעל" | "פ' נפעל" | "פ' פועל" | "פ' הופעל" => {
            VERB_TAGS
        }
        _ => return None,
    };
    Some(tags)
}

/// Whether an analysis can carry the given lattice tag. Parts of speech
/// with no known tags agree with everything.
pub fn pos_agrees(part_of_speech: &str, tag: &str) -> bool {
    lattice_tags_for(part_of_speech).map_or(true, |tags| tags.contains(&tag))
}

/// Moves the analyses that agree with `tag` to the front, keeping order.
pub fn prefer_tag(analyses: Vec<HebrewAnalysis>, tag: &str) -> Vec<HebrewAnalysis> {
    let (mut agreeing, rest): (Vec<_>, Vec<_>) = analyses
        .into_iter()
        .partition(|a| pos_agrees(&a.part_of_speech, tag));
    agreeing.extend(rest);
    agreeing
}

#[derive(Debug, Deserialize)]
struct LatticeResponse {
    md_lattice: String,
}

/// Blocking client for a YAP `joint` endpoint.
pub struct YapTagger {
    client: reqwest::blocking::Client,
    url: String,
}

impl YapTagger {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl PosTagger for YapTagger {
    fn tag(&self, words: &[String]) -> Result<Vec<String>, StoreError> {
        // the tagger wants a trailing double space to close the phrase
        let text = format!("{}  ", words.join(" "));
        let body = serde_json::json!({ "text": text }).to_string();
        let response = self
            .client
            .get(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        let payload: LatticeResponse = serde_json::from_str(&response.text()?)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let tags = parse_lattice(&payload.md_lattice)?;
        debug!(words = words.len(), tags = tags.len(), "pos tagged phrase");
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Chunk, ChunkType, WordForms};

    fn word(maleh: &str, language: Language) -> WordClassification {
        WordClassification::new(WordForms::new("", maleh, maleh), language, 0.5)
    }

    fn page(label: &str, chunks: Vec<Chunk>) -> TaggedPage {
        TaggedPage {
            page: label.to_string(),
            content: chunks,
        }
    }

    #[test]
    fn test_parse_lattice_keeps_last_morpheme() {
        let lattice = "0\t1\tה\tה\tDEF\tDEF\t_\t1\n\
                       1\t2\tבית\tבית\tNN\tNN\tgen=M\t1\n\
                       2\t3\tגדול\tגדול\tJJ\tJJ\tgen=M\t2\n\
                       \n";
        assert_eq!(parse_lattice(lattice).unwrap(), vec!["NN", "JJ"]);
        assert!(parse_lattice("").unwrap().is_empty());
        assert!(matches!(
            parse_lattice("0\t1\tבית\tNN"),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_prepare_phrase() {
        let words = vec![
            word("נתגלחו", Language::RabbinicHebrew),
            word("אמר", Language::Aramaic),
            word("דברין", Language::RabbinicHebrew),
            word("מתני׳", Language::RabbinicHebrew),
        ];
        assert_eq!(prepare_phrase(&words), vec!["התגלחו", ".", "דברים", "."]);
    }

    #[test]
    fn test_continued_chunk_is_tagged_with_next() {
        let mut pages = vec![
            page(
                "2a",
                vec![Chunk::new(
                    ChunkType::GemaraContinued,
                    vec![word("תנו", Language::RabbinicHebrew), word("רבנן", Language::RabbinicHebrew)],
                )],
            ),
            page(
                "2b",
                vec![
                    Chunk::new(ChunkType::Gemara, vec![word("המוציא", Language::RabbinicHebrew)]),
                    Chunk::new(ChunkType::Gemara, vec![word("אמר", Language::Aramaic)]),
                ],
            ),
        ];

        let mut tagger = MockPosTagger::new();
        tagger
            .expect_tag()
            .withf(|words: &[String]| words.len() == 2)
            .times(1)
            .returning(|_| Ok(vec!["VB".into(), "NN".into()]));
        tagger
            .expect_tag()
            .withf(|words: &[String]| words == ["תנו", "רבנן", "המוציא"])
            .times(1)
            .returning(|_| Ok(vec!["VB".into(), "NNP".into(), "BN".into()]));
        tagger
            .expect_tag()
            .withf(|words: &[String]| words == ["."])
            .times(1)
            .returning(|_| Ok(vec!["yyDOT".into()]));

        assert_eq!(tag_parts_of_speech(&tagger, &mut pages), 3);
        // retagged in context
        assert_eq!(pages[0].content[0].words[1].pos.as_deref(), Some("NNP"));
        assert_eq!(pages[1].content[0].words[0].pos.as_deref(), Some("BN"));
        assert_eq!(pages[1].content[1].words[0].pos.as_deref(), Some("yyDOT"));
    }

    #[test]
    fn test_failed_chunk_stays_untagged() {
        let mut pages = vec![page(
            "2a",
            vec![Chunk::new(ChunkType::Gemara, vec![word("תנו", Language::RabbinicHebrew)])],
        )];
        let mut tagger = MockPosTagger::new();
        tagger
            .expect_tag()
            .returning(|_| Err(StoreError::Unavailable("down".into())));
        assert_eq!(tag_parts_of_speech(&tagger, &mut pages), 0);
        assert!(pages[0].content[0].words[0].pos.is_none());

        let mut short = MockPosTagger::new();
        short.expect_tag().returning(|_| Ok(Vec::new()));
        assert_eq!(tag_parts_of_speech(&short, &mut pages), 0);
    }

    #[test]
    fn test_pos_agreement() {
        assert!(pos_agrees("פ' קל", "VBD"));
        assert!(!pos_agrees("פ' קל", "NN"));
        assert!(pos_agrees("", "NN"));
        assert!(pos_agrees("שֵם ז'", "NNT"));
        assert!(!pos_agrees("שֵם נ'", "NNT"));

        let analyses = vec![
            HebrewAnalysis {
                root: "ספר".into(),
                part_of_speech: "פ' פיעל".into(),
            },
            HebrewAnalysis {
                root: "סֵפֶר".into(),
                part_of_speech: "שֵם ז'".into(),
            },
        ];
        let preferred = prefer_tag(analyses, "NN");
        assert_eq!(preferred[0].root, "סֵפֶר");
        assert_eq!(preferred.len(), 2);
    }

    #[test]
    fn test_unreachable_tagger() {
        let tagger = YapTagger::new("http://127.0.0.1:9/yap/heb/joint", Duration::from_millis(200)).unwrap();
        assert!(tagger.tag(&["בית".to_string()]).is_err());
    }
}
