// File: src/alignment.rs
//! Word alignment of the Sefaria text with the parallel Dicta spellings,
//! and structural tagging of the aligned chunks.

use crate::core::alphabet::{GERESH, GERSHAYIM};
use crate::core::normalizer::consonants_only;
use crate::core::types::{ChunkType, SourceChunk, SourcePage, WordForms};

const MISHNA_OPENER: &str = "מתני";
const GEMARA_OPENER: &str = "גמ";

/// Whether a chunk of raw text runs over onto the next page.
pub fn does_continue(text: &str) -> bool {
    !text.trim_end().ends_with(['.', '?', '!'])
}

/// `0 -> "2a"`, `1 -> "2b"`, `2 -> "3a"`: tractates start on folio 2.
pub fn page_label(index: usize) -> String {
    let amud = if index % 2 == 0 { 'a' } else { 'b' };
    format!("{}{}", index / 2 + 2, amud)
}

/// Splits Dicta lines into words. Blank lines and lines carrying a `*`
/// marker are skipped; ASCII quotes become geresh and gershayim.
pub fn dicta_words(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty() && !line.contains('*'))
        .flat_map(str::split_whitespace)
        .map(|word| word.replace('\'', &GERESH.to_string()).replace('"', &GERSHAYIM.to_string()))
        .collect()
}

/// A Sefaria word whose consonants differ from the next Dicta word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentConflict<'a> {
    pub page: usize,
    pub chunk: usize,
    pub word: usize,
    pub sefaria: &'a str,
    pub dicta: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignDecision {
    /// Pair the two words anyway.
    Align,
    /// Keep the Sefaria word with empty Dicta forms.
    SkipSefaria,
    /// Emit the Dicta word with an empty Sefaria form.
    SkipDicta,
}

/// Aligns the Sefaria words (pages of chunks of words) with the maleh and
/// haser word lists, which must have equal length. Words match when their
/// consonants agree; every other pairing is settled by `decide`.
pub fn align_texts<F>(
    maleh: &[String],
    haser: &[String],
    sefaria: &[Vec<Vec<String>>],
    mut decide: F,
) -> Vec<Vec<Vec<WordForms>>>
where
    F: FnMut(&AlignmentConflict<'_>) -> AlignDecision,
{
    let dicta_len = maleh.len().min(haser.len());
    let mut dicta = 0;
    let mut aligned = Vec::with_capacity(sefaria.len());

    for (p, page) in sefaria.iter().enumerate() {
        let mut page_out = Vec::with_capacity(page.len());
        for (c, chunk) in page.iter().enumerate() {
            let mut chunk_out = Vec::with_capacity(chunk.len());
            let mut w = 0;
            while w < chunk.len() {
                let word = &chunk[w];
                if dicta >= dicta_len {
                    chunk_out.push(WordForms::new(word, "", ""));
                    w += 1;
                    continue;
                }
                let decision = if consonants_only(word) == consonants_only(&maleh[dicta]) {
                    AlignDecision::Align
                } else {
                    decide(&AlignmentConflict {
                        page: p,
                        chunk: c,
                        word: w,
                        sefaria: word,
                        dicta: &maleh[dicta],
                    })
                };
                match decision {
                    AlignDecision::Align => {
                        chunk_out.push(WordForms::new(word, &maleh[dicta], &haser[dicta]));
                        dicta += 1;
                        w += 1;
                    }
                    AlignDecision::SkipSefaria => {
                        chunk_out.push(WordForms::new(word, "", ""));
                        w += 1;
                    }
                    AlignDecision::SkipDicta => {
                        chunk_out.push(WordForms::new("", &maleh[dicta], &haser[dicta]));
                        dicta += 1;
                    }
                }
            }
            page_out.push(chunk_out);
        }
        aligned.push(page_out);
    }
    aligned
}

fn opener(chunk: &[WordForms]) -> Option<ChunkType> {
    let head = consonants_only(chunk.first()?.maleh());
    match head.as_str() {
        MISHNA_OPENER => Some(ChunkType::Mishna),
        GEMARA_OPENER => Some(ChunkType::Gemara),
        _ => None,
    }
}

fn bare_chunk(kind: ChunkType, text: Vec<WordForms>) -> SourceChunk {
    SourceChunk {
        kind,
        text,
        bible: String::new(),
        mishna: String::new(),
        tosefta: String::new(),
        sifra: String::new(),
        sifrei: String::new(),
        probs: None,
    }
}

/// Tags each chunk of a page as mishna or gemara, given the tag of the
/// previous page's final chunk. A chunk opening with מתני starts a mishna,
/// one opening with גמ starts a gemara, anything else inherits. The last
/// chunk is marked as continuing onto the next page.
pub fn tag_page_structure(chunks: Vec<Vec<WordForms>>, previous: ChunkType) -> Vec<SourceChunk> {
    if chunks.is_empty() {
        return vec![bare_chunk(previous, Vec::new())];
    }

    let mut prev = previous;
    let mut tagged: Vec<SourceChunk> = chunks
        .into_iter()
        .map(|text| {
            let kind = match opener(&text) {
                None if prev.is_continued() => {
                    let kind = prev;
                    prev = prev.base();
                    kind
                }
                None => prev,
                Some(opened) if opened != prev => {
                    prev = opened;
                    opened
                }
                Some(_) => prev,
            };
            bare_chunk(kind, text)
        })
        .collect();

    if let Some(last) = tagged.last_mut() {
        last.kind = last.kind.continued();
    }
    tagged
}

/// Tags and labels a whole tractate. The first page follows a mishna.
pub fn structure_masekhet(pages: Vec<Vec<Vec<WordForms>>>) -> Vec<SourcePage> {
    let mut previous = ChunkType::Mishna;
    pages
        .into_iter()
        .enumerate()
        .map(|(index, chunks)| {
            let content = tag_page_structure(chunks, previous);
            if let Some(last) = content.last() {
                previous = last.kind;
            }
            SourcePage {
                page: page_label(index),
                content,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn chunk(maleh: &str) -> Vec<WordForms> {
        maleh.split_whitespace().map(|w| WordForms::new(w, w, w)).collect()
    }

    #[test]
    fn test_page_labels() {
        assert_eq!(page_label(0), "2a");
        assert_eq!(page_label(1), "2b");
        assert_eq!(page_label(2), "3a");
        assert_eq!(page_label(125), "64b");
    }

    #[test]
    fn test_does_continue() {
        assert!(does_continue("אמר ליה"));
        assert!(!does_continue("אמר ליה. "));
        assert!(!does_continue("מאי טעמא?"));
    }

    #[test]
    fn test_dicta_words() {
        let text = "מתני' שנים\n\n* הערה\nאוחזין  בטלית \"ע\"ג\"";
        assert_eq!(dicta_words(text), vec!["מתני׳", "שנים", "אוחזין", "בטלית", "״ע״ג״"]);
    }

    #[test]
    fn test_alignment_matches_on_consonants() {
        let maleh = words("אמר רבי יוחנן");
        let haser = words("אמר רבי יוחנן");
        let sefaria = vec![vec![vec!["אָמַר".to_string(), "רַבִּי".to_string()], vec!["יוֹחָנָן".to_string()]]];
        let aligned = align_texts(&maleh, &haser, &sefaria, |_| panic!("no conflict expected"));
        assert_eq!(aligned[0][0][1], WordForms::new("רַבִּי", "רבי", "רבי"));
        assert_eq!(aligned[0][1][0].maleh(), "יוחנן");
    }

    #[test]
    fn test_alignment_conflicts() {
        let maleh = words("אמר ליה רבא");
        let haser = words("אמר ליה רבא");
        let sefaria = vec![vec![words("אמר הכי רבא תו")]];
        let mut seen = Vec::new();
        let aligned = align_texts(&maleh, &haser, &sefaria, |conflict| {
            seen.push((conflict.sefaria.to_string(), conflict.dicta.to_string()));
            if conflict.dicta == "ליה" {
                AlignDecision::SkipDicta
            } else {
                AlignDecision::SkipSefaria
            }
        });
        assert_eq!(
            aligned[0][0],
            vec![
                WordForms::new("אמר", "אמר", "אמר"),
                WordForms::new("", "ליה", "ליה"),
                WordForms::new("הכי", "", ""),
                WordForms::new("רבא", "רבא", "רבא"),
                // dicta exhausted
                WordForms::new("תו", "", ""),
            ]
        );
        assert_eq!(seen, vec![("הכי".to_string(), "ליה".to_string()), ("הכי".to_string(), "רבא".to_string())]);
    }

    #[test]
    fn test_structure_tags() {
        let page = vec![chunk("גמ׳ מאי"), chunk("אמר רבא"), chunk("מתני׳ שנים")];
        let tagged = tag_page_structure(page, ChunkType::MishnaContinued);
        let kinds: Vec<ChunkType> = tagged.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChunkType::Gemara, ChunkType::Gemara, ChunkType::MishnaContinued]);

        let page = vec![chunk("ואמר רבא"), chunk("אמר אביי")];
        let kinds: Vec<ChunkType> = tag_page_structure(page, ChunkType::GemaraContinued)
            .iter()
            .map(|c| c.kind)
            .collect();
        assert_eq!(kinds, vec![ChunkType::GemaraContinued, ChunkType::GemaraContinued]);
    }

    #[test]
    fn test_empty_page_keeps_previous_tag() {
        let tagged = tag_page_structure(Vec::new(), ChunkType::GemaraContinued);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].kind, ChunkType::GemaraContinued);
        assert!(tagged[0].text.is_empty());
    }

    #[test]
    fn test_structure_masekhet() {
        let pages = vec![vec![chunk("שנים אוחזין")], vec![chunk("בטלית"), chunk("גמ׳ מאי")]];
        let labelled = structure_masekhet(pages);
        assert_eq!(labelled[0].page, "2a");
        assert_eq!(labelled[0].content[0].kind, ChunkType::MishnaContinued);
        assert_eq!(labelled[1].content[0].kind, ChunkType::MishnaContinued);
        assert_eq!(labelled[1].content[1].kind, ChunkType::GemaraContinued);
    }
}
