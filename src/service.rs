// File: src/service.rs
//! Blocking client for the Hebrew root (translation) service.

use crate::core::normalizer::hebrew_plural;
use crate::error::StoreError;
use crate::store::{HebrewAnalysis, HebrewRootService};
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const NO_RESULT: &str = "NoResult";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Payload {
    result_type: String,
    #[serde(default)]
    words: Vec<PayloadWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PayloadWord {
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    input_language_meanings: Vec<Vec<Meaning>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Meaning {
    display_text: String,
}

/// Parses a service answer. `None` means the service knows no such word.
pub fn parse_payload(body: &str) -> Result<Option<Vec<HebrewAnalysis>>, StoreError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))?;
    if payload.result_type == NO_RESULT {
        return Ok(None);
    }
    let analyses = payload
        .words
        .into_iter()
        .filter_map(|word| {
            let root = word
                .input_language_meanings
                .into_iter()
                .next()?
                .into_iter()
                .next()?
                .display_text;
            Some(HebrewAnalysis {
                root,
                part_of_speech: word.part_of_speech,
            })
        })
        .collect();
    Ok(Some(analyses))
}

pub struct HttpHebrewRoots {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl HttpHebrewRoots {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff,
        })
    }

    /// One lookup with bounded retries on transport errors.
    fn fetch(&self, word: &str) -> Result<Option<Vec<HebrewAnalysis>>, StoreError> {
        let url = format!("{}/{}", self.base_url, word);
        let mut attempt = 0;
        loop {
            match self.client.get(&url).send() {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(StoreError::Status(status.as_u16()));
                    }
                    return parse_payload(&response.text()?);
                }
                Err(e) if attempt < self.max_retries && (e.is_timeout() || e.is_connect()) => {
                    attempt += 1;
                    warn!(word, attempt, error = %e, "root service request failed, retrying");
                    thread::sleep(self.backoff * attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl HebrewRootService for HttpHebrewRoots {
    fn hebrew_roots(&self, word: &str) -> Result<Vec<HebrewAnalysis>, StoreError> {
        if let Some(found) = self.fetch(word)? {
            return Ok(found);
        }
        let plural = hebrew_plural(word);
        if plural == word {
            return Ok(Vec::new());
        }
        debug!(word, plural = %plural, "no result, retrying as plural");
        Ok(self.fetch(&plural)?.unwrap_or_default())
    }
}
