// File: src/classifier.rs
//! The statistical word-language classifier used for initial gemara tagging.

use crate::error::{LinkerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Characters the encoder knows, in one-hot slot order.
pub const CHARSET: &str = "אבגדהוזחטיכךלמםנןסעפףצץקרשת\u{05B9}\u{05B0}\u{05BC}\u{05C1}\u{05C2}\u{05B8}\u{05B5}\u{05B7}\u{05B6}\u{05B4}\u{05BB}\u{05B1}\u{05B2}\u{05B3}\u{05C7}״׳";

/// Estimates P(Hebrew) for a single word.
pub trait LanguageClassifier {
    fn hebrew_probability(&self, word: &str) -> f64;

    fn classify_all(&self, words: &[&str]) -> Vec<f64> {
        words.iter().map(|w| self.hebrew_probability(w)).collect()
    }
}

/// Drops every character outside [`CHARSET`].
pub fn clean(token: &str) -> String {
    token.chars().filter(|&c| CHARSET.contains(c)).collect()
}

/// Active slots of the positional one-hot encoding of a cleaned token,
/// limited to `dim`.
pub fn one_hot_indices(token: &str, dim: usize) -> Vec<usize> {
    let width = CHARSET.chars().count();
    clean(token)
        .chars()
        .enumerate()
        .filter_map(|(pos, c)| {
            let slot = CHARSET.chars().position(|k| k == c)?;
            Some(pos * width + slot)
        })
        .filter(|&idx| idx < dim)
        .collect()
}

/// Logistic regression over the positional one-hot encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotLogistic {
    weights: Vec<f64>,
    bias: f64,
}

impl OneHotLogistic {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self> {
        if weights.is_empty() {
            return Err(LinkerError::Config("classifier has no weights".to_string()));
        }
        Ok(Self { weights, bias })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(LinkerError::PathIsDirectory(path.to_path_buf()));
        }
        let model: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        Self::new(model.weights, model.bias)
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }
}

impl LanguageClassifier for OneHotLogistic {
    fn hebrew_probability(&self, word: &str) -> f64 {
        let z: f64 = self.bias
            + one_hot_indices(word, self.weights.len())
                .into_iter()
                .map(|idx| self.weights[idx])
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

/// Returns the same probability for every word.
#[derive(Debug, Clone, Copy)]
pub struct ConstantClassifier(pub f64);

impl LanguageClassifier for ConstantClassifier {
    fn hebrew_probability(&self, _word: &str) -> f64 {
        self.0
    }
}
