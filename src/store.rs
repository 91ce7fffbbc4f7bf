// File: src/store.rs
//! Query contracts of the external dictionary and root tables, with
//! in-memory implementations loaded from JSON.

use crate::core::normalizer::{normalize, strip_nikkud};
use crate::error::{LinkerError, Result, StoreError};
use crate::flatten::flatten;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryField {
    Headword,
    AllForms,
    Unvoweled,
    AllUnvoweled,
}

impl DictionaryField {
    /// The headword-like and full-forms fields to query for a word.
    pub fn pair_for(voweled: bool) -> [DictionaryField; 2] {
        if voweled {
            [DictionaryField::Headword, DictionaryField::AllForms]
        } else {
            [DictionaryField::Unvoweled, DictionaryField::AllUnvoweled]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootField {
    Word,
    Unvoweled,
}

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub headword: String,
    #[serde(default)]
    pub all_forms: Vec<String>,
    #[serde(default)]
    pub definition: serde_json::Value,
}

impl DictionaryRecord {
    pub fn definitions(&self) -> Vec<String> {
        flatten(&self.definition)
    }
}

/// One row of a verb or noun root table. Nouns carry no binyan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RootRecord {
    pub word: String,
    pub root: String,
    #[serde(default)]
    pub binyan: Option<String>,
}

/// A root proposed by the Hebrew root service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HebrewAnalysis {
    pub root: String,
    pub part_of_speech: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait DictionaryStore {
    fn find(&self, field: DictionaryField, value: &str) -> std::result::Result<Vec<DictionaryRecord>, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RootStore {
    fn find(&self, field: RootField, value: &str) -> std::result::Result<Vec<RootRecord>, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait HebrewRootService {
    fn hebrew_roots(&self, word: &str) -> std::result::Result<Vec<HebrewAnalysis>, StoreError>;
}

fn read_records<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if path.is_dir() {
        return Err(LinkerError::PathIsDirectory(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Dictionary held in memory and indexed on all four query fields.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    records: Vec<DictionaryRecord>,
    index: HashMap<(DictionaryField, String), Vec<usize>>,
}

impl MemoryDictionary {
    pub fn new(records: Vec<DictionaryRecord>) -> Self {
        let mut index: HashMap<(DictionaryField, String), Vec<usize>> = HashMap::new();
        let mut add = |field, key: String, id: usize| {
            let ids = index.entry((field, key)).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        };
        for (id, record) in records.iter().enumerate() {
            add(DictionaryField::Headword, normalize(&record.headword), id);
            add(DictionaryField::Unvoweled, strip_nikkud(&record.headword), id);
            for form in &record.all_forms {
                add(DictionaryField::AllForms, normalize(form), id);
                add(DictionaryField::AllUnvoweled, strip_nikkud(form), id);
            }
        }
        Self { records, index }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(read_records(path)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DictionaryStore for MemoryDictionary {
    fn find(&self, field: DictionaryField, value: &str) -> std::result::Result<Vec<DictionaryRecord>, StoreError> {
        let key = match field {
            DictionaryField::Headword | DictionaryField::AllForms => normalize(value),
            DictionaryField::Unvoweled | DictionaryField::AllUnvoweled => strip_nikkud(value),
        };
        Ok(self
            .index
            .get(&(field, key))
            .map(|ids| ids.iter().map(|&id| self.records[id].clone()).collect())
            .unwrap_or_default())
    }
}

/// A verb or noun root table held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRootTable {
    by_word: HashMap<String, Vec<RootRecord>>,
    by_unvoweled: HashMap<String, Vec<RootRecord>>,
}

impl MemoryRootTable {
    pub fn new(records: Vec<RootRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table
                .by_unvoweled
                .entry(strip_nikkud(&record.word))
                .or_default()
                .push(record.clone());
            table
                .by_word
                .entry(normalize(&record.word))
                .or_default()
                .push(record);
        }
        table
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(read_records(path)?))
    }
}

impl RootStore for MemoryRootTable {
    fn find(&self, field: RootField, value: &str) -> std::result::Result<Vec<RootRecord>, StoreError> {
        let hit = match field {
            RootField::Word => self.by_word.get(&normalize(value)),
            RootField::Unvoweled => self.by_unvoweled.get(&strip_nikkud(value)),
        };
        Ok(hit.cloned().unwrap_or_default())
    }
}
