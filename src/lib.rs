// src/lib.rs

pub mod alignment;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod flatten;
pub mod lexicon;
pub mod persistence;
pub mod pos;
pub mod ranker;
pub mod resolver;
pub mod service;
pub mod store;

pub use crate::cache::ResultCache;
pub use crate::core::decomposer::Decomposer;
pub use crate::core::engine::TaggingEngine;
pub use crate::core::types::{Chunk, ChunkType, Language, LanguageScope, WordClassification};
pub use crate::error::{LinkerError, Result};
pub use crate::ranker::HeadwordRanker;
