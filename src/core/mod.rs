// File: src/core/mod.rs
pub mod alphabet;
pub mod context;
pub mod decomposer;
pub mod engine;
pub mod normalizer;
pub mod prefix;
pub mod suffix;
pub mod types;
