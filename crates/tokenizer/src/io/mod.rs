//! Serialization and deserialization for BPE models.
//!
//! This module provides the line-oriented model format, the human-readable
//! vocabulary listing, and the tiktoken rank file reader.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFile, MODEL_EXTENSION, MODEL_VERSION, VOCAB_EXTENSION};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
