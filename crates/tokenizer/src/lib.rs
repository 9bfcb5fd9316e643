//! minbpe-tokenizer - High-level tokenizer API
//!
//! This crate ties the BPE core and trainer together with text splitting,
//! special token handling and model persistence.
//!
//! # Features
//!
//! - Basic (no split) and regex-split byte-level BPE via [`Tokenizer`]
//! - GPT-2 and GPT-4 split patterns, or a custom pattern
//! - Special tokens with an explicit recognition policy at encode time
//! - Line-oriented `.model` files plus a human-readable `.vocab` listing
//! - [`Gpt4Tokenizer`] over pretrained tiktoken ranks
//!
//! # Example
//!
//! ```rust
//! use minbpe_tokenizer::{AllowedSpecial, SplitPattern, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::builder()
//!     .split_pattern(SplitPattern::Gpt4)
//!     .build()?;
//! tokenizer.train("hello hello hello world", 260)?;
//! tokenizer.register_special_tokens([("<|endoftext|>", 1000)])?;
//!
//! let ids = tokenizer.encode("hello world<|endoftext|>", &AllowedSpecial::All)?;
//! assert_eq!(ids.last(), Some(&1000));
//! assert_eq!(tokenizer.decode(&ids)?, "hello world<|endoftext|>");
//! # Ok::<(), minbpe_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use minbpe_core::{AllowedSpecial, MergeTable, MergeableRanks, Result, Token, TokenizerError};
pub use minbpe_training::{BpeTrainer, TrainingConfig};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{
    BpeTokenizer, Gpt4Tokenizer, Tokenizer, TokenizerBuilder, TokenizerConfig, TokenizerKind,
    GPT4_SPECIAL_TOKENS,
};

// IO/Serialization
pub mod io;
pub use io::{ModelFile, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{SplitPattern, Splitter, GPT2_SPLIT_PATTERN, GPT4_SPLIT_PATTERN};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
