//! minbpe-training - BPE training infrastructure
//!
//! This crate learns BPE merge rules from text that has already been split
//! into chunks.
//!
//! # Features
//!
//! - Greedy most-frequent-pair merge learning over pooled chunk counts
//! - Deterministic tie-break: the first pair encountered wins
//! - Merges are confined to chunks; identical chunks are counted once
//!
//! # Example
//!
//! ```rust
//! use minbpe_training::{BpeTrainer, TrainingConfig};
//!
//! let trainer = BpeTrainer::new(TrainingConfig { vocab_size: 256 + 3 });
//! let (merges, vocab) = trainer.train(["aaabdaaabac"])?;
//!
//! assert_eq!(merges.len(), 3);
//! assert_eq!(vocab.get(256), Some(&b"aa"[..]));
//! # Ok::<(), minbpe_training::TokenizerError>(())
//! ```

pub use minbpe_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{BpeTrainer, PairCounter, TrainingConfig};
