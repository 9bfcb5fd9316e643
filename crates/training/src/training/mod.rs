//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the training algorithm and the pooled pair counter
//! it runs on.

pub mod counter;
pub mod trainer;

pub use counter::PairCounter;
pub use trainer::{BpeTrainer, TrainingConfig};
