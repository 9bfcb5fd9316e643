//! Pre-tokenization pipeline.
//!
//! This module provides the operations applied before BPE encoding:
//! special token segmentation and pattern-based chunking.

pub mod special;
pub mod split;

pub use special::{split_special, Segment};
pub use split::{SplitPattern, Splitter, GPT2_SPLIT_PATTERN, GPT4_SPLIT_PATTERN};
