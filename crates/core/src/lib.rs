//! minbpe-core - Core BPE algorithm implementation
//!
//! This crate provides the fundamental data structures and algorithms for
//! byte-pair encoding (BPE), independent of text splitting and persistence.
//!
//! # Features
//!
//! - Insertion-ordered pair counting with a reproducible tie-break
//! - Merge tables whose k-th rule always produces token `256 + k`
//! - Vocabulary reconstruction from merges down to raw bytes
//! - Special token registry and encode-time recognition policy
//! - Merge recovery from externally ranked (tiktoken-style) vocabularies
//!
//! # Example
//!
//! ```rust
//! use minbpe_core::{encode_bytes, MergeTable, Vocabulary};
//!
//! let merges = MergeTable::from_pairs([(b'a' as u32, b'a' as u32)])?;
//! let vocab = Vocabulary::from_merges(&merges);
//!
//! assert_eq!(encode_bytes(b"aab", &merges), vec![256, 98]);
//! assert_eq!(vocab.get(256), Some(&b"aa"[..]));
//! # Ok::<(), minbpe_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE algorithm modules
pub mod core;
pub use self::core::{
    count_pairs, count_pairs_weighted, merge_pair, recover_merges, render_token, AllowedSpecial,
    ByteShuffle, ExternalVocabulary, MergeTable, MergeableRanks, Pair, PairCounts,
    SpecialTokenRegistry, Token, Vocabulary, BYTE_VOCAB_SIZE,
};

// Encoding
pub mod encoding;
pub use encoding::{apply_merges, decode_bytes, encode_bytes};
