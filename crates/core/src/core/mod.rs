//! Core BPE data structures.
//!
//! This module contains the fundamental data structures and algorithms
//! for byte-pair encoding, independent of how text is split or stored.

pub mod merges;
pub mod pairs;
pub mod ranks;
pub mod special;
pub mod vocab;

pub use merges::{MergeTable, BYTE_VOCAB_SIZE};
pub use pairs::{count_pairs, count_pairs_weighted, merge_pair, Pair, PairCounts, Token};
pub use ranks::{recover_merges, ByteShuffle, ExternalVocabulary, MergeableRanks};
pub use special::{AllowedSpecial, SpecialTokenRegistry};
pub use vocab::{render_token, Vocabulary};
