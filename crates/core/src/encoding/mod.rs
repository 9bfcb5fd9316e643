//! Encoding for BPE.
//!
//! This module applies a learned merge table to byte sequences and
//! resolves token ids back to bytes.

pub mod byte_level;

pub use byte_level::{apply_merges, decode_bytes, encode_bytes};
