//! Recovering merge structure from an externally ranked vocabulary.
//!
//! tiktoken-style vocabularies only ship `bytes -> rank`; the pairs that
//! produced each token are implicit. A multi-byte token of rank `r` is
//! rebuilt by running BPE over its own bytes with every rank below `r`
//! available: a consistent table always stops at exactly two parts, and
//! those two parts are the merged pair.
//!
//! The single-byte entries of such tables are not in raw byte order, so a
//! [`ByteShuffle`] translates raw bytes into the table's leaf ids.

use crate::core::merges::{MergeTable, BYTE_VOCAB_SIZE};
use crate::core::pairs::Token;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// Externally supplied vocabulary: token bytes -> rank.
pub type MergeableRanks = AHashMap<Vec<u8>, Token>;

/// Permutation of the 256 raw bytes onto an external table's leaf ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteShuffle {
    /// raw byte -> leaf id
    forward: [u8; BYTE_VOCAB_SIZE],
    /// leaf id -> raw byte
    inverse: [u8; BYTE_VOCAB_SIZE],
}

impl ByteShuffle {
    /// Read the permutation from the single-byte entries of `ranks`.
    ///
    /// Every byte must be present with a rank below 256, and no two bytes
    /// may share a rank.
    pub fn from_ranks(ranks: &MergeableRanks) -> Result<Self> {
        let mut forward = [0u8; BYTE_VOCAB_SIZE];
        let mut inverse = [0u8; BYTE_VOCAB_SIZE];
        let mut seen = [false; BYTE_VOCAB_SIZE];

        for b in 0..=u8::MAX {
            let rank = ranks.get([b].as_slice()).copied().ok_or_else(|| {
                TokenizerError::CorruptRanks(format!("missing single-byte entry for 0x{b:02x}"))
            })?;
            let leaf = u8::try_from(rank).map_err(|_| {
                TokenizerError::CorruptRanks(format!(
                    "single byte 0x{b:02x} has rank {rank}, expected below 256"
                ))
            })?;
            if std::mem::replace(&mut seen[leaf as usize], true) {
                return Err(TokenizerError::CorruptRanks(format!(
                    "rank {leaf} assigned to more than one single byte"
                )));
            }

            forward[b as usize] = leaf;
            inverse[leaf as usize] = b;
        }

        Ok(Self { forward, inverse })
    }

    /// Map a raw byte to the external leaf id.
    #[inline]
    pub fn shuffle(&self, byte: u8) -> u8 {
        self.forward[byte as usize]
    }

    /// Map an external leaf id back to the raw byte.
    #[inline]
    pub fn unshuffle(&self, leaf: u8) -> u8 {
        self.inverse[leaf as usize]
    }
}

/// Merge table and byte permutation recovered from [`MergeableRanks`].
#[derive(Debug, Clone)]
pub struct ExternalVocabulary {
    pub merges: MergeTable,
    pub shuffle: ByteShuffle,
}

impl ExternalVocabulary {
    /// Reconstruct the merge table and byte shuffle of `ranks`.
    pub fn from_ranks(ranks: &MergeableRanks) -> Result<Self> {
        let shuffle = ByteShuffle::from_ranks(ranks)?;
        let merges = recover_merges(ranks)?;

        log::debug!("recovered {} merges from external ranks", merges.len());

        Ok(Self { merges, shuffle })
    }
}

/// Split `token` into parts by greedily joining the lowest-ranked adjacent
/// pair, ignoring ranks at or above `max_rank`.
pub fn bpe_parts(ranks: &MergeableRanks, token: &[u8], max_rank: Option<Token>) -> Vec<Vec<u8>> {
    let mut parts: Vec<Vec<u8>> = token.iter().map(|&b| vec![b]).collect();
    let mut joined = Vec::new();

    loop {
        let mut best: Option<(usize, Token)> = None;

        for i in 0..parts.len().saturating_sub(1) {
            joined.clear();
            joined.extend_from_slice(&parts[i]);
            joined.extend_from_slice(&parts[i + 1]);

            if let Some(&rank) = ranks.get(joined.as_slice()) {
                if best.map_or(true, |(_, r)| rank < r) {
                    best = Some((i, rank));
                }
            }
        }

        match best {
            Some((i, rank)) if max_rank.map_or(true, |max| rank < max) => {
                let right = parts.remove(i + 1);
                parts[i].extend_from_slice(&right);
            }
            _ => break,
        }
    }

    parts
}

/// Recover the merge table implied by `ranks`.
///
/// Ranks of multi-byte entries become merge ids, so they must run
/// contiguously from 256.
pub fn recover_merges(ranks: &MergeableRanks) -> Result<MergeTable> {
    let mut entries: Vec<(&[u8], Token)> = ranks
        .iter()
        .filter(|(token, _)| token.len() > 1)
        .map(|(token, &rank)| (token.as_slice(), rank))
        .collect();
    entries.sort_unstable_by_key(|&(_, rank)| rank);

    let mut merges = MergeTable::with_capacity(entries.len());

    for (token, rank) in entries {
        if rank != merges.next_id() {
            return Err(TokenizerError::CorruptRanks(format!(
                "rank {rank} breaks the contiguous merge range (expected {})",
                merges.next_id()
            )));
        }

        let parts = bpe_parts(ranks, token, Some(rank));
        let [left, right] = parts.as_slice() else {
            return Err(TokenizerError::CorruptRanks(format!(
                "token of rank {rank} decomposes into {} parts, expected 2",
                parts.len()
            )));
        };

        let lookup = |part: &[u8]| {
            ranks.get(part).copied().ok_or_else(|| {
                TokenizerError::CorruptRanks(format!("part of rank {rank} has no rank of its own"))
            })
        };
        let pair = (lookup(left.as_slice())?, lookup(right.as_slice())?);

        merges
            .push(pair)
            .map_err(|e| TokenizerError::CorruptRanks(format!("rank {rank}: {e}")))?;
    }

    Ok(merges)
}
