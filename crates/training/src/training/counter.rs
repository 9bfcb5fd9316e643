//! Pair counting for BPE training.
//!
//! Training text arrives as chunks. Pairs are only counted inside a chunk,
//! but the counts of all chunks are pooled, so the pair chosen at each step
//! is the globally most frequent one.

use ahash::AHashMap;
use minbpe_core::{count_pairs_weighted, merge_pair, Pair, PairCounts, Token};

/// Counter for BPE pair frequencies over a set of chunks.
///
/// Identical chunks are stored once with an occurrence count. Their pairs
/// are first seen at the first occurrence either way, so deduplication does
/// not change the tie-break order.
#[derive(Debug, Default)]
pub struct PairCounter {
    /// Unique chunks as token ids, in first-occurrence order
    chunks: Vec<Vec<Token>>,
    /// Occurrences of each unique chunk
    chunk_counts: Vec<u64>,
    /// Chunk text -> position in `chunks`
    index: AHashMap<String, usize>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every chunk yielded by `chunks`.
    pub fn add_chunks<'a>(&mut self, chunks: impl IntoIterator<Item = &'a str>) {
        for chunk in chunks {
            self.add_chunk(chunk);
        }
    }

    /// Add a single chunk; its initial ids are its UTF-8 bytes.
    pub fn add_chunk(&mut self, chunk: &str) {
        if let Some(&pos) = self.index.get(chunk) {
            self.chunk_counts[pos] += 1;
            return;
        }

        self.index.insert(chunk.to_string(), self.chunks.len());
        self.chunks.push(chunk.bytes().map(Token::from).collect());
        self.chunk_counts.push(1);
    }

    /// Count all pairs across all chunks, in first-seen order.
    pub fn count_pairs(&self) -> PairCounts {
        let mut counts = PairCounts::new();

        for (chunk, &count) in self.chunks.iter().zip(self.chunk_counts.iter()) {
            count_pairs_weighted(chunk, count, &mut counts);
        }

        counts
    }

    /// Replace `pair` with `new_id` in every chunk.
    pub fn merge_pair_in_chunks(&mut self, pair: Pair, new_id: Token) {
        for chunk in &mut self.chunks {
            // chunks of length < 2 cannot contain the pair
            if chunk.len() >= 2 {
                *chunk = merge_pair(chunk, pair, new_id);
            }
        }
    }

    /// Get the number of unique chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get the total count of all chunk occurrences.
    pub fn total_chunk_occurrences(&self) -> u64 {
        self.chunk_counts.iter().sum()
    }

    /// Get a reference to the chunks.
    pub fn chunks(&self) -> &[Vec<Token>] {
        &self.chunks
    }

    /// Get a reference to the chunk counts.
    pub fn chunk_counts(&self) -> &[u64] {
        &self.chunk_counts
    }

    /// Clear all data from the counter.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.chunk_counts.clear();
        self.index.clear();
    }
}
