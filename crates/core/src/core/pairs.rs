//! Adjacent pair counting and pair replacement.
//!
//! These two primitives drive both training (pick the most frequent pair,
//! replace it everywhere) and encoding (replace the lowest-ranked pair).

use ahash::AHashMap;

/// A token identifier.
pub type Token = u32;

/// A pair of adjacent token IDs.
pub type Pair = (Token, Token);

/// Pair frequencies, iterated in the order each pair was first seen.
///
/// The insertion order is what makes the training tie-break reproducible:
/// among pairs with equal counts, the one encountered first wins.
#[derive(Debug, Clone, Default)]
pub struct PairCounts {
    /// (pair, count) in first-seen order
    entries: Vec<(Pair, u64)>,
    /// pair -> position in `entries`
    index: AHashMap<Pair, usize>,
}

impl PairCounts {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `pair`.
    #[inline]
    pub fn add(&mut self, pair: Pair, count: u64) {
        match self.index.get(&pair) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.index.insert(pair, self.entries.len());
                self.entries.push((pair, count));
            }
        }
    }

    /// Get the count for a pair.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<u64> {
        self.index.get(&pair).map(|&pos| self.entries[pos].1)
    }

    /// The pair with the highest count; ties go to the first-seen pair.
    pub fn most_frequent(&self) -> Option<(Pair, u64)> {
        let mut best: Option<(Pair, u64)> = None;
        for &(pair, count) in &self.entries {
            // strict comparison keeps the earliest pair on ties
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((pair, count));
            }
        }
        best
    }

    /// Iterate `(pair, count)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no pair has been counted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all counts, keeping allocations.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Count adjacent pairs of `ids` into `counts`.
///
/// Pass the same accumulator for several sequences to pool their counts.
pub fn count_pairs(ids: &[Token], counts: &mut PairCounts) {
    count_pairs_weighted(ids, 1, counts);
}

/// Count adjacent pairs of `ids`, each occurrence contributing `weight`.
pub fn count_pairs_weighted(ids: &[Token], weight: u64, counts: &mut PairCounts) {
    for window in ids.windows(2) {
        counts.add((window[0], window[1]), weight);
    }
}

/// Replace every non-overlapping occurrence of `pair` with `new_id`.
///
/// Scans left to right; after a match both elements are consumed, so
/// `[a, a, a]` merging `(a, a)` yields `[new_id, a]`.
pub fn merge_pair(ids: &[Token], pair: Pair, new_id: Token) -> Vec<Token> {
    let mut out = Vec::with_capacity(ids.len());
    let mut i = 0;

    while i < ids.len() {
        if i + 1 < ids.len() && ids[i] == pair.0 && ids[i + 1] == pair.1 {
            out.push(new_id);
            i += 2;
        } else {
            out.push(ids[i]);
            i += 1;
        }
    }

    out
}
