//! Merge table for BPE.
//!
//! The merge table is the model: an ordered list of learned pairs where the
//! k-th pair is replaced by token `256 + k`. Position in the list is the
//! merge's rank, so lower ids are applied first when encoding.

use crate::core::pairs::{Pair, Token};
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// Number of raw byte tokens; also the id of the first merge.
pub const BYTE_VOCAB_SIZE: usize = 256;

/// Ordered collection of BPE merge rules with hashed lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeTable {
    /// Learned pairs in learn order; pair `k` produces id `256 + k`
    pairs: Vec<Pair>,
    /// pair -> produced id
    index: AHashMap<Pair, Token>,
}

impl MergeTable {
    /// Create an empty merge table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty merge table with room for `capacity` merges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
        }
    }

    /// Build a table from pairs given in learn order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = Pair>) -> Result<Self> {
        let mut table = Self::new();
        for pair in pairs {
            table.push(pair)?;
        }
        Ok(table)
    }

    /// Append a merge rule, returning the id it was assigned.
    ///
    /// Both halves of the pair must already be defined (a raw byte or an
    /// earlier merge), and the pair must not be present yet.
    pub fn push(&mut self, pair: Pair) -> Result<Token> {
        let id = self.next_id();

        if pair.0 >= id || pair.1 >= id {
            return Err(TokenizerError::InvalidConfig(format!(
                "merge ({}, {}) references an id not yet defined (next id is {})",
                pair.0, pair.1, id
            )));
        }
        if self.index.contains_key(&pair) {
            return Err(TokenizerError::InvalidConfig(format!(
                "duplicate merge ({}, {})",
                pair.0, pair.1
            )));
        }

        self.pairs.push(pair);
        self.index.insert(pair, id);
        Ok(id)
    }

    /// Get the id produced by merging `pair`, which is also its rank.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<Token> {
        self.index.get(&pair).copied()
    }

    /// Get the pair that produced `id`, if `id` is a merge.
    #[inline]
    pub fn pair_of(&self, id: Token) -> Option<Pair> {
        (id as usize)
            .checked_sub(BYTE_VOCAB_SIZE)
            .and_then(|k| self.pairs.get(k).copied())
    }

    /// The id the next pushed merge will receive.
    #[inline]
    pub fn next_id(&self) -> Token {
        (BYTE_VOCAB_SIZE + self.pairs.len()) as Token
    }

    /// Iterate `(pair, id)` in learn order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, Token)> + '_ {
        self.pairs
            .iter()
            .enumerate()
            .map(|(k, &pair)| (pair, (BYTE_VOCAB_SIZE + k) as Token))
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut table = MergeTable::new();
        assert_eq!(table.push((97, 97)).unwrap(), 256);
        assert_eq!(table.push((256, 98)).unwrap(), 257);
        assert_eq!(table.next_id(), 258);

        assert_eq!(table.get((97, 97)), Some(256));
        assert_eq!(table.get((256, 98)), Some(257));
        assert_eq!(table.get((98, 97)), None);
    }

    #[test]
    fn test_pair_of() {
        let table = MergeTable::from_pairs([(1, 2), (256, 3)]).unwrap();

        assert_eq!(table.pair_of(256), Some((1, 2)));
        assert_eq!(table.pair_of(257), Some((256, 3)));
        assert_eq!(table.pair_of(258), None);
        assert_eq!(table.pair_of(42), None);
    }

    #[test]
    fn test_iter_in_learn_order() {
        let table = MergeTable::from_pairs([(5, 5), (1, 2), (256, 256)]).unwrap();
        let merges: Vec<_> = table.iter().collect();

        assert_eq!(
            merges,
            vec![((5, 5), 256), ((1, 2), 257), ((256, 256), 258)]
        );
    }

    #[test]
    fn test_rejects_undefined_ids() {
        let mut table = MergeTable::new();
        assert!(table.push((256, 1)).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut table = MergeTable::new();
        table.push((1, 2)).unwrap();
        assert!(table.push((1, 2)).is_err());
        assert_eq!(table.len(), 1);
    }
}
