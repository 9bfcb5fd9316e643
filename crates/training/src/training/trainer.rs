//! BPE trainer implementation.
//!
//! This module implements the core BPE training algorithm: starting from
//! raw bytes, repeatedly merge the most frequent adjacent pair until the
//! vocabulary reaches the requested size.
//!
//! Frequencies are recounted from scratch on every step. That keeps the
//! selection rule trivially correct (maximum count, ties broken by
//! first-seen order) at the cost of `O(merges * corpus)` time.

use super::counter::PairCounter;
use minbpe_core::{MergeTable, Result, TokenizerError, Vocabulary, BYTE_VOCAB_SIZE};

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, including the 256 byte tokens
    pub vocab_size: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self { vocab_size: 512 }
    }
}

/// BPE trainer.
///
/// Learns merge rules from pre-split chunks by iteratively merging the most
/// frequent byte pairs. Merges never cross chunk boundaries.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Create a new BPE trainer for the given vocabulary size.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig { vocab_size })
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on the given chunks.
    ///
    /// Returns the learned merges and the vocabulary they define. Training
    /// stops early, without error, once no pair occurs more than once.
    pub fn train<'a>(
        &self,
        chunks: impl IntoIterator<Item = &'a str>,
    ) -> Result<(MergeTable, Vocabulary)> {
        let vocab_size = self.config.vocab_size;
        if vocab_size < BYTE_VOCAB_SIZE {
            return Err(TokenizerError::VocabSizeTooSmall(vocab_size));
        }
        let num_merges = vocab_size - BYTE_VOCAB_SIZE;

        let mut counter = PairCounter::new();
        counter.add_chunks(chunks);

        log::info!(
            "training {} merges over {} chunks ({} unique)",
            num_merges,
            counter.total_chunk_occurrences(),
            counter.chunk_count()
        );

        let mut merges = MergeTable::with_capacity(num_merges);

        for step in 0..num_merges {
            let Some((pair, count)) = counter.count_pairs().most_frequent() else {
                log::warn!("no pairs left after {step} merges, stopping early");
                break;
            };
            if count < 2 {
                log::warn!(
                    "every remaining pair occurs once after {step} merges, stopping early"
                );
                break;
            }

            let new_id = merges.push(pair)?;
            counter.merge_pair_in_chunks(pair, new_id);

            log::debug!(
                "merge {}/{}: ({}, {}) -> {} had {} occurrences",
                step + 1,
                num_merges,
                pair.0,
                pair.1,
                new_id,
                count
            );
        }

        log::info!("training finished with {} merges", merges.len());

        let vocab = Vocabulary::from_merges(&merges);
        Ok((merges, vocab))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minbpe_core::{encode_bytes, Token};

    #[test]
    fn test_basic_training() {
        let trainer = BpeTrainer::with_vocab_size(256 + 3);
        let (merges, vocab) = trainer.train(["aaabdaaabac"]).unwrap();

        let learned: Vec<_> = merges.iter().collect();
        assert_eq!(
            learned,
            vec![((97, 97), 256), ((256, 97), 257), ((257, 98), 258)]
        );
        assert_eq!(vocab.len(), 259);
        assert_eq!(vocab.get(258), Some(&b"aaab"[..]));
    }

    #[test]
    fn test_encoding_replays_training() {
        let trainer = BpeTrainer::with_vocab_size(256 + 3);
        let (merges, _) = trainer.train(["aaabdaaabac"]).unwrap();

        let ids: Vec<Token> = encode_bytes(b"aaabdaaabac", &merges);
        assert_eq!(ids, vec![258, 100, 258, 97, 99]);
    }

    #[test]
    fn test_vocab_size_too_small() {
        let trainer = BpeTrainer::with_vocab_size(255);
        assert!(matches!(
            trainer.train(["abc"]),
            Err(TokenizerError::VocabSizeTooSmall(255))
        ));
    }

    #[test]
    fn test_no_merges_at_byte_vocab_size() {
        let trainer = BpeTrainer::with_vocab_size(256);
        let (merges, vocab) = trainer.train(["hello hello"]).unwrap();

        assert!(merges.is_empty());
        assert_eq!(vocab.len(), 256);
    }

    #[test]
    fn test_stops_when_pairs_exhausted() {
        let trainer = BpeTrainer::with_vocab_size(1000);
        let (merges, vocab) = trainer.train(["abab"]).unwrap();

        // (a, b) twice, then [256, 256] has a single pair left
        assert_eq!(merges.len(), 1);
        assert_eq!(vocab.len(), 257);
    }

    #[test]
    fn test_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog, the end";
        let trainer = BpeTrainer::with_vocab_size(280);

        let (first, _) = trainer.train([text]).unwrap();
        let (second, _) = trainer.train([text]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_cross_chunk_merges() {
        let trainer = BpeTrainer::with_vocab_size(300);
        // "bc" spans every chunk boundary but never occurs inside a chunk
        let (merges, _) = trainer.train(["ab", "cd", "ab", "cd", "ab", "cd"]).unwrap();

        assert_eq!(merges.get((98, 99)), None);
        assert_eq!(merges.get((97, 98)), Some(256));
        assert_eq!(merges.get((99, 100)), Some(257));
        assert_eq!(merges.len(), 2);
    }

    #[test]
    fn test_tie_break_first_seen() {
        let trainer = BpeTrainer::with_vocab_size(257);
        // (z, y) and (a, b) both occur twice; (z, y) is seen first
        let (merges, _) = trainer.train(["zyab", "zyab"]).unwrap();

        assert_eq!(merges.pair_of(256), Some((122, 121)));
    }
}
