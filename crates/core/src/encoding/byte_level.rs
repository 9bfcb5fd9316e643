//! Byte-level BPE encoding.
//!
//! A chunk is turned into its raw byte ids and then merged greedily: at each
//! step the adjacent pair with the lowest merge id (earliest learned) is
//! replaced everywhere in the chunk. Pairs without a merge rule never merge.
//! Because earlier merges always win, encoding replays training order
//! regardless of how frequent a pair happens to be in the input.

use crate::core::merges::MergeTable;
use crate::core::pairs::{merge_pair, Pair, Token};
use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};

/// Apply `merges` to a sequence of ids until no adjacent pair has a rule.
pub fn apply_merges(mut ids: Vec<Token>, merges: &MergeTable) -> Vec<Token> {
    while ids.len() >= 2 {
        let best: Option<(Pair, Token)> = ids
            .windows(2)
            .filter_map(|w| {
                let pair = (w[0], w[1]);
                merges.get(pair).map(|id| (pair, id))
            })
            .min_by_key(|&(_, id)| id);

        match best {
            Some((pair, id)) => ids = merge_pair(&ids, pair, id),
            None => break,
        }
    }

    ids
}

/// Encode raw bytes: each byte becomes its own id, then merges apply.
#[inline]
pub fn encode_bytes(bytes: &[u8], merges: &MergeTable) -> Vec<Token> {
    apply_merges(bytes.iter().map(|&b| b as Token).collect(), merges)
}

/// Concatenate the bytes of `ids`, falling back to `fallback` for ids the
/// vocabulary does not know; unknown everywhere is an error.
pub fn decode_bytes<'a>(
    ids: &[Token],
    vocab: &'a Vocabulary,
    mut fallback: impl FnMut(Token) -> Option<&'a [u8]>,
) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(ids.len() * 2);

    for &id in ids {
        let part = vocab
            .get(id)
            .or_else(|| fallback(id))
            .ok_or(TokenizerError::UnknownTokenId(id))?;
        bytes.extend_from_slice(part);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_without_merges() {
        let merges = MergeTable::new();
        assert_eq!(encode_bytes(b"hi", &merges), vec![104, 105]);
        assert_eq!(encode_bytes(b"", &merges), Vec::<Token>::new());
    }

    #[test]
    fn test_earliest_merge_wins() {
        // (b, c) is learned before (a, b); in "abc" it must apply first
        let merges = MergeTable::from_pairs([(98, 99), (97, 98)]).unwrap();
        assert_eq!(encode_bytes(b"abc", &merges), vec![97, 256]);
    }

    #[test]
    fn test_nested_merges() {
        let merges = MergeTable::from_pairs([(97, 97), (256, 97), (256, 98)]).unwrap();
        // aaab: (a,a) twice -> [256, 97, 98]; then (256, 97) -> [257, 98]
        assert_eq!(encode_bytes(b"aaab", &merges), vec![257, 98]);
    }

    #[test]
    fn test_decode_bytes() {
        let merges = MergeTable::from_pairs([(104, 105)]).unwrap();
        let vocab = Vocabulary::from_merges(&merges);

        let bytes = decode_bytes(&[256, 33], &vocab, |_| None).unwrap();
        assert_eq!(bytes, b"hi!");

        let special: &[u8] = b"<end>";
        let bytes = decode_bytes(&[256, 1000], &vocab, |id| (id == 1000).then_some(special)).unwrap();
        assert_eq!(bytes, b"hi<end>");

        assert!(matches!(
            decode_bytes(&[999], &vocab, |_| None),
            Err(TokenizerError::UnknownTokenId(999))
        ));
    }
}
