//! Vocabulary: token id to byte sequence.
//!
//! The vocabulary is never edited directly. It is rebuilt from a
//! [`MergeTable`] by expanding every merge down to its 256 raw-byte leaves.

use crate::core::merges::{MergeTable, BYTE_VOCAB_SIZE};
use crate::core::pairs::Token;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Mapping from token id to the bytes it stands for.
///
/// Ids are dense (`0..len`), so entries are stored by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<Vec<u8>>,
}

impl Vocabulary {
    /// Build the vocabulary for `merges`; id `b < 256` is the byte `b`.
    pub fn from_merges(merges: &MergeTable) -> Self {
        Self::from_merges_mapped(merges, |b| b)
    }

    /// Build the vocabulary for `merges`, with leaf `b` standing for `leaf(b)`.
    ///
    /// Used when the leaf ids are a permutation of the raw bytes.
    pub fn from_merges_mapped(merges: &MergeTable, leaf: impl Fn(u8) -> u8) -> Self {
        let mut tokens: Vec<Vec<u8>> = Vec::with_capacity(BYTE_VOCAB_SIZE + merges.len());
        tokens.extend((0..=u8::MAX).map(|b| vec![leaf(b)]));

        // every pair only references earlier ids, so one pass suffices
        for ((left, right), _) in merges.iter() {
            let mut bytes = tokens[left as usize].clone();
            bytes.extend_from_slice(&tokens[right as usize]);
            tokens.push(bytes);
        }

        Self { tokens }
    }

    /// Get the bytes for a token id.
    #[inline]
    pub fn get(&self, id: Token) -> Option<&[u8]> {
        self.tokens.get(id as usize).map(Vec::as_slice)
    }

    /// Check whether `id` is part of the vocabulary.
    #[inline]
    pub fn contains(&self, id: Token) -> bool {
        (id as usize) < self.tokens.len()
    }

    /// Iterate `(id, bytes)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Token, &[u8])> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, bytes)| (id as Token, bytes.as_slice()))
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: the 256 byte leaves are always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_merges(&MergeTable::new())
    }
}

/// Any character in the Unicode "Other" categories (Cc, Cf, Cs, Co, Cn).
static OTHER_CHAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\p{C}").ok());

/// Render token bytes for humans: lossy UTF-8 with every control, format,
/// private-use and unassigned character escaped as `\uXXXX`.
pub fn render_token(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);

    match OTHER_CHAR.as_ref() {
        Some(re) => re
            .replace_all(&text, |caps: &Captures| {
                caps[0].chars().map(escape_char).collect::<String>()
            })
            .into_owned(),
        // \p{C} always compiles with the default regex features
        None => text
            .chars()
            .map(|ch| if ch.is_control() { escape_char(ch) } else { ch.to_string() })
            .collect(),
    }
}

fn escape_char(ch: char) -> String {
    format!("\\u{:04x}", ch as u32)
}
