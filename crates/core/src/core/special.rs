//! Special tokens and the policy for recognizing them while encoding.

use crate::core::pairs::Token;
use crate::error::{Result, TokenizerError};
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use std::str::FromStr;

/// Bidirectional mapping between reserved strings and token ids.
///
/// Registration order is kept so the model file is written deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialTokenRegistry {
    /// (token, id) in registration order
    entries: Vec<(CompactString, Token)>,
    /// token -> id
    by_token: AHashMap<CompactString, Token>,
    /// id -> position in `entries`
    by_id: AHashMap<Token, usize>,
}

impl SpecialTokenRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(token, id)` pairs.
    pub fn from_pairs<S: AsRef<str>>(tokens: impl IntoIterator<Item = (S, Token)>) -> Result<Self> {
        let mut registry = Self::new();
        for (token, id) in tokens {
            registry.insert(token.as_ref(), id)?;
        }
        Ok(registry)
    }

    /// Register a special token.
    ///
    /// Both the string and the id must be unused, and the string non-empty.
    pub fn insert(&mut self, token: &str, id: Token) -> Result<()> {
        if token.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "special token must not be empty".to_string(),
            ));
        }
        if self.by_token.contains_key(token) {
            return Err(TokenizerError::InvalidConfig(format!(
                "special token {token:?} registered twice"
            )));
        }
        if self.by_id.contains_key(&id) {
            return Err(TokenizerError::InvalidConfig(format!(
                "special token id {id} already in use"
            )));
        }

        let token = CompactString::new(token);
        self.by_id.insert(id, self.entries.len());
        self.by_token.insert(token.clone(), id);
        self.entries.push((token, id));
        Ok(())
    }

    /// Get the id for a special token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<Token> {
        self.by_token.get(token).copied()
    }

    /// Get the special token string for an id.
    #[inline]
    pub fn get_token(&self, id: Token) -> Option<&str> {
        self.by_id.get(&id).map(|&pos| self.entries[pos].0.as_str())
    }

    /// Smallest registered id.
    pub fn min_id(&self) -> Option<Token> {
        self.entries.iter().map(|&(_, id)| id).min()
    }

    /// Fail if any registered id is below `limit` (i.e. owned by the merges).
    pub fn check_disjoint(&self, limit: Token) -> Result<()> {
        match self.entries.iter().find(|&&(_, id)| id < limit) {
            Some((token, id)) => Err(TokenizerError::InvalidConfig(format!(
                "special token {token:?} id {id} collides with the merge vocabulary (ids < {limit})"
            ))),
            None => Ok(()),
        }
    }

    /// The first registered token that occurs in `text`, if any.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .map(|(token, _)| token.as_str())
            .find(|token| text.contains(token))
    }

    /// Iterate `(token, id)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Token)> + '_ {
        self.entries.iter().map(|(token, id)| (token.as_str(), *id))
    }

    /// Number of registered special tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no special tokens are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which special tokens `encode` recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedSpecial {
    /// Recognize every registered special token.
    All,
    /// Treat special token strings as ordinary text.
    None,
    /// Fail if any registered special token appears in the text.
    #[default]
    NoneRaise,
    /// Recognize only the listed tokens.
    Subset(AHashSet<String>),
}

impl AllowedSpecial {
    /// Recognize only `tokens`.
    pub fn subset<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Self::Subset(tokens.into_iter().map(Into::into).collect())
    }

    /// Whether `token` is recognized under this policy.
    pub fn allows(&self, token: &str) -> bool {
        match self {
            Self::All => true,
            Self::None | Self::NoneRaise => false,
            Self::Subset(set) => set.contains(token),
        }
    }
}

impl FromStr for AllowedSpecial {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "none" => Ok(Self::None),
            "none_raise" => Ok(Self::NoneRaise),
            _ => Err(TokenizerError::InvalidConfig(format!(
                "invalid special token mode: {s:?} (expected \"all\", \"none\" or \"none_raise\")"
            ))),
        }
    }
}
