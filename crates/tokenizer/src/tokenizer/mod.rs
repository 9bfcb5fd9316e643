//! Main tokenizer implementation.
//!
//! This module provides the high-level [`Tokenizer`] struct that ties a
//! split pattern, a learned merge table and a special token registry
//! together, and the [`BpeTokenizer`] interface shared with
//! [`Gpt4Tokenizer`].

pub mod gpt4;
pub use gpt4::{Gpt4Tokenizer, GPT4_SPECIAL_TOKENS};

use crate::io::{TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{split_special, Segment, SplitPattern, Splitter};
use minbpe_core::{
    decode_bytes, encode_bytes, AllowedSpecial, MergeTable, Result, SpecialTokenRegistry, Token,
    TokenizerError, Vocabulary,
};
use minbpe_training::BpeTrainer;
use rayon::prelude::*;
use std::path::Path;

/// Which tokenizer variant an instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    /// Byte-level BPE over the whole text
    Basic,
    /// Byte-level BPE over regex-split chunks
    Regex,
    /// Pretrained GPT-4 ranks, read-only
    Gpt4,
}

/// Operations every tokenizer variant offers.
///
/// Variants that cannot perform an operation return
/// [`TokenizerError::Unsupported`].
pub trait BpeTokenizer {
    /// The variant of this tokenizer.
    fn kind(&self) -> TokenizerKind;

    /// Learn merges from `text` until the vocabulary has `vocab_size` entries.
    fn train(&mut self, text: &str, vocab_size: usize) -> Result<()>;

    /// Encode text under the given special token policy.
    fn encode(&self, text: &str, allowed: &AllowedSpecial) -> Result<Vec<Token>>;

    /// Decode token ids back to text, replacing invalid UTF-8.
    fn decode(&self, ids: &[Token]) -> Result<String>;

    /// Save to `<prefix>.model` and `<prefix>.vocab`.
    fn save(&self, prefix: &Path) -> Result<()>;

    /// Replace the model with the contents of a `.model` file.
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    /// Chunk splitting pattern
    pub split_pattern: SplitPattern,
    /// Special tokens and their ids
    pub special_tokens: Vec<(String, Token)>,
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the split pattern.
    pub fn split_pattern(mut self, pattern: SplitPattern) -> Self {
        self.config.split_pattern = pattern;
        self
    }

    /// Set special tokens.
    pub fn special_tokens<S: Into<String>>(
        mut self,
        tokens: impl IntoIterator<Item = (S, Token)>,
    ) -> Self {
        self.config.special_tokens = tokens
            .into_iter()
            .map(|(token, id)| (token.into(), id))
            .collect();
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }
}

/// Byte-level BPE tokenizer.
///
/// With [`SplitPattern::NoSplit`] this is the basic tokenizer, which merges
/// across the whole text; with any other pattern merges stay inside the
/// chunks the pattern produces.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Learned merges
    merges: MergeTable,
    /// Bytes of every merge id, derived from `merges`
    vocab: Vocabulary,
    /// Special tokens
    special: SpecialTokenRegistry,
    /// Chunk splitter
    splitter: Splitter,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the given configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        let splitter = Splitter::new(config.split_pattern)?;
        let merges = MergeTable::new();
        let special = SpecialTokenRegistry::from_pairs(config.special_tokens)?;
        special.check_disjoint(merges.next_id())?;

        Ok(Self {
            vocab: Vocabulary::from_merges(&merges),
            merges,
            special,
            splitter,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Untrained tokenizer without chunk splitting.
    pub fn basic() -> Self {
        Self::default()
    }

    /// Untrained tokenizer splitting with the GPT-4 pattern.
    pub fn regex() -> Result<Self> {
        Self::builder().split_pattern(SplitPattern::Gpt4).build()
    }

    /// Assemble a tokenizer from existing parts.
    pub fn from_parts(
        merges: MergeTable,
        special: SpecialTokenRegistry,
        pattern: SplitPattern,
    ) -> Result<Self> {
        special.check_disjoint(merges.next_id())?;

        Ok(Self {
            vocab: Vocabulary::from_merges(&merges),
            splitter: Splitter::new(pattern)?,
            merges,
            special,
        })
    }

    /// Load a tokenizer from a `.model` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut tokenizer = Self::default();
        tokenizer.load(path)?;
        Ok(tokenizer)
    }

    /// The variant: basic without a split pattern, regex otherwise.
    pub fn kind(&self) -> TokenizerKind {
        match self.splitter.pattern() {
            SplitPattern::NoSplit => TokenizerKind::Basic,
            _ => TokenizerKind::Regex,
        }
    }

    /// Train on `text`, replacing any previously learned merges.
    ///
    /// Registered special tokens are kept and must stay above the new
    /// vocabulary.
    pub fn train(&mut self, text: &str, vocab_size: usize) -> Result<()> {
        let limit = Token::try_from(vocab_size).map_err(|_| {
            TokenizerError::InvalidConfig(format!("vocabulary size {vocab_size} is too large"))
        })?;
        self.special.check_disjoint(limit)?;

        let chunks = self.splitter.split(text)?;
        let (merges, vocab) = BpeTrainer::with_vocab_size(vocab_size).train(chunks)?;

        self.merges = merges;
        self.vocab = vocab;
        Ok(())
    }

    /// Replace the registered special tokens.
    pub fn register_special_tokens<S: AsRef<str>>(
        &mut self,
        tokens: impl IntoIterator<Item = (S, Token)>,
    ) -> Result<()> {
        let special = SpecialTokenRegistry::from_pairs(tokens)?;
        special.check_disjoint(self.merges.next_id())?;

        log::debug!("registered {} special tokens", special.len());
        self.special = special;
        Ok(())
    }

    /// Encode text under the given special token policy.
    pub fn encode(&self, text: &str, allowed: &AllowedSpecial) -> Result<Vec<Token>> {
        encode_with(text, allowed, &self.special, &self.splitter, |chunk| {
            encode_bytes(chunk, &self.merges)
        })
    }

    /// Encode text, treating special token strings as ordinary text.
    pub fn encode_ordinary(&self, text: &str) -> Result<Vec<Token>> {
        self.encode(text, &AllowedSpecial::None)
    }

    /// Encode independent texts in parallel.
    pub fn encode_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        allowed: &AllowedSpecial,
    ) -> Result<Vec<Vec<Token>>> {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref(), allowed))
            .collect()
    }

    /// Decode token ids back to text, replacing invalid UTF-8.
    pub fn decode(&self, ids: &[Token]) -> Result<String> {
        let bytes = decode_bytes(ids, &self.vocab, |id| {
            self.special.get_token(id).map(str::as_bytes)
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Save to `<prefix>.model` and `<prefix>.vocab`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        TokenizerSaver::new(
            self.splitter.pattern().as_str(),
            &self.merges,
            &self.vocab,
            &self.special,
        )
        .save(prefix.as_ref())
    }

    /// Replace pattern, special tokens and merges with those of a `.model` file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let model = TokenizerLoader::load(path.as_ref())?;

        self.splitter = Splitter::new(SplitPattern::from_pattern(&model.pattern))?;
        self.vocab = Vocabulary::from_merges(&model.merges);
        self.merges = model.merges;
        self.special = model.special_tokens;
        Ok(())
    }

    /// Get the merge table.
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Get the vocabulary, excluding special tokens.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get the special token registry.
    pub fn special_tokens(&self) -> &SpecialTokenRegistry {
        &self.special
    }

    /// Get the split pattern.
    pub fn pattern(&self) -> &SplitPattern {
        self.splitter.pattern()
    }

    /// Number of ids this tokenizer can produce, special tokens included.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len() + self.special.len()
    }
}

impl BpeTokenizer for Tokenizer {
    fn kind(&self) -> TokenizerKind {
        Tokenizer::kind(self)
    }

    fn train(&mut self, text: &str, vocab_size: usize) -> Result<()> {
        Tokenizer::train(self, text, vocab_size)
    }

    fn encode(&self, text: &str, allowed: &AllowedSpecial) -> Result<Vec<Token>> {
        Tokenizer::encode(self, text, allowed)
    }

    fn decode(&self, ids: &[Token]) -> Result<String> {
        Tokenizer::decode(self, ids)
    }

    fn save(&self, prefix: &Path) -> Result<()> {
        Tokenizer::save(self, prefix)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        Tokenizer::load(self, path)
    }
}

/// Segment on special tokens, split each text span into chunks, and encode
/// every chunk's bytes with `encode_chunk`.
pub(crate) fn encode_with(
    text: &str,
    allowed: &AllowedSpecial,
    special: &SpecialTokenRegistry,
    splitter: &Splitter,
    encode_chunk: impl Fn(&[u8]) -> Vec<Token>,
) -> Result<Vec<Token>> {
    let mut ids = Vec::new();

    for segment in split_special(text, special, allowed)? {
        match segment {
            Segment::Special(id) => ids.push(id),
            Segment::Text(span) => {
                for chunk in splitter.split(span)? {
                    ids.extend(encode_chunk(chunk.as_bytes()));
                }
            }
        }
    }

    Ok(ids)
}
