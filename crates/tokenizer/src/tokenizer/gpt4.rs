//! Read-only tokenizer over pretrained GPT-4 (cl100k) ranks.
//!
//! The merge table is recovered from the rank table, and raw bytes pass
//! through the table's byte permutation before merging. Decoded bytes come
//! from a vocabulary built directly in raw byte space, so no inverse
//! permutation is needed at decode time.

use super::{encode_with, BpeTokenizer, TokenizerKind};
use crate::io::{TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{SplitPattern, Splitter};
use minbpe_core::{
    apply_merges, decode_bytes, AllowedSpecial, ByteShuffle, ExternalVocabulary, MergeTable,
    MergeableRanks, Result, SpecialTokenRegistry, Token, TokenizerError, Vocabulary,
};
use std::path::Path;

/// Special tokens of the cl100k encoding.
pub const GPT4_SPECIAL_TOKENS: [(&str, Token); 5] = [
    ("<|endoftext|>", 100257),
    ("<|fim_prefix|>", 100258),
    ("<|fim_middle|>", 100259),
    ("<|fim_suffix|>", 100260),
    ("<|endofprompt|>", 100276),
];

/// GPT-4 compatible tokenizer.
#[derive(Debug, Clone)]
pub struct Gpt4Tokenizer {
    /// Merges recovered from the ranks, over shuffled leaf ids
    merges: MergeTable,
    /// Raw bytes of every id
    vocab: Vocabulary,
    /// Raw byte -> leaf id permutation
    shuffle: ByteShuffle,
    /// Special tokens
    special: SpecialTokenRegistry,
    /// Chunk splitter
    splitter: Splitter,
}

impl Gpt4Tokenizer {
    /// Build from a rank table with the GPT-4 pattern and special tokens.
    pub fn from_ranks(ranks: &MergeableRanks) -> Result<Self> {
        Self::with_config(ranks, SplitPattern::Gpt4, GPT4_SPECIAL_TOKENS)
    }

    /// Build from a rank table with an explicit pattern and special tokens.
    pub fn with_config<S: AsRef<str>>(
        ranks: &MergeableRanks,
        pattern: SplitPattern,
        special_tokens: impl IntoIterator<Item = (S, Token)>,
    ) -> Result<Self> {
        let ExternalVocabulary { merges, shuffle } = ExternalVocabulary::from_ranks(ranks)?;
        let special = SpecialTokenRegistry::from_pairs(special_tokens)?;
        special.check_disjoint(merges.next_id())?;

        let vocab = Vocabulary::from_merges_mapped(&merges, |leaf| shuffle.unshuffle(leaf));

        log::info!(
            "built GPT-4 tokenizer with {} merges and {} special tokens",
            merges.len(),
            special.len()
        );

        Ok(Self {
            merges,
            vocab,
            shuffle,
            special,
            splitter: Splitter::new(pattern)?,
        })
    }

    /// Build from a local tiktoken rank file with the GPT-4 defaults.
    pub fn from_tiktoken_file(path: impl AsRef<Path>) -> Result<Self> {
        let ranks = TokenizerLoader::load_tiktoken_ranks(path.as_ref())?;
        Self::from_ranks(&ranks)
    }

    /// Always [`TokenizerKind::Gpt4`].
    pub fn kind(&self) -> TokenizerKind {
        TokenizerKind::Gpt4
    }

    /// Encode text under the given special token policy.
    pub fn encode(&self, text: &str, allowed: &AllowedSpecial) -> Result<Vec<Token>> {
        encode_with(text, allowed, &self.special, &self.splitter, |chunk| {
            let leaves = chunk
                .iter()
                .map(|&b| Token::from(self.shuffle.shuffle(b)))
                .collect();
            apply_merges(leaves, &self.merges)
        })
    }

    /// Encode text, treating special token strings as ordinary text.
    pub fn encode_ordinary(&self, text: &str) -> Result<Vec<Token>> {
        self.encode(text, &AllowedSpecial::None)
    }

    /// Decode token ids back to text, replacing invalid UTF-8.
    ///
    /// Special token ids decode to their string.
    pub fn decode(&self, ids: &[Token]) -> Result<String> {
        let bytes = decode_bytes(ids, &self.vocab, |id| {
            self.special.get_token(id).map(str::as_bytes)
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write only the human-readable `<prefix>.vocab` listing.
    pub fn save_vocab(&self, prefix: impl AsRef<Path>) -> Result<()> {
        TokenizerSaver::new(
            self.splitter.pattern().as_str(),
            &self.merges,
            &self.vocab,
            &self.special,
        )
        .save_vocab(prefix.as_ref())
    }

    /// Get the recovered merge table (over shuffled leaf ids).
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Get the vocabulary in raw byte space.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get the byte permutation.
    pub fn byte_shuffle(&self) -> &ByteShuffle {
        &self.shuffle
    }

    /// Get the special token registry.
    pub fn special_tokens(&self) -> &SpecialTokenRegistry {
        &self.special
    }
}

impl BpeTokenizer for Gpt4Tokenizer {
    fn kind(&self) -> TokenizerKind {
        TokenizerKind::Gpt4
    }

    fn train(&mut self, _text: &str, _vocab_size: usize) -> Result<()> {
        Err(TokenizerError::Unsupported("training a pretrained GPT-4 tokenizer"))
    }

    fn encode(&self, text: &str, allowed: &AllowedSpecial) -> Result<Vec<Token>> {
        Gpt4Tokenizer::encode(self, text, allowed)
    }

    fn decode(&self, ids: &[Token]) -> Result<String> {
        Gpt4Tokenizer::decode(self, ids)
    }

    fn save(&self, _prefix: &Path) -> Result<()> {
        Err(TokenizerError::Unsupported("saving a GPT-4 tokenizer (use save_vocab)"))
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Err(TokenizerError::Unsupported("loading into a GPT-4 tokenizer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    /// Single bytes ranked in reverse order, then "ab", "cd", "abcd".
    fn synthetic_ranks() -> MergeableRanks {
        let mut ranks: MergeableRanks = (0..=u8::MAX)
            .map(|b| (vec![b], 255 - Token::from(b)))
            .collect();
        ranks.insert(b"ab".to_vec(), 256);
        ranks.insert(b"cd".to_vec(), 257);
        ranks.insert(b"abcd".to_vec(), 258);
        ranks
    }

    fn tokenizer() -> Gpt4Tokenizer {
        Gpt4Tokenizer::from_ranks(&synthetic_ranks()).unwrap()
    }

    #[test]
    fn test_recovers_pairs() {
        let tokenizer = tokenizer();
        let a = 255 - Token::from(b'a');
        let c = 255 - Token::from(b'c');

        assert_eq!(tokenizer.merges().pair_of(256), Some((a, a - 1)));
        assert_eq!(tokenizer.merges().pair_of(257), Some((c, c - 1)));
        assert_eq!(tokenizer.merges().pair_of(258), Some((256, 257)));
        assert_eq!(tokenizer.vocab().get(258), Some(&b"abcd"[..]));
    }

    #[test]
    fn test_encode_shuffles_bytes() {
        let tokenizer = tokenizer();

        assert_eq!(tokenizer.encode_ordinary("abcd").unwrap(), vec![258]);
        assert_eq!(
            tokenizer.encode_ordinary("ba").unwrap(),
            vec![255 - Token::from(b'b'), 255 - Token::from(b'a')]
        );
    }

    #[test]
    fn test_round_trip() {
        let tokenizer = tokenizer();
        for text in ["abcd abcd cdab", "", "hello world!", "ünïcode 🦀\n"] {
            let ids = tokenizer.encode_ordinary(text).unwrap();
            assert_eq!(tokenizer.decode(&ids).unwrap(), text);
        }
    }

    #[test]
    fn test_special_tokens() {
        let tokenizer = tokenizer();
        let ids = tokenizer
            .encode("abcd<|endoftext|>", &AllowedSpecial::All)
            .unwrap();

        assert_eq!(ids, vec![258, 100257]);
        assert_eq!(tokenizer.decode(&ids).unwrap(), "abcd<|endoftext|>");
        assert!(tokenizer
            .encode("abcd<|endoftext|>", &AllowedSpecial::NoneRaise)
            .is_err());
    }

    #[test]
    fn test_with_config() {
        let tokenizer = Gpt4Tokenizer::with_config(
            &synthetic_ranks(),
            SplitPattern::NoSplit,
            [("<eot>", 500)],
        )
        .unwrap();

        assert_eq!(tokenizer.encode_ordinary("abcd").unwrap(), vec![258]);
        assert_eq!(tokenizer.special_tokens().get_id("<eot>"), Some(500));
        assert_eq!(tokenizer.special_tokens().get_id("<|endoftext|>"), None);
    }

    #[test]
    fn test_rejects_gapped_ranks() {
        let mut ranks = synthetic_ranks();
        ranks.insert(b"zz".to_vec(), 300);

        assert!(matches!(
            Gpt4Tokenizer::from_ranks(&ranks),
            Err(TokenizerError::CorruptRanks(_))
        ));
    }

    #[test]
    fn test_unsupported_operations() {
        let mut tokenizer = tokenizer();
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(BpeTokenizer::kind(&tokenizer), TokenizerKind::Gpt4);
        assert!(matches!(
            BpeTokenizer::train(&mut tokenizer, "abcd", 300),
            Err(TokenizerError::Unsupported(_))
        ));
        assert!(matches!(
            BpeTokenizer::save(&tokenizer, &dir.path().join("gpt4")),
            Err(TokenizerError::Unsupported(_))
        ));
        assert!(matches!(
            BpeTokenizer::load(&mut tokenizer, &dir.path().join("gpt4.model")),
            Err(TokenizerError::Unsupported(_))
        ));
    }

    #[test]
    fn test_save_vocab() {
        let dir = tempfile::tempdir().unwrap();
        tokenizer().save_vocab(dir.path().join("gpt4")).unwrap();

        assert!(!dir.path().join("gpt4.model").exists());
        let listing = std::fs::read_to_string(dir.path().join("gpt4.vocab")).unwrap();
        let lines: Vec<_> = listing.lines().collect();

        // leaves are listed by id and rendered as their real byte
        assert_eq!(lines[255 - usize::from(b'a')], format!("[a] {}", 255 - b'a'));
        assert_eq!(lines[258], "[ab][cd] -> [abcd] 258");
        assert_eq!(lines.last(), Some(&"[<|endofprompt|>] 100276"));
    }

    #[test]
    fn test_from_tiktoken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranks.tiktoken");

        let mut entries: Vec<_> = synthetic_ranks().into_iter().collect();
        entries.sort_by_key(|&(_, rank)| rank);
        let content: String = entries
            .iter()
            .map(|(token, rank)| format!("{} {rank}\n", STANDARD.encode(token)))
            .collect();
        std::fs::write(&path, content).unwrap();

        let tokenizer = Gpt4Tokenizer::from_tiktoken_file(&path).unwrap();
        let expected = Gpt4Tokenizer::from_ranks(&synthetic_ranks()).unwrap();
        assert_eq!(tokenizer.merges(), expected.merges());
        assert_eq!(tokenizer.encode_ordinary("abcd").unwrap(), vec![258]);
    }
}
