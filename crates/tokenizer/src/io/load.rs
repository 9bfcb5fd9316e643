//! Load functionality for trained tokenizers.
//!
//! Two inputs are supported: model files written by
//! [`TokenizerSaver`](super::TokenizerSaver), and tiktoken rank files
//! (`<base64 token> <rank>` per line) for the GPT-4 adapter.

use super::format::{ModelFile, MODEL_EXTENSION};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use minbpe_core::{MergeableRanks, Result, Token, TokenizerError};
use std::path::Path;

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a model file. The path must end in `.model`.
    pub fn load(path: &Path) -> Result<ModelFile> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(MODEL_EXTENSION) {
            return Err(TokenizerError::BadExtension(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| TokenizerError::io(path, e))?;
        let model = ModelFile::parse(&content)?;

        log::info!(
            "loaded {} merges and {} special tokens from {}",
            model.merges.len(),
            model.special_tokens.len(),
            path.display()
        );
        Ok(model)
    }

    /// Load a tiktoken rank file.
    pub fn load_tiktoken_ranks(path: &Path) -> Result<MergeableRanks> {
        let content = std::fs::read_to_string(path).map_err(|e| TokenizerError::io(path, e))?;
        let ranks = Self::parse_tiktoken_ranks(&content)?;

        log::info!("loaded {} ranks from {}", ranks.len(), path.display());
        Ok(ranks)
    }

    /// Parse tiktoken rank file content.
    pub fn parse_tiktoken_ranks(content: &str) -> Result<MergeableRanks> {
        let mut ranks = MergeableRanks::new();

        for (i, line) in content.lines().enumerate() {
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(token), Some(rank), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(TokenizerError::format(
                    line_no,
                    format!("expected `<base64> <rank>`, got {line:?}"),
                ));
            };

            let bytes = STANDARD
                .decode(token)
                .map_err(|e| TokenizerError::format(line_no, format!("bad base64: {e}")))?;
            let rank: Token = rank
                .parse()
                .map_err(|_| TokenizerError::format(line_no, format!("invalid rank {rank:?}")))?;

            if ranks.insert(bytes, rank).is_some() {
                return Err(TokenizerError::format(line_no, "duplicate token"));
            }
        }

        Ok(ranks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TokenizerSaver;
    use minbpe_core::{MergeTable, SpecialTokenRegistry, Vocabulary};

    #[test]
    fn test_load_saved_model() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("toy");

        let merges = MergeTable::from_pairs([(97, 97), (256, 98)]).unwrap();
        let vocab = Vocabulary::from_merges(&merges);
        let special = SpecialTokenRegistry::from_pairs([("<end>", 1000)]).unwrap();
        TokenizerSaver::new(r"\w+", &merges, &vocab, &special)
            .save(&prefix)
            .unwrap();

        let model = TokenizerLoader::load(&dir.path().join("toy.model")).unwrap();
        assert_eq!(model.pattern, r"\w+");
        assert_eq!(model.merges, merges);
        assert_eq!(model.special_tokens, special);
    }

    #[test]
    fn test_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.vocab");
        std::fs::write(&path, "minbpe v1\n\n0\n").unwrap();

        assert!(matches!(
            TokenizerLoader::load(&path),
            Err(TokenizerError::BadExtension(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TokenizerLoader::load(&dir.path().join("absent.model")),
            Err(TokenizerError::Io { .. })
        ));
    }

    #[test]
    fn test_parse_tiktoken_ranks() {
        // "IQ==" is b"!", "aGk=" is b"hi"
        let ranks = TokenizerLoader::parse_tiktoken_ranks("IQ== 0\naGk= 256\n\n").unwrap();
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks.get(&b"!"[..]), Some(&0));
        assert_eq!(ranks.get(&b"hi"[..]), Some(&256));
    }

    #[test]
    fn test_parse_tiktoken_errors() {
        assert!(matches!(
            TokenizerLoader::parse_tiktoken_ranks("IQ== 0\n!!! 1\n"),
            Err(TokenizerError::Format { line: 2, .. })
        ));
        assert!(matches!(
            TokenizerLoader::parse_tiktoken_ranks("IQ==\n"),
            Err(TokenizerError::Format { line: 1, .. })
        ));
        assert!(matches!(
            TokenizerLoader::parse_tiktoken_ranks("IQ== x\n"),
            Err(TokenizerError::Format { line: 1, .. })
        ));
    }
}
