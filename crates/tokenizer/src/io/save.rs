//! Save functionality for trained tokenizers.
//!
//! Saving writes two files next to each other: `<prefix>.model`, which
//! [`TokenizerLoader`](super::TokenizerLoader) reads back, and
//! `<prefix>.vocab`, a listing for human inspection.

use super::format::{write_vocab, ModelFile, MODEL_EXTENSION, VOCAB_EXTENSION};
use minbpe_core::{MergeTable, Result, SpecialTokenRegistry, TokenizerError, Vocabulary};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Split pattern string
    pattern: &'a str,
    /// Merge rules reference
    merges: &'a MergeTable,
    /// Vocabulary reference, used for the listing only
    vocab: &'a Vocabulary,
    /// Special tokens reference
    special_tokens: &'a SpecialTokenRegistry,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(
        pattern: &'a str,
        merges: &'a MergeTable,
        vocab: &'a Vocabulary,
        special_tokens: &'a SpecialTokenRegistry,
    ) -> Self {
        Self {
            pattern,
            merges,
            vocab,
            special_tokens,
        }
    }

    /// Save `<prefix>.model` and `<prefix>.vocab`.
    ///
    /// The extensions are appended, so a prefix like `out/v1.2` keeps its dot.
    pub fn save(&self, prefix: &Path) -> Result<()> {
        let model = ModelFile {
            pattern: self.pattern.to_string(),
            special_tokens: self.special_tokens.clone(),
            merges: self.merges.clone(),
        };
        model.validate()?;

        let model_path = with_suffix(prefix, MODEL_EXTENSION);
        write_file(&model_path, |w| model.write_to(w))?;

        self.save_vocab(prefix)?;

        log::info!(
            "saved {} merges and {} special tokens to {}",
            self.merges.len(),
            self.special_tokens.len(),
            model_path.display()
        );
        Ok(())
    }

    /// Save only the human-readable `<prefix>.vocab` listing.
    pub fn save_vocab(&self, prefix: &Path) -> Result<()> {
        let vocab_path = with_suffix(prefix, VOCAB_EXTENSION);
        write_file(&vocab_path, |w| {
            write_vocab(w, self.vocab, self.merges, self.special_tokens)
        })?;

        log::debug!("wrote vocabulary listing to {}", vocab_path.display());
        Ok(())
    }
}

/// `prefix` + `.` + `extension`, without replacing an existing extension.
pub(crate) fn with_suffix(prefix: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<()> {
    let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(|e| TokenizerError::io(path, e))?;
    writer.flush().map_err(|e| TokenizerError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_suffix_keeps_dots() {
        assert_eq!(
            with_suffix(Path::new("out/v1.2"), MODEL_EXTENSION),
            PathBuf::from("out/v1.2.model")
        );
    }

    #[test]
    fn test_save_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("toy");

        let merges = MergeTable::from_pairs([(104, 105)]).unwrap();
        let vocab = Vocabulary::from_merges(&merges);
        let special = SpecialTokenRegistry::from_pairs([("<end>", 1000)]).unwrap();

        TokenizerSaver::new("", &merges, &vocab, &special)
            .save(&prefix)
            .unwrap();

        let model = std::fs::read_to_string(dir.path().join("toy.model")).unwrap();
        assert_eq!(model, "minbpe v1\n\n1\n<end> 1000\n104 105\n");

        let listing = std::fs::read_to_string(dir.path().join("toy.vocab")).unwrap();
        assert!(listing.contains("[h][i] -> [hi] 256"));
        assert!(listing.ends_with("[<end>] 1000\n"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("missing").join("toy");
        let merges = MergeTable::new();
        let vocab = Vocabulary::default();
        let special = SpecialTokenRegistry::new();

        assert!(matches!(
            TokenizerSaver::new("", &merges, &vocab, &special).save(&prefix),
            Err(TokenizerError::Io { .. })
        ));
    }
}
