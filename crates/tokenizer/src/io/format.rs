//! Format definitions for tokenizer serialization.
//!
//! A model file is line oriented:
//!
//! ```text
//! minbpe v1
//! <split pattern, may be empty>
//! <number of special tokens>
//! <token> <id>          one per special token
//! <left> <right>        one per merge, in learn order
//! ```
//!
//! Merge ids are not stored; the k-th merge line is id `256 + k`.
//! The companion vocabulary file is for humans and never read back.

use minbpe_core::{
    render_token, MergeTable, Result, SpecialTokenRegistry, Token, TokenizerError, Vocabulary,
};
use std::io::{self, Write};

/// Version tag on the first line of every model file.
pub const MODEL_VERSION: &str = "minbpe v1";

/// Extension of model files.
pub const MODEL_EXTENSION: &str = "model";

/// Extension of human-readable vocabulary files.
pub const VOCAB_EXTENSION: &str = "vocab";

/// Everything a model file stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFile {
    /// Split pattern string; empty means no splitting
    pub pattern: String,
    /// Special tokens in file order
    pub special_tokens: SpecialTokenRegistry,
    /// Merges in learn order
    pub merges: MergeTable,
}

impl ModelFile {
    /// Check that the model can be represented in the line format.
    ///
    /// Special tokens containing whitespace and patterns containing line
    /// breaks would not parse back.
    pub fn validate(&self) -> Result<()> {
        if let Some((token, _)) = self
            .special_tokens
            .iter()
            .find(|(token, _)| token.chars().any(char::is_whitespace))
        {
            return Err(TokenizerError::InvalidConfig(format!(
                "special token {token:?} contains whitespace and cannot be saved"
            )));
        }
        if self.pattern.contains(['\n', '\r']) {
            return Err(TokenizerError::InvalidConfig(
                "split pattern contains a line break and cannot be saved".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the model in the line format. Call [`ModelFile::validate`] first.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{MODEL_VERSION}")?;
        writeln!(writer, "{}", self.pattern)?;
        writeln!(writer, "{}", self.special_tokens.len())?;
        for (token, id) in self.special_tokens.iter() {
            writeln!(writer, "{token} {id}")?;
        }
        for ((left, right), _) in self.merges.iter() {
            writeln!(writer, "{left} {right}")?;
        }
        Ok(())
    }

    /// Parse a model file.
    pub fn parse(content: &str) -> Result<Self> {
        // end of file is reported at the last line present
        let last_line = content.lines().count().max(1);
        let mut lines = content.lines().enumerate().map(|(i, line)| (i + 1, line));
        let mut next_line = |what: &str| {
            lines.next().ok_or_else(|| {
                TokenizerError::format(last_line, format!("unexpected end of file, expected {what}"))
            })
        };

        let (_, version) = next_line("version tag")?;
        if version.trim() != MODEL_VERSION {
            return Err(TokenizerError::VersionMismatch(version.to_string()));
        }

        let (_, pattern) = next_line("split pattern")?;
        let pattern = pattern.to_string();

        let (line_no, count) = next_line("special token count")?;
        let count: usize = parse_int(line_no, count.trim())?;

        let mut special_tokens = SpecialTokenRegistry::new();
        let mut special_lines = Vec::with_capacity(count);
        for _ in 0..count {
            let (line_no, line) = next_line("special token")?;
            let (token, id) = split_two(line_no, line)?;
            let id: Token = parse_int(line_no, id)?;
            special_tokens
                .insert(token, id)
                .map_err(|e| TokenizerError::format(line_no, e.to_string()))?;
            special_lines.push((line_no, id));
        }

        let mut merges = MergeTable::new();
        for (line_no, line) in lines {
            let (left, right) = split_two(line_no, line)?;
            let pair = (parse_int(line_no, left)?, parse_int(line_no, right)?);
            merges
                .push(pair)
                .map_err(|e| TokenizerError::format(line_no, e.to_string()))?;
        }

        if let Some(&(line_no, id)) = special_lines
            .iter()
            .find(|&&(_, id)| id < merges.next_id())
        {
            return Err(TokenizerError::format(
                line_no,
                format!(
                    "special token id {id} collides with the merge vocabulary (ids < {})",
                    merges.next_id()
                ),
            ));
        }

        Ok(Self {
            pattern,
            special_tokens,
            merges,
        })
    }
}

/// Split a line into exactly two whitespace-separated fields.
fn split_two(line_no: usize, line: &str) -> Result<(&str, &str)> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(TokenizerError::format(
            line_no,
            format!("expected two fields, got {line:?}"),
        )),
    }
}

fn parse_int<T: std::str::FromStr>(line_no: usize, field: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| TokenizerError::format(line_no, format!("invalid integer {field:?}")))
}

/// Write the human-readable vocabulary listing.
///
/// One line per id: `[token] id` for leaves and
/// `[left][right] -> [token] id` for merges, then one line per special token.
pub fn write_vocab<W: Write>(
    writer: &mut W,
    vocab: &Vocabulary,
    merges: &MergeTable,
    special_tokens: &SpecialTokenRegistry,
) -> io::Result<()> {
    for (id, bytes) in vocab.iter() {
        let token = render_token(bytes);
        match merges.pair_of(id) {
            Some((left, right)) => {
                let left = vocab.get(left).map(render_token).unwrap_or_default();
                let right = vocab.get(right).map(render_token).unwrap_or_default();
                writeln!(writer, "[{left}][{right}] -> [{token}] {id}")?;
            }
            None => writeln!(writer, "[{token}] {id}")?,
        }
    }

    for (token, id) in special_tokens.iter() {
        writeln!(writer, "[{}] {id}", render_token(token.as_bytes()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelFile {
        ModelFile {
            pattern: r"\s+|\w+".to_string(),
            special_tokens: SpecialTokenRegistry::from_pairs([("<|endoftext|>", 300)]).unwrap(),
            merges: MergeTable::from_pairs([(97, 97), (256, 98)]).unwrap(),
        }
    }

    fn render(model: &ModelFile) -> String {
        let mut buf = Vec::new();
        model.validate().unwrap();
        model.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_layout() {
        assert_eq!(
            render(&sample()),
            "minbpe v1\n\\s+|\\w+\n1\n<|endoftext|> 300\n97 97\n256 98\n"
        );
    }

    #[test]
    fn test_parse_written_model() {
        let model = sample();
        assert_eq!(ModelFile::parse(&render(&model)).unwrap(), model);
    }

    #[test]
    fn test_parse_empty_pattern() {
        let model = ModelFile::parse("minbpe v1\n\n0\n104 105\n").unwrap();
        assert_eq!(model.pattern, "");
        assert!(model.special_tokens.is_empty());
        assert_eq!(model.merges.get((104, 105)), Some(256));
    }

    #[test]
    fn test_version_mismatch() {
        assert!(matches!(
            ModelFile::parse("minbpe v2\n\n0\n"),
            Err(TokenizerError::VersionMismatch(_))
        ));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\nx\n"),
            Err(TokenizerError::Format { line: 3, .. })
        ));
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\n0\n97 nope\n"),
            Err(TokenizerError::Format { line: 4, .. })
        ));
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\n0\n97 98 99\n"),
            Err(TokenizerError::Format { line: 4, .. })
        ));
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\n2\n<a> 300\n"),
            Err(TokenizerError::Format { line: 4, .. })
        ));
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\n0\n97 97\n\n98 98\n"),
            Err(TokenizerError::Format { line: 5, .. })
        ));
    }

    #[test]
    fn test_merge_referencing_unknown_id() {
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\n0\n97 300\n"),
            Err(TokenizerError::Format { line: 4, .. })
        ));
    }

    #[test]
    fn test_special_colliding_with_merges() {
        assert!(matches!(
            ModelFile::parse("minbpe v1\n\n1\n<a> 256\n97 98\n"),
            Err(TokenizerError::Format { line: 4, .. })
        ));
    }

    #[test]
    fn test_whitespace_special_token_rejected() {
        let model = ModelFile {
            special_tokens: SpecialTokenRegistry::from_pairs([("<a b>", 300)]).unwrap(),
            ..Default::default()
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_write_vocab() {
        let model = sample();
        let vocab = Vocabulary::from_merges(&model.merges);
        let mut buf = Vec::new();
        write_vocab(&mut buf, &vocab, &model.merges, &model.special_tokens).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 256 + 2 + 1);
        assert_eq!(lines[10], "[\\u000a] 10");
        assert_eq!(lines[97], "[a] 97");
        assert_eq!(lines[256], "[a][a] -> [aa] 256");
        assert_eq!(lines[257], "[aa][b] -> [aab] 257");
        assert_eq!(lines[258], "[<|endoftext|>] 300");
    }
}
