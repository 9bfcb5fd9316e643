//! Text splitting for pre-tokenization.
//!
//! Text is split into chunks before BPE runs, and merges never cross a
//! chunk boundary. Training and encoding share one [`Splitter`], so learned
//! merges are always applied against the same segmentation.

use fancy_regex::Regex;
use minbpe_core::{Result, TokenizerError};

/// GPT-2 split pattern.
pub const GPT2_SPLIT_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// GPT-4 (cl100k) split pattern.
pub const GPT4_SPLIT_PATTERN: &str = r"'(?i:[sdmt]|ll|ve|re)|[^\r\n\p{L}\p{N}]?+\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]++[\r\n]*|\s*[\r\n]|\s+(?!\S)|\s+";

/// Splitting patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SplitPattern {
    /// No splitting: the whole text is one chunk
    #[default]
    NoSplit,
    /// [`GPT2_SPLIT_PATTERN`]
    Gpt2,
    /// [`GPT4_SPLIT_PATTERN`]
    Gpt4,
    /// Custom regex pattern
    Custom(String),
}

impl SplitPattern {
    /// Map a stored pattern string back to a pattern; empty means no split.
    pub fn from_pattern(pattern: &str) -> Self {
        match pattern {
            "" => Self::NoSplit,
            GPT2_SPLIT_PATTERN => Self::Gpt2,
            GPT4_SPLIT_PATTERN => Self::Gpt4,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The pattern string; empty for [`SplitPattern::NoSplit`].
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSplit => "",
            Self::Gpt2 => GPT2_SPLIT_PATTERN,
            Self::Gpt4 => GPT4_SPLIT_PATTERN,
            Self::Custom(pattern) => pattern,
        }
    }
}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
    /// Compiled pattern; `None` when not splitting
    regex: Option<Regex>,
}

impl Splitter {
    /// Create a new splitter, compiling the pattern.
    pub fn new(pattern: SplitPattern) -> Result<Self> {
        let pattern = SplitPattern::from_pattern(pattern.as_str());
        let regex = match pattern {
            SplitPattern::NoSplit => None,
            ref other => Some(Regex::new(other.as_str())?),
        };

        Ok(Self { pattern, regex })
    }

    /// Get the split pattern.
    pub fn pattern(&self) -> &SplitPattern {
        &self.pattern
    }

    /// Split text into chunks.
    ///
    /// The chunks concatenate back to exactly `text`: any span the pattern
    /// does not match becomes a chunk of its own.
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let Some(regex) = &self.regex else {
            return Ok(vec![text]);
        };

        let mut chunks = Vec::new();
        let mut last = 0;

        for mat in regex.find_iter(text) {
            let mat = mat.map_err(|e| TokenizerError::Split(e.to_string()))?;
            if mat.start() == mat.end() {
                continue;
            }
            if mat.start() > last {
                chunks.push(&text[last..mat.start()]);
            }
            chunks.push(mat.as_str());
            last = mat.end();
        }

        if last < text.len() {
            chunks.push(&text[last..]);
        }

        Ok(chunks)
    }
}
