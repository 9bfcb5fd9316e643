//! Special token segmentation.
//!
//! Before chunking, recognized special tokens cut the text into literal
//! spans. Each span is encoded normally; each special token becomes its
//! single reserved id.

use minbpe_core::{AllowedSpecial, Result, SpecialTokenRegistry, Token, TokenizerError};
use regex::Regex;

/// A piece of input text after special token segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Ordinary text, to be chunked and BPE-encoded
    Text(&'t str),
    /// A recognized special token
    Special(Token),
}

/// Split `text` on the special tokens that `allowed` recognizes.
///
/// With [`AllowedSpecial::NoneRaise`] any registered special token in the
/// text is an error. When two recognized tokens match at the same
/// position, the longer one wins.
pub fn split_special<'t>(
    text: &'t str,
    registry: &SpecialTokenRegistry,
    allowed: &AllowedSpecial,
) -> Result<Vec<Segment<'t>>> {
    if let AllowedSpecial::NoneRaise = allowed {
        if let Some(token) = registry.find_in(text) {
            return Err(TokenizerError::SpecialTokenInText(token.to_string()));
        }
    }

    let mut tokens: Vec<(&str, Token)> = registry
        .iter()
        .filter(|(token, _)| allowed.allows(token))
        .collect();

    if tokens.is_empty() {
        return Ok(whole(text));
    }

    // stable sort keeps registration order among equal lengths
    tokens.sort_by_key(|(token, _)| std::cmp::Reverse(token.len()));

    let alternation = tokens
        .iter()
        .map(|(token, _)| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    let re = Regex::new(&alternation)
        .map_err(|e| TokenizerError::InvalidConfig(format!("special token pattern: {e}")))?;

    let mut segments = Vec::new();
    let mut last = 0;

    for mat in re.find_iter(text) {
        if mat.start() > last {
            segments.push(Segment::Text(&text[last..mat.start()]));
        }
        // every alternative is a registered token
        if let Some(id) = registry.get_id(mat.as_str()) {
            segments.push(Segment::Special(id));
        }
        last = mat.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }

    Ok(segments)
}

fn whole(text: &str) -> Vec<Segment<'_>> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Segment::Text(text)]
    }
}
