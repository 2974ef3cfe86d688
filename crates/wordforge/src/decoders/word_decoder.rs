//! # Word Decoder

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{WFResult, WordforgeError},
    types::TokenId,
    vocab::{DEFAULT_END_OF_WORD_SUFFIX, SpecialVocab, Vocabulary, strip_end_of_word},
};

/// Punctuation that [`DecoderOptions::cleanup_spaces`] reattaches.
const CLEANUP_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// Options for [`WordDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// The end-of-word suffix, turned back into a space.
    pub end_of_word_suffix: Option<CompactString>,

    /// Remove the space before `.`, `,`, `!` and `?`.
    pub cleanup_spaces: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            end_of_word_suffix: Some(DEFAULT_END_OF_WORD_SUFFIX.into()),
            cleanup_spaces: true,
        }
    }
}

impl DecoderOptions {
    /// Sets the end-of-word suffix.
    pub fn with_end_of_word_suffix<S: Into<CompactString>>(
        self,
        suffix: Option<S>,
    ) -> Self {
        Self {
            end_of_word_suffix: suffix.map(Into::into),
            ..self
        }
    }

    /// Sets space cleanup.
    pub fn with_cleanup_spaces(
        self,
        cleanup_spaces: bool,
    ) -> Self {
        Self {
            cleanup_spaces,
            ..self
        }
    }
}

/// Reassembles text from token ids.
///
/// Decoding is best effort: lowercasing, accent stripping and Unicode
/// normalization are not reversible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDecoder {
    options: DecoderOptions,
}

impl WordDecoder {
    /// Create a decoder.
    pub fn new(options: DecoderOptions) -> Self {
        Self { options }
    }

    /// The decoder options.
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode `ids` into text.
    ///
    /// ## Arguments
    /// * `ids` - The token ids.
    /// * `vocab` - The vocabulary.
    /// * `specials` - The special token registry.
    /// * `skip_special_tokens` - Drop special tokens from the output.
    ///
    /// ## Returns
    /// The text, or [`WordforgeError::UnknownId`] for an id outside `vocab`.
    pub fn decode(
        &self,
        ids: &[TokenId],
        vocab: &Vocabulary,
        specials: &SpecialVocab,
        skip_special_tokens: bool,
    ) -> WFResult<String> {
        let suffix = self.options.end_of_word_suffix.as_deref();
        let mut text = String::new();

        for &id in ids {
            let token = vocab
                .get_token(id)
                .ok_or(WordforgeError::UnknownId { id })?;

            if specials.is_special_id(id) {
                if skip_special_tokens {
                    continue;
                }
                // Specials stand alone as words.
                if !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                }
                text.push_str(token);
                text.push(' ');
                continue;
            }

            let (stem, end_of_word) = strip_end_of_word(token, suffix);
            text.push_str(stem);
            if end_of_word {
                text.push(' ');
            }
        }

        let mut text = text.trim().to_string();
        if self.options.cleanup_spaces {
            text = cleanup_spaces(&text);
        }
        Ok(text)
    }
}

fn cleanup_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' && chars.peek().is_some_and(|n| CLEANUP_PUNCTUATION.contains(n)) {
            continue;
        }
        out.push(c);
    }
    out
}
