//! # Pre-Tokenizer

use serde::{Deserialize, Serialize};
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::{
    errors::WFResult,
    pretokenizers::{RegexPattern, RegexWrapper},
};

/// Span splitting rules for [`PreTokenizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreTokenizerConfig {
    /// Whitespace separates spans and is dropped;
    /// every punctuation character is its own span.
    #[default]
    WhitespacePunctuation,

    /// Whitespace separates spans and is dropped.
    Whitespace,

    /// Every match of the pattern is a span.
    ///
    /// Unmatched text between matches is split on whitespace.
    Pattern {
        /// The span pattern.
        pattern: RegexPattern,
    },
}

impl PreTokenizerConfig {
    /// Build a [`PreTokenizerConfig::Pattern`].
    pub fn pattern<P: Into<RegexPattern>>(pattern: P) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
        }
    }
}

/// A span of pre-tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreTokenSpan<'a> {
    /// The span text.
    pub text: &'a str,

    /// Byte offset of the span start in the pre-tokenized text.
    pub start: usize,

    /// Byte offset of the span end in the pre-tokenized text.
    pub end: usize,
}

impl<'a> PreTokenSpan<'a> {
    fn new(
        source: &'a str,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            text: &source[start..end],
            start,
            end,
        }
    }
}

/// Is `c` punctuation?
///
/// ASCII symbols count as punctuation, as do all Unicode `P*` categories.
pub fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_punctuation();
    }
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Splits normalized text into spans.
#[derive(Debug, Clone)]
pub struct PreTokenizer {
    config: PreTokenizerConfig,
    regex: Option<RegexWrapper>,
}

impl Default for PreTokenizer {
    fn default() -> Self {
        Self {
            config: PreTokenizerConfig::default(),
            regex: None,
        }
    }
}

impl PreTokenizer {
    /// Build a pre-tokenizer; patterns are compiled here.
    pub fn new(config: PreTokenizerConfig) -> WFResult<Self> {
        let regex = match &config {
            PreTokenizerConfig::Pattern { pattern } => Some(pattern.compile()?),
            _ => None,
        };
        Ok(Self { config, regex })
    }

    /// The active rules.
    pub fn config(&self) -> &PreTokenizerConfig {
        &self.config
    }

    /// Split `text` into non-empty spans, in order.
    pub fn pre_tokenize<'a>(
        &self,
        text: &'a str,
    ) -> Vec<PreTokenSpan<'a>> {
        let mut spans = Vec::new();
        match (&self.config, &self.regex) {
            (PreTokenizerConfig::Pattern { .. }, Some(regex)) => {
                let mut last = 0;
                for range in regex.find_ranges(text) {
                    if range.is_empty() {
                        continue;
                    }
                    split_runs(text, last, range.start, false, &mut spans);
                    spans.push(PreTokenSpan::new(text, range.start, range.end));
                    last = range.end;
                }
                split_runs(text, last, text.len(), false, &mut spans);
            }
            (PreTokenizerConfig::Whitespace, _) => {
                split_runs(text, 0, text.len(), false, &mut spans);
            }
            _ => {
                split_runs(text, 0, text.len(), true, &mut spans);
            }
        }
        spans
    }
}

/// Split `text[from..to]` on whitespace, optionally isolating punctuation.
fn split_runs<'a>(
    text: &'a str,
    from: usize,
    to: usize,
    isolate_punctuation: bool,
    spans: &mut Vec<PreTokenSpan<'a>>,
) {
    let mut run_start: Option<usize> = None;
    for (offset, c) in text[from..to].char_indices() {
        let pos = from + offset;
        if c.is_whitespace() {
            if let Some(start) = run_start.take() {
                spans.push(PreTokenSpan::new(text, start, pos));
            }
        } else if isolate_punctuation && is_punctuation(c) {
            if let Some(start) = run_start.take() {
                spans.push(PreTokenSpan::new(text, start, pos));
            }
            spans.push(PreTokenSpan::new(text, pos, pos + c.len_utf8()));
        } else if run_start.is_none() {
            run_start = Some(pos);
        }
    }
    if let Some(start) = run_start {
        spans.push(PreTokenSpan::new(text, start, to));
    }
}
