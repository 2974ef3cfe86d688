//! # BPE Model

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    models::span_encoders::{SpanEncoder, SpanEncoderSelector, Symbol},
    training::TrainResults,
    types::TokenId,
    vocab::{DEFAULT_END_OF_WORD_SUFFIX, MergeTable, SpecialToken, Vocabulary, atomic_symbols},
};

/// Options for [`BpeModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BpeModelOptions {
    /// The suffix carried by the last symbol of each span.
    ///
    /// Must match the suffix the model was trained with.
    pub end_of_word_suffix: Option<CompactString>,

    /// Join adjacent unknown symbols into a single unknown token.
    pub fuse_unknown: bool,

    /// The merge application strategy.
    pub span_encoder: SpanEncoderSelector,
}

impl Default for BpeModelOptions {
    fn default() -> Self {
        Self {
            end_of_word_suffix: Some(DEFAULT_END_OF_WORD_SUFFIX.into()),
            fuse_unknown: false,
            span_encoder: SpanEncoderSelector::default(),
        }
    }
}

impl BpeModelOptions {
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

    /// Sets unknown fusing.
    pub fn with_fuse_unknown(
        self,
        fuse_unknown: bool,
    ) -> Self {
        Self {
            fuse_unknown,
            ..self
        }
    }

    /// Sets the span encoder.
    pub fn with_span_encoder(
        self,
        span_encoder: SpanEncoderSelector,
    ) -> Self {
        Self {
            span_encoder,
            ..self
        }
    }
}

/// A token produced by [`BpeModel::encode_span`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelToken {
    /// The token id.
    pub id: TokenId,

    /// The token string.
    pub token: CompactString,

    /// The start byte offset, local to the span.
    pub start: usize,

    /// The end byte offset, local to the span.
    pub end: usize,
}

/// A trained subword model: vocabulary plus ranked merges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BpeModel {
    vocab: Vocabulary,
    merges: MergeTable,
    options: BpeModelOptions,
}

impl From<TrainResults> for BpeModel {
    fn from(results: TrainResults) -> Self {
        Self::new(results.vocab, results.merges, BpeModelOptions::default())
    }
}

impl BpeModel {
    /// Create a model.
    pub fn new(
        vocab: Vocabulary,
        merges: MergeTable,
        options: BpeModelOptions,
    ) -> Self {
        Self {
            vocab,
            merges,
            options,
        }
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Mutable vocabulary access, for registering special tokens.
    ///
    /// Merges index by id, so appending entries keeps them valid.
    pub(crate) fn vocab_mut(&mut self) -> &mut Vocabulary {
        &mut self.vocab
    }

    /// The merge table.
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// The model options.
    pub fn options(&self) -> &BpeModelOptions {
        &self.options
    }

    /// Replace the model options.
    pub fn set_options(
        &mut self,
        options: BpeModelOptions,
    ) {
        self.options = options;
    }

    /// Build the span encoder selected by the options.
    pub fn span_encoder(&self) -> Box<dyn SpanEncoder> {
        self.options.span_encoder.build()
    }

    /// Encode one pre-tokenized span.
    ///
    /// ## Arguments
    /// * `span` - The span text.
    /// * `unk` - The token standing in for unknown symbols;
    ///   with `None`, unknown symbols are dropped.
    pub fn encode_span(
        &self,
        span: &str,
        unk: Option<&SpecialToken>,
    ) -> Vec<ModelToken> {
        let mut tokens = Vec::new();
        self.encode_span_with(self.span_encoder().as_mut(), span, unk, &mut tokens);
        tokens
    }

    /// Encode one pre-tokenized span, appending to `tokens`.
    ///
    /// Offsets of the appended tokens are local to `span`.
    pub fn encode_span_with(
        &self,
        encoder: &mut dyn SpanEncoder,
        span: &str,
        unk: Option<&SpecialToken>,
        tokens: &mut Vec<ModelToken>,
    ) {
        let suffix = self.options.end_of_word_suffix.as_deref();
        let mut symbols: Vec<Symbol> = atomic_symbols(span, suffix)
            .into_iter()
            .map(|(range, symbol)| Symbol {
                id: self.vocab.get_id(&symbol),
                start: range.start,
                end: range.end,
            })
            .collect();

        encoder.merge_symbols(&self.merges, &mut symbols);

        let fuse = self.options.fuse_unknown;
        let mut last_unknown = false;
        for symbol in symbols {
            let known = symbol
                .id
                .and_then(|id| self.vocab.get_token(id).map(|token| (id, token)));
            match (known, unk) {
                (Some((id, token)), _) => {
                    tokens.push(ModelToken {
                        id,
                        token: token.into(),
                        start: symbol.start,
                        end: symbol.end,
                    });
                    last_unknown = false;
                }
                (None, Some(unk)) => {
                    if fuse && last_unknown {
                        if let Some(prev) = tokens.last_mut() {
                            prev.end = symbol.end;
                            continue;
                        }
                    }
                    tokens.push(ModelToken {
                        id: unk.id,
                        token: unk.content.clone(),
                        start: symbol.start,
                        end: symbol.end,
                    });
                    last_unknown = true;
                }
                (None, None) => {
                    log::debug!(
                        "dropping unknown symbol {:?} at {:?}",
                        span.get(symbol.range()),
                        symbol.range()
                    );
                }
            }
        }
    }
}
