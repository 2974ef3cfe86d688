//! # Tokenizer State Snapshots

use std::sync::Arc;

use compact_str::CompactString;

use crate::{
    decoders::WordDecoder,
    encoding::{Encoding, PaddingConfig, PaddingLength, TruncationConfig},
    errors::{WFResult, WordforgeError},
    models::{BpeModel, SpanEncoder},
    normalizers::{NormalizationForm, Normalizer, NormalizerConfig},
    pretokenizers::{PreTokenizer, PreTokenizerConfig},
    processors::{PostProcessorConfig, TemplateProcessor},
    tokenizer::TokenizerConfig,
    training::{BpeTrainer, BpeTrainerOptions, CancelToken, utility::SpanSource},
    types::TokenId,
    vocab::{
        InputSegment,
        MergeTable,
        SpecialMatcher,
        SpecialToken,
        SpecialVocab,
        Vocabulary,
        special_vocab::{PAD_NAME, UNK_NAME, split_input},
    },
};

/// An immutable view of a tokenizer's complete configuration.
///
/// Every encode and decode reads one snapshot from start to finish;
/// changes to a [`Tokenizer`](crate::Tokenizer) publish a new snapshot and
/// never touch one in use.
#[derive(Debug, Clone)]
pub struct TokenizerState {
    config: TokenizerConfig,
    normalizer: Normalizer,
    pre_tokenizer: PreTokenizer,
    model: Arc<BpeModel>,
    specials: SpecialVocab,
    matcher: Option<SpecialMatcher>,
    processor: TemplateProcessor,
    decoder: WordDecoder,
}

impl TokenizerState {
    /// Build an untrained state: the default special tokens, no merges.
    pub fn new(config: TokenizerConfig) -> WFResult<Self> {
        let mut vocab = Vocabulary::new();
        let specials = SpecialVocab::with_defaults(&mut vocab)?;
        let model = BpeModel::new(vocab, MergeTable::default(), config.model.clone());
        Self::from_parts(config, model, specials)
    }

    /// Assemble a state from its parts, validating them together.
    ///
    /// ## Arguments
    /// * `config` - The configuration; `config.model` replaces the model's options,
    ///   and its end-of-word suffix must equal the decoder's.
    /// * `model` - The trained model.
    /// * `specials` - The special token registry; every entry must be in the
    ///   model's vocabulary.
    pub fn from_parts(
        config: TokenizerConfig,
        mut model: BpeModel,
        specials: SpecialVocab,
    ) -> WFResult<Self> {
        for token in specials.iter() {
            if model.vocab().get_id(&token.content) != Some(token.id) {
                return Err(WordforgeError::config(format!(
                    "special token {:?} is not in the vocabulary at id {}",
                    token.content, token.id
                )));
            }
        }
        if config.model.end_of_word_suffix != config.decoder.end_of_word_suffix {
            return Err(WordforgeError::config(format!(
                "model end-of-word suffix {:?} does not match decoder suffix {:?}",
                config.model.end_of_word_suffix, config.decoder.end_of_word_suffix
            )));
        }
        model.set_options(config.model.clone());

        let pre_tokenizer = PreTokenizer::new(config.pre_tokenizer.clone())?;
        let processor = TemplateProcessor::from_config(&config.post_processor)?;
        processor.validate(&specials)?;
        if config.padding.is_some() && specials.get(PAD_NAME).is_none() {
            return Err(WordforgeError::config(
                "padding requires a registered pad token",
            ));
        }

        Ok(Self {
            normalizer: Normalizer::new(config.normalizer.clone()),
            pre_tokenizer,
            matcher: SpecialMatcher::build(&specials)?,
            model: Arc::new(model),
            specials,
            processor,
            decoder: WordDecoder::new(config.decoder.clone()),
            config,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// The model.
    pub fn model(&self) -> &BpeModel {
        &self.model
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        self.model.vocab()
    }

    /// The special token registry.
    pub fn specials(&self) -> &SpecialVocab {
        &self.specials
    }

    /// The post-processor.
    pub fn processor(&self) -> &TemplateProcessor {
        &self.processor
    }

    /// The number of vocabulary entries, special tokens included.
    pub fn vocab_size(&self) -> usize {
        self.vocab().len()
    }

    /// Look up the id of a token string.
    pub fn token_to_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.vocab().get_id(token)
    }

    /// Look up the string of a token id.
    pub fn id_to_token(
        &self,
        id: TokenId,
    ) -> WFResult<&str> {
        self.vocab()
            .get_token(id)
            .ok_or(WordforgeError::UnknownId { id })
    }

    /// Look up a special token by logical name or surface string.
    pub fn special_token(
        &self,
        key: &str,
    ) -> Option<&SpecialToken> {
        self.specials.resolve(key)
    }

    pub(crate) fn set_normalizer_config(
        &mut self,
        normalizer: NormalizerConfig,
    ) {
        log::debug!("normalizer: {normalizer:?}");
        self.normalizer = Normalizer::new(normalizer.clone());
        self.config.normalizer = normalizer;
    }

    pub(crate) fn set_normalization_form(
        &mut self,
        form: NormalizationForm,
    ) {
        let normalizer = self.config.normalizer.clone().with_form(form);
        self.set_normalizer_config(normalizer);
    }

    pub(crate) fn set_pre_tokenizer(
        &mut self,
        pre_tokenizer: PreTokenizerConfig,
    ) -> WFResult<()> {
        log::debug!("pre-tokenizer: {pre_tokenizer:?}");
        self.pre_tokenizer = PreTokenizer::new(pre_tokenizer.clone())?;
        self.config.pre_tokenizer = pre_tokenizer;
        Ok(())
    }

    pub(crate) fn add_special_tokens<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
    ) -> WFResult<Vec<TokenId>> {
        let model = Arc::make_mut(&mut self.model);
        let ids = tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                self.specials.register(token, token, model.vocab_mut())
            })
            .collect::<WFResult<Vec<_>>>()?;
        self.matcher = SpecialMatcher::build(&self.specials)?;
        log::debug!("registered {} special tokens: {ids:?}", ids.len());
        Ok(ids)
    }

    pub(crate) fn set_post_processor(
        &mut self,
        post_processor: PostProcessorConfig,
    ) -> WFResult<()> {
        let processor = TemplateProcessor::from_config(&post_processor)?;
        processor.validate(&self.specials)?;
        log::debug!("post-processor: {post_processor:?}");
        self.processor = processor;
        self.config.post_processor = post_processor;
        Ok(())
    }

    pub(crate) fn set_truncation(
        &mut self,
        truncation: Option<TruncationConfig>,
    ) {
        log::debug!("truncation: {truncation:?}");
        self.config.truncation = truncation;
    }

    pub(crate) fn set_padding(
        &mut self,
        padding: Option<PaddingConfig>,
    ) -> WFResult<()> {
        if padding.is_some() {
            self.pad_token()?;
        }
        log::debug!("padding: {padding:?}");
        self.config.padding = padding;
        Ok(())
    }

    /// Train a new model, keeping every special token at its id.
    pub(crate) fn train<S, I>(
        &mut self,
        sources: S,
        options: BpeTrainerOptions,
        cancel: Option<CancelToken>,
    ) -> WFResult<()>
    where
        S: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: AsRef<str> + Send + Sync,
    {
        let options = options.with_end_of_word_suffix(self.config.model.end_of_word_suffix.clone());
        let source = SpanSource {
            normalizer: self.normalizer.clone(),
            pre_tokenizer: self.pre_tokenizer.clone(),
            specials: self.matcher.clone(),
        };

        let mut trainer: BpeTrainer = BpeTrainer::new(options, source)?;
        if let Some(cancel) = cancel {
            trainer = trainer.with_cancel_token(cancel);
        }
        for samples in sources {
            trainer.update_from_samples(samples);
        }

        let mut base_vocab = Vocabulary::new();
        for token in self.specials.iter() {
            base_vocab.insert_at(&token.content, token.id)?;
        }

        let results = trainer.train(base_vocab)?;
        self.model = Arc::new(BpeModel::new(
            results.vocab,
            results.merges,
            self.config.model.clone(),
        ));
        Ok(())
    }

    fn pad_token(&self) -> WFResult<&SpecialToken> {
        self.specials
            .get(PAD_NAME)
            .ok_or_else(|| WordforgeError::config("padding requires a registered pad token"))
    }

    /// Run normalization, pre-tokenization and the model over one input.
    ///
    /// Offsets are into `text`; no template tokens are added.
    pub fn encode_sequence(
        &self,
        text: &str,
        encoder: &mut dyn SpanEncoder,
    ) -> Encoding {
        let unk = self.specials.get(UNK_NAME);
        let mut encoding = Encoding::with_capacity(text.len() / 4);
        let mut model_tokens = Vec::new();
        let mut word_idx: u32 = 0;

        for segment in split_input(self.matcher.as_ref(), text) {
            match segment {
                InputSegment::Special { id, range } => {
                    let token: CompactString = text[range.clone()].into();
                    encoding.push_token(id, token, (range.start, range.end), Some(word_idx), true);
                    word_idx += 1;
                }
                InputSegment::Text(range) => {
                    let base = range.start;
                    let normalized = self.normalizer.normalize(&text[range]);
                    for span in self.pre_tokenizer.pre_tokenize(normalized.as_str()) {
                        model_tokens.clear();
                        self.model
                            .encode_span_with(encoder, span.text, unk, &mut model_tokens);
                        for token in model_tokens.drain(..) {
                            let local = span.start + token.start..span.start + token.end;
                            let offsets = normalized
                                .original_range(local)
                                .map(|r| (base + r.start, base + r.end))
                                .unwrap_or((base, base));
                            encoding.push_token(token.id, token.token, offsets, Some(word_idx), false);
                        }
                        word_idx += 1;
                    }
                }
            }
        }
        encoding
    }

    /// Encode pre-split words; each word is one span.
    ///
    /// Offsets are into each word; no template tokens are added.
    pub fn encode_words<S: AsRef<str>>(
        &self,
        words: &[S],
        encoder: &mut dyn SpanEncoder,
    ) -> Encoding {
        let unk = self.specials.get(UNK_NAME);
        let mut encoding = Encoding::default();
        let mut model_tokens = Vec::new();

        for (word_idx, word) in words.iter().enumerate() {
            let normalized = self.normalizer.normalize(word.as_ref());
            if normalized.is_empty() {
                continue;
            }
            model_tokens.clear();
            self.model
                .encode_span_with(encoder, normalized.as_str(), unk, &mut model_tokens);
            for token in model_tokens.drain(..) {
                let offsets = normalized
                    .original_range(token.start..token.end)
                    .map(|r| (r.start, r.end))
                    .unwrap_or((0, 0));
                encoding.push_token(
                    token.id,
                    token.token,
                    offsets,
                    Some(word_idx as u32),
                    false,
                );
            }
        }
        encoding
    }

    /// Truncate, apply the template, and pad to a fixed length.
    pub fn post_process(
        &self,
        mut a: Encoding,
        mut b: Option<Encoding>,
    ) -> WFResult<Encoding> {
        if let Some(truncation) = &self.config.truncation {
            let added = self.processor.added_tokens(b.is_some());
            truncation.apply(&mut a, b.as_mut(), added)?;
        }

        let mut encoding = self.processor.apply(a, b, &self.specials)?;

        if let Some(PaddingConfig {
            length: PaddingLength::Fixed(target),
            direction,
        }) = self.config.padding
        {
            let pad = self.pad_token()?;
            encoding.pad(target, pad.id, &pad.content, direction);
        }
        Ok(encoding)
    }

    /// Encode one input.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text)))]
    pub fn encode(
        &self,
        text: &str,
    ) -> WFResult<Encoding> {
        let mut encoder = self.model.span_encoder();
        let a = self.encode_sequence(text, encoder.as_mut());
        self.post_process(a, None)
    }

    /// Encode an input pair.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, a, b)))]
    pub fn encode_pair(
        &self,
        a: &str,
        b: &str,
    ) -> WFResult<Encoding> {
        let mut encoder = self.model.span_encoder();
        let a = self.encode_sequence(a, encoder.as_mut());
        let b = self.encode_sequence(b, encoder.as_mut());
        self.post_process(a, Some(b))
    }

    /// Encode pre-split words.
    pub fn encode_pretokenized<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> WFResult<Encoding> {
        let mut encoder = self.model.span_encoder();
        let a = self.encode_words(words, encoder.as_mut());
        self.post_process(a, None)
    }

    /// Encode a batch of inputs.
    ///
    /// With [`PaddingLength::BatchLongest`], the batch is padded to its
    /// longest member.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, texts)))]
    pub fn encode_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
    ) -> WFResult<Vec<Encoding>> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                use rayon::prelude::*;
                let mut encodings = texts
                    .par_iter()
                    .map_init(
                        || self.model.span_encoder(),
                        |encoder, text| {
                            let a = self.encode_sequence(text.as_ref(), encoder.as_mut());
                            self.post_process(a, None)
                        },
                    )
                    .collect::<WFResult<Vec<_>>>()?;
            } else {
                let mut encoder = self.model.span_encoder();
                let mut encodings = texts
                    .iter()
                    .map(|text| {
                        let a = self.encode_sequence(text.as_ref(), encoder.as_mut());
                        self.post_process(a, None)
                    })
                    .collect::<WFResult<Vec<_>>>()?;
            }
        }

        if let Some(padding) = &self.config.padding {
            if padding.length == PaddingLength::BatchLongest {
                let pad = self.pad_token()?;
                padding.apply_batch(&mut encodings, pad.id, &pad.content);
            }
        }
        Ok(encodings)
    }

    /// Decode ids into text.
    pub fn decode(
        &self,
        ids: &[TokenId],
        skip_special_tokens: bool,
    ) -> WFResult<String> {
        self.decoder
            .decode(ids, self.vocab(), &self.specials, skip_special_tokens)
    }

    /// Decode a batch of id sequences.
    pub fn decode_batch<B: AsRef<[TokenId]> + Sync>(
        &self,
        batch: &[B],
        skip_special_tokens: bool,
    ) -> WFResult<Vec<String>> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                use rayon::prelude::*;
                batch
                    .par_iter()
                    .map(|ids| self.decode(ids.as_ref(), skip_special_tokens))
                    .collect()
            } else {
                batch
                    .iter()
                    .map(|ids| self.decode(ids.as_ref(), skip_special_tokens))
                    .collect()
            }
        }
    }
}
