//! # Combined Tokenizer

use std::sync::Arc;

use compact_str::CompactString;
use parking_lot::{Mutex, RwLock};

use crate::{
    encoding::{Encoding, PaddingConfig, TruncationConfig},
    errors::WFResult,
    normalizers::NormalizationForm,
    pretokenizers::PreTokenizerConfig,
    processors::PostProcessorConfig,
    tokenizer::{TokenizerConfig, TokenizerState},
    training::{BpeTrainerOptions, CancelToken},
    types::TokenId,
    vocab::SpecialToken,
};

/// Unified Tokenizer.
///
/// Combines normalization, pre-tokenization, a [`BpeModel`](crate::models::BpeModel),
/// special tokens, a post-processor and a decoder behind `&self` methods.
///
/// Readers (encode, decode, lookups) work on an [`Arc<TokenizerState>`]
/// snapshot and never block each other. Writers (setters, training) are
/// serialized, build a modified copy, and publish it whole; a failed write
/// leaves the tokenizer unchanged.
#[derive(Debug)]
pub struct Tokenizer {
    state: RwLock<Arc<TokenizerState>>,
    writer: Mutex<()>,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the default configuration.
    ///
    /// The vocabulary holds only the default special tokens.
    pub fn new() -> WFResult<Self> {
        Self::from_config(TokenizerConfig::default())
    }

    /// Create an untrained tokenizer.
    pub fn from_config(config: TokenizerConfig) -> WFResult<Self> {
        Ok(Self::from_state(TokenizerState::new(config)?))
    }

    /// Wrap a prepared state.
    pub fn from_state(state: TokenizerState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            writer: Mutex::new(()),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<TokenizerState> {
        self.state.read().clone()
    }

    /// The current configuration.
    pub fn config(&self) -> TokenizerConfig {
        self.snapshot().config().clone()
    }

    fn update<R, F>(
        &self,
        f: F,
    ) -> WFResult<R>
    where
        F: FnOnce(&mut TokenizerState) -> WFResult<R>,
    {
        let _guard = self.writer.lock();
        let mut next = TokenizerState::clone(&self.snapshot());
        let result = f(&mut next)?;
        *self.state.write() = Arc::new(next);
        Ok(result)
    }

    fn modify<F>(
        &self,
        f: F,
    ) where
        F: FnOnce(&mut TokenizerState),
    {
        let _guard = self.writer.lock();
        let mut next = TokenizerState::clone(&self.snapshot());
        f(&mut next);
        *self.state.write() = Arc::new(next);
    }

    /// Train the model on a corpus.
    ///
    /// Special tokens keep their ids; everything else is replaced.
    ///
    /// ## Arguments
    /// * `sources` - Corpus sources; each yields text chunks.
    ///   Counts accumulate across all sources before merging starts.
    /// * `vocab_size` - The target vocabulary size, special tokens included.
    /// * `min_frequency` - Pairs seen fewer times are never merged.
    pub fn train<S, I>(
        &self,
        sources: S,
        vocab_size: usize,
        min_frequency: u64,
    ) -> WFResult<()>
    where
        S: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: AsRef<str> + Send + Sync,
    {
        let options = BpeTrainerOptions::new(vocab_size).with_min_frequency(min_frequency);
        self.train_with_options(sources, options, None)
    }

    /// Train the model with full trainer options.
    ///
    /// The end-of-word suffix always follows the model options.
    /// A cancelled run fails with [`WordforgeError::Cancelled`](crate::WordforgeError::Cancelled)
    /// and leaves the tokenizer unchanged.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, sources, cancel)))]
    pub fn train_with_options<S, I>(
        &self,
        sources: S,
        options: BpeTrainerOptions,
        cancel: Option<CancelToken>,
    ) -> WFResult<()>
    where
        S: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: AsRef<str> + Send + Sync,
    {
        self.update(|state| state.train(sources, options, cancel))
    }

    /// Sets the Unicode normalization form.
    pub fn set_normalization_form(
        &self,
        form: NormalizationForm,
    ) {
        self.modify(|state| state.set_normalization_form(form));
    }

    /// Sets the Unicode normalization form by name: `NFC`, `NFD`, `NFKC`, `NFKD` or `none`.
    pub fn set_normalization_form_name(
        &self,
        name: &str,
    ) -> WFResult<()> {
        let form = NormalizationForm::parse_name(name)?;
        self.set_normalization_form(form);
        Ok(())
    }

    /// Sets lowercasing.
    pub fn set_lowercase(
        &self,
        lowercase: bool,
    ) {
        self.modify(|state| {
            let normalizer = state.config().normalizer.clone().with_lowercase(lowercase);
            state.set_normalizer_config(normalizer);
        });
    }

    /// Sets accent stripping.
    pub fn set_strip_accents(
        &self,
        strip_accents: bool,
    ) {
        self.modify(|state| {
            let normalizer = state
                .config()
                .normalizer
                .clone()
                .with_strip_accents(strip_accents);
            state.set_normalizer_config(normalizer);
        });
    }

    /// Sets the pre-tokenizer rules.
    pub fn set_pre_tokenizer(
        &self,
        pre_tokenizer: PreTokenizerConfig,
    ) -> WFResult<()> {
        self.update(|state| state.set_pre_tokenizer(pre_tokenizer))
    }

    /// Register special tokens.
    ///
    /// Each string is its own logical name. Registering an existing
    /// token returns its existing id.
    ///
    /// ## Returns
    /// The ids, in input order.
    pub fn add_special_tokens<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> WFResult<Vec<TokenId>> {
        self.update(|state| state.add_special_tokens(tokens))
    }

    /// Look up a special token by logical name or surface string.
    pub fn special_token(
        &self,
        key: &str,
    ) -> Option<SpecialToken> {
        self.snapshot().special_token(key).cloned()
    }

    /// Install the BERT template: `[CLS] $A [SEP]` / `[CLS] $A [SEP] $B:1 [SEP]:1`.
    ///
    /// With `add_special_tokens = false` sequences pass through unchanged.
    pub fn create_bert_post_processor(
        &self,
        add_special_tokens: bool,
    ) -> WFResult<()> {
        self.set_post_processor(PostProcessorConfig::bert(add_special_tokens))
    }

    /// Install a post-processor.
    ///
    /// Fails with [`WordforgeError::Template`](crate::WordforgeError::Template)
    /// if a referenced special token is not registered.
    pub fn set_post_processor(
        &self,
        post_processor: PostProcessorConfig,
    ) -> WFResult<()> {
        self.update(|state| state.set_post_processor(post_processor))
    }

    /// Sets or clears truncation.
    pub fn set_truncation(
        &self,
        truncation: Option<TruncationConfig>,
    ) {
        self.modify(|state| state.set_truncation(truncation));
    }

    /// Sets or clears padding; requires a registered `pad` token.
    pub fn set_padding(
        &self,
        padding: Option<PaddingConfig>,
    ) -> WFResult<()> {
        self.update(|state| state.set_padding(padding))
    }

    /// Encode one input.
    pub fn encode(
        &self,
        text: &str,
    ) -> WFResult<Encoding> {
        self.snapshot().encode(text)
    }

    /// Encode an input pair; the second sequence gets its template type ids.
    pub fn encode_pair(
        &self,
        a: &str,
        b: &str,
    ) -> WFResult<Encoding> {
        self.snapshot().encode_pair(a, b)
    }

    /// Encode pre-split words, one span per word.
    ///
    /// Offsets are relative to each word.
    pub fn encode_pretokenized<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> WFResult<Encoding> {
        self.snapshot().encode_pretokenized(words)
    }

    /// Encode a batch of inputs.
    pub fn encode_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
    ) -> WFResult<Vec<Encoding>> {
        self.snapshot().encode_batch(texts)
    }

    /// Decode ids into text.
    pub fn decode(
        &self,
        ids: &[TokenId],
        skip_special_tokens: bool,
    ) -> WFResult<String> {
        self.snapshot().decode(ids, skip_special_tokens)
    }

    /// Decode a batch of id sequences.
    pub fn decode_batch<B: AsRef<[TokenId]> + Sync>(
        &self,
        batch: &[B],
        skip_special_tokens: bool,
    ) -> WFResult<Vec<String>> {
        self.snapshot().decode_batch(batch, skip_special_tokens)
    }

    /// Look up the id of a token string.
    pub fn token_to_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.snapshot().token_to_id(token)
    }

    /// Look up the id of a token string; `-1` if absent.
    pub fn token_to_id_or_sentinel(
        &self,
        token: &str,
    ) -> i64 {
        self.token_to_id(token).map_or(-1, i64::from)
    }

    /// Look up the string of a token id.
    ///
    /// Fails with [`WordforgeError::UnknownId`](crate::WordforgeError::UnknownId)
    /// outside the vocabulary.
    pub fn id_to_token(
        &self,
        id: TokenId,
    ) -> WFResult<CompactString> {
        self.snapshot().id_to_token(id).map(CompactString::from)
    }

    /// The number of vocabulary entries, special tokens included.
    pub fn vocab_size(&self) -> usize {
        self.snapshot().vocab_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WordforgeError;

    const CORPUS: &str = "the cat sat on the mat. the dog sat on the log!";

    fn trained() -> Tokenizer {
        let tokenizer = Tokenizer::new().unwrap();
        tokenizer.train([[CORPUS]], 200, 1).unwrap();
        tokenizer
    }

    #[test]
    fn test_untrained() {
        let tokenizer = Tokenizer::new().unwrap();
        assert_eq!(tokenizer.vocab_size(), 7);
        assert_eq!(tokenizer.token_to_id("[CLS]"), Some(6));
        assert_eq!(tokenizer.token_to_id_or_sentinel("cat"), -1);
        assert_eq!(tokenizer.id_to_token(0).unwrap(), "[UNK]");
        assert!(matches!(
            tokenizer.id_to_token(7),
            Err(WordforgeError::UnknownId { id: 7 })
        ));

        // Every symbol is unknown; each span maps to `unk`.
        let encoding = tokenizer.encode("ab c").unwrap();
        assert_eq!(encoding.input_ids, vec![0, 0, 0]);
        assert_eq!(encoding.offsets, vec![(0, 1), (1, 2), (3, 4)]);
    }

    #[test]
    fn test_train_keeps_specials() {
        let tokenizer = trained();
        assert_eq!(tokenizer.token_to_id("[UNK]"), Some(0));
        assert_eq!(tokenizer.token_to_id("[CLS]"), Some(6));
        assert!(tokenizer.token_to_id("the</w>").is_some());
        assert!(tokenizer.vocab_size() <= 200);

        let snapshot = tokenizer.snapshot();
        assert!(snapshot.vocab().is_contiguous());
    }

    #[test]
    fn test_encode_offsets() {
        let tokenizer = trained();
        tokenizer.set_lowercase(true);

        let text = "The CAT sat.";
        let encoding = tokenizer.encode(text).unwrap();
        let spans: Vec<&str> = encoding
            .offsets
            .iter()
            .map(|&(start, end)| &text[start..end])
            .collect();
        assert_eq!(encoding.tokens, vec!["the</w>", "cat</w>", "sat</w>", ".</w>"]);
        assert_eq!(spans, vec!["The", "CAT", "sat", "."]);
        assert_eq!(encoding.word_ids, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_special_tokens_in_input() {
        let tokenizer = trained();
        let ids = tokenizer.add_special_tokens(&["<sep>", "[SEP]"]).unwrap();
        assert_eq!(ids[1], 5);

        let encoding = tokenizer.encode("cat<sep>dog").unwrap();
        assert_eq!(encoding.tokens, vec!["cat</w>", "<sep>", "dog</w>"]);
        assert_eq!(encoding.offsets[1], (3, 8));
        assert_eq!(encoding.special_tokens_mask, vec![0, 1, 0]);
        assert_eq!(
            tokenizer.decode(&encoding.input_ids, false).unwrap(),
            "cat <sep> dog"
        );
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let tokenizer = trained();
        let before = tokenizer.config();

        let bad = PostProcessorConfig::Custom {
            single: Some("[NOPE] $A".parse().unwrap()),
            pair: None,
        };
        assert!(matches!(
            tokenizer.set_post_processor(bad),
            Err(WordforgeError::Template(_))
        ));
        assert!(tokenizer.set_normalization_form_name("NFX").is_err());
        assert!(
            tokenizer
                .set_pre_tokenizer(PreTokenizerConfig::pattern("("))
                .is_err()
        );
        assert_eq!(tokenizer.config(), before);
    }

    #[test]
    fn test_snapshots_are_stable() {
        let tokenizer = trained();
        let snapshot = tokenizer.snapshot();
        let before = snapshot.encode("the cat").unwrap();

        tokenizer.create_bert_post_processor(true).unwrap();
        tokenizer.add_special_tokens(&["cat"]).unwrap();

        assert_eq!(snapshot.encode("the cat").unwrap(), before);
        assert_eq!(tokenizer.encode("the cat").unwrap().len(), 4);
    }

    #[test]
    fn test_cancelled_training() {
        let tokenizer = Tokenizer::new().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = tokenizer.train_with_options(
            [[CORPUS]],
            BpeTrainerOptions::new(100),
            Some(cancel),
        );
        assert!(matches!(result, Err(WordforgeError::Cancelled)));
        assert_eq!(tokenizer.vocab_size(), 7);
    }
}
