//! # Tokenizer Configuration

use serde::{Deserialize, Serialize};

use crate::{
    decoders::DecoderOptions,
    encoding::{PaddingConfig, TruncationConfig},
    models::BpeModelOptions,
    normalizers::NormalizerConfig,
    pretokenizers::PreTokenizerConfig,
    processors::PostProcessorConfig,
};

/// Options for configuring a [`Tokenizer`](crate::Tokenizer).
///
/// The model and decoder each carry an end-of-word suffix;
/// a tokenizer rejects a configuration where they differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Normalizer options.
    pub normalizer: NormalizerConfig,

    /// Pre-tokenizer rules.
    pub pre_tokenizer: PreTokenizerConfig,

    /// Model options.
    pub model: BpeModelOptions,

    /// Decoder options.
    pub decoder: DecoderOptions,

    /// Post-processor template.
    pub post_processor: PostProcessorConfig,

    /// Truncation, if enabled.
    pub truncation: Option<TruncationConfig>,

    /// Padding, if enabled.
    pub padding: Option<PaddingConfig>,
}

impl TokenizerConfig {
    /// Sets the normalizer options.
    pub fn with_normalizer(
        self,
        normalizer: NormalizerConfig,
    ) -> Self {
        Self { normalizer, ..self }
    }

    /// Sets the pre-tokenizer rules.
    pub fn with_pre_tokenizer(
        self,
        pre_tokenizer: PreTokenizerConfig,
    ) -> Self {
        Self {
            pre_tokenizer,
            ..self
        }
    }

    /// Sets the model options.
    pub fn with_model(
        self,
        model: BpeModelOptions,
    ) -> Self {
        Self { model, ..self }
    }

    /// Sets the decoder options.
    pub fn with_decoder(
        self,
        decoder: DecoderOptions,
    ) -> Self {
        Self { decoder, ..self }
    }

    /// Sets the post-processor.
    pub fn with_post_processor(
        self,
        post_processor: PostProcessorConfig,
    ) -> Self {
        Self {
            post_processor,
            ..self
        }
    }

    /// Sets truncation.
    pub fn with_truncation(
        self,
        truncation: Option<TruncationConfig>,
    ) -> Self {
        Self { truncation, ..self }
    }

    /// Sets padding.
    pub fn with_padding(
        self,
        padding: Option<PaddingConfig>,
    ) -> Self {
        Self { padding, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizers::NormalizationForm;

    #[test]
    fn test_serde_defaults() {
        let config: TokenizerConfig = serde_json::from_str(
            r#"{"normalizer": {"form": "NFKC", "lowercase": true}}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            TokenizerConfig::default().with_normalizer(
                NormalizerConfig::default()
                    .with_form(NormalizationForm::Nfkc)
                    .with_lowercase(true)
            )
        );

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<TokenizerConfig>(&json).unwrap(), config);
    }
}
