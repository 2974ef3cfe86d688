//! # Tokenizer JSON IO

use std::io::{Read, Write};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{WFResult, WordforgeError},
    models::BpeModel,
    tokenizer::{Tokenizer, TokenizerConfig, TokenizerState},
    vocab::{MergeRule, MergeTable, SpecialToken, SpecialVocab, Vocabulary},
};

/// The current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// The persisted form of a tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerDocument {
    /// The format version; see [`FORMAT_VERSION`].
    pub version: u32,

    /// The tokenizer configuration.
    pub config: TokenizerConfig,

    /// The vocabulary; entry `i` has id `i`.
    pub vocab: Vec<CompactString>,

    /// The special token registry, in registration order.
    pub special_tokens: Vec<SpecialToken>,

    /// The merge rules, in rank order.
    pub merges: Vec<MergeRule>,
}

impl TokenizerDocument {
    /// Capture a snapshot.
    pub fn from_state(state: &TokenizerState) -> WFResult<Self> {
        Ok(Self {
            version: FORMAT_VERSION,
            config: state.config().clone(),
            vocab: state.vocab().to_token_list()?,
            special_tokens: state.specials().iter().cloned().collect(),
            merges: state.model().merges().rules().to_vec(),
        })
    }

    /// Rebuild a snapshot, validating the document.
    pub fn into_state(self) -> WFResult<TokenizerState> {
        if self.version != FORMAT_VERSION {
            return Err(WordforgeError::document(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }

        let vocab = Vocabulary::from_token_list(&self.vocab)?;
        let merges = MergeTable::from_rules(self.merges, &vocab)?;

        let mut specials = SpecialVocab::new();
        for token in self.special_tokens {
            specials.restore(token, &vocab)?;
        }

        let model = BpeModel::new(vocab, merges, self.config.model.clone());
        TokenizerState::from_parts(self.config, model, specials)
    }
}

/// Write a tokenizer as a JSON document.
///
/// ## Arguments
/// * `tokenizer` - The tokenizer; its current snapshot is written.
/// * `writer` - The destination.
pub fn save_tokenizer<W: Write>(
    tokenizer: &Tokenizer,
    writer: W,
) -> WFResult<()> {
    let document = TokenizerDocument::from_state(&tokenizer.snapshot())?;
    serde_json::to_writer_pretty(writer, &document)?;
    log::debug!(
        "saved tokenizer: {} entries, {} merges",
        document.vocab.len(),
        document.merges.len()
    );
    Ok(())
}

/// Read a tokenizer from a JSON document.
pub fn load_tokenizer<R: Read>(reader: R) -> WFResult<Tokenizer> {
    let document: TokenizerDocument = serde_json::from_reader(reader)?;
    Ok(Tokenizer::from_state(document.into_state()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tokenizer {
        let tokenizer = Tokenizer::new().unwrap();
        tokenizer
            .train([["low lower lowest, newer wider!"]], 60, 1)
            .unwrap();
        tokenizer.set_lowercase(true);
        tokenizer.create_bert_post_processor(true).unwrap();
        tokenizer.add_special_tokens(&["<extra>"]).unwrap();
        tokenizer
    }

    #[test]
    fn test_round_trip() {
        let tokenizer = sample();
        let mut buf = Vec::new();
        save_tokenizer(&tokenizer, &mut buf).unwrap();

        let loaded = load_tokenizer(buf.as_slice()).unwrap();
        assert_eq!(loaded.config(), tokenizer.config());
        assert_eq!(loaded.vocab_size(), tokenizer.vocab_size());

        for text in ["Lower LOWEST <extra> newest", "", "wider?"] {
            let a = tokenizer.encode(text).unwrap();
            let b = loaded.encode(text).unwrap();
            assert_eq!(a, b);
            assert_eq!(
                tokenizer.decode(&a.input_ids, true).unwrap(),
                loaded.decode(&b.input_ids, true).unwrap()
            );
        }

        // Saving again yields the same bytes.
        let mut again = Vec::new();
        save_tokenizer(&loaded, &mut again).unwrap();
        assert_eq!(buf, again);
    }

    #[test]
    fn test_rejects_bad_documents() {
        let tokenizer = sample();
        let document = TokenizerDocument::from_state(&tokenizer.snapshot()).unwrap();

        let mut wrong_version = document.clone();
        wrong_version.version = 99;
        assert!(matches!(
            wrong_version.into_state(),
            Err(WordforgeError::Document(_))
        ));

        let mut bad_merge = document.clone();
        bad_merge.merges.push(MergeRule::new("zz", "top"));
        assert!(matches!(
            bad_merge.into_state(),
            Err(WordforgeError::Document(_))
        ));

        let mut bad_special = document.clone();
        bad_special.special_tokens[0].id = 3;
        assert!(bad_special.into_state().is_err());

        let mut duplicate = document;
        duplicate.vocab.push("[UNK]".into());
        assert!(matches!(
            duplicate.into_state(),
            Err(WordforgeError::Document(_))
        ));

        assert!(matches!(
            load_tokenizer("{not json".as_bytes()),
            Err(WordforgeError::Json(_))
        ));
    }
}
