//! # Encoding

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{encoding::PaddingDirection, types::TokenId};

/// The result of encoding one or two sequences.
///
/// All fields are aligned: index `i` of each describes token `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    /// The token ids.
    pub input_ids: Vec<TokenId>,

    /// The token strings.
    pub tokens: Vec<CompactString>,

    /// The `(start, end)` byte offsets into the original input.
    ///
    /// For a pair, offsets of the second sequence are into the second input.
    /// Template and padding tokens have `(0, 0)`.
    pub offsets: Vec<(usize, usize)>,

    /// The sequence index: `0` for the first sequence, `1` for the second.
    pub type_ids: Vec<u32>,

    /// `1` for template, padding and special tokens; `0` otherwise.
    pub special_tokens_mask: Vec<u32>,

    /// `0` for padding; `1` otherwise.
    pub attention_mask: Vec<u32>,

    /// The index of the pre-tokenized span each token came from.
    pub word_ids: Vec<Option<u32>>,
}

impl Encoding {
    /// Create an empty encoding with room for `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            input_ids: Vec::with_capacity(capacity),
            tokens: Vec::with_capacity(capacity),
            offsets: Vec::with_capacity(capacity),
            type_ids: Vec::with_capacity(capacity),
            special_tokens_mask: Vec::with_capacity(capacity),
            attention_mask: Vec::with_capacity(capacity),
            word_ids: Vec::with_capacity(capacity),
        }
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Is the encoding empty?
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Append a token produced by the model.
    pub fn push_token(
        &mut self,
        id: TokenId,
        token: CompactString,
        offsets: (usize, usize),
        word_id: Option<u32>,
        special: bool,
    ) {
        self.input_ids.push(id);
        self.tokens.push(token);
        self.offsets.push(offsets);
        self.type_ids.push(0);
        self.special_tokens_mask.push(special as u32);
        self.attention_mask.push(1);
        self.word_ids.push(word_id);
    }

    /// Append a template-inserted token.
    pub fn push_template_token(
        &mut self,
        id: TokenId,
        token: CompactString,
        type_id: u32,
    ) {
        self.input_ids.push(id);
        self.tokens.push(token);
        self.offsets.push((0, 0));
        self.type_ids.push(type_id);
        self.special_tokens_mask.push(1);
        self.attention_mask.push(1);
        self.word_ids.push(None);
    }

    /// Set the type id of every token.
    pub fn set_type_id(
        &mut self,
        type_id: u32,
    ) {
        self.type_ids.iter_mut().for_each(|t| *t = type_id);
    }

    /// Append all tokens of `other`.
    pub fn extend(
        &mut self,
        other: Encoding,
    ) {
        self.input_ids.extend(other.input_ids);
        self.tokens.extend(other.tokens);
        self.offsets.extend(other.offsets);
        self.type_ids.extend(other.type_ids);
        self.special_tokens_mask.extend(other.special_tokens_mask);
        self.attention_mask.extend(other.attention_mask);
        self.word_ids.extend(other.word_ids);
    }

    /// Keep at most the first `max_len` tokens.
    pub fn truncate(
        &mut self,
        max_len: usize,
    ) {
        self.input_ids.truncate(max_len);
        self.tokens.truncate(max_len);
        self.offsets.truncate(max_len);
        self.type_ids.truncate(max_len);
        self.special_tokens_mask.truncate(max_len);
        self.attention_mask.truncate(max_len);
        self.word_ids.truncate(max_len);
    }

    /// Pad to `target_len` tokens; longer encodings are left unchanged.
    ///
    /// ## Arguments
    /// * `target_len` - The padded length.
    /// * `pad_id` - The padding token id.
    /// * `pad_token` - The padding token string.
    /// * `direction` - Which side receives the padding.
    pub fn pad(
        &mut self,
        target_len: usize,
        pad_id: TokenId,
        pad_token: &str,
        direction: PaddingDirection,
    ) {
        let Some(count) = target_len.checked_sub(self.len()).filter(|&n| n > 0) else {
            return;
        };

        fn pad_vec<V: Clone>(
            v: &mut Vec<V>,
            value: V,
            count: usize,
            direction: PaddingDirection,
        ) {
            match direction {
                PaddingDirection::Right => v.extend(core::iter::repeat_n(value, count)),
                PaddingDirection::Left => {
                    v.splice(0..0, core::iter::repeat_n(value, count));
                }
            }
        }

        pad_vec(&mut self.input_ids, pad_id, count, direction);
        pad_vec(&mut self.tokens, pad_token.into(), count, direction);
        pad_vec(&mut self.offsets, (0, 0), count, direction);
        pad_vec(&mut self.type_ids, 0, count, direction);
        pad_vec(&mut self.special_tokens_mask, 1, count, direction);
        pad_vec(&mut self.attention_mask, 0, count, direction);
        pad_vec(&mut self.word_ids, None, count, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Encoding {
        let mut enc = Encoding::default();
        enc.push_token(10, "he".into(), (0, 2), Some(0), false);
        enc.push_token(11, "llo</w>".into(), (2, 5), Some(0), false);
        enc.push_token(12, "!</w>".into(), (5, 6), Some(1), false);
        enc
    }

    #[test]
    fn test_push_and_extend() {
        let mut enc = Encoding::with_capacity(4);
        assert!(enc.is_empty());
        enc.push_template_token(1, "[CLS]".into(), 0);

        let mut second = sample();
        second.set_type_id(1);
        enc.extend(second);

        assert_eq!(enc.len(), 4);
        assert_eq!(enc.type_ids, vec![0, 1, 1, 1]);
        assert_eq!(enc.special_tokens_mask, vec![1, 0, 0, 0]);
        assert_eq!(enc.word_ids, vec![None, Some(0), Some(0), Some(1)]);
        assert_eq!(enc.offsets[0], (0, 0));
    }

    #[test]
    fn test_truncate() {
        let mut enc = sample();
        enc.truncate(5);
        assert_eq!(enc.len(), 3);

        enc.truncate(1);
        assert_eq!(enc.input_ids, vec![10]);
        assert_eq!(enc.tokens.len(), 1);
        assert_eq!(enc.word_ids.len(), 1);
    }

    #[test]
    fn test_pad() {
        let mut right = sample();
        right.pad(5, 0, "[PAD]", PaddingDirection::Right);
        assert_eq!(right.input_ids, vec![10, 11, 12, 0, 0]);
        assert_eq!(right.attention_mask, vec![1, 1, 1, 0, 0]);
        assert_eq!(right.tokens[4], "[PAD]");

        let mut left = sample();
        left.pad(4, 0, "[PAD]", PaddingDirection::Left);
        assert_eq!(left.input_ids, vec![0, 10, 11, 12]);
        assert_eq!(left.special_tokens_mask, vec![1, 0, 0, 0]);
        assert_eq!(left.word_ids[0], None);

        let mut noop = sample();
        noop.pad(2, 0, "[PAD]", PaddingDirection::Right);
        assert_eq!(noop, sample());
    }
}
