//! # Special Token Registry
//!
//! Special tokens are atomic: the pre-tokenizer never splits them, merges
//! never touch them, and their ids never change once assigned.

use core::ops::Range;

use aho_corasick::{AhoCorasick, MatchKind};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{WFResult, WordforgeError},
    types::{TokenId, WFHashMap},
    vocab::Vocabulary,
};

/// The `(name, surface)` pairs registered by a default tokenizer, in id order.
pub const DEFAULT_SPECIAL_TOKENS: [(&str, &str); 7] = [
    ("unk", "[UNK]"),
    ("pad", "[PAD]"),
    ("bos", "[BOS]"),
    ("eos", "[EOS]"),
    ("mask", "[MASK]"),
    ("sep", "[SEP]"),
    ("cls", "[CLS]"),
];

/// Logical name of the unknown-symbol token.
pub const UNK_NAME: &str = "unk";

/// Logical name of the padding token.
pub const PAD_NAME: &str = "pad";

/// A registered special token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialToken {
    /// The logical name, e.g. `"sep"`.
    pub name: CompactString,

    /// The surface string, e.g. `"[SEP]"`.
    pub content: CompactString,

    /// The assigned id.
    pub id: TokenId,
}

/// The registry of special tokens.
#[derive(Debug, Clone, Default)]
pub struct SpecialVocab {
    tokens: Vec<SpecialToken>,
    by_name: WFHashMap<CompactString, usize>,
    by_content: WFHashMap<CompactString, usize>,
    by_id: WFHashMap<TokenId, usize>,
}

impl PartialEq for SpecialVocab {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.tokens == other.tokens
    }
}

impl SpecialVocab {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding [`DEFAULT_SPECIAL_TOKENS`].
    ///
    /// ## Arguments
    /// * `vocab` - the vocabulary the default surfaces are inserted into.
    pub fn with_defaults(vocab: &mut Vocabulary) -> WFResult<Self> {
        let mut specials = Self::new();
        for (name, content) in DEFAULT_SPECIAL_TOKENS {
            specials.register(name, content, vocab)?;
        }
        Ok(specials)
    }

    /// The number of registered tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the registered tokens in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SpecialToken> {
        self.tokens.iter()
    }

    /// Register a special token.
    ///
    /// Idempotent: if `content` is already registered, its id is returned
    /// unchanged. Otherwise `content` takes the lowest free id. A `content`
    /// that is already an ordinary vocabulary entry is rejected.
    ///
    /// ## Arguments
    /// * `name` - the logical name.
    /// * `content` - the surface string; must be non-empty.
    /// * `vocab` - the vocabulary the id is drawn from.
    pub fn register(
        &mut self,
        name: &str,
        content: &str,
        vocab: &mut Vocabulary,
    ) -> WFResult<TokenId> {
        if content.is_empty() {
            return Err(WordforgeError::config(
                "special token surface must be non-empty",
            ));
        }
        if let Some(existing) = self.get_by_content(content) {
            return Ok(existing.id);
        }
        if let Some(existing) = self.get(name) {
            return Err(WordforgeError::config(format!(
                "special token name {name:?} is already bound to {:?}",
                existing.content
            )));
        }

        if vocab.contains(content) {
            return Err(WordforgeError::config(format!(
                "special token {content:?} is already an ordinary vocabulary entry"
            )));
        }

        let id = vocab.insert(content);
        self.push(SpecialToken {
            name: name.into(),
            content: content.into(),
            id,
        });
        Ok(id)
    }

    /// Restore a previously assigned token, validating it against `vocab`.
    pub fn restore(
        &mut self,
        token: SpecialToken,
        vocab: &Vocabulary,
    ) -> WFResult<()> {
        if vocab.get_id(&token.content) != Some(token.id) {
            return Err(WordforgeError::document(format!(
                "special token {:?} does not match vocabulary id {}",
                token.content, token.id
            )));
        }
        if self.get(&token.name).is_some() || self.get_by_content(&token.content).is_some() {
            return Err(WordforgeError::document(format!(
                "special token {:?} is registered twice",
                token.name
            )));
        }
        self.push(token);
        Ok(())
    }

    fn push(
        &mut self,
        token: SpecialToken,
    ) {
        let idx = self.tokens.len();
        self.by_name.insert(token.name.clone(), idx);
        self.by_content.insert(token.content.clone(), idx);
        self.by_id.insert(token.id, idx);
        self.tokens.push(token);
    }

    /// Look up a token by logical name.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&SpecialToken> {
        self.by_name.get(name).map(|&idx| &self.tokens[idx])
    }

    /// Look up a token by surface string.
    pub fn get_by_content(
        &self,
        content: &str,
    ) -> Option<&SpecialToken> {
        self.by_content.get(content).map(|&idx| &self.tokens[idx])
    }

    /// Look up a token by id.
    pub fn get_by_id(
        &self,
        id: TokenId,
    ) -> Option<&SpecialToken> {
        self.by_id.get(&id).map(|&idx| &self.tokens[idx])
    }

    /// Look up a token by logical name, falling back to surface string.
    pub fn resolve(
        &self,
        key: &str,
    ) -> Option<&SpecialToken> {
        self.get(key).or_else(|| self.get_by_content(key))
    }

    /// Is `id` a special token?
    pub fn is_special_id(
        &self,
        id: TokenId,
    ) -> bool {
        self.by_id.contains_key(&id)
    }
}

/// A piece of input text, after special-token matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSegment {
    /// Ordinary text, to be normalized and pre-tokenized.
    Text(Range<usize>),

    /// An exact occurrence of a special token surface.
    Special {
        /// The special token id.
        id: TokenId,

        /// The byte range of the occurrence.
        range: Range<usize>,
    },
}

/// Finds special token surfaces in raw input.
///
/// Overlapping candidates resolve leftmost-longest.
#[derive(Debug, Clone)]
pub struct SpecialMatcher {
    automaton: AhoCorasick,
    ids: Vec<TokenId>,
}

impl SpecialMatcher {
    /// Build a matcher over all surfaces of `specials`.
    ///
    /// ## Returns
    /// `None` if the registry is empty.
    pub fn build(specials: &SpecialVocab) -> WFResult<Option<Self>> {
        if specials.is_empty() {
            return Ok(None);
        }
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(specials.iter().map(|t| t.content.as_str()))
            .map_err(WordforgeError::config)?;
        let ids = specials.iter().map(|t| t.id).collect();
        Ok(Some(Self { automaton, ids }))
    }

    /// Split `text` into ordinary and special segments.
    ///
    /// Empty text segments are not emitted.
    pub fn split(
        &self,
        text: &str,
    ) -> Vec<InputSegment> {
        let mut segments = Vec::new();
        let mut last = 0;
        for mat in self.automaton.find_iter(text) {
            if mat.start() > last {
                segments.push(InputSegment::Text(last..mat.start()));
            }
            segments.push(InputSegment::Special {
                id: self.ids[mat.pattern().as_usize()],
                range: mat.start()..mat.end(),
            });
            last = mat.end();
        }
        if last < text.len() {
            segments.push(InputSegment::Text(last..text.len()));
        }
        segments
    }
}

/// Split `text` with an optional matcher.
pub fn split_input(
    matcher: Option<&SpecialMatcher>,
    text: &str,
) -> Vec<InputSegment> {
    match matcher {
        Some(matcher) => matcher.split(text),
        None if text.is_empty() => Vec::new(),
        None => vec![InputSegment::Text(0..text.len())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mut vocab = Vocabulary::new();
        let specials = SpecialVocab::with_defaults(&mut vocab).unwrap();

        assert_eq!(specials.len(), 7);
        assert_eq!(vocab.len(), 7);
        for (idx, (name, content)) in DEFAULT_SPECIAL_TOKENS.iter().enumerate() {
            let token = specials.get(name).unwrap();
            assert_eq!(token.content, *content);
            assert_eq!(token.id, idx as TokenId);
            assert_eq!(vocab.get_id(content), Some(idx as TokenId));
        }

        assert_eq!(specials.resolve("[SEP]").unwrap().name, "sep");
        assert!(specials.is_special_id(6));
        assert!(!specials.is_special_id(7));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut vocab = Vocabulary::new();
        let mut specials = SpecialVocab::with_defaults(&mut vocab).unwrap();

        let id = specials.register("[MY_TOKEN]", "[MY_TOKEN]", &mut vocab).unwrap();
        assert_eq!(id, 7);
        let again = specials.register("[MY_TOKEN]", "[MY_TOKEN]", &mut vocab).unwrap();
        assert_eq!(again, 7);
        assert_eq!(vocab.len(), 8);

        assert!(matches!(
            specials.register("sep", "<sep>", &mut vocab),
            Err(WordforgeError::Config(_))
        ));
        assert!(matches!(
            specials.register("empty", "", &mut vocab),
            Err(WordforgeError::Config(_))
        ));
    }

    #[test]
    fn test_register_rejects_ordinary_tokens() {
        let mut vocab = Vocabulary::new();
        let mut specials = SpecialVocab::with_defaults(&mut vocab).unwrap();
        let a = vocab.insert("a");

        assert!(matches!(
            specials.register("a", "a", &mut vocab),
            Err(WordforgeError::Config(_))
        ));
        assert!(!specials.is_special_id(a));
        assert_eq!(specials.len(), 7);
    }

    #[test]
    fn test_restore_validates() {
        let vocab = Vocabulary::from_token_list(["[UNK]", "a"]).unwrap();
        let mut specials = SpecialVocab::new();

        let bad = SpecialToken {
            name: "unk".into(),
            content: "[UNK]".into(),
            id: 1,
        };
        assert!(specials.restore(bad, &vocab).is_err());

        let good = SpecialToken {
            name: "unk".into(),
            content: "[UNK]".into(),
            id: 0,
        };
        specials.restore(good.clone(), &vocab).unwrap();
        assert!(specials.restore(good, &vocab).is_err());
    }

    #[test]
    fn test_matcher_split() {
        let mut vocab = Vocabulary::new();
        let mut specials = SpecialVocab::new();
        specials.register("a", "[A]", &mut vocab).unwrap();
        specials.register("ab", "[A][B]", &mut vocab).unwrap();

        let matcher = SpecialMatcher::build(&specials).unwrap().unwrap();
        let text = "x[A][B]y[A]";
        assert_eq!(matcher.split(text), vec![
            InputSegment::Text(0..1),
            InputSegment::Special { id: 1, range: 1..7 },
            InputSegment::Text(7..8),
            InputSegment::Special { id: 0, range: 8..11 },
        ]);

        assert!(SpecialMatcher::build(&SpecialVocab::new()).unwrap().is_none());
        assert!(split_input(None, "").is_empty());
        assert_eq!(split_input(None, "hi"), vec![InputSegment::Text(0..2)]);
    }
}
