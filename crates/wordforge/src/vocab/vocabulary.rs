//! # Token Vocabulary

use std::collections::BTreeSet;

use compact_str::CompactString;

use crate::{
    errors::{WFResult, WordforgeError},
    types::{TokenId, WFHashMap},
};

/// A bijective `{ token string <-> id }` table.
///
/// New entries take the lowest free id. A vocabulary may transiently have
/// holes (ids below [`Vocabulary::id_bound`] with no entry) while it is being
/// assembled; completed vocabularies are contiguous, see
/// [`Vocabulary::is_contiguous`].
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    id_to_token: Vec<Option<CompactString>>,
    token_to_id: WFHashMap<CompactString, TokenId>,
    holes: BTreeSet<TokenId>,
}

impl PartialEq for Vocabulary {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.id_to_token == other.id_to_token
    }
}

impl Eq for Vocabulary {}

impl Vocabulary {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from an id-ordered token list.
    ///
    /// ## Arguments
    /// * `tokens` - `tokens[i]` is assigned id `i`.
    ///
    /// ## Returns
    /// The vocabulary, or a [`WordforgeError::Document`] if a token repeats.
    pub fn from_token_list<I, S>(tokens: I) -> WFResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for token in tokens {
            let token = token.as_ref();
            if vocab.contains(token) {
                return Err(WordforgeError::document(format!(
                    "duplicate vocabulary entry: {token:?}"
                )));
            }
            vocab.insert(token);
        }
        Ok(vocab)
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    /// One past the largest assigned id.
    pub fn id_bound(&self) -> usize {
        self.id_to_token.len()
    }

    /// Are the ids exactly `0..len`?
    pub fn is_contiguous(&self) -> bool {
        self.holes.is_empty()
    }

    /// Does the vocabulary contain `token`?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.token_to_id.contains_key(token)
    }

    /// Look up the id of `token`.
    pub fn get_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    /// Look up the token string of `id`.
    pub fn get_token(
        &self,
        id: TokenId,
    ) -> Option<&str> {
        self.id_to_token
            .get(id as usize)
            .and_then(|slot| slot.as_deref())
    }

    /// Insert `token` at the lowest free id.
    ///
    /// ## Returns
    /// The id of `token`; the existing id if it was already present.
    pub fn insert(
        &mut self,
        token: &str,
    ) -> TokenId {
        if let Some(id) = self.get_id(token) {
            return id;
        }

        let token = CompactString::from(token);
        let id = match self.holes.pop_first() {
            Some(id) => {
                self.id_to_token[id as usize] = Some(token.clone());
                id
            }
            None => {
                let id = self.id_to_token.len() as TokenId;
                self.id_to_token.push(Some(token.clone()));
                id
            }
        };
        self.token_to_id.insert(token, id);
        id
    }

    /// Insert `token` at a fixed `id`.
    ///
    /// Ids between the current bound and `id` become holes.
    ///
    /// ## Returns
    /// `Ok(())` if the entry now exists exactly as requested;
    /// a [`WordforgeError::Config`] if either the token or the id is
    /// already bound to something else.
    pub fn insert_at(
        &mut self,
        token: &str,
        id: TokenId,
    ) -> WFResult<()> {
        match (self.get_id(token), self.get_token(id)) {
            (Some(existing), _) if existing == id => return Ok(()),
            (Some(existing), _) => {
                return Err(WordforgeError::config(format!(
                    "token {token:?} is already bound to id {existing}"
                )));
            }
            (None, Some(other)) => {
                return Err(WordforgeError::config(format!(
                    "id {id} is already bound to token {other:?}"
                )));
            }
            (None, None) => {}
        }

        let slot = id as usize;
        while self.id_to_token.len() <= slot {
            let hole = self.id_to_token.len() as TokenId;
            self.id_to_token.push(None);
            self.holes.insert(hole);
        }
        self.holes.remove(&id);

        let token = CompactString::from(token);
        self.id_to_token[slot] = Some(token.clone());
        self.token_to_id.insert(token, id);
        Ok(())
    }

    /// Iterate over `(id, token)` entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> + '_ {
        self.id_to_token
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_deref().map(|t| (id as TokenId, t)))
    }

    /// The id-ordered token list.
    ///
    /// ## Returns
    /// The list, or a [`WordforgeError::Config`] if the vocabulary has holes.
    pub fn to_token_list(&self) -> WFResult<Vec<CompactString>> {
        self.id_to_token
            .iter()
            .enumerate()
            .map(|(id, slot)| {
                slot.clone().ok_or_else(|| {
                    WordforgeError::config(format!("vocabulary has no entry for id {id}"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut vocab = Vocabulary::new();
        assert!(vocab.is_empty());

        assert_eq!(vocab.insert("a"), 0);
        assert_eq!(vocab.insert("b"), 1);
        assert_eq!(vocab.insert("a"), 0);

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.get_id("b"), Some(1));
        assert_eq!(vocab.get_token(0), Some("a"));
        assert_eq!(vocab.get_token(2), None);
        assert!(vocab.is_contiguous());
    }

    #[test]
    fn test_insert_at_fills_holes() {
        let mut vocab = Vocabulary::new();
        vocab.insert_at("[X]", 3).unwrap();
        assert_eq!(vocab.id_bound(), 4);
        assert!(!vocab.is_contiguous());
        assert!(vocab.to_token_list().is_err());

        assert_eq!(vocab.insert("a"), 0);
        assert_eq!(vocab.insert("b"), 1);
        assert_eq!(vocab.insert("c"), 2);
        assert!(vocab.is_contiguous());
        assert_eq!(vocab.insert("d"), 4);

        assert_eq!(
            vocab.to_token_list().unwrap(),
            vec!["a", "b", "c", "[X]", "d"]
        );
    }

    #[test]
    fn test_insert_at_conflicts() {
        let mut vocab = Vocabulary::new();
        vocab.insert("a");

        assert!(vocab.insert_at("a", 0).is_ok());
        assert!(matches!(
            vocab.insert_at("a", 5),
            Err(WordforgeError::Config(_))
        ));
        assert!(matches!(
            vocab.insert_at("b", 0),
            Err(WordforgeError::Config(_))
        ));
    }

    #[test]
    fn test_from_token_list() {
        let vocab = Vocabulary::from_token_list(["x", "y", "z"]).unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec![
            (0, "x"),
            (1, "y"),
            (2, "z")
        ]);

        assert!(matches!(
            Vocabulary::from_token_list(["x", "x"]),
            Err(WordforgeError::Document(_))
        ));
    }
}
