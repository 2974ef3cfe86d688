//! # Merge Rules

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{WFResult, WordforgeError},
    types::{Pair, TokenId, WFHashMap},
    vocab::Vocabulary,
};

/// A learned `(left, right) -> left + right` merge.
///
/// The rank of a rule is its position in a [`MergeTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRule {
    /// The left symbol.
    pub left: CompactString,

    /// The right symbol.
    pub right: CompactString,
}

impl MergeRule {
    /// Create a new rule.
    pub fn new<L: AsRef<str>, R: AsRef<str>>(
        left: L,
        right: R,
    ) -> Self {
        Self {
            left: left.as_ref().into(),
            right: right.as_ref().into(),
        }
    }

    /// The merged symbol.
    pub fn merged(&self) -> CompactString {
        let mut merged = self.left.clone();
        merged.push_str(&self.right);
        merged
    }
}

/// The result of applying a rule to an id pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeTarget {
    /// The rule rank; lower ranks apply first.
    pub rank: u32,

    /// The id of the merged symbol.
    pub token: TokenId,
}

/// Rank-ordered merge rules, indexed by id pair.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    rules: Vec<MergeRule>,
    index: WFHashMap<Pair<TokenId>, MergeTarget>,
}

impl PartialEq for MergeTable {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rules == other.rules
    }
}

impl MergeTable {
    /// Build a table from rank-ordered rules.
    ///
    /// Every `left`, `right` and merged symbol must be in `vocab`.
    /// If a pair repeats, the lowest rank wins.
    pub fn from_rules(
        rules: Vec<MergeRule>,
        vocab: &Vocabulary,
    ) -> WFResult<Self> {
        let lookup = |symbol: &str| {
            vocab.get_id(symbol).ok_or_else(|| {
                WordforgeError::document(format!("merge symbol {symbol:?} is not in the vocabulary"))
            })
        };

        let mut index: WFHashMap<Pair<TokenId>, MergeTarget> = WFHashMap::default();
        index.reserve(rules.len());
        for (rank, rule) in rules.iter().enumerate() {
            let pair = (lookup(rule.left.as_str())?, lookup(rule.right.as_str())?);
            let token = lookup(rule.merged().as_str())?;
            index.entry(pair).or_insert(MergeTarget {
                rank: rank as u32,
                token,
            });
        }

        Ok(Self { rules, index })
    }

    /// The rules in rank order.
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up the rule for an adjacent id pair.
    pub fn lookup(
        &self,
        pair: Pair<TokenId>,
    ) -> Option<MergeTarget> {
        self.index.get(&pair).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vocab() -> Vocabulary {
        Vocabulary::from_token_list(["a", "b", "c</w>", "ab", "abc</w>"]).unwrap()
    }

    #[test]
    fn test_merged() {
        assert_eq!(MergeRule::new("ab", "c</w>").merged(), "abc</w>");
    }

    #[test]
    fn test_from_rules() {
        let vocab = sample_vocab();
        let table = MergeTable::from_rules(
            vec![
                MergeRule::new("a", "b"),
                MergeRule::new("ab", "c</w>"),
                MergeRule::new("a", "b"),
            ],
            &vocab,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.lookup((0, 1)),
            Some(MergeTarget { rank: 0, token: 3 })
        );
        assert_eq!(
            table.lookup((3, 2)),
            Some(MergeTarget { rank: 1, token: 4 })
        );
        assert_eq!(table.lookup((1, 0)), None);
    }

    #[test]
    fn test_from_rules_missing_symbol() {
        let vocab = sample_vocab();
        let err = MergeTable::from_rules(vec![MergeRule::new("b", "c</w>")], &vocab).unwrap_err();
        assert!(matches!(err, WordforgeError::Document(_)));
    }
}
