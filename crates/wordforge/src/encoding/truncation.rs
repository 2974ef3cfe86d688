//! # Truncation

use serde::{Deserialize, Serialize};

use crate::{
    encoding::Encoding,
    errors::{WFResult, WordforgeError},
};

/// Which sequence loses tokens when a pair is too long.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TruncationStrategy {
    /// Take tokens from the longer sequence until both fit.
    ///
    /// When both must shrink, the first keeps the extra token of an odd budget.
    #[default]
    LongestFirst,

    /// Only truncate the first sequence.
    OnlyFirst,

    /// Only truncate the second sequence.
    OnlySecond,
}

/// Truncation settings.
///
/// Truncation happens before post-processing, reserving room for the tokens
/// the template adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationConfig {
    /// The maximum final length, template tokens included.
    pub max_length: usize,

    /// Which sequence to truncate.
    #[serde(default)]
    pub strategy: TruncationStrategy,
}

impl TruncationConfig {
    /// Create a config with the default strategy.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            strategy: TruncationStrategy::default(),
        }
    }

    /// Sets the strategy.
    pub fn with_strategy(
        self,
        strategy: TruncationStrategy,
    ) -> Self {
        Self { strategy, ..self }
    }

    /// Truncate one or two sequences in place.
    ///
    /// A single sequence is always truncated, whatever the strategy.
    ///
    /// ## Arguments
    /// * `a` - The first sequence.
    /// * `b` - The optional second sequence.
    /// * `added_tokens` - The number of tokens post-processing will add.
    ///
    /// ## Returns
    /// A [`WordforgeError::Config`] if the strategy forbids truncating the
    /// sequence that is too long.
    pub fn apply(
        &self,
        a: &mut Encoding,
        b: Option<&mut Encoding>,
        added_tokens: usize,
    ) -> WFResult<()> {
        let budget = self.max_length.saturating_sub(added_tokens);

        let Some(b) = b else {
            a.truncate(budget);
            return Ok(());
        };

        let (la, lb) = (a.len(), b.len());
        if la + lb <= budget {
            return Ok(());
        }

        let (keep_a, keep_b) = match self.strategy {
            TruncationStrategy::LongestFirst => {
                let short = la.min(lb);
                if 2 * short <= budget {
                    if la <= lb {
                        (la, budget - la)
                    } else {
                        (budget - lb, lb)
                    }
                } else {
                    let half = budget.div_ceil(2);
                    (half, budget - half)
                }
            }
            TruncationStrategy::OnlyFirst => match budget.checked_sub(lb) {
                Some(keep) => (keep, lb),
                None => {
                    return Err(WordforgeError::config(format!(
                        "second sequence ({lb} tokens) exceeds the truncation budget of {budget}"
                    )));
                }
            },
            TruncationStrategy::OnlySecond => match budget.checked_sub(la) {
                Some(keep) => (la, keep),
                None => {
                    return Err(WordforgeError::config(format!(
                        "first sequence ({la} tokens) exceeds the truncation budget of {budget}"
                    )));
                }
            },
        };

        a.truncate(keep_a);
        b.truncate(keep_b);
        Ok(())
    }
}
