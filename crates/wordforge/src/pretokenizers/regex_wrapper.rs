//! # Regex Wrapper
//! Mixes `regex` and `fancy_regex` behind one matcher.

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::{WFResult, WordforgeError};

/// A regex pattern and the engine it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "engine", content = "pattern", rename_all = "snake_case")]
pub enum RegexPattern {
    /// A pattern for the `regex` crate.
    Basic(String),

    /// A pattern for the `fancy_regex` crate (look-around, backreferences).
    Fancy(String),

    /// Try the `regex` crate first, and fall back to `fancy_regex`.
    Adaptive(String),
}

impl<S: AsRef<str>> From<S> for RegexPattern {
    fn from(pattern: S) -> Self {
        Self::Adaptive(pattern.as_ref().to_string())
    }
}

impl RegexPattern {
    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(pattern) | Self::Fancy(pattern) | Self::Adaptive(pattern) => pattern,
        }
    }

    /// Compile the pattern.
    ///
    /// ## Returns
    /// The compiled [`RegexWrapper`], or a [`WordforgeError::Config`].
    pub fn compile(&self) -> WFResult<RegexWrapper> {
        let invalid =
            |err: &dyn core::fmt::Display| WordforgeError::config(format!("invalid pattern {:?}: {err}", self.as_str()));

        match self {
            Self::Basic(pattern) => regex::Regex::new(pattern)
                .map(RegexWrapper::Basic)
                .map_err(|e| invalid(&e)),
            Self::Fancy(pattern) => fancy_regex::Regex::new(pattern)
                .map(RegexWrapper::Fancy)
                .map_err(|e| invalid(&e)),
            Self::Adaptive(pattern) => regex::Regex::new(pattern)
                .map(RegexWrapper::Basic)
                .or_else(|_| {
                    fancy_regex::Regex::new(pattern)
                        .map(RegexWrapper::Fancy)
                        .map_err(|e| invalid(&e))
                }),
        }
    }
}

/// A compiled regex from either engine.
#[derive(Debug, Clone)]
pub enum RegexWrapper {
    /// Wrapper for `regex::Regex`.
    Basic(regex::Regex),

    /// Wrapper for `fancy_regex::Regex`.
    Fancy(fancy_regex::Regex),
}

impl RegexWrapper {
    /// Is this `Fancy`?
    pub fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(regex) => regex.as_str(),
            Self::Fancy(regex) => regex.as_str(),
        }
    }

    /// Iterate over the byte ranges of non-overlapping matches.
    ///
    /// A `fancy_regex` runtime failure (backtrack limit) ends the iteration
    /// and is logged.
    pub fn find_ranges<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> MatchRanges<'r, 'h> {
        match self {
            Self::Basic(regex) => MatchRanges::Basic(regex.find_iter(haystack)),
            Self::Fancy(regex) => MatchRanges::Fancy(regex.find_iter(haystack)),
        }
    }
}

/// Iterator over match ranges; see [`RegexWrapper::find_ranges`].
pub enum MatchRanges<'r, 'h> {
    /// Matches from `regex`.
    Basic(regex::Matches<'r, 'h>),

    /// Matches from `fancy_regex`.
    Fancy(fancy_regex::Matches<'r, 'h>),
}

impl Iterator for MatchRanges<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Basic(matches) => matches.next().map(|m| m.range()),
            Self::Fancy(matches) => match matches.next()? {
                Ok(m) => Some(m.range()),
                Err(err) => {
                    log::warn!("pattern matching stopped early: {err}");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_compile() {
        let basic = RegexPattern::from(r"\w+").compile().unwrap();
        assert!(!basic.is_fancy());
        assert_eq!(basic.as_str(), r"\w+");

        // Look-ahead is only supported by `fancy_regex`.
        let fancy = RegexPattern::from(r"\s+(?!\S)").compile().unwrap();
        assert!(fancy.is_fancy());
    }

    #[test]
    fn test_bad_pattern() {
        assert!(matches!(
            RegexPattern::from("(").compile(),
            Err(WordforgeError::Config(_))
        ));
        assert!(RegexPattern::Basic(r"a(?=b)".to_string()).compile().is_err());
    }

    #[test]
    fn test_find_ranges() {
        for pattern in [
            RegexPattern::Basic(r"\w+".to_string()),
            RegexPattern::Fancy(r"\w+".to_string()),
        ] {
            let regex = pattern.compile().unwrap();
            assert_eq!(
                regex.find_ranges("ab, cd").collect::<Vec<_>>(),
                vec![0..2, 4..6]
            );
        }
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&RegexPattern::Fancy("a".to_string())).unwrap();
        assert_eq!(json, r#"{"engine":"fancy","pattern":"a"}"#);
    }
}
