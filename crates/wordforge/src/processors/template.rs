//! # Post-processing Templates
//!
//! A template is a whitespace separated list of pieces:
//! * `$A`, `$B` - the first and second sequence;
//! * anything else - a special token, by logical name or surface string.
//!
//! Any piece may carry a `:<type_id>` suffix; the default type id is `0`.
//!
//! ```
//! use wordforge::processors::{Piece, SequenceId, Template};
//!
//! let template: Template = "cls $A sep $B:1 sep:1".parse().unwrap();
//! assert_eq!(template.pieces()[3], Piece::Sequence {
//!     id: SequenceId::B,
//!     type_id: 1
//! });
//! assert_eq!(template.to_string(), "cls $A sep $B:1 sep:1");
//! ```

use core::{fmt, str::FromStr};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::errors::{WFResult, WordforgeError};

/// A sequence placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceId {
    /// The first sequence.
    A,

    /// The second sequence.
    B,
}

/// One slot of a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Piece {
    /// A special token.
    Special {
        /// The logical name or surface string.
        name: CompactString,

        /// The type id assigned to the token.
        type_id: u32,
    },

    /// A sequence placeholder.
    Sequence {
        /// Which sequence.
        id: SequenceId,

        /// The type id assigned to every token of the sequence.
        type_id: u32,
    },
}

impl FromStr for Piece {
    type Err = WordforgeError;

    fn from_str(s: &str) -> WFResult<Self> {
        let (body, type_id) = match s.rsplit_once(':') {
            Some((body, tail))
                if !body.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) =>
            {
                let type_id = tail
                    .parse::<u32>()
                    .map_err(|e| WordforgeError::template(format!("bad type id in {s:?}: {e}")))?;
                (body, type_id)
            }
            _ => (s, 0),
        };

        if body.is_empty() {
            return Err(WordforgeError::template("empty template piece"));
        }
        Ok(match body {
            "$A" | "$a" => Piece::Sequence {
                id: SequenceId::A,
                type_id,
            },
            "$B" | "$b" => Piece::Sequence {
                id: SequenceId::B,
                type_id,
            },
            _ if body.starts_with('$') => {
                return Err(WordforgeError::template(format!(
                    "unknown sequence placeholder {body:?}"
                )));
            }
            _ => Piece::Special {
                name: body.into(),
                type_id,
            },
        })
    }
}

impl fmt::Display for Piece {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let type_id = match self {
            Piece::Special { name, type_id } => {
                f.write_str(name)?;
                *type_id
            }
            Piece::Sequence { id, type_id } => {
                write!(f, "${id:?}")?;
                *type_id
            }
        };
        if type_id != 0 {
            write!(f, ":{type_id}")?;
        }
        Ok(())
    }
}

/// An ordered list of [`Piece`]s.
///
/// Each sequence placeholder occurs at most once.
/// Serializes as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    pub(crate) pieces: Vec<Piece>,
}

impl Template {
    /// Build a template from pieces.
    pub fn new(pieces: Vec<Piece>) -> WFResult<Self> {
        for seq in [SequenceId::A, SequenceId::B] {
            let count = pieces
                .iter()
                .filter(|p| matches!(p, Piece::Sequence { id, .. } if *id == seq))
                .count();
            if count > 1 {
                return Err(WordforgeError::template(format!(
                    "sequence ${seq:?} occurs {count} times"
                )));
            }
        }
        Ok(Self { pieces })
    }

    /// The pieces.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Does the template place `seq`?
    pub fn contains(
        &self,
        seq: SequenceId,
    ) -> bool {
        self.pieces
            .iter()
            .any(|p| matches!(p, Piece::Sequence { id, .. } if *id == seq))
    }

    /// Iterate over the special token names, in order.
    pub fn special_names(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Special { name, .. } => Some(name.as_str()),
            Piece::Sequence { .. } => None,
        })
    }

    /// The number of special tokens the template inserts.
    pub fn added_tokens(&self) -> usize {
        self.special_names().count()
    }
}

impl FromStr for Template {
    type Err = WordforgeError;

    fn from_str(s: &str) -> WFResult<Self> {
        let pieces = s
            .split_whitespace()
            .map(Piece::from_str)
            .collect::<WFResult<Vec<_>>>()?;
        Self::new(pieces)
    }
}

impl TryFrom<String> for Template {
    type Error = WordforgeError;

    fn try_from(s: String) -> WFResult<Self> {
        s.parse()
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.to_string()
    }
}

impl fmt::Display for Template {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (idx, piece) in self.pieces.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{piece}")?;
        }
        Ok(())
    }
}
