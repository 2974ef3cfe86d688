//! # Padding

use serde::{Deserialize, Serialize};

use crate::{encoding::Encoding, types::TokenId};

/// Which side of an encoding receives padding.
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
pub enum PaddingDirection {
    /// Padding before the tokens.
    Left,

    /// Padding after the tokens.
    #[default]
    Right,
}

/// The padded length.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingLength {
    /// Pad every encoding to a fixed length.
    Fixed(usize),

    /// Pad a batch to its longest member; single encodings are unchanged.
    #[default]
    BatchLongest,
}

/// Padding settings.
///
/// Padding uses the `pad` special token.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    /// The padded length.
    pub length: PaddingLength,

    /// The padded side.
    pub direction: PaddingDirection,
}

impl PaddingConfig {
    /// Sets the padded length.
    pub fn with_length(
        self,
        length: PaddingLength,
    ) -> Self {
        Self { length, ..self }
    }

    /// Sets the padded side.
    pub fn with_direction(
        self,
        direction: PaddingDirection,
    ) -> Self {
        Self { direction, ..self }
    }

    /// Pad a batch of encodings in place.
    pub fn apply_batch(
        &self,
        encodings: &mut [Encoding],
        pad_id: TokenId,
        pad_token: &str,
    ) {
        let target = match self.length {
            PaddingLength::Fixed(n) => n,
            PaddingLength::BatchLongest => encodings.iter().map(Encoding::len).max().unwrap_or(0),
        };
        for encoding in encodings {
            encoding.pad(target, pad_id, pad_token, self.direction);
        }
    }
}
