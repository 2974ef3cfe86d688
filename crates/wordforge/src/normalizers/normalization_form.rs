//! # Unicode Normalization Forms

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::errors::{WFResult, WordforgeError};

/// A Unicode normalization form.
///
/// Names parse case-insensitively: `"NFC"`, `"nfkd"`, `"none"`, ...
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum NormalizationForm {
    /// Canonical decomposition, then canonical composition.
    #[strum(serialize = "NFC")]
    #[serde(rename = "NFC")]
    Nfc,

    /// Canonical decomposition.
    #[strum(serialize = "NFD")]
    #[serde(rename = "NFD")]
    Nfd,

    /// Compatibility decomposition, then canonical composition.
    #[strum(serialize = "NFKC")]
    #[serde(rename = "NFKC")]
    Nfkc,

    /// Compatibility decomposition.
    #[strum(serialize = "NFKD")]
    #[serde(rename = "NFKD")]
    Nfkd,

    /// No normalization.
    #[default]
    #[strum(serialize = "none")]
    #[serde(rename = "none")]
    None,
}

impl NormalizationForm {
    /// Parse a form name; unknown names fail with [`WordforgeError::Config`].
    pub fn parse_name(name: &str) -> WFResult<Self> {
        Self::from_str(name.trim()).map_err(|_| {
            WordforgeError::config(format!("unknown normalization form: {name:?}"))
        })
    }

    /// Does this form end with canonical composition?
    pub fn is_composing(&self) -> bool {
        matches!(self, Self::Nfc | Self::Nfkc)
    }

    /// Append the normalized form of `text` to `out`.
    pub fn apply_into(
        &self,
        text: &str,
        out: &mut String,
    ) {
        match self {
            Self::Nfc => out.extend(text.nfc()),
            Self::Nfd => out.extend(text.nfd()),
            Self::Nfkc => out.extend(text.nfkc()),
            Self::Nfkd => out.extend(text.nfkd()),
            Self::None => out.push_str(text),
        }
    }

    /// Return the normalized form of `text`.
    pub fn apply(
        &self,
        text: &str,
    ) -> String {
        let mut out = String::with_capacity(text.len());
        self.apply_into(text, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_parse_name() {
        assert_eq!(NormalizationForm::parse_name("NFC").unwrap(), NormalizationForm::Nfc);
        assert_eq!(NormalizationForm::parse_name("nfkd").unwrap(), NormalizationForm::Nfkd);
        assert_eq!(NormalizationForm::parse_name(" Nfd ").unwrap(), NormalizationForm::Nfd);
        assert_eq!(NormalizationForm::parse_name("NONE").unwrap(), NormalizationForm::None);

        assert!(matches!(
            NormalizationForm::parse_name("NFX"),
            Err(WordforgeError::Config(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for form in NormalizationForm::iter() {
            assert_eq!(NormalizationForm::parse_name(&form.to_string()).unwrap(), form);
        }
    }

    #[test]
    fn test_apply() {
        assert_eq!(NormalizationForm::Nfc.apply("e\u{301}"), "\u{e9}");
        assert_eq!(NormalizationForm::Nfd.apply("\u{e9}"), "e\u{301}");
        assert_eq!(NormalizationForm::Nfkc.apply("\u{fb01}"), "fi");
        assert_eq!(NormalizationForm::None.apply("\u{fb01}"), "\u{fb01}");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&NormalizationForm::Nfkc).unwrap(),
            "\"NFKC\""
        );
        let form: NormalizationForm = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(form, NormalizationForm::None);
    }
}
