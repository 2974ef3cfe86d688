//! # Text Normalizer

use serde::{Deserialize, Serialize};
use unicode_normalization::{
    IsNormalized,
    UnicodeNormalization,
    char::{canonical_combining_class, is_combining_mark},
    is_nfc_quick,
    is_nfkc_quick,
};

use crate::normalizers::{NormalizationForm, NormalizedString};

/// Options for [`Normalizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// The Unicode normalization form.
    pub form: NormalizationForm,

    /// Lowercase after normalization.
    ///
    /// Mapping is per segment, without word context: a final capital sigma
    /// becomes `σ`, not `ς`.
    pub lowercase: bool,

    /// Remove combining marks.
    pub strip_accents: bool,

    /// Trim leading and trailing whitespace.
    pub strip_whitespace: bool,
}

impl NormalizerConfig {
    /// Sets the normalization form.
    pub fn with_form(
        self,
        form: NormalizationForm,
    ) -> Self {
        Self { form, ..self }
    }

    /// Sets lowercasing.
    pub fn with_lowercase(
        self,
        lowercase: bool,
    ) -> Self {
        Self { lowercase, ..self }
    }

    /// Sets accent stripping.
    pub fn with_strip_accents(
        self,
        strip_accents: bool,
    ) -> Self {
        Self {
            strip_accents,
            ..self
        }
    }

    /// Sets whitespace trimming.
    pub fn with_strip_whitespace(
        self,
        strip_whitespace: bool,
    ) -> Self {
        Self {
            strip_whitespace,
            ..self
        }
    }
}

/// Applies a [`NormalizerConfig`] to text.
///
/// The input is cut into segments at characters that never combine with what
/// precedes them; each segment is transformed independently, and every output
/// byte aligns to its segment's original byte range. The pipeline per
/// segment is: normalize, lowercase, strip accents, normalize again. The
/// result is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl From<NormalizerConfig> for Normalizer {
    fn from(config: NormalizerConfig) -> Self {
        Self::new(config)
    }
}

impl Normalizer {
    /// Create a normalizer.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// The active options.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Does this normalizer leave every input unchanged?
    pub fn is_identity(&self) -> bool {
        self.config == NormalizerConfig::default()
    }

    /// Normalize `text`, keeping an alignment to the original.
    pub fn normalize(
        &self,
        text: &str,
    ) -> NormalizedString {
        if self.is_identity() {
            return NormalizedString::from_original(text);
        }

        let mut normalized = String::with_capacity(text.len());
        let mut alignments = Vec::with_capacity(text.len());
        for (start, segment) in Segments::new(text) {
            let before = normalized.len();
            self.transform_segment(segment, &mut normalized);
            let produced = normalized.len() - before;
            alignments.extend(core::iter::repeat_n(
                (start, start + segment.len()),
                produced,
            ));
        }

        let mut result = NormalizedString::from_parts(text.len(), normalized, alignments);
        if self.config.strip_whitespace {
            result.trim();
        }
        result
    }

    /// Normalize `text`, discarding the alignment.
    pub fn normalize_str(
        &self,
        text: &str,
    ) -> String {
        self.normalize(text).into_string()
    }

    fn transform_segment(
        &self,
        segment: &str,
        out: &mut String,
    ) {
        let NormalizerConfig {
            form,
            lowercase,
            strip_accents,
            ..
        } = self.config;

        if !lowercase && !strip_accents {
            form.apply_into(segment, out);
            return;
        }

        let mut buf = form.apply(segment);
        if lowercase {
            buf = buf.to_lowercase();
        }
        if strip_accents {
            buf = buf.nfd().filter(|&c| !is_combining_mark(c)).collect();
        }
        form.apply_into(&buf, out);
    }
}

/// Can `c` never combine with the text before it?
///
/// True for starters that pass both the NFC and NFKC quick checks. This
/// excludes the second halves of canonical compositions (Hangul jamo, the
/// two-part vowel signs of Tamil, Malayalam, Kannada and Sinhala, and so on).
fn starts_segment(c: char) -> bool {
    canonical_combining_class(c) == 0
        && is_nfc_quick(core::iter::once(c)) == IsNormalized::Yes
        && is_nfkc_quick(core::iter::once(c)) == IsNormalized::Yes
}

/// Iterator over `(byte_offset, segment)` composition segments.
struct Segments<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let first = rest.chars().next()?;

        let len = rest
            .char_indices()
            .skip(1)
            .find(|&(_, c)| starts_segment(c))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        debug_assert!(len >= first.len_utf8());

        let start = self.pos;
        self.pos += len;
        Some((start, &rest[..len]))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn full() -> Normalizer {
        NormalizerConfig::default()
            .with_form(NormalizationForm::Nfkc)
            .with_lowercase(true)
            .with_strip_accents(true)
            .into()
    }

    #[test]
    fn test_segments() {
        let segs: Vec<_> = Segments::new("ae\u{301}\u{1100}\u{1161}b").collect();
        assert_eq!(segs, vec![
            (0, "a"),
            (1, "e\u{301}"),
            (4, "\u{1100}\u{1161}"),
            (10, "b"),
        ]);
        assert_eq!(Segments::new("").count(), 0);
        assert_eq!(Segments::new("\u{301}a").collect::<Vec<_>>(), vec![
            (0, "\u{301}"),
            (2, "a")
        ]);
    }

    #[test]
    fn test_identity() {
        let normalizer = Normalizer::default();
        assert!(normalizer.is_identity());
        assert_eq!(normalizer.normalize_str("Héllo"), "Héllo");
    }

    #[test]
    fn test_lowercase() {
        let normalizer: Normalizer = NormalizerConfig::default().with_lowercase(true).into();
        assert_eq!(normalizer.normalize_str("Hello World"), "hello world");
    }

    #[test]
    fn test_forms() {
        let nfc: Normalizer = NormalizerConfig::default()
            .with_form(NormalizationForm::Nfc)
            .into();
        assert_eq!(nfc.normalize_str("e\u{301}"), "\u{e9}");

        let nfkd: Normalizer = NormalizerConfig::default()
            .with_form(NormalizationForm::Nfkd)
            .into();
        assert_eq!(nfkd.normalize_str("\u{fb01}\u{e9}"), "fie\u{301}");
    }

    #[test]
    fn test_composing_starters() {
        let nfc: Normalizer = NormalizerConfig::default()
            .with_form(NormalizationForm::Nfc)
            .into();
        for (text, composed) in [
            ("\u{bc6}\u{bbe}", "\u{bca}"),
            ("\u{d46}\u{d3e}", "\u{d4a}"),
            ("\u{cc6}\u{cc2}", "\u{cca}"),
            ("\u{cc6}\u{cc2}\u{cd5}", "\u{ccb}"),
            ("\u{dd9}\u{dcf}", "\u{ddc}"),
            ("\u{1100}\u{1161}\u{11a8}", "\u{ac01}"),
        ] {
            assert_eq!(nfc.normalize_str(text), composed, "{text:?}");
        }

        let ns = nfc.normalize("a\u{bc6}\u{bbe}b");
        assert_eq!(ns.as_str(), "a\u{bca}b");
        assert_eq!(ns.original_range(1..4), Some(1..7));
    }

    #[test]
    fn test_lowercase_is_per_segment() {
        let normalizer: Normalizer = NormalizerConfig::default().with_lowercase(true).into();
        assert_eq!(normalizer.normalize_str("ΟΔΟΣ"), "οδοσ");
    }

    #[test]
    fn test_strip_accents() {
        assert_eq!(full().normalize_str("Café CRÈME"), "cafe creme");

        let decomposed: Normalizer = NormalizerConfig::default()
            .with_strip_accents(true)
            .into();
        assert_eq!(decomposed.normalize_str("naïve"), "naive");
    }

    #[test]
    fn test_strip_whitespace() {
        let normalizer: Normalizer = NormalizerConfig::default()
            .with_lowercase(true)
            .with_strip_whitespace(true)
            .into();
        let ns = normalizer.normalize("  Hi There \n");
        assert_eq!(ns.as_str(), "hi there");
        assert_eq!(ns.original_range(0..2), Some(2..4));
    }

    #[test]
    fn test_alignment_ligature() {
        // "ﬁ" (3 bytes) expands to "fi" (2 bytes); both map to the ligature.
        let ns = full().normalize("a\u{fb01}b");
        assert_eq!(ns.as_str(), "afib");
        assert_eq!(ns.original_range(0..1), Some(0..1));
        assert_eq!(ns.original_range(1..2), Some(1..4));
        assert_eq!(ns.original_range(2..3), Some(1..4));
        assert_eq!(ns.original_range(3..4), Some(4..5));
    }

    #[test]
    fn test_alignment_dotted_capital_i() {
        let normalizer: Normalizer = NormalizerConfig::default().with_lowercase(true).into();
        let ns = normalizer.normalize("\u{130}x");
        assert_eq!(ns.as_str(), "i\u{307}x");
        assert_eq!(ns.original_range(0..3), Some(0..2));
        assert_eq!(ns.original_range(3..4), Some(2..3));
    }

    fn all_configs() -> Vec<Normalizer> {
        let mut configs = Vec::new();
        for form in [
            NormalizationForm::None,
            NormalizationForm::Nfc,
            NormalizationForm::Nfd,
            NormalizationForm::Nfkc,
            NormalizationForm::Nfkd,
        ] {
            for lowercase in [false, true] {
                for strip_accents in [false, true] {
                    configs.push(
                        NormalizerConfig::default()
                            .with_form(form)
                            .with_lowercase(lowercase)
                            .with_strip_accents(strip_accents)
                            .with_strip_whitespace(lowercase)
                            .into(),
                    );
                }
            }
        }
        configs
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            text in "[a-zA-Z0-9 .,!?\u{c0}-\u{17f}\u{300}-\u{36f}\u{fb00}-\u{fb06}\u{391}-\u{3c9}\u{400}-\u{45f}\u{1100}-\u{1112}\u{1161}-\u{1175}\u{ac00}-\u{ac10}\u{130}]{0,32}"
        ) {
            for normalizer in all_configs() {
                let once = normalizer.normalize_str(&text);
                let twice = normalizer.normalize_str(&once);
                prop_assert_eq!(&once, &twice, "config: {:?}", normalizer.config());
            }
        }

        #[test]
        fn prop_forms_match_whole_text(
            text in "[a-z \u{300}-\u{36f}\u{bbe}\u{bc6}-\u{bcc}\u{bd7}\u{cbf}\u{cc0}\u{cc2}\u{cc6}-\u{ccb}\u{cd5}\u{cd6}\u{d3e}\u{d46}-\u{d4c}\u{d57}\u{dca}-\u{dcf}\u{dd9}-\u{dde}\u{1100}-\u{1112}\u{1161}-\u{1175}\u{11a8}-\u{11c2}\u{ac00}-\u{ac10}\u{fb01}]{0,24}"
        ) {
            let nfc: Normalizer = NormalizerConfig::default()
                .with_form(NormalizationForm::Nfc)
                .into();
            let nfkc: Normalizer = NormalizerConfig::default()
                .with_form(NormalizationForm::Nfkc)
                .into();
            prop_assert_eq!(nfc.normalize_str(&text), text.nfc().collect::<String>());
            prop_assert_eq!(nfkc.normalize_str(&text), text.nfkc().collect::<String>());
        }

        #[test]
        fn prop_alignments_cover_original(text in "\\PC{0,32}") {
            let ns = full().normalize(&text);
            let range = ns.original_range(0..ns.len()).unwrap();
            prop_assert!(range.end <= text.len());
            prop_assert!(text.is_char_boundary(range.start));
            prop_assert!(text.is_char_boundary(range.end));
        }
    }
}
