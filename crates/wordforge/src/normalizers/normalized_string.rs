//! # Normalized Strings with Alignments

use core::ops::Range;

/// A normalized string and its alignment back to the original text.
///
/// Every byte of the normalized string maps to the byte range of the
/// original text it was produced from. Transforms that change length
/// (ligature expansion, case mapping) keep offsets exact at the granularity
/// of the original segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedString {
    original_len: usize,
    normalized: String,
    alignments: Vec<(usize, usize)>,
}

impl NormalizedString {
    /// Wrap `text` with the identity alignment.
    pub fn from_original(text: &str) -> Self {
        let mut alignments = Vec::with_capacity(text.len());
        for (start, c) in text.char_indices() {
            let end = start + c.len_utf8();
            alignments.extend(core::iter::repeat_n((start, end), c.len_utf8()));
        }
        Self {
            original_len: text.len(),
            normalized: text.to_string(),
            alignments,
        }
    }

    pub(crate) fn from_parts(
        original_len: usize,
        normalized: String,
        alignments: Vec<(usize, usize)>,
    ) -> Self {
        debug_assert_eq!(normalized.len(), alignments.len());
        Self {
            original_len,
            normalized,
            alignments,
        }
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Consume into the normalized text.
    pub fn into_string(self) -> String {
        self.normalized
    }

    /// The byte length of the normalized text.
    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    /// Is the normalized text empty?
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// The byte length of the original text.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Map a normalized byte range to the original byte range it covers.
    ///
    /// An empty range maps to the empty original range at its position.
    ///
    /// ## Returns
    /// `None` if `range` is out of bounds.
    pub fn original_range(
        &self,
        range: Range<usize>,
    ) -> Option<Range<usize>> {
        if range.start > range.end || range.end > self.alignments.len() {
            return None;
        }
        if range.is_empty() {
            let pos = match self.alignments.get(range.start) {
                Some(&(start, _)) => start,
                None => self.original_len,
            };
            return Some(pos..pos);
        }
        let start = self.alignments[range.start].0;
        let end = self.alignments[range.end - 1].1;
        Some(start..end)
    }

    /// Trim leading and trailing whitespace, keeping alignments consistent.
    pub fn trim(&mut self) {
        let trimmed_end = self.normalized.trim_end().len();
        self.normalized.truncate(trimmed_end);
        self.alignments.truncate(trimmed_end);

        let leading = self.normalized.len() - self.normalized.trim_start().len();
        if leading > 0 {
            self.normalized.drain(..leading);
            self.alignments.drain(..leading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let s = NormalizedString::from_original("aé");
        assert_eq!(s.as_str(), "aé");
        assert_eq!(s.len(), 3);
        assert_eq!(s.original_range(0..1), Some(0..1));
        assert_eq!(s.original_range(1..3), Some(1..3));
        assert_eq!(s.original_range(0..3), Some(0..3));
        assert_eq!(s.original_range(3..3), Some(3..3));
        assert_eq!(s.original_range(0..4), None);
    }

    #[test]
    fn test_trim() {
        let mut s = NormalizedString::from_original("  ab ");
        s.trim();
        assert_eq!(s.as_str(), "ab");
        assert_eq!(s.original_range(0..2), Some(2..4));
        assert_eq!(s.original_len(), 5);

        let mut blank = NormalizedString::from_original("   ");
        blank.trim();
        assert!(blank.is_empty());
        assert_eq!(blank.original_range(0..0), Some(3..3));
    }
}
