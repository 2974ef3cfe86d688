//! # Atomic Symbols
//!
//! A span splits into one symbol per character; the last character carries
//! the end-of-word suffix.

use core::ops::Range;

use compact_str::CompactString;

/// The default end-of-word suffix.
pub const DEFAULT_END_OF_WORD_SUFFIX: &str = "</w>";

/// Split `span` into atomic symbols.
///
/// ## Returns
/// `(byte_range, symbol)` pairs in order; `byte_range` is local to `span`.
pub fn atomic_symbols(
    span: &str,
    end_of_word_suffix: Option<&str>,
) -> Vec<(Range<usize>, CompactString)> {
    let mut symbols: Vec<(Range<usize>, CompactString)> = span
        .char_indices()
        .map(|(start, c)| {
            let mut buf = [0u8; 4];
            (
                start..start + c.len_utf8(),
                CompactString::from(&*c.encode_utf8(&mut buf)),
            )
        })
        .collect();

    if let (Some(suffix), Some((_, last))) = (end_of_word_suffix, symbols.last_mut()) {
        last.push_str(suffix);
    }
    symbols
}

/// Strip the end-of-word suffix from a symbol, if present.
///
/// ## Returns
/// `(stem, had_suffix)`.
pub fn strip_end_of_word<'a>(
    symbol: &'a str,
    end_of_word_suffix: Option<&str>,
) -> (&'a str, bool) {
    match end_of_word_suffix.and_then(|suffix| symbol.strip_suffix(suffix)) {
        Some(stem) => (stem, true),
        None => (symbol, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_symbols() {
        let symbols = atomic_symbols("héy", Some("</w>"));
        assert_eq!(symbols, vec![
            (0..1, CompactString::from("h")),
            (1..3, CompactString::from("é")),
            (3..4, CompactString::from("y</w>")),
        ]);

        let bare = atomic_symbols("ab", None);
        assert_eq!(bare[1].1, "b");
        assert!(atomic_symbols("", Some("</w>")).is_empty());
    }

    #[test]
    fn test_strip_end_of_word() {
        assert_eq!(strip_end_of_word("lo</w>", Some("</w>")), ("lo", true));
        assert_eq!(strip_end_of_word("lo", Some("</w>")), ("lo", false));
        assert_eq!(strip_end_of_word("lo</w>", None), ("lo</w>", false));
    }
}
