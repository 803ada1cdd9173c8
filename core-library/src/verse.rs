//! Verse pagination over stored lyrics.

use crate::error::{LibraryError, Result};

/// Separator between verses: one blank line.
pub const VERSE_DELIMITER: &str = "\n\n";

/// Split lyrics into verses, in order, without trimming.
///
/// Leading or trailing delimiters produce empty verses; text without a
/// delimiter is a single verse.
pub fn split_verses(text: &str) -> Vec<&str> {
    text.split(VERSE_DELIMITER).collect()
}

/// Return the verse at 1-indexed `page`.
///
/// # Errors
///
/// `PageOutOfRange` if `page < 1` or `page` exceeds the verse count.
pub fn verse_at(text: &str, page: i64) -> Result<&str> {
    let verses = split_verses(text);

    usize::try_from(page)
        .ok()
        .and_then(|page| page.checked_sub(1))
        .and_then(|index| verses.get(index).copied())
        .ok_or(LibraryError::PageOutOfRange {
            page,
            verses: verses.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_three_verses() {
        assert_eq!(split_verses("A\n\nB\n\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_verse_at_page() {
        let text = "A\n\nB\n\nC";
        assert_eq!(verse_at(text, 1).unwrap(), "A");
        assert_eq!(verse_at(text, 2).unwrap(), "B");
        assert_eq!(verse_at(text, 3).unwrap(), "C");
    }

    #[test]
    fn test_out_of_range_pages() {
        let text = "A\n\nB\n\nC";
        for page in [0, 4, -1, i64::MAX] {
            assert!(
                matches!(
                    verse_at(text, page),
                    Err(LibraryError::PageOutOfRange { verses: 3, .. })
                ),
                "page {page} accepted"
            );
        }
    }

    #[test]
    fn test_empty_segments_are_kept() {
        assert_eq!(split_verses("\n\nA\n\n"), vec!["", "A", ""]);
        assert_eq!(split_verses(""), vec![""]);
        assert_eq!(verse_at("\n\nA", 1).unwrap(), "");
    }

    #[test]
    fn test_single_newlines_stay_inside_a_verse() {
        assert_eq!(
            split_verses("line 1\nline 2\n\nline 3"),
            vec!["line 1\nline 2", "line 3"]
        );
        assert_eq!(split_verses("A\n\n\nB"), vec!["A", "\nB"]);
    }
}
