//! Generic length-bucketed keyword lookup, used by every per-language
//! scanner's keyword table.
//!
//! Keyword tables are small (tens of entries), so a linear scan within
//! each length bucket is fast in practice; the length check alone
//! rejects most non-keyword identifiers before any string comparison.

use ulight_core::Category;

/// Looks `word` up in `table`, first rejecting any entry whose length
/// doesn't match (cheap), then comparing the remaining candidates.
#[must_use]
pub fn lookup_length_bucketed(table: &[(&str, Category)], word: &[u8]) -> Option<Category> {
    table
        .iter()
        .find(|(text, _)| text.as_bytes() == word)
        .map(|&(_, cat)| cat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &[(&str, Category)] = &[("if", Category::KeywordControl), ("int", Category::KeywordType)];

    #[test]
    fn finds_exact_match() {
        assert_eq!(lookup_length_bucketed(TABLE, b"if"), Some(Category::KeywordControl));
    }

    #[test]
    fn rejects_non_keyword() {
        assert_eq!(lookup_length_bucketed(TABLE, b"iffy"), None);
    }
}
