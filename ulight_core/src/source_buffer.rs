//! Sentinel-terminated source buffer.
//!
//! Highlighting reads a source buffer byte by byte and frequently peeks one
//! or two bytes ahead. Padding the buffer with a zero sentinel past the end
//! of the real content lets [`Cursor`](crate::cursor::Cursor) peek without a
//! bounds check on every byte.

use memchr::memchr;

/// Bytes of padding appended after the source content and before the next
/// cache-line boundary. Chosen so `peek2` never reads past the allocation.
const MIN_PADDING: usize = 2;
const CACHE_LINE: usize = 64;

/// A kind of non-fatal anomaly noticed while building a [`SourceBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodingIssueKind {
    Utf8Bom,
    Utf16LeBom,
    Utf16BeBom,
    InteriorNull,
}

/// A single anomaly found in the source, recorded but not corrected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EncodingIssue {
    pub kind: EncodingIssueKind,
    pub pos: u32,
    pub len: u32,
}

/// Owns a zero-padded copy of a source buffer suitable for sentinel-based
/// scanning.
///
/// The buffer is at least `source_len + MIN_PADDING` bytes, rounded up to a
/// multiple of `CACHE_LINE`. Every byte past `source_len` is `0x00`.
pub struct SourceBuffer {
    buf: Vec<u8>,
    source_len: u32,
    encoding_issues: Vec<EncodingIssue>,
}

impl SourceBuffer {
    #[must_use]
    pub fn new(source: &[u8]) -> Self {
        let source_len = u32::try_from(source.len()).unwrap_or(u32::MAX);
        let padded_len = (source.len() + MIN_PADDING).div_ceil(CACHE_LINE) * CACHE_LINE;
        let mut buf = vec![0u8; padded_len];
        buf[..source.len()].copy_from_slice(source);

        let encoding_issues = detect_encoding_issues(source, source_len);

        Self {
            buf,
            source_len,
            encoding_issues,
        }
    }

    /// The real source bytes, without sentinel padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// The sentinel-padded bytes, safe to read up to two bytes past `len()`.
    #[must_use]
    pub fn as_sentinel_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.source_len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }

    #[must_use]
    pub fn encoding_issues(&self) -> &[EncodingIssue] {
        &self.encoding_issues
    }

    #[must_use]
    pub fn cursor(&self) -> crate::cursor::Cursor<'_> {
        crate::cursor::Cursor::new(&self.buf, self.source_len)
    }
}

fn detect_encoding_issues(source: &[u8], source_len: u32) -> Vec<EncodingIssue> {
    let mut issues = Vec::new();
    if let Some(kind) = detect_bom(source) {
        let len = match kind {
            EncodingIssueKind::Utf8Bom => 3,
            EncodingIssueKind::Utf16LeBom | EncodingIssueKind::Utf16BeBom => 2,
            EncodingIssueKind::InteriorNull => unreachable!(),
        };
        issues.push(EncodingIssue { kind, pos: 0, len });
    }
    detect_interior_nulls(source, source_len, &mut issues);
    issues
}

fn detect_bom(source: &[u8]) -> Option<EncodingIssueKind> {
    if source.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(EncodingIssueKind::Utf8Bom)
    } else if source.starts_with(&[0xFF, 0xFE]) {
        Some(EncodingIssueKind::Utf16LeBom)
    } else if source.starts_with(&[0xFE, 0xFF]) {
        Some(EncodingIssueKind::Utf16BeBom)
    } else {
        None
    }
}

fn detect_interior_nulls(source: &[u8], source_len: u32, issues: &mut Vec<EncodingIssue>) {
    let mut offset = 0usize;
    let mut rest = source;
    while let Some(idx) = memchr(0, rest) {
        let pos = offset + idx;
        if pos as u32 >= source_len {
            break;
        }
        issues.push(EncodingIssue {
            kind: EncodingIssueKind::InteriorNull,
            pos: pos as u32,
            len: 1,
        });
        offset = pos + 1;
        rest = &source[offset..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_source_has_sentinel_padding() {
        let buf = SourceBuffer::new(b"");
        assert_eq!(buf.len(), 0);
        assert!(buf.as_sentinel_bytes().len() >= MIN_PADDING);
        assert_eq!(buf.as_sentinel_bytes()[0], 0);
    }

    #[test]
    fn preserves_content() {
        let buf = SourceBuffer::new(b"hello world");
        assert_eq!(buf.as_bytes(), b"hello world");
    }

    #[test]
    fn detects_utf8_bom() {
        let mut source = vec![0xEF, 0xBB, 0xBF];
        source.extend_from_slice(b"x");
        let buf = SourceBuffer::new(&source);
        assert_eq!(buf.encoding_issues().len(), 1);
        assert_eq!(
            buf.encoding_issues()[0].kind,
            EncodingIssueKind::Utf8Bom
        );
    }

    #[test]
    fn detects_interior_null() {
        let buf = SourceBuffer::new(b"ab\0cd");
        assert_eq!(buf.encoding_issues().len(), 1);
        assert_eq!(buf.encoding_issues()[0].pos, 2);
    }

    #[test]
    fn padded_len_is_cache_line_multiple() {
        for len in [0, 1, 63, 64, 65, 127, 128, 129, 1000] {
            let source = vec![b'x'; len];
            let buf = SourceBuffer::new(&source);
            assert_eq!(buf.as_sentinel_bytes().len() % CACHE_LINE, 0);
            assert!(buf.as_sentinel_bytes().len() >= len + MIN_PADDING);
        }
    }
}
