//! Common scaffolding shared by every per-language scanner: `emit`,
//! `advance`, `remainder`, `eof`. Per-language scanners hold one of these
//! and add their own state (brace-nesting stacks, "fresh line" flags,
//! and so on).

use ulight_core::{Category, Coalescing, Cursor, EmissionBuffer, HighlightToken};

/// Global options applying to a whole `highlight` call.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Merge adjacent same-category tokens on emit.
    pub coalescing: bool,
    /// When set and applicable (C/C++), restrict keyword recognition to
    /// the standard feature mask, excluding extensions.
    pub strict: bool,
}

pub struct ScannerBase<'a> {
    cursor: Cursor<'a>,
    out: EmissionBuffer,
    pub options: Options,
}

impl<'a> ScannerBase<'a> {
    #[must_use]
    pub fn new(cursor: Cursor<'a>, options: Options) -> Self {
        Self {
            cursor,
            out: EmissionBuffer::new(options.coalescing),
            options,
        }
    }

    #[must_use]
    pub fn eof(&self) -> bool {
        self.cursor.is_eof()
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.cursor.pos()
    }

    #[must_use]
    pub fn remainder(&self) -> &'a [u8] {
        self.cursor.remainder()
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    #[must_use]
    pub fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub fn advance(&mut self, len: u32) {
        self.cursor.advance_n(len);
    }

    pub fn emit(&mut self, begin: u32, len: u32, category: Category, coalescing: Coalescing) {
        if len == 0 {
            return;
        }
        self.out.push(begin, len, category, coalescing);
    }

    pub fn emit_and_advance(&mut self, len: u32, category: Category, coalescing: Coalescing) {
        let begin = self.index();
        self.emit(begin, len, category, coalescing);
        self.advance(len);
    }

    /// Decodes one code point (or one byte if ill-formed) at the current
    /// position and advances past it without emitting anything. Used as
    /// the progress-guaranteeing fallback at the end of a scanner's main
    /// loop.
    pub fn advance_one_unhighlighted(&mut self) -> u32 {
        self.cursor.advance_char()
    }

    /// Same as [`advance_one_unhighlighted`](Self::advance_one_unhighlighted),
    /// but emits the consumed span as `error` with forced coalescing so
    /// consecutive garbage collapses into one red span.
    pub fn emit_error_one_code_point(&mut self) -> u32 {
        let begin = self.index();
        let len = ulight_core::cursor::Cursor::utf8_char_width(self.cursor.current())
            .min(self.cursor.remaining())
            .max(1);
        self.emit(begin, len, Category::Error, Coalescing::Forced);
        self.advance(len);
        len
    }

    #[must_use]
    pub fn finish(self) -> Vec<HighlightToken> {
        self.out.into_tokens()
    }
}
