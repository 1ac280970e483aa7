//! Rune cursor over the lexer input.
//!
//! The cursor walks a `&str` one `char` at a time, tracking byte offsets for
//! slicing and line/column for diagnostics. End of input is reported as
//! `None`, never as a real code point.
//!
//! `start..pos` is the pending span that the next emitted token will carry.
//! Exactly one rune of backtrack is supported.

use crate::token::Span;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    /// Start of the pending span (byte offset).
    start: usize,
    /// Current read position (byte offset).
    pos: usize,
    /// Byte width of the last rune returned by `next`, 0 after a backup.
    width: usize,
    line: usize,
    column: usize,
    /// Line/column before the last `next`, restored by `backup`.
    prev_line: usize,
    prev_column: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            start: 0,
            pos: 0,
            width: 0,
            line: 1,
            column: 1,
            prev_line: 1,
            prev_column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Consume and return the next rune, or `None` at end of input.
    pub fn next(&mut self) -> Option<char> {
        let Some(c) = self.input[self.pos..].chars().next() else {
            self.width = 0;
            return None;
        };
        self.width = c.len_utf8();
        self.pos += self.width;
        self.prev_line = self.line;
        self.prev_column = self.column;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Look at the next rune without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Step back over the rune returned by the last `next`.
    ///
    /// A second call without an intervening `next` does nothing.
    pub fn backup(&mut self) {
        if self.width == 0 {
            return;
        }
        self.pos -= self.width;
        self.line = self.prev_line;
        self.column = self.prev_column;
        self.width = 0;
    }

    /// The pending, not yet emitted, text.
    pub fn pending(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    /// Span of the pending text.
    pub fn pending_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line, self.start_column)
    }

    /// Drop the pending text: `start = pos`.
    pub fn collapse(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    /// Span of the last consumed rune, or an empty span at `pos` after EOF or a backup.
    pub fn last_rune_span(&self) -> Span {
        if self.width == 0 {
            self.here()
        } else {
            Span::new(
                self.pos - self.width,
                self.pos,
                self.prev_line,
                self.prev_column,
            )
        }
    }

    /// Empty span at the current position.
    pub fn here(&self) -> Span {
        Span::new(self.pos, self.pos, self.line, self.column)
    }

    pub fn has_pending(&self) -> bool {
        self.start < self.pos
    }

    pub fn pos(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input_is_eof() {
        let mut c = Cursor::new("");
        assert_eq!(c.peek(), None);
        assert_eq!(c.next(), None);
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn test_next_does_not_advance_past_end() {
        let mut c = Cursor::new("a");
        assert_eq!(c.next(), Some('a'));
        assert_eq!(c.next(), None);
        assert_eq!(c.next(), None);
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn test_multibyte_width() {
        let mut c = Cursor::new("é<");
        assert_eq!(c.next(), Some('é'));
        assert_eq!(c.pos(), 2);
        c.backup();
        assert_eq!(c.pos(), 0);
        assert_eq!(c.next(), Some('é'));
        assert_eq!(c.next(), Some('<'));
        assert_eq!(c.pos(), 3);
    }

    #[test]
    fn test_peek_is_non_consuming() {
        let mut c = Cursor::new("ab");
        assert_eq!(c.peek(), Some('a'));
        assert_eq!(c.peek(), Some('a'));
        assert_eq!(c.next(), Some('a'));
        assert_eq!(c.peek(), Some('b'));
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn test_double_backup_is_guarded() {
        let mut c = Cursor::new("abc");
        c.next();
        c.next();
        c.backup();
        assert_eq!(c.pos(), 1);
        c.backup();
        assert_eq!(c.pos(), 1);
        assert_eq!(c.next(), Some('b'));
    }

    #[test]
    fn test_backup_after_eof_is_noop() {
        let mut c = Cursor::new("a");
        c.next();
        assert_eq!(c.next(), None);
        c.backup();
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn test_pending_and_collapse() {
        let mut c = Cursor::new("<abc>");
        c.next();
        assert_eq!(c.pending(), "<");
        c.collapse();
        assert!(!c.has_pending());
        c.next();
        c.next();
        c.next();
        assert_eq!(c.pending(), "abc");
        assert_eq!(c.pending_span(), Span::new(1, 4, 1, 2));
    }

    #[test]
    fn test_line_column_tracking() {
        let mut c = Cursor::new("a\nbc");
        c.next();
        c.next();
        assert_eq!(c.last_rune_span(), Span::new(1, 2, 1, 2));
        c.next();
        assert_eq!(c.last_rune_span(), Span::new(2, 3, 2, 1));
        c.backup();
        c.collapse();
        c.next();
        c.next();
        assert_eq!(c.pending_span(), Span::new(2, 4, 2, 1));
    }
}
