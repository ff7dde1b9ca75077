//! Byte cursor for traversing filter source.
//!
//! The cursor maintains the current byte position in the source string and
//! provides methods for advancing, peeking ahead, and slicing. All token
//! boundaries in the language are ASCII, so the cursor works on bytes;
//! multi-byte UTF-8 sequences only occur inside string literals and are
//! handled there.

/// A cursor for traversing source text byte by byte.
pub struct Cursor<'a> {
    /// The source text being traversed.
    source: &'a str,

    /// Current byte position in the source.
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Returns the current byte, or 0 at the end of the source.
    #[inline]
    pub fn current(&self) -> u8 {
        self.peek(0)
    }

    /// Returns the byte at the given offset from the current position,
    /// or 0 past the end of the source.
    #[inline]
    pub fn peek(&self, offset: usize) -> u8 {
        match self.source.as_bytes().get(self.position + offset) {
            Some(b) => *b,
            None => 0,
        }
    }

    /// Returns the character starting at the current position, if any.
    ///
    /// Used by string-literal scanning when an escape precedes a
    /// multi-byte character.
    pub fn current_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advances the cursor by one byte. Does nothing at the end.
    #[inline]
    pub fn advance(&mut self) {
        if self.position < self.source.len() {
            self.position += 1;
        }
    }

    /// Advances the cursor by the given number of bytes, clamped to the
    /// end of the source.
    pub fn advance_n(&mut self, count: usize) {
        self.position = (self.position + count).min(self.source.len());
    }

    /// Returns true if the cursor is at the end of the source.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Matches and consumes the expected byte if present.
    pub fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.current() == expected {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Skips whitespace (space, tab, CR, LF) between tokens.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.current(), b' ' | b'\t' | b'\r' | b'\n') {
            self.position += 1;
        }
    }

    /// Returns the current byte position in the source.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a slice of the source from `start` to the current position.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    /// Returns the source text from the current position to the end.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.position..]
    }

    /// Saves the current position so a speculative scan can be rewound.
    pub fn snapshot(&self) -> usize {
        self.position
    }

    /// Rewinds to a previously saved position.
    pub fn restore(&mut self, snapshot: usize) {
        self.position = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor() {
        let cursor = Cursor::new("ip.src");
        assert_eq!(cursor.current(), b'i');
        assert_eq!(cursor.position(), 0);
        assert!(!cursor.is_at_end());
    }

    #[test]
    fn test_advance() {
        let mut cursor = Cursor::new("abc");
        cursor.advance();
        assert_eq!(cursor.current(), b'b');
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.current(), 0);
        cursor.advance();
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_peek() {
        let cursor = Cursor::new("==");
        assert_eq!(cursor.peek(0), b'=');
        assert_eq!(cursor.peek(1), b'=');
        assert_eq!(cursor.peek(2), 0);
        assert_eq!(cursor.peek(100), 0);
    }

    #[test]
    fn test_match_byte() {
        let mut cursor = Cursor::new("!=");
        assert!(cursor.match_byte(b'!'));
        assert!(!cursor.match_byte(b'!'));
        assert!(cursor.match_byte(b'='));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_skip_whitespace() {
        let mut cursor = Cursor::new("  \t\r\n  and");
        cursor.skip_whitespace();
        assert_eq!(cursor.current(), b'a');

        let mut all_ws = Cursor::new("   ");
        all_ws.skip_whitespace();
        assert!(all_ws.is_at_end());
    }

    #[test]
    fn test_slice_from() {
        let mut cursor = Cursor::new("http.host == 1");
        let start = cursor.position();
        cursor.advance_n(9);
        assert_eq!(cursor.slice_from(start), "http.host");
        assert_eq!(cursor.remaining(), " == 1");
    }

    #[test]
    fn test_snapshot_restore() {
        let mut cursor = Cursor::new("strict other");
        let saved = cursor.snapshot();
        cursor.advance_n(6);
        assert_eq!(cursor.remaining(), " other");
        cursor.restore(saved);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.current(), b's');
    }

    #[test]
    fn test_current_char_multibyte() {
        let cursor = Cursor::new("é");
        assert_eq!(cursor.current_char(), Some('é'));
    }

    #[test]
    fn test_empty_source() {
        let mut cursor = Cursor::new("");
        assert!(cursor.is_at_end());
        assert_eq!(cursor.current(), 0);
        cursor.skip_whitespace();
        assert_eq!(cursor.position(), 0);
    }
}
