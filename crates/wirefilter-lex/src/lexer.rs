//! Main lexer implementation for the filter expression language.
//!
//! The lexer transforms source text into a stream of tokens using a
//! single-pass byte-level scan. It handles keywords (case-insensitive),
//! identifiers, string and raw-string literals, integer and address
//! literals, the multi-word `strict wildcard` operator, and the greedy
//! multi-byte punctuation operators.

use std::net::IpAddr;

use wirefilter_util::Span;

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, LitValue, Token, TokenKind};

/// Returns true for bytes that may appear inside an identifier.
///
/// Field names are dotted paths (`http.host`) and may carry `_`, `-`, `:`
/// and `/`, which also lets address-shaped atoms (`fe80::1`,
/// `10.0.0.0/8`) scan as single runs before classification.
#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b':' | b'/')
}

/// The lexer for filter source text.
///
/// Tokens are produced lazily via [`Lexer::next_token`] until
/// [`TokenKind::Eof`]. Lexical failures are reported as
/// [`TokenKind::Error`] tokens whose literal carries the message and whose
/// span carries the byte position.
///
/// # Example
///
/// ```
/// use wirefilter_lex::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new("http.host == \"example.com\"");
/// assert_eq!(lexer.next_token().kind, TokenKind::Ident);
/// assert_eq!(lexer.next_token().kind, TokenKind::Eq);
/// assert_eq!(lexer.next_token().kind, TokenKind::Str);
/// assert_eq!(lexer.next_token().kind, TokenKind::Eof);
/// ```
pub struct Lexer<'a> {
    /// Byte cursor over the source.
    cursor: Cursor<'a>,

    /// Start position of the token currently being scanned.
    token_start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
        }
    }

    /// Returns the next token from the source.
    ///
    /// Skips whitespace, then dispatches on the first byte of the token.
    /// Returns [`TokenKind::Eof`] at the end of input.
    pub fn next_token(&mut self) -> Token {
        self.cursor.skip_whitespace();
        self.token_start = self.cursor.position();

        if self.cursor.is_at_end() {
            return Token::eof(self.token_start);
        }

        match self.cursor.current() {
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b',' => self.single(TokenKind::Comma),
            b'*' => self.single(TokenKind::Asterisk),
            b'~' => self.single(TokenKind::Matches),

            b'=' => self.lex_equals(),
            b'!' => self.lex_bang(),
            b'<' => self.lex_angle(TokenKind::Lt, TokenKind::Le),
            b'>' => self.lex_angle(TokenKind::Gt, TokenKind::Ge),
            b'&' => self.lex_pair(b'&', TokenKind::And),
            b'|' => self.lex_pair(b'|', TokenKind::Or),
            b'^' => self.lex_pair(b'^', TokenKind::Xor),
            b'.' => self.lex_pair(b'.', TokenKind::Range),

            b'$' => self.lex_list_ref(),
            b'"' => self.lex_string(),
            b'r' if self.cursor.peek(1) == b'"' => self.lex_raw_string(),

            b'-' if self.cursor.peek(1).is_ascii_digit() => self.lex_number(),
            b if b.is_ascii_digit() => self.lex_number(),
            b if b.is_ascii_alphabetic() => self.lex_identifier(),

            b => {
                self.cursor.advance();
                self.error_token(format!("unexpected character '{}'", b as char))
            }
        }
    }

    /// Span of the token currently being scanned.
    fn span(&self) -> Span {
        Span::new(self.token_start, self.cursor.position())
    }

    /// Consumes one byte and emits a single-byte token.
    fn single(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        Token::new(kind, self.cursor.slice_from(self.token_start), self.span())
    }

    /// Emits an error token carrying the message at the current span.
    fn error_token(&self, message: impl Into<String>) -> Token {
        Token::new(TokenKind::Error, message, self.span())
    }

    /// Lexes `==` / `===`. A lone `=` is a lexical error.
    fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if !self.cursor.match_byte(b'=') {
            return self.error_token("unexpected character '='");
        }
        let kind = if self.cursor.match_byte(b'=') {
            TokenKind::AllEq
        } else {
            TokenKind::Eq
        };
        Token::new(kind, self.cursor.slice_from(self.token_start), self.span())
    }

    /// Lexes `!` / `!=` / `!==`.
    fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        let kind = if self.cursor.match_byte(b'=') {
            if self.cursor.match_byte(b'=') {
                TokenKind::AnyNe
            } else {
                TokenKind::Ne
            }
        } else {
            TokenKind::Not
        };
        Token::new(kind, self.cursor.slice_from(self.token_start), self.span())
    }

    /// Lexes `<` / `<=` or `>` / `>=`.
    fn lex_angle(&mut self, bare: TokenKind, with_eq: TokenKind) -> Token {
        self.cursor.advance();
        let kind = if self.cursor.match_byte(b'=') {
            with_eq
        } else {
            bare
        };
        Token::new(kind, self.cursor.slice_from(self.token_start), self.span())
    }

    /// Lexes a doubled byte (`&&`, `||`, `^^`, `..`). The byte in
    /// isolation is a lexical error.
    fn lex_pair(&mut self, second: u8, kind: TokenKind) -> Token {
        let first = self.cursor.current() as char;
        self.cursor.advance();
        if !self.cursor.match_byte(second) {
            return self.error_token(format!("unexpected character '{first}'"));
        }
        Token::new(kind, self.cursor.slice_from(self.token_start), self.span())
    }

    /// Lexes a `$name` list reference.
    fn lex_list_ref(&mut self) -> Token {
        self.cursor.advance();
        let name_start = self.cursor.position();
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let name = self.cursor.slice_from(name_start);
        if name.is_empty() {
            return self.error_token("expected list name after '$'");
        }
        Token::with_value(
            TokenKind::ListRef,
            self.cursor.slice_from(self.token_start),
            LitValue::Str(name.to_string()),
            self.span(),
        )
    }

    /// Lexes an identifier, keyword, boolean, or address-shaped atom.
    fn lex_identifier(&mut self) -> Token {
        self.consume_ident_run();
        let text = self.cursor.slice_from(self.token_start);
        let lower = text.to_ascii_lowercase();

        if lower == "strict" {
            return self.lex_strict_wildcard();
        }
        if let Some(kind) = keyword_from_ident(&lower) {
            return Token::new(kind, text, self.span());
        }
        match lower.as_str() {
            "true" => {
                return Token::with_value(TokenKind::Bool, text, LitValue::Bool(true), self.span())
            }
            "false" => {
                return Token::with_value(TokenKind::Bool, text, LitValue::Bool(false), self.span())
            }
            _ => {}
        }

        // Identifiers containing ':' are address-shaped: `fe80::1` is an
        // IPv6 literal, `fe80::/10` an IPv6 network.
        if text.contains(':') {
            if let Some(token) = self.classify_address(text) {
                return token;
            }
        }

        Token::new(TokenKind::Ident, text, self.span())
    }

    /// Consumes an identifier-shaped run, stopping before a `..` range
    /// operator so `{1..5}` and `{a..b}` keep their endpoints separate.
    fn consume_ident_run(&mut self) {
        while is_ident_continue(self.cursor.current()) {
            if self.cursor.current() == b'.' && self.cursor.peek(1) == b'.' {
                break;
            }
            self.cursor.advance();
        }
    }

    /// Bounded lookahead after `strict`: past whitespace, a `wildcard`
    /// keyword folds both words into one token; anything else rewinds and
    /// leaves `strict` as a plain identifier.
    fn lex_strict_wildcard(&mut self) -> Token {
        let strict_text = self.cursor.slice_from(self.token_start);
        let saved = self.cursor.snapshot();

        self.cursor.skip_whitespace();
        let word_start = self.cursor.position();
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let word = self.cursor.slice_from(word_start);

        if word.eq_ignore_ascii_case("wildcard") {
            return Token::new(
                TokenKind::StrictWildcard,
                self.cursor.slice_from(self.token_start),
                self.span(),
            );
        }

        self.cursor.restore(saved);
        Token::new(TokenKind::Ident, strict_text, self.span())
    }

    /// Lexes an integer or address literal starting with a digit (or a
    /// `-` sign directly followed by a digit).
    ///
    /// The full identifier-shaped run is consumed first, then classified:
    /// a pure digit run is a 64-bit integer (overflow is a lexical
    /// error); otherwise the run is attempted as an IP address and then
    /// as a CIDR network.
    fn lex_number(&mut self) -> Token {
        if self.cursor.current() == b'-' {
            self.cursor.advance();
        }
        self.consume_ident_run();
        let text = self.cursor.slice_from(self.token_start);

        let digits = &text[usize::from(text.starts_with('-'))..];
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            return match text.parse::<i64>() {
                Ok(value) => {
                    Token::with_value(TokenKind::Int, text, LitValue::Int(value), self.span())
                }
                Err(_) => self.error_token(format!("integer literal overflow: '{text}'")),
            };
        }

        match self.classify_address(text) {
            Some(token) => token,
            None => self.error_token(format!("invalid numeric or address literal '{text}'")),
        }
    }

    /// Classifies an address-shaped atom as an `Ip` token, or — when it
    /// splits into a valid address and a numeric prefix length — as a
    /// `Str` token holding the CIDR text, which the evaluator consumes as
    /// a network range.
    fn classify_address(&self, text: &str) -> Option<Token> {
        if let Ok(ip) = text.parse::<IpAddr>() {
            return Some(Token::with_value(
                TokenKind::Ip,
                text,
                LitValue::Ip(ip),
                self.span(),
            ));
        }

        let (addr, prefix) = text.split_once('/')?;
        if addr.parse::<IpAddr>().is_err() {
            return None;
        }
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Token::with_value(
            TokenKind::Str,
            text,
            LitValue::Str(text.to_string()),
            self.span(),
        ))
    }

    /// Lexes a double-quoted string literal.
    ///
    /// The fast path copies the literal bytes in one slice when no
    /// backslash is seen. The slow path processes the escapes `\n \t \r
    /// \\ \"`; any other escaped character is taken literally.
    fn lex_string(&mut self) -> Token {
        self.cursor.advance();
        let content_start = self.cursor.position();

        loop {
            if self.cursor.is_at_end() {
                return self.error_token("unterminated string literal");
            }
            match self.cursor.current() {
                b'"' => {
                    let content = self.cursor.slice_from(content_start).to_string();
                    self.cursor.advance();
                    return Token::with_value(
                        TokenKind::Str,
                        self.cursor.slice_from(self.token_start),
                        LitValue::Str(content),
                        self.span(),
                    );
                }
                b'\\' => break,
                _ => self.cursor.advance(),
            }
        }

        // Escape seen: collect processed content, copying contiguous runs.
        let mut content = String::from(self.cursor.slice_from(content_start));
        loop {
            if self.cursor.is_at_end() {
                return self.error_token("unterminated string literal");
            }
            match self.cursor.current() {
                b'"' => {
                    self.cursor.advance();
                    return Token::with_value(
                        TokenKind::Str,
                        self.cursor.slice_from(self.token_start),
                        LitValue::Str(content),
                        self.span(),
                    );
                }
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.is_at_end() {
                        return self.error_token("unterminated string literal");
                    }
                    match self.cursor.current() {
                        b'n' => {
                            content.push('\n');
                            self.cursor.advance();
                        }
                        b't' => {
                            content.push('\t');
                            self.cursor.advance();
                        }
                        b'r' => {
                            content.push('\r');
                            self.cursor.advance();
                        }
                        b'\\' => {
                            content.push('\\');
                            self.cursor.advance();
                        }
                        b'"' => {
                            content.push('"');
                            self.cursor.advance();
                        }
                        _ => {
                            // Unknown escape: the escaped character stands
                            // for itself, multi-byte included.
                            if let Some(c) = self.cursor.current_char() {
                                content.push(c);
                                self.cursor.advance_n(c.len_utf8());
                            }
                        }
                    }
                }
                _ => {
                    let run_start = self.cursor.position();
                    while !self.cursor.is_at_end()
                        && self.cursor.current() != b'"'
                        && self.cursor.current() != b'\\'
                    {
                        self.cursor.advance();
                    }
                    content.push_str(self.cursor.slice_from(run_start));
                }
            }
        }
    }

    /// Lexes a raw string literal `r"..."`: no escape processing, the
    /// closing quote is required.
    fn lex_raw_string(&mut self) -> Token {
        self.cursor.advance(); // 'r'
        self.cursor.advance(); // opening quote
        let content_start = self.cursor.position();

        loop {
            if self.cursor.is_at_end() {
                return self.error_token("unterminated raw string literal");
            }
            if self.cursor.current() == b'"' {
                let content = self.cursor.slice_from(content_start).to_string();
                self.cursor.advance();
                return Token::with_value(
                    TokenKind::RawStr,
                    self.cursor.slice_from(self.token_start),
                    LitValue::Str(content),
                    self.span(),
                );
            }
            self.cursor.advance();
        }
    }
}
