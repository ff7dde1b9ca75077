//! Token model for the filter expression language.

use std::fmt;
use std::net::IpAddr;

use wirefilter_util::Span;

/// The closed set of token kinds the language recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input.
    Eof,

    /// Field or function name.
    Ident,

    /// Double-quoted string literal.
    Str,

    /// Raw string literal (`r"..."`).
    RawStr,

    /// 64-bit signed integer literal.
    Int,

    /// Boolean literal (`true` / `false`).
    Bool,

    /// IPv4 or IPv6 address literal.
    Ip,

    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `===`
    AllEq,
    /// `!==`
    AnyNe,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,

    /// `and` / `&&`
    And,
    /// `or` / `||`
    Or,
    /// `xor` / `^^`
    Xor,
    /// `not` / `!`
    Not,

    /// `contains`
    Contains,
    /// `matches` / `~`
    Matches,
    /// `in`
    In,
    /// `wildcard`
    Wildcard,
    /// `strict wildcard` (two words, one token)
    StrictWildcard,

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `..`
    Range,
    /// `*`
    Asterisk,

    /// `$name` list reference.
    ListRef,

    /// Lexical error; the token literal holds the message.
    Error,
}

impl TokenKind {
    /// Short human-readable name used in parser error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Ident => "identifier",
            TokenKind::Str => "string literal",
            TokenKind::RawStr => "raw string literal",
            TokenKind::Int => "integer literal",
            TokenKind::Bool => "boolean literal",
            TokenKind::Ip => "IP address literal",
            TokenKind::Eq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::AllEq => "'==='",
            TokenKind::AnyNe => "'!=='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Le => "'<='",
            TokenKind::Ge => "'>='",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Xor => "'xor'",
            TokenKind::Not => "'not'",
            TokenKind::Contains => "'contains'",
            TokenKind::Matches => "'matches'",
            TokenKind::In => "'in'",
            TokenKind::Wildcard => "'wildcard'",
            TokenKind::StrictWildcard => "'strict wildcard'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Range => "'..'",
            TokenKind::Asterisk => "'*'",
            TokenKind::ListRef => "list reference",
            TokenKind::Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A literal payload parsed during lexing.
#[derive(Clone, Debug, PartialEq)]
pub enum LitValue {
    Int(i64),
    Bool(bool),
    /// For `Str`/`RawStr` tokens: the processed (unescaped) content.
    /// For `ListRef` tokens: the referenced list name.
    Str(String),
    Ip(IpAddr),
}

/// A single token: kind, raw lexeme, parsed payload, and source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw matched source text. For `Error` tokens this holds the
    /// error message instead.
    pub literal: String,
    /// Parsed payload for literal-carrying kinds.
    pub value: Option<LitValue>,
    pub span: Span,
}

impl Token {
    /// Creates a token without a parsed payload.
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            value: None,
            span,
        }
    }

    /// Creates a token carrying a parsed payload.
    pub fn with_value(
        kind: TokenKind,
        literal: impl Into<String>,
        value: LitValue,
        span: Span,
    ) -> Self {
        Self {
            kind,
            literal: literal.into(),
            value: Some(value),
            span,
        }
    }

    /// The end-of-input token at the given offset.
    pub fn eof(at: usize) -> Self {
        Self::new(TokenKind::Eof, "", Span::point(at))
    }

    /// Returns true if the token has the given kind.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Maps a lower-cased identifier to its keyword token kind.
///
/// Keyword recognition is case-insensitive; the caller passes the
/// lower-cased form. `true`/`false` and the two-word `strict wildcard`
/// operator are handled separately by the lexer.
pub fn keyword_from_ident(lower: &str) -> Option<TokenKind> {
    Some(match lower {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "not" => TokenKind::Not,
        "contains" => TokenKind::Contains,
        "matches" => TokenKind::Matches,
        "in" => TokenKind::In,
        "wildcard" => TokenKind::Wildcard,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(keyword_from_ident("and"), Some(TokenKind::And));
        assert_eq!(keyword_from_ident("wildcard"), Some(TokenKind::Wildcard));
        assert_eq!(keyword_from_ident("http"), None);
        // Caller lower-cases first; mixed case misses by design.
        assert_eq!(keyword_from_ident("AND"), None);
    }

    #[test]
    fn test_token_constructors() {
        let t = Token::with_value(
            TokenKind::Int,
            "42",
            LitValue::Int(42),
            Span::new(0, 2),
        );
        assert!(t.is(TokenKind::Int));
        assert_eq!(t.literal, "42");
        assert_eq!(t.value, Some(LitValue::Int(42)));

        let eof = Token::eof(7);
        assert!(eof.is(TokenKind::Eof));
        assert_eq!(eof.span, Span::point(7));
    }
}
