//! wirefilter-lex - Lexical Analysis
//!
//! Transforms a filter source string into a stream of tokens. The lexer is
//! byte-oriented: every token boundary in the language is ASCII, and
//! non-ASCII bytes only ever appear inside string literals, where they are
//! copied through untouched.
//!
//! Tokens are produced lazily through [`Lexer::next_token`]; the parser
//! pulls them on demand. Lexical failures surface as a distinguished
//! [`TokenKind::Error`] token carrying the message and byte position, which
//! the parser turns into a `FilterError::Lex`.

pub mod cursor;
pub mod lexer;
pub mod token;

mod edge_cases;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{keyword_from_ident, LitValue, Token, TokenKind};
