//! wirefilter-par - Parser (Syntactic Analysis)
//!
//! Builds the filter AST from the lexer's token stream. Expressions are
//! parsed with a Pratt (top-down operator precedence) parser; see
//! [`expr`] for the precedence table. The whole input must form exactly
//! one expression — trailing tokens and empty input are errors.
//!
//! Tokens are pulled lazily from the lexer, one token of lookahead at a
//! time. Errors accumulate on the parser; the first one aborts
//! [`Parser::parse`] with an `Err`.

pub mod ast;
pub mod expr;

mod edge_cases;

pub use ast::*;

use wirefilter_lex::{Lexer, LitValue, Token, TokenKind};
use wirefilter_util::{FilterError, FilterResult};

/// Parser over the lazy token stream of one filter expression.
pub struct Parser<'a> {
    /// Token source.
    lexer: Lexer<'a>,

    /// Token currently under examination.
    current: Token,

    /// Errors reported so far; the first aborts parsing.
    errors: Vec<FilterError>,
}

impl<'a> Parser<'a> {
    /// Creates a parser for the given source text.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            errors: Vec::new(),
        }
    }

    /// Parses the complete filter expression.
    ///
    /// The whole input must be consumed: anything left after the top
    /// expression is an "unexpected trailing token" error, and empty
    /// input is rejected.
    pub fn parse(&mut self) -> FilterResult<Expr> {
        if self.current.kind == TokenKind::Eof {
            return Err(self.report(FilterError::parse("empty filter expression", "")));
        }

        let root = self.parse_expr(expr::bp::MIN)?;

        match self.current.kind {
            TokenKind::Eof => Ok(root),
            TokenKind::Error => Err(self.lex_error()),
            _ => Err(self.report(FilterError::parse(
                format!("unexpected trailing token {}", self.current.kind),
                self.current.literal.clone(),
            ))),
        }
    }

    /// Errors reported during parsing.
    pub fn errors(&self) -> &[FilterError] {
        &self.errors
    }

    /// Consumes the current token and returns it, pulling the next one
    /// from the lexer.
    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Consumes the current token when it has the expected kind; reports
    /// an error otherwise. Lexical error tokens surface as lex errors.
    fn expect(&mut self, kind: TokenKind, message: &str) -> FilterResult<Token> {
        if self.current.kind == TokenKind::Error {
            return Err(self.lex_error());
        }
        if self.current.kind != kind {
            return Err(self.report(FilterError::parse(
                format!("{message}, found {}", self.current.kind),
                self.current.literal.clone(),
            )));
        }
        Ok(self.advance())
    }

    /// Converts the current `Error` token into a lex error.
    fn lex_error(&mut self) -> FilterError {
        let err = FilterError::lex(self.current.literal.clone(), self.current.span);
        self.report(err)
    }

    /// Records an error and hands it back for propagation.
    fn report(&mut self, err: FilterError) -> FilterError {
        self.errors.push(err.clone());
        err
    }

    /// Extracts the parsed payload of a literal-carrying token.
    ///
    /// The lexer always attaches a value to literal kinds, so a missing
    /// payload is reported as a parse error rather than a panic.
    fn literal_of(&mut self, token: Token) -> FilterResult<LitValue> {
        match token.value {
            Some(value) => Ok(value),
            None => Err(self.report(FilterError::parse(
                "malformed literal token",
                token.literal,
            ))),
        }
    }
}
