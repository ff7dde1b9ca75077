//! Expression parsing using Pratt parsing (top-down operator precedence).
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `or` | Left |
//! | 2 | `xor` | Left |
//! | 3 | `and` | Left |
//! | 4 | `not` | Prefix |
//! | 5 | `==`, `!=`, `===`, `!==`, `<`, `<=`, `>`, `>=`, `contains`, `matches`, `in`, `wildcard`, `strict wildcard` | Left |
//! | 6 | `[lit]`, `[*]` | Postfix |
//!
//! `not` sits between `and` and the comparisons, so `not a == b` negates
//! the whole comparison while `a == b and not c` groups as expected.

use wirefilter_lex::{LitValue, TokenKind};
use wirefilter_util::{FilterError, FilterResult};

use crate::{
    ArrayExpr, BinOp, BinaryExpr, CallExpr, Expr, FieldExpr, IndexExpr, ListRefExpr, Literal,
    LiteralExpr, Parser, RangeExpr, UnOp, UnaryExpr, UnpackExpr,
};

/// Binding power levels for Pratt parsing.
/// Higher numbers = tighter binding (higher precedence).
pub(crate) mod bp {
    /// Minimum binding power (start of expression)
    pub const MIN: u8 = 0;

    /// Logical OR
    pub const OR: u8 = 2;

    /// Logical XOR
    pub const XOR: u8 = 4;

    /// Logical AND
    pub const AND: u8 = 6;

    /// Right binding power of prefix `not`: tighter than `and`, looser
    /// than any comparison.
    pub const NOT: u8 = 7;

    /// Comparison operators
    pub const COMPARISON: u8 = 10;

    /// Postfix `[...]` and `[*]`
    pub const POSTFIX: u8 = 12;
}

impl<'a> Parser<'a> {
    /// Parses an expression with the given minimum binding power.
    ///
    /// The heart of the Pratt algorithm: parse a prefix expression, then
    /// keep folding infix/postfix operators while their left binding
    /// power is at least `min_bp`. All infix operators are
    /// left-associative (right bp = left bp + 1).
    pub(crate) fn parse_expr(&mut self, min_bp: u8) -> FilterResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if self.current.kind == TokenKind::LBracket && bp::POSTFIX >= min_bp {
                lhs = self.parse_postfix(lhs)?;
                continue;
            }

            let (rbp, op) = match self.infix_binding_power() {
                Some((lbp, rbp, op)) if lbp >= min_bp => (rbp, op),
                _ => break,
            };

            self.advance();
            let rhs = self.parse_expr(rbp)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary(BinaryExpr {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }

    /// Binding powers for the token at the cursor, when it is an infix
    /// operator.
    fn infix_binding_power(&self) -> Option<(u8, u8, BinOp)> {
        let (lbp, op) = match self.current.kind {
            TokenKind::Or => (bp::OR, BinOp::Or),
            TokenKind::Xor => (bp::XOR, BinOp::Xor),
            TokenKind::And => (bp::AND, BinOp::And),
            TokenKind::Eq => (bp::COMPARISON, BinOp::Eq),
            TokenKind::Ne => (bp::COMPARISON, BinOp::Ne),
            TokenKind::AllEq => (bp::COMPARISON, BinOp::AllEq),
            TokenKind::AnyNe => (bp::COMPARISON, BinOp::AnyNe),
            TokenKind::Lt => (bp::COMPARISON, BinOp::Lt),
            TokenKind::Le => (bp::COMPARISON, BinOp::Le),
            TokenKind::Gt => (bp::COMPARISON, BinOp::Gt),
            TokenKind::Ge => (bp::COMPARISON, BinOp::Ge),
            TokenKind::Contains => (bp::COMPARISON, BinOp::Contains),
            TokenKind::Matches => (bp::COMPARISON, BinOp::Matches),
            TokenKind::In => (bp::COMPARISON, BinOp::In),
            TokenKind::Wildcard => (bp::COMPARISON, BinOp::Wildcard),
            TokenKind::StrictWildcard => (bp::COMPARISON, BinOp::StrictWildcard),
            _ => return None,
        };
        Some((lbp, lbp + 1, op))
    }

    /// Parses a prefix expression: `not`, or a primary.
    fn parse_prefix(&mut self) -> FilterResult<Expr> {
        match self.current.kind {
            TokenKind::Not => {
                let token = self.advance();
                let operand = self.parse_expr(bp::NOT)?;
                let span = token.span.to(operand.span());
                Ok(Expr::Unary(UnaryExpr {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    span,
                }))
            }
            _ => self.parse_primary(),
        }
    }

    /// Parses a primary expression: parenthesised expression, literal,
    /// array, field, function call, or list reference.
    fn parse_primary(&mut self) -> FilterResult<Expr> {
        match self.current.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(bp::MIN)?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                Ok(inner)
            }
            TokenKind::Int | TokenKind::Bool | TokenKind::Str | TokenKind::RawStr
            | TokenKind::Ip => self.parse_literal(),
            TokenKind::Ident => self.parse_field_or_call(),
            TokenKind::ListRef => self.parse_list_ref(),
            TokenKind::LBrace => self.parse_array(),
            TokenKind::Error => Err(self.lex_error()),
            _ => {
                let current = self.current.clone();
                Err(self.report(FilterError::parse(
                    format!("expected expression, found {}", current.kind),
                    current.literal,
                )))
            }
        }
    }

    /// Parses a literal token into a literal expression.
    fn parse_literal(&mut self) -> FilterResult<Expr> {
        let token = self.advance();
        let span = token.span;
        let value = match self.literal_of(token)? {
            LitValue::Int(i) => Literal::Int(i),
            LitValue::Bool(b) => Literal::Bool(b),
            LitValue::Str(s) => Literal::Str(s),
            LitValue::Ip(ip) => Literal::Ip(ip),
        };
        Ok(Expr::Literal(LiteralExpr { value, span }))
    }

    /// Parses an identifier as a field reference, or as a function call
    /// when directly followed by `(`.
    fn parse_field_or_call(&mut self) -> FilterResult<Expr> {
        let ident = self.advance();

        if self.current.kind != TokenKind::LParen {
            return Ok(Expr::Field(FieldExpr {
                name: ident.literal,
                span: ident.span,
            }));
        }

        self.advance();
        let mut args = Vec::new();
        if self.current.kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expr(bp::MIN)?);
                if self.current.kind == TokenKind::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        let close = self.expect(TokenKind::RParen, "expected ')' after arguments")?;

        Ok(Expr::Call(CallExpr {
            name: ident.literal,
            args,
            span: ident.span.to(close.span),
        }))
    }

    /// Parses a `$name` list reference.
    fn parse_list_ref(&mut self) -> FilterResult<Expr> {
        let token = self.advance();
        let span = token.span;
        let name = match self.literal_of(token)? {
            LitValue::Str(name) => name,
            _ => unreachable!("list reference tokens always carry a name"),
        };
        Ok(Expr::ListRef(ListRefExpr { name, span }))
    }

    /// Parses an array literal `{ elem, elem, .. }`; each element is an
    /// expression or an `expr .. expr` range.
    fn parse_array(&mut self) -> FilterResult<Expr> {
        let open = self.advance();
        let mut elements = Vec::new();

        if self.current.kind != TokenKind::RBrace {
            loop {
                let element = self.parse_expr(bp::MIN)?;
                let element = if self.current.kind == TokenKind::Range {
                    self.advance();
                    let end = self.parse_expr(bp::MIN)?;
                    let span = element.span().to(end.span());
                    Expr::Range(RangeExpr {
                        start: Box::new(element),
                        end: Box::new(end),
                        span,
                    })
                } else {
                    element
                };
                elements.push(element);

                if self.current.kind == TokenKind::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' after array elements")?;

        Ok(Expr::Array(ArrayExpr {
            elements,
            span: open.span.to(close.span),
        }))
    }

    /// Parses a postfix `[...]`: either an unpack `[*]` or an index with
    /// a string/integer literal.
    fn parse_postfix(&mut self, object: Expr) -> FilterResult<Expr> {
        self.advance();

        if self.current.kind == TokenKind::Asterisk {
            self.advance();
            let close = self.expect(TokenKind::RBracket, "expected ']' after '*'")?;
            let span = object.span().to(close.span);
            return Ok(Expr::Unpack(UnpackExpr {
                inner: Box::new(object),
                span,
            }));
        }

        let index = match self.current.kind {
            TokenKind::Int | TokenKind::Str | TokenKind::RawStr => {
                let token = self.advance();
                match self.literal_of(token)? {
                    LitValue::Int(i) => Literal::Int(i),
                    LitValue::Str(s) => Literal::Str(s),
                    _ => unreachable!("int/str tokens carry int/str payloads"),
                }
            }
            TokenKind::Error => return Err(self.lex_error()),
            _ => {
                let current = self.current.clone();
                return Err(self.report(FilterError::parse(
                    "index must be a string or integer literal",
                    current.literal,
                )));
            }
        };
        let close = self.expect(TokenKind::RBracket, "expected ']' after index")?;
        let span = object.span().to(close.span);

        Ok(Expr::Index(IndexExpr {
            object: Box::new(object),
            index,
            span,
        }))
    }
}
