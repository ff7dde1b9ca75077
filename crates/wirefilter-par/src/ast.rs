//! AST node definitions for filter expressions.

use std::fmt;
use std::net::IpAddr;

use wirefilter_util::Span;

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Binary operation (logical or comparison)
    Binary(BinaryExpr),

    /// Unary operation (always logical NOT)
    Unary(UnaryExpr),

    /// Field reference, resolved against the execution context
    Field(FieldExpr),

    /// Literal value
    Literal(LiteralExpr),

    /// Array literal `{ a, b, 1..3 }`
    Array(ArrayExpr),

    /// Range element inside an array literal
    Range(RangeExpr),

    /// Index access `expr[lit]`
    Index(IndexExpr),

    /// Unpack postfix `expr[*]`
    Unpack(UnpackExpr),

    /// Named list reference `$name`
    ListRef(ListRefExpr),

    /// Built-in function call
    Call(CallExpr),
}

impl Expr {
    /// Source span covered by this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Field(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::Range(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Unpack(e) => e.span,
            Expr::ListRef(e) => e.span,
            Expr::Call(e) => e.span,
        }
    }
}

/// Binary operators, lowest-precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    Xor,
    And,
    Eq,
    Ne,
    AllEq,
    AnyNe,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    Matches,
    In,
    Wildcard,
    StrictWildcard,
}

impl BinOp {
    /// Returns true for the short-circuiting / truthiness operators.
    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or | BinOp::Xor)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::AllEq => "===",
            BinOp::AnyNe => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Contains => "contains",
            BinOp::Matches => "matches",
            BinOp::In => "in",
            BinOp::Wildcard => "wildcard",
            BinOp::StrictWildcard => "strict wildcard",
        };
        f.write_str(text)
    }
}

/// The only unary operator is logical NOT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
}

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
    Ip(IpAddr),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{s:?}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Ip(ip) => write!(f, "{ip}"),
        }
    }
}

/// Binary expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Unary expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

/// Field reference
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    pub name: String,
    pub span: Span,
}

/// Literal expression
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

/// Array literal; elements are expressions or ranges
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// Inclusive integer range inside an array literal
#[derive(Debug, Clone, PartialEq)]
pub struct RangeExpr {
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    pub span: Span,
}

/// Index access; the index is restricted to a string or integer literal
/// at parse time
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index: Literal,
    pub span: Span,
}

/// Unpack postfix, marking the inner expression for element-wise operator
/// application
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}

/// Named list reference, resolved against the execution context at
/// evaluation time
#[derive(Debug, Clone, PartialEq)]
pub struct ListRefExpr {
    pub name: String,
    pub span: Span,
}

/// Function call
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}
