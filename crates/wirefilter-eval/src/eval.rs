//! Expression evaluation against an execution context.
//!
//! A tree walk with exhaustive dispatch over the AST variants. The
//! operand states of a binary operator are modelled by [`Evaluated`]:
//! a concrete value, a missing value, or an array unpacked by `[*]`.
//! `and`/`or` short-circuit in the walk itself; `xor` always evaluates
//! both sides.

use std::borrow::Cow;

use wirefilter_par::{
    ArrayExpr, BinOp, BinaryExpr, CallExpr, Expr, IndexExpr, Literal, RangeExpr, UnaryExpr,
    UnpackExpr,
};
use wirefilter_util::FilterResult;

use crate::functions;
use crate::pattern::{glob_to_regex, PatternCaches};
use crate::value::{canonical_ip, Value};
use crate::ExecutionContext;

/// Evaluates the expression against a context, collapsing a missing
/// result to `false`.
pub fn evaluate(
    expr: &Expr,
    ctx: &ExecutionContext,
    caches: &PatternCaches,
) -> FilterResult<bool> {
    let evaluator = Evaluator { ctx, caches };
    Ok(evaluator.eval(expr)?.is_truthy())
}

/// Result of evaluating a sub-expression.
///
/// `Missing` is the internal no-value sentinel: it never crosses the
/// public API and collapses to `false` at the filter boundary.
/// `Unpacked` carries an array flagged by `[*]` for element-wise
/// operator application; it is private to this module, so an unpacked
/// array can never be stored into a context.
enum Evaluated<'v> {
    Value(Cow<'v, Value>),
    Unpacked(Cow<'v, [Value]>),
    Missing,
}

impl Evaluated<'_> {
    /// Existence semantics: a missing value is falsy, everything else
    /// follows [`Value::is_truthy`]. An unpacked array is an array.
    fn is_truthy(&self) -> bool {
        match self {
            Evaluated::Value(value) => value.is_truthy(),
            Evaluated::Unpacked(_) => true,
            Evaluated::Missing => false,
        }
    }

    /// Converts into an owned value; an unpacked array degrades to its
    /// plain array value.
    fn into_owned_value(self) -> Option<Value> {
        match self {
            Evaluated::Value(value) => Some(value.into_owned()),
            Evaluated::Unpacked(items) => Some(Value::Array(items.into_owned())),
            Evaluated::Missing => None,
        }
    }
}

/// Wraps a boolean result.
fn bool_value<'v>(value: bool) -> Evaluated<'v> {
    Evaluated::Value(Cow::Owned(Value::Bool(value)))
}

/// Converts a parsed literal to a runtime value.
fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Int(i) => Value::Int(*i),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Ip(ip) => Value::Ip(*ip),
    }
}

/// Indexes into a map by string key or an array by position. Anything
/// else — including a negative or out-of-range position — is absent.
fn index_value<'a>(object: &'a Value, index: &Literal) -> Option<&'a Value> {
    match (object, index) {
        (Value::Map(map), Literal::Str(key)) => map.get(key.as_str()),
        (Value::Array(items), Literal::Int(i)) => {
            usize::try_from(*i).ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}

/// Regex patterns and CIDR strings are cached only when they come from
/// the filter source itself, never when they arrive through a context
/// value.
fn pattern_cacheable(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_) => true,
        Expr::Array(array) => array.elements.iter().all(|element| match element {
            Expr::Literal(_) => true,
            Expr::Range(range) => {
                matches!(&*range.start, Expr::Literal(_)) && matches!(&*range.end, Expr::Literal(_))
            }
            _ => false,
        }),
        _ => false,
    }
}

struct Evaluator<'v> {
    ctx: &'v ExecutionContext,
    caches: &'v PatternCaches,
}

impl<'v> Evaluator<'v> {
    fn eval(&self, expr: &Expr) -> FilterResult<Evaluated<'v>> {
        match expr {
            Expr::Literal(lit) => Ok(Evaluated::Value(Cow::Owned(literal_value(&lit.value)))),
            Expr::Field(field) => Ok(match self.ctx.get(&field.name) {
                Some(value) => Evaluated::Value(Cow::Borrowed(value)),
                None => Evaluated::Missing,
            }),
            Expr::ListRef(list) => Ok(match self.ctx.get_list(&list.name) {
                Some(value) => Evaluated::Value(Cow::Borrowed(value)),
                None => Evaluated::Missing,
            }),
            Expr::Unary(unary) => self.eval_not(unary),
            Expr::Binary(binary) => self.eval_binary(binary),
            Expr::Array(array) => self.eval_array(array),
            // Ranges only expand inside array literals.
            Expr::Range(_) => Ok(Evaluated::Missing),
            Expr::Index(index) => self.eval_index(index),
            Expr::Unpack(unpack) => self.eval_unpack(unpack),
            Expr::Call(call) => self.eval_call(call),
        }
    }

    /// Logical NOT: a missing operand negates to true.
    fn eval_not(&self, unary: &UnaryExpr) -> FilterResult<Evaluated<'v>> {
        let operand = self.eval(&unary.operand)?;
        Ok(bool_value(!operand.is_truthy()))
    }

    fn eval_binary(&self, binary: &BinaryExpr) -> FilterResult<Evaluated<'v>> {
        match binary.op {
            BinOp::And => {
                let left = self.eval(&binary.left)?;
                if matches!(left, Evaluated::Unpacked(_)) || !left.is_truthy() {
                    return Ok(bool_value(false));
                }
                Ok(bool_value(self.eval(&binary.right)?.is_truthy()))
            }
            BinOp::Or => {
                let left = self.eval(&binary.left)?;
                if matches!(left, Evaluated::Unpacked(_)) {
                    return Ok(bool_value(false));
                }
                if left.is_truthy() {
                    return Ok(bool_value(true));
                }
                Ok(bool_value(self.eval(&binary.right)?.is_truthy()))
            }
            BinOp::Xor => {
                let left = self.eval(&binary.left)?;
                let right = self.eval(&binary.right)?;
                if matches!(left, Evaluated::Unpacked(_)) {
                    return Ok(bool_value(false));
                }
                Ok(bool_value(left.is_truthy() != right.is_truthy()))
            }
            op => {
                let left = self.eval(&binary.left)?;
                let right = self.eval(&binary.right)?;
                let cacheable = pattern_cacheable(&binary.right);
                self.apply_cmp(op, &left, &right, cacheable).map(bool_value)
            }
        }
    }

    /// Applies a comparison operator, expanding an unpacked left operand
    /// element-wise: true as soon as any element satisfies the operator,
    /// false for an empty array.
    fn apply_cmp(
        &self,
        op: BinOp,
        left: &Evaluated<'_>,
        right: &Evaluated<'_>,
        cacheable: bool,
    ) -> FilterResult<bool> {
        let right_store;
        let right: Option<&Value> = match right {
            Evaluated::Value(value) => Some(value.as_ref()),
            // A right-side unpacked array degrades to its array value.
            Evaluated::Unpacked(items) => {
                right_store = Value::Array(items.clone().into_owned());
                Some(&right_store)
            }
            Evaluated::Missing => None,
        };

        match left {
            Evaluated::Unpacked(items) => {
                for item in items.iter() {
                    if self.cmp_values(op, Some(item), right, cacheable)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Evaluated::Value(value) => self.cmp_values(op, Some(value.as_ref()), right, cacheable),
            Evaluated::Missing => self.cmp_values(op, None, right, cacheable),
        }
    }

    /// Comparison semantics over two optional operands.
    fn cmp_values(
        &self,
        op: BinOp,
        left: Option<&Value>,
        right: Option<&Value>,
        cacheable: bool,
    ) -> FilterResult<bool> {
        let result = match op {
            BinOp::Eq => match (left, right) {
                // Two absent values are equal.
                (None, None) => true,
                (Some(a), Some(b)) => a.equal(b),
                _ => false,
            },
            BinOp::Ne => match (left, right) {
                (Some(a), Some(b)) => !a.equal(b),
                _ => false,
            },
            BinOp::AllEq => match (left, right) {
                (Some(Value::Array(items)), Some(rhs)) => {
                    !items.is_empty() && items.iter().all(|item| item.equal(rhs))
                }
                _ => false,
            },
            BinOp::AnyNe => match (left, right) {
                (Some(Value::Array(items)), Some(rhs)) => {
                    !items.is_empty() && items.iter().any(|item| !item.equal(rhs))
                }
                _ => false,
            },
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => match (left, right) {
                (Some(Value::Int(a)), Some(Value::Int(b))) => match op {
                    BinOp::Lt => a < b,
                    BinOp::Le => a <= b,
                    BinOp::Gt => a > b,
                    _ => a >= b,
                },
                _ => false,
            },
            BinOp::Contains => match (left, right) {
                (Some(Value::String(haystack)), Some(Value::String(needle))) => {
                    haystack.contains(needle.as_str())
                }
                // Every element of the right array must be present.
                (Some(Value::Array(haystack)), Some(Value::Array(needles))) => needles
                    .iter()
                    .all(|needle| haystack.iter().any(|item| item.equal(needle))),
                (Some(Value::Array(haystack)), Some(single)) => {
                    haystack.iter().any(|item| item.equal(single))
                }
                _ => false,
            },
            BinOp::Matches => match (left, right) {
                (Some(Value::String(text)), Some(Value::String(pattern))) => {
                    self.caches.regex(pattern, cacheable)?.is_match(text)
                }
                _ => false,
            },
            BinOp::Wildcard => self.wildcard_match(left, right, true, cacheable)?,
            BinOp::StrictWildcard => self.wildcard_match(left, right, false, cacheable)?,
            BinOp::In => self.value_in(left, right, cacheable)?,
            // Logical operators are dispatched before comparison
            // handling; under an unpacked left operand they are
            // unsupported and collapse to false.
            BinOp::And | BinOp::Or | BinOp::Xor => false,
        };
        Ok(result)
    }

    /// Glob matching: the pattern is translated to an anchored regex,
    /// case-insensitively for `wildcard`, case-sensitively for
    /// `strict wildcard`.
    fn wildcard_match(
        &self,
        left: Option<&Value>,
        right: Option<&Value>,
        case_insensitive: bool,
        cacheable: bool,
    ) -> FilterResult<bool> {
        let (Some(Value::String(text)), Some(Value::String(glob))) = (left, right) else {
            return Ok(false);
        };
        let pattern = glob_to_regex(glob, case_insensitive);
        Ok(self.caches.regex(&pattern, cacheable)?.is_match(text))
    }

    /// `in` semantics: array membership, array-in-array with OR
    /// semantics, or IP-in-CIDR for an address against a network string.
    fn value_in(
        &self,
        left: Option<&Value>,
        right: Option<&Value>,
        cacheable: bool,
    ) -> FilterResult<bool> {
        match (left, right) {
            (Some(Value::Array(items)), Some(Value::Array(candidates))) => {
                for item in items {
                    if self.in_array(item, candidates, cacheable)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            (Some(single), Some(Value::Array(candidates))) => {
                self.in_array(single, candidates, cacheable)
            }
            (Some(Value::Ip(ip)), Some(Value::String(network))) => Ok(self
                .caches
                .network(network, cacheable)?
                .contains(&canonical_ip(*ip))),
            _ => Ok(false),
        }
    }

    /// Membership scan with CIDR awareness: a string candidate containing
    /// `/` is treated as a network when the probe is an address.
    fn in_array(
        &self,
        needle: &Value,
        candidates: &[Value],
        cacheable: bool,
    ) -> FilterResult<bool> {
        for candidate in candidates {
            let matched = match (needle, candidate) {
                (Value::Ip(ip), Value::String(s)) if s.contains('/') => self
                    .caches
                    .network(s, cacheable)?
                    .contains(&canonical_ip(*ip)),
                _ => needle.equal(candidate),
            };
            if matched {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Array literal: each element evaluates in place; range elements
    /// expand inline.
    fn eval_array(&self, array: &ArrayExpr) -> FilterResult<Evaluated<'v>> {
        let mut items = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            match element {
                Expr::Range(range) => self.expand_range(range, &mut items)?,
                other => {
                    if let Some(value) = self.eval(other)?.into_owned_value() {
                        items.push(value);
                    }
                }
            }
        }
        Ok(Evaluated::Value(Cow::Owned(Value::Array(items))))
    }

    /// Expands `start..end` into consecutive integers, inclusive. A
    /// non-integer endpoint or a reversed range contributes nothing.
    fn expand_range(&self, range: &RangeExpr, out: &mut Vec<Value>) -> FilterResult<()> {
        let start = self.eval(&range.start)?.into_owned_value();
        let end = self.eval(&range.end)?.into_owned_value();
        if let (Some(Value::Int(start)), Some(Value::Int(end))) = (start, end) {
            if start <= end {
                out.extend((start..=end).map(Value::Int));
            }
        }
        Ok(())
    }

    fn eval_index(&self, index: &IndexExpr) -> FilterResult<Evaluated<'v>> {
        match self.eval(&index.object)? {
            Evaluated::Value(Cow::Borrowed(object)) => {
                Ok(match index_value(object, &index.index) {
                    Some(value) => Evaluated::Value(Cow::Borrowed(value)),
                    None => Evaluated::Missing,
                })
            }
            Evaluated::Value(Cow::Owned(object)) => {
                Ok(match index_value(&object, &index.index) {
                    Some(value) => Evaluated::Value(Cow::Owned(value.clone())),
                    None => Evaluated::Missing,
                })
            }
            _ => Ok(Evaluated::Missing),
        }
    }

    /// `[*]`: an array value becomes an unpacked array; anything else —
    /// including a missing field — is absent.
    fn eval_unpack(&self, unpack: &UnpackExpr) -> FilterResult<Evaluated<'v>> {
        match self.eval(&unpack.inner)? {
            Evaluated::Value(Cow::Borrowed(Value::Array(items))) => {
                Ok(Evaluated::Unpacked(Cow::Borrowed(items.as_slice())))
            }
            Evaluated::Value(Cow::Owned(Value::Array(items))) => {
                Ok(Evaluated::Unpacked(Cow::Owned(items)))
            }
            _ => Ok(Evaluated::Missing),
        }
    }

    fn eval_call(&self, call: &CallExpr) -> FilterResult<Evaluated<'v>> {
        let name = call.name.to_ascii_lowercase();
        match name.as_str() {
            "any" => self.eval_any(call),
            "all" => self.eval_all(call),
            _ => {
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval(arg)?.into_owned_value());
                }
                Ok(match functions::dispatch(&name, &args) {
                    Some(value) => Evaluated::Value(Cow::Owned(value)),
                    None => Evaluated::Missing,
                })
            }
        }
    }

    /// `any(expr)`: truthiness of the evaluated argument. A comparison
    /// with an unpacked left side already collapses to any-element
    /// semantics in the operator dispatch.
    fn eval_any(&self, call: &CallExpr) -> FilterResult<Evaluated<'v>> {
        if call.args.len() != 1 {
            return Ok(Evaluated::Missing);
        }
        Ok(bool_value(self.eval(&call.args[0])?.is_truthy()))
    }

    /// `all(expr)`: the only all-element form. When the argument is a
    /// comparison whose left side unpacks to an array, every element
    /// must satisfy it, and an empty array does not. Any other argument
    /// falls back to plain truthiness of the evaluated expression.
    fn eval_all(&self, call: &CallExpr) -> FilterResult<Evaluated<'v>> {
        if call.args.len() != 1 {
            return Ok(Evaluated::Missing);
        }
        let arg = &call.args[0];

        if let Expr::Binary(binary) = arg {
            if !binary.op.is_logical() {
                if let Evaluated::Unpacked(items) = self.eval(&binary.left)? {
                    if items.is_empty() {
                        return Ok(bool_value(false));
                    }
                    let right = self.eval(&binary.right)?;
                    let cacheable = pattern_cacheable(&binary.right);

                    let right_store;
                    let right: Option<&Value> = match &right {
                        Evaluated::Value(value) => Some(value.as_ref()),
                        Evaluated::Unpacked(other) => {
                            right_store = Value::Array(other.clone().into_owned());
                            Some(&right_store)
                        }
                        Evaluated::Missing => None,
                    };

                    for item in items.iter() {
                        if !self.cmp_values(binary.op, Some(item), right, cacheable)? {
                            return Ok(bool_value(false));
                        }
                    }
                    return Ok(bool_value(true));
                }
            }
        }

        Ok(bool_value(self.eval(arg)?.is_truthy()))
    }
}
