//! AST validation against a schema.
//!
//! A recursive walk over the expression tree, rejecting references to
//! undeclared fields and calls denied by the function policy. List
//! references are not validated here: list existence is a run-time
//! concern and an undefined list simply never matches.

use wirefilter_par::Expr;
use wirefilter_util::{FilterError, FilterResult};

use crate::Schema;

impl Schema {
    /// Validates every field reference and function call in the
    /// expression. Fails with the first offending name.
    ///
    /// Field validation only applies when the schema declares at least
    /// one field.
    pub fn validate(&self, expr: &Expr) -> FilterResult<()> {
        match expr {
            Expr::Field(field) => {
                if self.has_fields() && self.get_field(&field.name).is_none() {
                    return Err(FilterError::UnknownField(field.name.clone()));
                }
                Ok(())
            }
            Expr::Call(call) => {
                if !self.is_function_allowed(&call.name) {
                    return Err(FilterError::FunctionNotAllowed(call.name.clone()));
                }
                for arg in &call.args {
                    self.validate(arg)?;
                }
                Ok(())
            }
            Expr::Binary(binary) => {
                self.validate(&binary.left)?;
                self.validate(&binary.right)
            }
            Expr::Unary(unary) => self.validate(&unary.operand),
            Expr::Array(array) => {
                for element in &array.elements {
                    self.validate(element)?;
                }
                Ok(())
            }
            Expr::Range(range) => {
                self.validate(&range.start)?;
                self.validate(&range.end)
            }
            Expr::Index(index) => self.validate(&index.object),
            Expr::Unpack(unpack) => self.validate(&unpack.inner),
            Expr::Literal(_) | Expr::ListRef(_) => Ok(()),
        }
    }
}
