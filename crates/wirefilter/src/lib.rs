//! wirefilter - Filtering Expression Engine
//!
//! A compile-once / execute-many filtering expression language, modeled
//! on Cloudflare's Wirefilter. A filter is compiled from a small DSL
//! against an optional schema, then executed any number of times against
//! per-record execution contexts.
//!
//! ```
//! use wirefilter::{compile, ExecutionContext, Schema, Type};
//!
//! let mut schema = Schema::new();
//! schema
//!     .add_field("http.host", Type::String)
//!     .add_field("http.status", Type::Int);
//!
//! let filter = compile(
//!     "http.host == \"example.com\" and http.status >= 400",
//!     Some(schema),
//! )
//! .unwrap();
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.set_string("http.host", "example.com");
//! ctx.set_int("http.status", 500);
//!
//! assert!(filter.execute(&ctx).unwrap());
//! ```
//!
//! The pipeline phases live in their own crates: `wirefilter-lex`
//! (tokens), `wirefilter-par` (AST + parser), `wirefilter-sem` (schema
//! validation) and `wirefilter-eval` (values, contexts, evaluation).
//! This crate ties them together and re-exports the public surface.

use log::debug;

pub use wirefilter_eval::{glob_to_regex, ExecutionContext, PatternCaches, Value};
pub use wirefilter_par::ast;
pub use wirefilter_sem::{FunctionMode, Schema, Type};
pub use wirefilter_util::{FilterError, FilterResult, Span};

use wirefilter_par::Parser;

/// A compiled filter: the parsed expression, the schema it was validated
/// against, and the lazily populated pattern caches.
///
/// A filter is read-only during execution and can be shared across
/// threads; the caches take their own locks.
#[derive(Debug)]
pub struct Filter {
    root: ast::Expr,
    schema: Option<Schema>,
    caches: PatternCaches,
}

/// Compiles a filter expression, validating it against the schema when
/// one is supplied.
///
/// Lexical and syntax errors carry source positions; schema errors carry
/// the offending field or function name.
pub fn compile(source: &str, schema: Option<Schema>) -> FilterResult<Filter> {
    let root = Parser::new(source).parse()?;
    if let Some(schema) = &schema {
        schema.validate(&root)?;
    }
    debug!("compiled filter from {} bytes of source", source.len());

    Ok(Filter {
        root,
        schema,
        caches: PatternCaches::new(),
    })
}

impl Filter {
    /// Executes the filter against one execution context.
    ///
    /// Returns an error only for a malformed regex pattern or CIDR
    /// literal that the evaluation actually reaches; a missing field or
    /// list never errors, it just fails to match.
    pub fn execute(&self, ctx: &ExecutionContext) -> FilterResult<bool> {
        wirefilter_eval::evaluate(&self.root, ctx, &self.caches)
    }

    /// The root of the compiled expression tree.
    pub fn root(&self) -> &ast::Expr {
        &self.root
    }

    /// The schema this filter was validated against, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Turns off the regex/CIDR caches for this filter; every execution
    /// then compiles patterns fresh. Results are identical either way.
    pub fn disable_pattern_caches(&mut self) {
        self.caches = PatternCaches::disabled();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_execute() {
        let filter = compile("status == 200", None).unwrap();
        let mut ctx = ExecutionContext::new();
        ctx.set_int("status", 200);
        assert!(filter.execute(&ctx).unwrap());
    }

    #[test]
    fn test_compile_reports_parse_error() {
        assert!(matches!(
            compile("http.host ==", None),
            Err(FilterError::Parse { .. })
        ));
    }

    #[test]
    fn test_compile_validates_schema() {
        let mut schema = Schema::new();
        schema.add_field("http.host", Type::String);
        assert!(matches!(
            compile("http.unknown == 1", Some(schema)),
            Err(FilterError::UnknownField(name)) if name == "http.unknown"
        ));
    }

    #[test]
    fn test_filter_accessors() {
        let mut schema = Schema::new();
        schema.add_field("x", Type::Int);
        let filter = compile("x == 1", Some(schema)).unwrap();
        assert!(filter.schema().is_some());
        assert!(matches!(filter.root(), ast::Expr::Binary(_)));
    }

    #[test]
    fn test_missing_fields_never_error() {
        let filter = compile("nope == 1 or deeper.nope contains \"x\"", None).unwrap();
        let ctx = ExecutionContext::new();
        assert_eq!(filter.execute(&ctx).unwrap(), false);
    }
}
