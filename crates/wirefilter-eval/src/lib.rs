//! wirefilter-eval - Evaluation
//!
//! The runtime half of the filter engine: the value model, the per-record
//! execution context, the compiled-pattern caches, the built-in function
//! set, and the evaluator that walks a parsed expression against a
//! context.
//!
//! Evaluation is read-only with respect to both the expression and the
//! context. The only mutable state is the pair of lazily populated
//! pattern caches, which sit behind mutexes so one compiled filter can
//! serve concurrent executions.

pub mod context;
pub mod eval;
pub mod pattern;
pub mod value;

mod functions;

pub use context::ExecutionContext;
pub use eval::evaluate;
pub use pattern::{glob_to_regex, PatternCaches};
pub use value::Value;
