//! wirefilter-sem - Schema & Validation
//!
//! Declares the semantic types a host can expose to filters, the schema
//! mapping field names to those types, the function allow/block policy,
//! and the AST validation pass that rejects unknown fields and forbidden
//! function calls at compile time.

pub mod analysis;
pub mod schema;
pub mod types;

pub use schema::{FunctionMode, Schema};
pub use types::Type;
