//! wirefilter-util - Shared Foundation Types
//!
//! Foundation types used by every phase of the filter pipeline: source
//! spans for error reporting and the common error type returned by
//! compilation and execution.

pub mod error;
pub mod span;

pub use error::{FilterError, FilterResult};
pub use span::Span;
