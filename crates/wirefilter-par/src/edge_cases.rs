//! Edge case tests for wirefilter-par.
