//! Edge case tests for wirefilter-lex.
