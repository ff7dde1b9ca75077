//! Schema declaration: typed fields and the function policy.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::Type;

/// Whether functions are allowed by default.
///
/// In `Blocklist` mode (the default) every function is allowed unless
/// explicitly disabled; in `Allowlist` mode only explicitly enabled
/// functions may be called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FunctionMode {
    #[default]
    Blocklist,
    Allowlist,
}

/// Declared fields plus the function allow/block policy.
///
/// Field lookup is case-sensitive; function lookup is case-insensitive.
/// A schema with no declared fields skips field validation entirely, so
/// hosts can opt into function policing alone.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    /// Declared fields, in declaration order.
    fields: IndexMap<String, Type>,

    /// Default function policy.
    function_mode: FunctionMode,

    /// Per-function overrides, keyed by lower-cased name.
    function_rules: FxHashMap<String, bool>,
}

impl Schema {
    /// Creates an empty schema with the default (blocklist) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema from an iterator of `(name, type)` pairs.
    pub fn from_fields<N, I>(fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Type)>,
    {
        let mut schema = Self::new();
        for (name, ty) in fields {
            schema.add_field(name, ty);
        }
        schema
    }

    /// Declares a field. Re-declaring a name overwrites its type.
    pub fn add_field(&mut self, name: impl Into<String>, ty: Type) -> &mut Self {
        self.fields.insert(name.into(), ty);
        self
    }

    /// Looks up a declared field. Case-sensitive.
    pub fn get_field(&self, name: &str) -> Option<Type> {
        self.fields.get(name).copied()
    }

    /// Returns true if at least one field is declared.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Sets the default function policy.
    pub fn set_function_mode(&mut self, mode: FunctionMode) -> &mut Self {
        self.function_mode = mode;
        self
    }

    /// Explicitly enables the named functions. Case-insensitive.
    pub fn enable_functions(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.function_rules.insert(name.to_ascii_lowercase(), true);
        }
        self
    }

    /// Explicitly disables the named functions. Case-insensitive.
    pub fn disable_functions(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.function_rules.insert(name.to_ascii_lowercase(), false);
        }
        self
    }

    /// Returns true if the policy allows calling the named function.
    /// Case-insensitive.
    pub fn is_function_allowed(&self, name: &str) -> bool {
        let key = name.to_ascii_lowercase();
        match self.function_rules.get(&key) {
            Some(allowed) => *allowed,
            None => self.function_mode == FunctionMode::Blocklist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup_is_case_sensitive() {
        let mut schema = Schema::new();
        schema.add_field("http.host", Type::String);

        assert_eq!(schema.get_field("http.host"), Some(Type::String));
        assert_eq!(schema.get_field("HTTP.HOST"), None);
    }

    #[test]
    fn test_from_fields() {
        let schema = Schema::from_fields([("http.host", Type::String), ("http.status", Type::Int)]);
        assert_eq!(schema.field_count(), 2);
        assert_eq!(schema.get_field("http.status"), Some(Type::Int));
    }

    #[test]
    fn test_redeclaring_field_overwrites() {
        let mut schema = Schema::new();
        schema.add_field("x", Type::Int);
        schema.add_field("x", Type::String);
        assert_eq!(schema.get_field("x"), Some(Type::String));
        assert_eq!(schema.field_count(), 1);
    }

    #[test]
    fn test_blocklist_mode_default() {
        let mut schema = Schema::new();
        assert!(schema.is_function_allowed("lower"));

        schema.disable_functions(&["lower"]);
        assert!(!schema.is_function_allowed("lower"));
        assert!(schema.is_function_allowed("upper"));
    }

    #[test]
    fn test_allowlist_mode() {
        let mut schema = Schema::new();
        schema.set_function_mode(FunctionMode::Allowlist);
        assert!(!schema.is_function_allowed("lower"));

        schema.enable_functions(&["lower"]);
        assert!(schema.is_function_allowed("lower"));
        assert!(!schema.is_function_allowed("upper"));
    }

    #[test]
    fn test_function_lookup_is_case_insensitive() {
        let mut schema = Schema::new();
        schema.disable_functions(&["LOWER"]);
        assert!(!schema.is_function_allowed("lower"));
        assert!(!schema.is_function_allowed("Lower"));
    }
}
