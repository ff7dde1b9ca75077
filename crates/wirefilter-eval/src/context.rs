//! Per-record execution context.

use std::net::IpAddr;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::Value;

/// Field values and named lists for one filter execution.
///
/// A context is constructed per record and never mutated by the
/// evaluator. Fields the filter references but the context does not
/// carry simply evaluate as missing, which is falsy.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    /// Field values, keyed by field name (case-sensitive).
    fields: FxHashMap<String, Value>,

    /// Named lists for `$name` references. Always `Value::Array`.
    lists: FxHashMap<String, Value>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw value for a field.
    pub fn set_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Sets a string field.
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_value(name, Value::String(value.into()))
    }

    /// Sets an integer field.
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.set_value(name, Value::Int(value))
    }

    /// Sets a boolean field.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.set_value(name, Value::Bool(value))
    }

    /// Sets an IP address field.
    pub fn set_ip(&mut self, name: impl Into<String>, value: IpAddr) -> &mut Self {
        self.set_value(name, Value::Ip(value))
    }

    /// Sets a byte-string field.
    pub fn set_bytes(&mut self, name: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.set_value(name, Value::Bytes(value))
    }

    /// Sets an array field.
    pub fn set_array(&mut self, name: impl Into<String>, values: Vec<Value>) -> &mut Self {
        self.set_value(name, Value::Array(values))
    }

    /// Sets an array field from plain strings.
    pub fn set_string_array(
        &mut self,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> &mut Self {
        self.set_array(name, values.into_iter().map(Value::String).collect())
    }

    /// Sets an array field from integers.
    pub fn set_int_array(&mut self, name: impl Into<String>, values: Vec<i64>) -> &mut Self {
        self.set_array(name, values.into_iter().map(Value::Int).collect())
    }

    /// Sets a map field.
    pub fn set_map(
        &mut self,
        name: impl Into<String>,
        value: IndexMap<String, Value>,
    ) -> &mut Self {
        self.set_value(name, Value::Map(value))
    }

    /// Looks up a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns true if the field is present.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a named list of strings for `$name` references.
    pub fn set_list(&mut self, name: impl Into<String>, values: Vec<String>) -> &mut Self {
        self.lists.insert(
            name.into(),
            Value::Array(values.into_iter().map(Value::String).collect()),
        );
        self
    }

    /// Sets a named list of addresses for `$name` references.
    ///
    /// Entries are parsed as IP addresses; entries that fail to parse are
    /// kept as strings, where the IP-to-string equality coercion still
    /// matches them.
    pub fn set_ip_list(&mut self, name: impl Into<String>, values: Vec<String>) -> &mut Self {
        let values = values
            .into_iter()
            .map(|entry| match entry.parse::<IpAddr>() {
                Ok(ip) => Value::Ip(ip),
                Err(_) => Value::String(entry),
            })
            .collect();
        self.lists.insert(name.into(), Value::Array(values));
        self
    }

    /// Looks up a named list. Always a `Value::Array` when present.
    pub fn get_list(&self, name: &str) -> Option<&Value> {
        self.lists.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_setters() {
        let mut ctx = ExecutionContext::new();
        ctx.set_string("host", "example.com")
            .set_int("status", 404)
            .set_bool("error", true)
            .set_ip("src", "10.0.0.1".parse().unwrap())
            .set_bytes("body", vec![1, 2, 3])
            .set_int_array("codes", vec![301, 302]);

        assert_eq!(ctx.get("host"), Some(&Value::from("example.com")));
        assert_eq!(ctx.get("status"), Some(&Value::Int(404)));
        assert_eq!(ctx.get("error"), Some(&Value::Bool(true)));
        assert_eq!(ctx.get("body"), Some(&Value::Bytes(vec![1, 2, 3])));
        assert_eq!(
            ctx.get("codes"),
            Some(&Value::Array(vec![Value::Int(301), Value::Int(302)]))
        );
        assert!(ctx.has("src"));
        assert!(!ctx.has("missing"));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_set_list() {
        let mut ctx = ExecutionContext::new();
        ctx.set_list("roles", vec!["admin".into(), "root".into()]);

        let list = ctx.get_list("roles").unwrap();
        assert!(list.contains(&Value::from("admin")));
        assert!(!list.contains(&Value::from("guest")));
        assert!(ctx.get_list("missing").is_none());
    }

    #[test]
    fn test_set_ip_list_parses_entries() {
        let mut ctx = ExecutionContext::new();
        ctx.set_ip_list(
            "blocked",
            vec!["10.0.0.1".into(), "2001:db8::1".into(), "not-an-ip".into()],
        );

        let Value::Array(items) = ctx.get_list("blocked").unwrap() else {
            panic!("lists are arrays");
        };
        assert!(matches!(items[0], Value::Ip(_)));
        assert!(matches!(items[1], Value::Ip(_)));
        assert!(matches!(items[2], Value::String(_)));
    }

    #[test]
    fn test_field_overwrite() {
        let mut ctx = ExecutionContext::new();
        ctx.set_int("x", 1);
        ctx.set_string("x", "two");
        assert_eq!(ctx.get("x"), Some(&Value::from("two")));
    }
}
