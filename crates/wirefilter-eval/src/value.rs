//! Runtime values for filter evaluation.

use std::fmt;
use std::net::IpAddr;

use indexmap::IndexMap;
use wirefilter_sem::Type;

/// A runtime value supplied by the execution context or produced by a
/// built-in function.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Ip(IpAddr),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// The semantic type of this value.
    pub fn kind(&self) -> Type {
        match self {
            Value::String(_) => Type::String,
            Value::Int(_) => Type::Int,
            Value::Bool(_) => Type::Bool,
            Value::Ip(_) => Type::Ip,
            Value::Bytes(_) => Type::Bytes,
            Value::Array(_) => Type::Array,
            Value::Map(_) => Type::Map,
        }
    }

    /// Existence semantics: every value is truthy except `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    /// Equality with the single documented coercion: an IP compared to a
    /// string parses the string as an address. A parse failure is plain
    /// inequality, never an error. All other cross-type comparisons are
    /// false.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Ip(ip), Value::String(s)) | (Value::String(s), Value::Ip(ip)) => {
                match s.parse::<IpAddr>() {
                    Ok(parsed) => ip_eq(*ip, parsed),
                    Err(_) => false,
                }
            }
            (Value::Ip(a), Value::Ip(b)) => ip_eq(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equal(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.equal(other)))
            }
            _ => false,
        }
    }

    /// Linear membership scan for array values; false for everything
    /// else.
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Value::Array(items) => items.iter().any(|item| item.equal(needle)),
            _ => false,
        }
    }

    /// Map key lookup; `None` for non-map values and absent keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Ip(ip) => write!(f, "{ip}"),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<IpAddr> for Value {
    fn from(value: IpAddr) -> Self {
        Value::Ip(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

/// Canonicalises a v4-mapped IPv6 address to plain IPv4, so
/// `::ffff:10.0.0.1` compares equal to `10.0.0.1`.
pub(crate) fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

/// Address equality across the v4/v6 mapping boundary.
pub(crate) fn ip_eq(a: IpAddr, b: IpAddr) -> bool {
    canonical_ip(a) == canonical_ip(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_kind() {
        assert_eq!(Value::from("x").kind(), Type::String);
        assert_eq!(Value::Int(1).kind(), Type::Int);
        assert_eq!(Value::Ip(ip("::1")).kind(), Type::Ip);
        assert_eq!(Value::Array(vec![]).kind(), Type::Array);
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        // Everything else exists, therefore is truthy.
        assert!(Value::Int(0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::Bytes(vec![]).is_truthy());
    }

    #[test]
    fn test_equality_same_types() {
        assert!(Value::from("a").equal(&Value::from("a")));
        assert!(!Value::from("a").equal(&Value::from("b")));
        assert!(Value::Int(3).equal(&Value::Int(3)));
        assert!(!Value::Int(3).equal(&Value::Int(4)));
    }

    #[test]
    fn test_equality_across_types_is_false() {
        assert!(!Value::Int(1).equal(&Value::from("1")));
        assert!(!Value::Bool(true).equal(&Value::Int(1)));
    }

    #[test]
    fn test_ip_string_coercion() {
        let addr = Value::Ip(ip("10.0.0.1"));
        assert!(addr.equal(&Value::from("10.0.0.1")));
        assert!(Value::from("10.0.0.1").equal(&addr));
        assert!(!addr.equal(&Value::from("10.0.0.2")));
        // Unparseable string is plain inequality.
        assert!(!addr.equal(&Value::from("not-an-ip")));
    }

    #[test]
    fn test_mapped_ipv4_equality() {
        let v4 = Value::Ip(ip("10.0.0.1"));
        let mapped = Value::Ip(ip("::ffff:10.0.0.1"));
        assert!(v4.equal(&mapped));
        assert!(mapped.equal(&Value::from("10.0.0.1")));
    }

    #[test]
    fn test_array_equality_elementwise() {
        let a = Value::Array(vec![Value::Int(1), Value::from("x")]);
        let b = Value::Array(vec![Value::Int(1), Value::from("x")]);
        let c = Value::Array(vec![Value::Int(1)]);
        assert!(a.equal(&b));
        assert!(!a.equal(&c));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let mut a = IndexMap::new();
        a.insert("x".to_string(), Value::Int(1));
        a.insert("y".to_string(), Value::Int(2));
        let mut b = IndexMap::new();
        b.insert("y".to_string(), Value::Int(2));
        b.insert("x".to_string(), Value::Int(1));
        assert!(Value::Map(a).equal(&Value::Map(b)));
    }

    #[test]
    fn test_array_contains() {
        let arr = Value::Array(vec![Value::from("a"), Value::Int(2)]);
        assert!(arr.contains(&Value::from("a")));
        assert!(arr.contains(&Value::Int(2)));
        assert!(!arr.contains(&Value::Int(3)));
        assert!(!Value::Int(1).contains(&Value::Int(1)));
    }

    #[test]
    fn test_map_get() {
        let mut map = IndexMap::new();
        map.insert("k".to_string(), Value::from("v"));
        let map = Value::Map(map);
        assert_eq!(map.get("k"), Some(&Value::from("v")));
        assert_eq!(map.get("missing"), None);
        assert_eq!(Value::Int(1).get("k"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Ip(ip("10.0.0.1")).to_string(), "10.0.0.1");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, a]"
        );
    }
}
