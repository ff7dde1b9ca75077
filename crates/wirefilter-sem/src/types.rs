//! Semantic types for schema fields.

use std::fmt;

/// The closed set of types a schema field can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    String,
    /// 64-bit signed integer
    Int,
    Bool,
    /// IPv4 or IPv6 address
    Ip,
    Bytes,
    Array,
    Map,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::String => "string",
            Type::Int => "int",
            Type::Bool => "bool",
            Type::Ip => "ip",
            Type::Bytes => "bytes",
            Type::Array => "array",
            Type::Map => "map",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Type::String.to_string(), "string");
        assert_eq!(Type::Ip.to_string(), "ip");
    }
}
