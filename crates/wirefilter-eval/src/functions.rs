//! Built-in filter functions.
//!
//! All names are case-insensitive (the evaluator lowercases before
//! dispatch). Arity and operand types are enforced here at call time: a
//! mismatch yields no value — which the surrounding operator treats as
//! falsy — never an execution error, so filters stay usable on partial
//! records.
//!
//! `any(...)` and `all(...)` are not in this table: they need the
//! unevaluated argument expression and live in the evaluator.

use std::net::IpAddr;

use ipnet::{Ipv4Net, Ipv6Net};

use crate::Value;

/// Calls the named built-in with already-evaluated arguments.
///
/// `None` entries are arguments that evaluated to no value; most
/// functions treat them as a type mismatch, `concat` skips them.
pub(crate) fn dispatch(name: &str, args: &[Option<Value>]) -> Option<Value> {
    match name {
        "lower" => {
            let [Some(Value::String(s))] = args else {
                return None;
            };
            Some(Value::String(s.to_lowercase()))
        }
        "upper" => {
            let [Some(Value::String(s))] = args else {
                return None;
            };
            Some(Value::String(s.to_uppercase()))
        }
        "len" => {
            let [Some(value)] = args else {
                return None;
            };
            let len = match value {
                Value::String(s) => s.len(),
                Value::Bytes(b) => b.len(),
                Value::Array(a) => a.len(),
                Value::Map(m) => m.len(),
                _ => return None,
            };
            Some(Value::Int(len as i64))
        }
        "starts_with" => {
            let [Some(Value::String(s)), Some(Value::String(prefix))] = args else {
                return None;
            };
            Some(Value::Bool(s.starts_with(prefix)))
        }
        "ends_with" => {
            let [Some(Value::String(s)), Some(Value::String(suffix))] = args else {
                return None;
            };
            Some(Value::Bool(s.ends_with(suffix)))
        }
        "substring" => match args {
            [Some(Value::String(s)), Some(Value::Int(start))] => {
                Some(Value::String(substring(s, *start, None)))
            }
            [Some(Value::String(s)), Some(Value::Int(start)), Some(Value::Int(end))] => {
                Some(Value::String(substring(s, *start, Some(*end))))
            }
            _ => None,
        },
        "concat" => {
            let mut out = String::new();
            for arg in args.iter().flatten() {
                match arg {
                    Value::String(s) => out.push_str(s),
                    other => out.push_str(&other.to_string()),
                }
            }
            Some(Value::String(out))
        }
        "split" => {
            let [Some(Value::String(s)), Some(Value::String(sep))] = args else {
                return None;
            };
            Some(Value::Array(
                s.split(sep.as_str())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            ))
        }
        "join" => {
            let [Some(Value::Array(items)), Some(Value::String(sep))] = args else {
                return None;
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Some(Value::String(parts.join(sep)))
        }
        "has_key" => {
            let [Some(Value::Map(map)), Some(Value::String(key))] = args else {
                return None;
            };
            Some(Value::Bool(map.contains_key(key)))
        }
        "has_value" => {
            let [Some(array @ Value::Array(_)), Some(needle)] = args else {
                return None;
            };
            Some(Value::Bool(array.contains(needle)))
        }
        "url_decode" => {
            let [Some(Value::String(s))] = args else {
                return None;
            };
            let plus_decoded = s.replace('+', " ");
            match urlencoding::decode(&plus_decoded) {
                Ok(decoded) => Some(Value::String(decoded.into_owned())),
                Err(_) => Some(Value::String(s.clone())),
            }
        }
        "cidr" => {
            let [Some(Value::Ip(ip)), Some(Value::Int(v4)), Some(Value::Int(v6))] = args else {
                return None;
            };
            Some(Value::Ip(mask_ip(*ip, *v4, *v6)))
        }
        "cidr6" => {
            let [Some(Value::Ip(ip)), Some(Value::Int(v6))] = args else {
                return None;
            };
            Some(Value::Ip(mask_ip(*ip, (*v6).min(32), *v6)))
        }
        _ => None,
    }
}

/// Byte-based substring with saturation: offsets are clamped to the
/// string's byte length and snapped back to the previous character
/// boundary, so a slice can never split a UTF-8 sequence. `end < start`
/// yields the empty string. Byte indexing matches `len`.
fn substring(s: &str, start: i64, end: Option<i64>) -> String {
    let len = s.len() as i64;
    let start = floor_char_boundary(s, start.clamp(0, len) as usize);
    let end = floor_char_boundary(s, end.map_or(len, |e| e.clamp(0, len)) as usize);
    if end < start {
        return String::new();
    }
    s[start..end].to_string()
}

/// Largest character boundary not exceeding `index`. `index` must not
/// exceed the string's byte length.
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Applies a CIDR mask to an address: `v4` prefix bits for IPv4
/// addresses (clamped to 0..=32), `v6` bits for IPv6 (clamped to
/// 0..=128).
fn mask_ip(ip: IpAddr, v4: i64, v6: i64) -> IpAddr {
    match ip {
        IpAddr::V4(addr) => {
            let prefix = v4.clamp(0, 32) as u8;
            // The prefix is clamped, so construction cannot fail.
            match Ipv4Net::new(addr, prefix) {
                Ok(net) => IpAddr::V4(net.trunc().addr()),
                Err(_) => IpAddr::V4(addr),
            }
        }
        IpAddr::V6(addr) => {
            let prefix = v6.clamp(0, 128) as u8;
            match Ipv6Net::new(addr, prefix) {
                Ok(net) => IpAddr::V6(net.trunc().addr()),
                Err(_) => IpAddr::V6(addr),
            }
        }
    }
}
