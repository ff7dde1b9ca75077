//! Compiled-pattern caches and glob-to-regex translation.

use ipnet::IpNet;
use log::trace;
use parking_lot::Mutex;
use regex::Regex;
use rustc_hash::FxHashMap;
use wirefilter_util::{FilterError, FilterResult};

/// Lazily populated caches for compiled regexes and parsed CIDR
/// networks, keyed by the source literal.
///
/// Both caches live as long as the owning filter, so repeated executions
/// of `matches`, `wildcard` and `in` against literal patterns compile
/// each pattern exactly once. Lookups take a mutex, keeping a compiled
/// filter shareable across concurrent executions. Failed compilations
/// are returned to the caller and never cached.
#[derive(Debug, Default)]
pub struct PatternCaches {
    regexes: Mutex<FxHashMap<String, Regex>>,
    networks: Mutex<FxHashMap<String, IpNet>>,
    disabled: bool,
}

impl PatternCaches {
    /// Creates empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates caches that never retain anything; every lookup compiles
    /// fresh. Exists to prove cache parity in tests and for
    /// memory-constrained hosts.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Fetches or compiles a regex for the given pattern.
    ///
    /// `cacheable` is false when the pattern came from a context value
    /// rather than a source literal; such patterns are compiled fresh so
    /// the cache only ever holds the filter's own literals.
    pub fn regex(&self, pattern: &str, cacheable: bool) -> FilterResult<Regex> {
        if self.disabled || !cacheable {
            return compile_regex(pattern);
        }
        let mut cache = self.regexes.lock();
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }
        let regex = compile_regex(pattern)?;
        trace!("caching regex pattern {pattern:?}");
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    /// Fetches or parses a CIDR network for the given literal.
    pub fn network(&self, literal: &str, cacheable: bool) -> FilterResult<IpNet> {
        if self.disabled || !cacheable {
            return parse_network(literal);
        }
        let mut cache = self.networks.lock();
        if let Some(network) = cache.get(literal) {
            return Ok(*network);
        }
        let network = parse_network(literal)?;
        trace!("caching CIDR network {literal:?}");
        cache.insert(literal.to_string(), network);
        Ok(network)
    }
}

fn compile_regex(pattern: &str) -> FilterResult<Regex> {
    Regex::new(pattern).map_err(|err| FilterError::Regex {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

fn parse_network(literal: &str) -> FilterResult<IpNet> {
    literal.parse::<IpNet>().map_err(|err| FilterError::Cidr {
        literal: literal.to_string(),
        message: err.to_string(),
    })
}

/// Translates a glob pattern to an anchored regex.
///
/// `*` maps to `.*`, `?` maps to `.`, every regex metacharacter is
/// escaped, and the result is anchored as `^...$`. `case_insensitive`
/// prepends `(?i)` — used by `wildcard`, never by `strict wildcard`.
pub fn glob_to_regex(glob: &str, case_insensitive: bool) -> String {
    let mut pattern = String::with_capacity(glob.len() + 8);
    if case_insensitive {
        pattern.push_str("(?i)");
    }
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            '.' | '+' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }
    pattern.push('$');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_star_and_question() {
        assert_eq!(glob_to_regex("*.example.com", false), r"^.*\.example\.com$");
        assert_eq!(glob_to_regex("a?c", false), "^a.c$");
    }

    #[test]
    fn test_glob_escapes_metacharacters() {
        assert_eq!(
            glob_to_regex(r". + ^ $ ( ) [ ] { } | \", false),
            r"^\. \+ \^ \$ \( \) \[ \] \{ \} \| \\$"
        );
    }

    #[test]
    fn test_glob_case_insensitive_prefix() {
        assert_eq!(glob_to_regex("x*", true), "(?i)^x.*$");
        assert_eq!(glob_to_regex("x*", false), "^x.*$");
    }

    #[test]
    fn test_glob_output_always_compiles() {
        for glob in ["", "*", "???", "a[b]{c}|d\\e", "*.example.com", "^$"] {
            let pattern = glob_to_regex(glob, true);
            assert!(Regex::new(&pattern).is_ok(), "pattern {pattern:?}");
        }
    }

    #[test]
    fn test_glob_matching_behaviour() {
        let re = Regex::new(&glob_to_regex("*.example.com", true)).unwrap();
        assert!(re.is_match("api.example.com"));
        assert!(re.is_match("API.EXAMPLE.COM"));
        assert!(!re.is_match("example.com"));
        assert!(!re.is_match("api.example.com.evil"));

        let strict = Regex::new(&glob_to_regex("*.example.com", false)).unwrap();
        assert!(strict.is_match("api.example.com"));
        assert!(!strict.is_match("API.EXAMPLE.COM"));
    }

    #[test]
    fn test_regex_cache_round_trip() {
        let caches = PatternCaches::new();
        let first = caches.regex("ab?c", true).unwrap();
        let second = caches.regex("ab?c", true).unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_regex_error_not_cached() {
        let caches = PatternCaches::new();
        assert!(caches.regex("[", true).is_err());
        // The failed pattern must not poison the cache.
        assert!(caches.regex("[", true).is_err());
        assert!(caches.regex("ok", true).is_ok());
    }

    #[test]
    fn test_network_cache() {
        let caches = PatternCaches::new();
        let net = caches.network("10.0.0.0/8", true).unwrap();
        assert!(net.contains(&"10.1.2.3".parse::<std::net::IpAddr>().unwrap()));
        assert!(caches.network("bogus/99", true).is_err());
    }

    #[test]
    fn test_disabled_caches_still_compile() {
        let caches = PatternCaches::disabled();
        assert!(caches.regex("a+", true).is_ok());
        assert!(caches.network("10.0.0.0/8", true).is_ok());
        assert!(caches.regex("[", true).is_err());
    }

    #[test]
    fn test_uncacheable_patterns_compile_fresh() {
        let caches = PatternCaches::new();
        assert!(caches.regex("dynamic.*", false).is_ok());
        assert!(caches.regexes.lock().is_empty());
    }
}
