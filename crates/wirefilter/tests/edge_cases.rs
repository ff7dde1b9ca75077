//! Cross-cutting properties: compile idempotence, cache parity, filter
//! reuse, and gnarlier inputs the unit suites do not cover.

use wirefilter::{compile, ExecutionContext, Filter, FilterError, Value};

fn ctx_from(pairs: &[(&str, Value)]) -> ExecutionContext {
    let mut ctx = ExecutionContext::new();
    for (name, value) in pairs {
        ctx.set_value(*name, value.clone());
    }
    ctx
}

// ==================== UNIVERSAL INVARIANTS ====================

#[test]
fn test_compile_idempotence() {
    let source = "tags[*] == \"admin\" or (n in {1..100} and name wildcard \"a*\")";
    let first = compile(source, None).unwrap();
    let second = compile(source, None).unwrap();

    let contexts = [
        ctx_from(&[("n", Value::Int(42))]),
        ctx_from(&[("name", Value::from("alpha"))]),
        ctx_from(&[(
            "tags",
            Value::Array(vec![Value::from("admin"), Value::from("x")]),
        )]),
        ctx_from(&[]),
    ];

    for ctx in &contexts {
        assert_eq!(
            first.execute(ctx).unwrap(),
            second.execute(ctx).unwrap(),
            "identical sources must execute identically"
        );
    }
}

#[test]
fn test_cache_parity() {
    let sources = [
        "host matches \"ex.*com\"",
        "host wildcard \"*.example.?om\"",
        "src in {192.168.0.0/16, 10.0.0.0/8}",
        "host strict wildcard \"api.*\"",
    ];
    let contexts = [
        ctx_from(&[("host", Value::from("api.example.com"))]),
        ctx_from(&[("src", Value::Ip("10.1.2.3".parse().unwrap()))]),
        ctx_from(&[("host", Value::from("API.other"))]),
    ];

    for source in sources {
        let cached = compile(source, None).unwrap();
        let mut uncached = compile(source, None).unwrap();
        uncached.disable_pattern_caches();

        for ctx in &contexts {
            assert_eq!(
                cached.execute(ctx).unwrap(),
                uncached.execute(ctx).unwrap(),
                "cache must not change results for {source:?}"
            );
        }
    }
}

#[test]
fn test_filter_reuse_across_many_executions() {
    let filter = compile("host matches \"^api\\\\.\" and n > 10", None).unwrap();

    for i in 0..1000 {
        let mut ctx = ExecutionContext::new();
        ctx.set_string("host", if i % 2 == 0 { "api.x" } else { "web.x" });
        ctx.set_int("n", i);
        let expected = i % 2 == 0 && i > 10;
        assert_eq!(filter.execute(&ctx).unwrap(), expected, "iteration {i}");
    }
}

#[test]
fn test_filter_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Filter>();
}

#[test]
fn test_concurrent_execution_shares_caches() {
    use std::sync::Arc;

    let filter = Arc::new(compile("host wildcard \"*.example.com\"", None).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let filter = Arc::clone(&filter);
            std::thread::spawn(move || {
                let mut ctx = ExecutionContext::new();
                ctx.set_string(
                    "host",
                    if i % 2 == 0 { "a.example.com" } else { "nope" },
                );
                (i, filter.execute(&ctx).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, matched) = handle.join().unwrap();
        assert_eq!(matched, i % 2 == 0);
    }
}

// ==================== ERROR SURFACE ====================

#[test]
fn test_execute_error_is_repeatable() {
    let filter = compile("name matches \"[\"", None).unwrap();
    let mut ctx = ExecutionContext::new();
    ctx.set_string("name", "x");

    // The bad pattern errors on every execution; it is never cached.
    for _ in 0..3 {
        assert!(matches!(
            filter.execute(&ctx).unwrap_err(),
            FilterError::Regex { .. }
        ));
    }
}

#[test]
fn test_regex_error_skipped_when_types_mismatch() {
    // The pattern never compiles because the left side is not a string.
    let filter = compile("n matches \"[\"", None).unwrap();
    let mut ctx = ExecutionContext::new();
    ctx.set_int("n", 5);
    assert_eq!(filter.execute(&ctx).unwrap(), false);
}

#[test]
fn test_dynamic_pattern_from_context() {
    let filter = compile("name matches pattern", None).unwrap();

    let mut ctx = ExecutionContext::new();
    ctx.set_string("name", "hello world");
    ctx.set_string("pattern", "wor.d");
    assert!(filter.execute(&ctx).unwrap());

    let mut ctx = ExecutionContext::new();
    ctx.set_string("name", "hello");
    ctx.set_string("pattern", "[");
    assert!(matches!(
        filter.execute(&ctx).unwrap_err(),
        FilterError::Regex { .. }
    ));
}

// ==================== GNARLY INPUTS ====================

#[test]
fn test_mapped_ipv4_matches_plain_v4_cidr() {
    let filter = compile("src in {10.0.0.0/8}", None).unwrap();
    let mut ctx = ExecutionContext::new();
    ctx.set_ip("src", "::ffff:10.1.2.3".parse().unwrap());
    assert!(filter.execute(&ctx).unwrap());
}

#[test]
fn test_ip_list_membership_with_mixed_entries() {
    let filter = compile("src in $blocked", None).unwrap();

    let mut ctx = ExecutionContext::new();
    ctx.set_ip("src", "10.0.0.1".parse().unwrap());
    ctx.set_ip_list("blocked", vec!["10.0.0.1".into(), "garbage".into()]);
    assert!(filter.execute(&ctx).unwrap());

    let mut ctx = ExecutionContext::new();
    ctx.set_ip("src", "10.9.9.9".parse().unwrap());
    ctx.set_ip_list("blocked", vec!["10.0.0.1".into()]);
    assert!(!filter.execute(&ctx).unwrap());
}

#[test]
fn test_deep_nesting_compiles_and_runs() {
    let mut source = String::from("x == 1");
    for _ in 0..100 {
        source = format!("({source})");
    }
    let filter = compile(&source, None).unwrap();
    let mut ctx = ExecutionContext::new();
    ctx.set_int("x", 1);
    assert!(filter.execute(&ctx).unwrap());
}

#[test]
fn test_bytes_field_round_trip() {
    let filter = compile("len(body) > 2 and body == body", None).unwrap();
    let mut ctx = ExecutionContext::new();
    ctx.set_bytes("body", vec![0xde, 0xad, 0xbe, 0xef]);
    assert!(filter.execute(&ctx).unwrap());
}

#[test]
fn test_map_indexing_end_to_end() {
    let filter = compile(
        "headers[\"content-type\"] contains \"json\" and has_key(headers, \"host\")",
        None,
    )
    .unwrap();

    let mut headers = indexmap_map();
    headers.insert("content-type".to_string(), Value::from("application/json"));
    headers.insert("host".to_string(), Value::from("example.com"));

    let mut ctx = ExecutionContext::new();
    ctx.set_map("headers", headers);
    assert!(filter.execute(&ctx).unwrap());
}

fn indexmap_map() -> indexmap::IndexMap<String, Value> {
    indexmap::IndexMap::new()
}

#[test]
fn test_url_decode_pipeline() {
    let filter = compile("url_decode(query) == \"a b/c\"", None).unwrap();
    let mut ctx = ExecutionContext::new();
    ctx.set_string("query", "a+b%2Fc");
    assert!(filter.execute(&ctx).unwrap());
}

#[test]
fn test_concat_and_join() {
    let filter = compile(
        "concat(\"host=\", host) == \"host=a\" and join(parts, \"-\") == \"x-1\"",
        None,
    )
    .unwrap();

    let mut ctx = ExecutionContext::new();
    ctx.set_string("host", "a");
    ctx.set_array("parts", vec![Value::from("x"), Value::Int(1)]);
    assert!(filter.execute(&ctx).unwrap());
}
