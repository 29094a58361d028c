#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{Map, Value};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_.]{0,10}"
}

/// JSON scalars of every kind.
pub fn arb_scalar() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
    .boxed()
}

/// Arbitrary JSON values nested up to `depth` levels.
pub fn arb_json(depth: u32) -> BoxedStrategy<Value> {
    arb_scalar()
        .prop_recursive(depth, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(arb_key(), inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
        .boxed()
}

/// A JSON object whose values are nested up to `depth` levels.
pub fn arb_json_object(depth: u32) -> BoxedStrategy<Map<String, Value>> {
    prop::collection::btree_map(arb_key(), arb_json(depth), 0..8)
        .prop_map(|map| map.into_iter().collect())
        .boxed()
}

/// A list mixing scalars and flat objects.
pub fn arb_mixed_list() -> BoxedStrategy<Vec<Value>> {
    let element = prop_oneof![
        arb_scalar(),
        prop::collection::btree_map(arb_key(), arb_scalar(), 0..4)
            .prop_map(|map| Value::Object(map.into_iter().collect())),
    ];
    prop::collection::vec(element, 0..12).boxed()
}
