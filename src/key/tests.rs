//! Tests for key derivation.

use super::*;
use serde_json::{Value, json};
use std::collections::HashSet;

#[test]
fn test_default_key_format() {
    let deriver = DefaultKeyDeriver::default();
    let key = deriver.derive_key("Job", &[json!(1)]);
    assert_eq!(key.as_str(), "locked:Job-[1]");
}

#[test]
fn test_default_key_with_no_args() {
    let deriver = DefaultKeyDeriver::default();
    assert_eq!(deriver.derive_key("Job", &[]).as_str(), "locked:Job-[]");
}

#[test]
fn test_render_args_mixed_values() {
    let rendered = render_args(&[json!("a"), json!(2), json!(null), json!([true, 1.5])]);
    assert_eq!(rendered, r#"["a",2,null,[true,1.5]]"#);
}

#[test]
fn test_render_args_object_keys_are_sorted() {
    let a: Value = serde_json::from_str(r#"{"b":1,"a":2}"#).unwrap();
    let b: Value = serde_json::from_str(r#"{"a":2,"b":1}"#).unwrap();
    assert_eq!(render_args(&[a]), render_args(&[b]));
}

#[test]
fn test_derivation_is_deterministic() {
    let deriver = DefaultKeyDeriver::default();
    let args = vec![json!("acct-42"), json!({"dry_run": false, "limit": 10})];
    let first = deriver.derive_key("SyncAccount", &args);
    let second = deriver.derive_key("SyncAccount", &args.clone());
    assert_eq!(first, second);
}

#[test]
fn test_derivation_is_order_sensitive() {
    let deriver = DefaultKeyDeriver::default();
    let forward = deriver.derive_key("Job", &[json!(1), json!(2)]);
    let reversed = deriver.derive_key("Job", &[json!(2), json!(1)]);
    assert_ne!(forward, reversed);
}

#[test]
fn test_distinct_identities_do_not_collide() {
    let deriver = DefaultKeyDeriver::default();
    let identities: Vec<(&str, Vec<Value>)> = vec![
        ("Job", vec![]),
        ("Job", vec![json!(1)]),
        ("Job", vec![json!("1")]),
        ("Job", vec![json!(1), json!(2)]),
        ("Job", vec![json!([1, 2])]),
        ("Job", vec![json!(null)]),
        ("Job", vec![json!({"id": 1})]),
        ("Other", vec![json!(1)]),
        ("Job-", vec![json!(1)]),
        ("job", vec![json!(1)]),
    ];

    let keys: HashSet<LockKey> = identities
        .iter()
        .map(|(name, args)| deriver.derive_key(name, args))
        .collect();
    assert_eq!(keys.len(), identities.len());
}

#[test]
fn test_custom_namespace() {
    let deriver = DefaultKeyDeriver::new("jobs:lock:");
    assert_eq!(
        deriver.derive_key("Job", &[json!(7)]).as_str(),
        "jobs:lock:Job-[7]"
    );
}

#[test]
fn test_constant_key_ignores_args() {
    let deriver = ConstantKey::new("locked:Nightly");
    assert_eq!(
        deriver.derive_key("Nightly", &[json!(1)]),
        deriver.derive_key("Nightly", &[json!(2), json!("x")])
    );
}

#[test]
fn test_arg_subset_key() {
    let deriver = ArgSubsetKey::new(DEFAULT_NAMESPACE, [0]);
    let a = deriver.derive_key("SyncAccount", &[json!("acct-1"), json!(100)]);
    let b = deriver.derive_key("SyncAccount", &[json!("acct-1"), json!(200)]);
    let c = deriver.derive_key("SyncAccount", &[json!("acct-2"), json!(100)]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.as_str(), r#"locked:SyncAccount-["acct-1"]"#);
}

#[test]
fn test_arg_subset_key_missing_position_renders_null() {
    let deriver = ArgSubsetKey::new(DEFAULT_NAMESPACE, [3]);
    assert_eq!(
        deriver.derive_key("Job", &[json!(1)]).as_str(),
        "locked:Job-[null]"
    );
}

#[test]
fn test_closure_deriver_widens_key() {
    let region = "eu-west".to_string();
    let deriver = move |job_type: &str, args: &[Value]| {
        LockKey::new(format!("locked:{}@{}-{}", job_type, region, render_args(args)))
    };
    assert_eq!(
        deriver.derive_key("Job", &[json!(1)]).as_str(),
        "locked:Job@eu-west-[1]"
    );
}

#[test]
fn test_registry_falls_back_to_default() {
    let registry = DeriverRegistry::default();
    assert_eq!(
        registry.derive_key("Job", &[json!(1)]).as_str(),
        "locked:Job-[1]"
    );
    assert!(!registry.has_override("Job"));
}

#[test]
fn test_registry_override_applies_to_one_job_type() {
    let registry = DeriverRegistry::default();
    let constant = registry.namespaced("Nightly");
    let registry = registry.with_override("Nightly", ConstantKey::new(constant.clone()));

    assert_eq!(registry.derive_key("Nightly", &[json!(1)]), constant);
    assert_eq!(registry.derive_key("Nightly", &[json!(2)]), constant);
    assert_eq!(
        registry.derive_key("Other", &[json!(1)]).as_str(),
        "locked:Other-[1]"
    );
}

#[test]
fn test_registry_debug_lists_overrides() {
    let registry = DeriverRegistry::default()
        .with_override("B", ConstantKey::new("locked:B"))
        .with_override("A", ConstantKey::new("locked:A"));
    let debug = format!("{:?}", registry);
    assert!(debug.contains("locked:"));
    assert!(debug.contains(r#"["A", "B"]"#));
}

#[test]
fn test_lock_key_display_and_serde() {
    let key = LockKey::new("locked:Job-[1]");
    assert_eq!(key.to_string(), "locked:Job-[1]");
    assert_eq!(serde_json::to_string(&key).unwrap(), r#""locked:Job-[1]""#);
    let parsed: LockKey = serde_json::from_str(r#""locked:Job-[1]""#).unwrap();
    assert_eq!(parsed, key);
}
