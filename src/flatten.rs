// File: src/flatten.rs
//! Flattening of nested dictionary definitions.

use serde_json::{Map, Value};

/// Every string leaf of `tree`, depth first. Arrays keep their order,
/// object members follow key order.
/// Numbers and booleans are rendered as text; nulls are skipped.
pub fn flatten(tree: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect(tree, &mut out);
    out
}

fn collect(tree: &Value, out: &mut Vec<String>) {
    match tree {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => flatten_list(items, out),
        Value::Object(map) => {
            for value in map.values() {
                collect(value, out);
            }
        }
        other => out.push(other.to_string()),
    }
}

/// Consumes one element per step so nested lists always shrink.
fn flatten_list(items: &[Value], out: &mut Vec<String>) {
    if let Some((head, tail)) = items.split_first() {
        collect(head, out);
        flatten_list(tail, out);
    }
}

/// Flattens nested objects into one object keyed by leaf key. Leaves that
/// share a key are merged into a list in discovery order.
pub fn flatten_keyed(tree: &Value) -> Map<String, Value> {
    let mut merged: Map<String, Value> = Map::new();
    merge_keyed(tree, &mut merged);
    merged
}

fn merge_keyed(tree: &Value, merged: &mut Map<String, Value>) {
    match tree {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(_) => merge_keyed(value, merged),
                    Value::Array(items) if items.iter().any(Value::is_object) => {
                        for item in items {
                            merge_keyed(item, merged);
                        }
                    }
                    leaf => push_leaf(merged, key, leaf.clone()),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                merge_keyed(item, merged);
            }
        }
        _ => {}
    }
}

fn push_leaf(merged: &mut Map<String, Value>, key: &str, leaf: Value) {
    match merged.get_mut(key) {
        None => {
            merged.insert(key.to_string(), leaf);
        }
        Some(Value::Array(existing)) => existing.push(leaf),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, leaf]);
        }
    }
}
