use serde_json::{Map, Value};

/// Deep key-convention conversion at the wire boundary.
///
/// The marketplace API speaks camelCase JSON; everything inside this
/// workspace is snake_case. Request bodies are converted exactly once
/// immediately before transport, response bodies exactly once immediately
/// after, before validation. Leaf values are never touched and both
/// directions are idempotent.
pub fn keys_to_wire(value: Value) -> Value {
    map_keys(value, snake_to_camel)
}

pub fn keys_to_internal(value: Value) -> Value {
    map_keys(value, camel_to_snake)
}

fn map_keys(value: Value, convert: fn(&str) -> String) -> Value {
    match value {
        Value::Object(entries) => {
            let mapped: Map<String, Value> = entries
                .into_iter()
                .map(|(key, nested)| (convert(&key), map_keys(nested, convert)))
                .collect();
            Value::Object(mapped)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_keys(item, convert)).collect())
        }
        leaf => leaf,
    }
}

/// `price_cents` -> `priceCents`. Keys without underscores pass through.
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `priceCents` -> `price_cents`. Keys without uppercase pass through.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_uppercase() {
            out.push('_');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
