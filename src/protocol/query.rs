//! Deterministic query-string serialization.
//!
//! Parameters are written in alphabetical key order at every nesting level, so
//! two requests with the same parameters always produce the same URL (and the
//! same cache key) regardless of how the parameters were assembled.
//!
//! # Encoding
//!
//! | Value | Output |
//! |-------|--------|
//! | `{"b": 1, "a": 2}` | `a=2&b=1` |
//! | `{"tags": ["x", "y"]}` | `tags%5B0%5D=x&tags%5B1%5D=y` |
//! | `{"filter": {"age": 3}}` | `filter%5Bage%5D=3` |
//! | `{"q": null}` | `q=` |
//! | `{"q": "a b"}` | `q=a%20b` |
//!
//! Empty arrays and objects produce nothing.

use crate::types::Params;
use serde_json::Value;
use url::form_urlencoded;

/// Serialize parameters into a query string (without the leading `?`).
///
/// # Examples
///
/// ```
/// use restie::protocol::serialize_params;
/// use restie::Params;
/// use serde_json::json;
///
/// let mut params = Params::new();
/// params.insert("b".into(), json!(1));
/// params.insert("a".into(), json!(2));
/// assert_eq!(serialize_params(&params), "a=2&b=1");
/// ```
pub fn serialize_params(params: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(key, value, &mut pairs);
    }
    pairs.join("&")
}

/// Replace any query string on `url` with the serialized parameters.
///
/// # Examples
///
/// ```
/// use restie::protocol::with_query;
/// use restie::Params;
/// use serde_json::json;
///
/// let mut params = Params::new();
/// params.insert("page".into(), json!(2));
/// assert_eq!(with_query("http://api/users?page=1", &params), "http://api/users?page=2");
/// assert_eq!(with_query("http://api/users?page=1", &Params::new()), "http://api/users");
/// ```
pub fn with_query(url: &str, params: &Params) -> String {
    let base = url.split('?').next().unwrap_or(url);
    let query = serialize_params(params);
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}

fn push_pairs(key: &str, value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(&format!("{}[{}]", key, index), item, pairs);
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for child in keys {
                push_pairs(&format!("{}[{}]", key, child), &map[child], pairs);
            }
        }
        Value::Null => pairs.push(format!("{}=", encode(key))),
        Value::String(s) => pairs.push(format!("{}={}", encode(key), encode(s))),
        other => pairs.push(format!("{}={}", encode(key), encode(&other.to_string()))),
    }
}

/// Percent-encode a component; spaces become `%20` rather than `+`.
fn encode(component: &str) -> String {
    form_urlencoded::byte_serialize(component.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
