//! OpenAPI path map conversion.
//!
//! Turns the `paths` object of an OpenAPI 3 document into the chained calls
//! that reach each operation with this crate:
//!
//! | Path | Method | Generated |
//! |------|--------|-----------|
//! | `/planets` | get | `api.collection("planets").get_all()` |
//! | `/planets/{id}` | get | `api.item("planets", "{id}").get()` |
//! | `/planets/{id}/humans` | post | `api.item("planets", "{id}").collection("humans").post()` |
//!
//! A path with a single operation other than `post` moves its last literal
//! segment into the verb call (`.get().path("status")`) instead of nesting one
//! more collection. Only `get`, `post`, `put`, `patch` and `delete`
//! operations are mapped; other keys of a path item are ignored.
//!
//! # Examples
//!
//! ```
//! use restie::openapi::map_from_openapi;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "paths": {
//!         "/planets/{id}/humans": { "get": {}, "post": {} },
//!         "/system/status": { "get": {} },
//!     }
//! });
//!
//! let routes = map_from_openapi(&schema, "api").unwrap();
//! assert_eq!(routes[0].generated, r#"api.item("planets", "{id}").collection("humans").get_all()"#);
//! assert_eq!(routes[2].generated, r#"api.collection("system").get().path("status")"#);
//! ```

use crate::error::{RestieError, Result};
use serde::Serialize;
use serde_json::Value;

const VERBS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

/// One operation of the schema and the call expression reaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMapping {
    /// Path as written in the schema.
    pub original_path: String,
    /// Lower-case operation method.
    pub method: String,
    /// Chained call expression.
    pub generated: String,
}

/// Map every operation of `schema["paths"]` to a call chain rooted at `root`.
///
/// Fails with [`RestieError::Config`] when the schema has no `paths` object.
pub fn map_from_openapi(schema: &Value, root: &str) -> Result<Vec<RouteMapping>> {
    let paths = schema
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| RestieError::Config("schema has no `paths` object".into()))?;

    let mut routes = Vec::new();

    for (raw_path, item) in paths {
        let methods: Vec<&str> = item
            .as_object()
            .map(|ops| {
                ops.keys()
                    .map(String::as_str)
                    .filter(|m| VERBS.contains(m))
                    .collect()
            })
            .unwrap_or_default();

        let parts: Vec<&str> = raw_path.split('/').filter(|p| !p.is_empty()).collect();
        let only_one_method = methods.len() == 1;

        for method in methods {
            let append = only_one_method
                && method != "post"
                && parts.len() > 1
                && parts.last().is_some_and(|last| !is_path_parameter(last));

            let chain = chain_parts(&parts, append);
            let call = verb_call(method, append, &parts);

            routes.push(RouteMapping {
                original_path: raw_path.clone(),
                method: method.to_string(),
                generated: format!("{}.{}.{}", root, chain.join("."), call),
            });
        }
    }

    Ok(routes)
}

fn is_path_parameter(part: &str) -> bool {
    part.starts_with('{') && part.ends_with('}')
}

/// Node calls for `parts`, built back to front so a parameter merges with the
/// literal before it.
fn chain_parts(parts: &[&str], skip_last: bool) -> Vec<String> {
    let mut chain = Vec::new();
    let end = if skip_last { parts.len() - 1 } else { parts.len() };
    let mut index = end;

    while index > 0 {
        index -= 1;
        let current = parts[index];
        let forward = index.checked_sub(1).map(|i| parts[i]);

        match forward {
            Some(forward) if is_path_parameter(current) && !is_path_parameter(forward) => {
                chain.push(format!("item(\"{forward}\", \"{current}\")"));
                index -= 1;
            }
            _ => chain.push(format!("collection(\"{current}\")")),
        }
    }

    chain.reverse();
    chain
}

fn verb_call(method: &str, append: bool, parts: &[&str]) -> String {
    let last = parts.last().copied().unwrap_or_default();
    let verb = match method {
        "get" if !append && !is_path_parameter(last) => "get_all",
        other => other,
    };

    if append {
        format!("{verb}().path(\"{last}\")")
    } else {
        format!("{verb}()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generated(schema: Value) -> Vec<(String, String)> {
        map_from_openapi(&schema, "api")
            .unwrap()
            .into_iter()
            .map(|r| (r.method, r.generated))
            .collect()
    }

    #[test]
    fn test_collection_and_item() {
        let routes = generated(json!({
            "paths": {
                "/planets": { "get": {}, "post": {} },
                "/planets/{id}": { "get": {}, "delete": {}, "parameters": [] },
            }
        }));
        assert_eq!(
            routes,
            vec![
                ("get".into(), r#"api.collection("planets").get_all()"#.into()),
                ("post".into(), r#"api.collection("planets").post()"#.into()),
                ("delete".into(), r#"api.item("planets", "{id}").delete()"#.into()),
                ("get".into(), r#"api.item("planets", "{id}").get()"#.into()),
            ]
        );
    }

    #[test]
    fn test_single_method_appends_last_segment() {
        let routes = generated(json!({
            "paths": { "/users/{id}/activate": { "put": {} } }
        }));
        assert_eq!(
            routes[0].1,
            r#"api.item("users", "{id}").put().path("activate")"#
        );
    }

    #[test]
    fn test_single_post_nests() {
        let routes = generated(json!({
            "paths": { "/users/{id}/activate": { "post": {} } }
        }));
        assert_eq!(
            routes[0].1,
            r#"api.item("users", "{id}").collection("activate").post()"#
        );
    }

    #[test]
    fn test_consecutive_parameters() {
        let routes = generated(json!({
            "paths": { "/a/{x}/{y}": { "get": {}, "put": {} } }
        }));
        assert_eq!(routes[0].1, r#"api.item("a", "{x}").collection("{y}").get()"#);
    }

    #[test]
    fn test_missing_paths() {
        assert!(matches!(
            map_from_openapi(&json!({"openapi": "3.0.0"}), "api"),
            Err(RestieError::Config(_))
        ));
    }
}
