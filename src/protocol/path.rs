//! Path construction for nested resources.
//!
//! Resource URLs are built by joining segments with `/` after stripping a single
//! leading slash from each one. Nothing else is normalized: trailing slashes are
//! kept and an empty segment produces adjacent slashes.
//!
//! # Examples
//!
//! ```
//! use restie::protocol::concat_paths;
//!
//! assert_eq!(concat_paths(&["http://api", "/users", "42"]), "http://api/users/42");
//! assert_eq!(concat_paths(&["a", "", "b"]), "a//b");
//! ```

use serde_json::Value;
use std::fmt;

/// One segment of a resource path: a collection name or an identifier.
///
/// Converts from strings and integers so `item("boxes", 42)` and
/// `item("boxes", "current")` read the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment(String);

impl PathSegment {
    /// The segment text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the segment is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathSegment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment(value)
    }
}

impl From<&String> for PathSegment {
    fn from(value: &String) -> Self {
        PathSegment(value.clone())
    }
}

macro_rules! segment_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PathSegment {
                fn from(value: $t) -> Self {
                    PathSegment(value.to_string())
                }
            }
        )*
    };
}

segment_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Join path parts with `/`, stripping one leading slash from each part.
pub fn concat_paths<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| {
            let part = part.as_ref();
            part.strip_prefix('/').unwrap_or(part)
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a positional argument can act as a path (a string or a number).
pub fn is_path_like(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}

/// Render a path-like argument as a segment.
///
/// Returns `None` for `null` and for anything that is not a string or number.
pub fn path_from_value(value: &Value) -> Option<PathSegment> {
    match value {
        Value::String(s) => Some(PathSegment(s.clone())),
        Value::Number(n) => Some(PathSegment(n.to_string())),
        _ => None,
    }
}

/// Make the leading path argument of a positional verb call explicit.
///
/// When the first argument is not a string or number, a `null` placeholder
/// is prepended so the remaining arguments line up as body/params/headers.
///
/// # Examples
///
/// ```
/// use restie::protocol::normalize_leading_arg;
/// use serde_json::{json, Value};
///
/// let args = normalize_leading_arg(vec![json!({"name": "x"})]);
/// assert_eq!(args, vec![Value::Null, json!({"name": "x"})]);
///
/// let args = normalize_leading_arg(vec![json!(7), json!({})]);
/// assert_eq!(args[0], json!(7));
/// ```
pub fn normalize_leading_arg(mut args: Vec<Value>) -> Vec<Value> {
    let leading_is_path = args.first().map(is_path_like).unwrap_or(false);
    if !leading_is_path {
        args.insert(0, Value::Null);
    }
    args
}
