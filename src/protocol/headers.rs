//! Default request headers and header merging.
//!
//! Every request starts from the default header set below. Caller-supplied
//! headers override defaults by case-insensitive name.
//!
//! # Default Headers
//!
//! | Header | Value |
//! |--------|-------|
//! | Accept | `application/json, text/plain, */*` |
//! | Content-Type | `application/json` |
//!
//! An explicit null `Authorization` header removes the header entirely instead
//! of being serialized.
//!
//! # Examples
//!
//! ```
//! use restie::protocol::apply_default_headers;
//! use restie::Headers;
//!
//! let mut overrides = Headers::new();
//! overrides.insert("accept".into(), Some("text/plain".into()));
//! overrides.insert("Authorization".into(), None);
//!
//! let headers = apply_default_headers(&overrides);
//! assert_eq!(headers["accept"].as_deref(), Some("text/plain"));
//! assert!(!headers.contains_key("Accept"));
//! assert!(!headers.contains_key("Authorization"));
//! ```

use crate::types::Headers;

/// Header name constants.
pub mod names {
    /// `Accept`
    pub const ACCEPT: &str = "Accept";
    /// `Authorization`
    pub const AUTHORIZATION: &str = "Authorization";
    /// `Content-Type`
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// Default `Accept` value.
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

/// Default `Content-Type` value.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Default headers every request starts from.
pub fn default_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(names::ACCEPT.to_string(), Some(DEFAULT_ACCEPT.to_string()));
    headers.insert(
        names::CONTENT_TYPE.to_string(),
        Some(DEFAULT_CONTENT_TYPE.to_string()),
    );
    headers
}

/// Overlay `overrides` onto `base`, replacing entries by case-insensitive name.
pub fn merge_headers(base: &mut Headers, overrides: &Headers) {
    for (name, value) in overrides {
        base.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        base.insert(name.clone(), value.clone());
    }
}

/// Remove an `Authorization` header that was explicitly set to null.
///
/// Returns `true` if a header was removed.
pub fn strip_null_authorization(headers: &mut Headers) -> bool {
    let before = headers.len();
    headers.retain(|name, value| {
        !(name.eq_ignore_ascii_case(names::AUTHORIZATION) && value.is_none())
    });
    before != headers.len()
}

/// Defaults, then overrides, then null-`Authorization` removal.
pub fn apply_default_headers(overrides: &Headers) -> Headers {
    let mut headers = default_headers();
    merge_headers(&mut headers, overrides);
    strip_null_authorization(&mut headers);
    headers
}

/// Case-insensitive lookup of a non-null header value.
pub fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.as_deref())
}
