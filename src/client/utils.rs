//! Utility functions for the Restie client.
//!
//! This module provides helper functions for:
//! - Status code classification
//! - Content-Type inspection
//! - Best-effort body decoding

use crate::types::RawResponse;
use serde_json::Value;

/// How a response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `application/json`
    Json,
    /// Anything else
    Text,
}

/// Check if status code indicates success (`200..300`).
///
/// # Examples
///
/// ```
/// use restie::client::is_success_status;
///
/// assert!(is_success_status(204));
/// assert!(!is_success_status(304));
/// ```
#[inline]
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Media type of a Content-Type value, without parameters, lower-cased.
///
/// # Examples
///
/// ```
/// use restie::client::mime_essence;
///
/// assert_eq!(mime_essence("Application/JSON; charset=utf-8"), "application/json");
/// ```
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Decoding strategy for a declared Content-Type.
pub fn body_kind(content_type: Option<&str>) -> BodyKind {
    match content_type.map(mime_essence).as_deref() {
        Some("application/json") => BodyKind::Json,
        _ => BodyKind::Text,
    }
}

/// Decode a response body without failing.
///
/// JSON bodies are parsed, every other body is read as text. An empty body,
/// malformed JSON or invalid UTF-8 yields `null`.
pub fn parse_body(raw: &RawResponse) -> Value {
    if raw.body.is_empty() {
        return Value::Null;
    }

    let parsed = match body_kind(raw.content_type()) {
        BodyKind::Json => raw.json(),
        BodyKind::Text => raw.text().map(Value::String),
    };

    match parsed {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(status = raw.status, "Body could not be decoded, using null: {}", e);
            Value::Null
        }
    }
}
