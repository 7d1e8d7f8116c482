//! Conditional request support
//!
//! Mutations on identities and twins can carry an `If-Match` precondition so
//! they only apply when the resource is unchanged since it was last read. The
//! hub rejects a stale precondition with `412 Precondition Failed`, surfaced as
//! [`IoTHubError::PreconditionFailed`](crate::IoTHubError::PreconditionFailed).

use hyper::header::{HeaderValue, InvalidHeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque version marker returned by the hub for identities and twins
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    /// Wrap a value read from the hub
    pub fn new(etag: impl Into<String>) -> Self {
        ETag(etag.into())
    }

    /// The raw value as received
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty ETags are treated as no ETag at all
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        ETag::new(etag)
    }
}

impl From<String> for ETag {
    fn from(etag: String) -> Self {
        ETag(etag)
    }
}

/// Precondition sent in the `If-Match` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfMatch {
    /// Wildcard `*`, apply regardless of the current version
    Any,
    /// Apply only if the resource still has this ETag
    ETag(ETag),
}

impl IfMatch {
    /// Fails for ETags that are not visible ASCII
    pub(crate) fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        match self {
            IfMatch::Any => Ok(HeaderValue::from_static("*")),
            IfMatch::ETag(etag) => {
                let value = etag.as_str();
                let quoted = if value.starts_with('"') || value.starts_with("W/\"") {
                    value.to_string()
                } else {
                    format!("\"{}\"", value)
                };
                HeaderValue::from_str(&quoted)
            }
        }
    }
}

impl From<ETag> for IfMatch {
    fn from(etag: ETag) -> Self {
        IfMatch::ETag(etag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_star() {
        assert_eq!(IfMatch::Any.header_value().unwrap(), "*");
    }

    #[test]
    fn bare_etag_is_quoted() {
        let condition = IfMatch::from(ETag::new("AAAAAAAAAAE="));
        assert_eq!(condition.header_value().unwrap(), "\"AAAAAAAAAAE=\"");
    }

    #[test]
    fn quoted_and_weak_etags_pass_through() {
        assert_eq!(IfMatch::from(ETag::new("\"abc\"")).header_value().unwrap(), "\"abc\"");
        assert_eq!(IfMatch::from(ETag::new("W/\"abc\"")).header_value().unwrap(), "W/\"abc\"");
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(IfMatch::from(ETag::new("abc\ndef")).header_value().is_err());
    }

    #[test]
    fn etag_is_transparent_in_json() {
        let etag: ETag = serde_json::from_str("\"MzQ1Njc4\"").unwrap();
        assert_eq!(etag.as_str(), "MzQ1Njc4");
        assert_eq!(serde_json::to_string(&etag).unwrap(), "\"MzQ1Njc4\"");
        assert!(ETag::new("  ").is_empty());
    }
}
