//! Engine error taxonomy.
//!
//! Two failure classes the remote platform forces on us never escape
//! this crate: a "collect already exists" 422 is absorbed by
//! the collect manager as success, and a malformed stored assignment
//! document is recovered by the merger (merge proceeds from empty, with a
//! warn-level log). Everything else propagates as [`EngineError`].

use thiserror::Error;

use crate::config::ConfigError;

/// Best-effort-parsed body of a non-success Shopify response.
///
/// Shopify does not always return valid JSON on error, so a body that
/// fails to parse is carried as raw text instead of failing the whole
/// operation a second time.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Body was not valid JSON; kept verbatim.
    Raw(String),
}

impl ErrorBody {
    /// Parse a response body, falling back to raw text.
    #[must_use]
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(text),
        }
    }

    /// Case-insensitive substring search over the body, whatever its shape.
    ///
    /// For JSON bodies the search runs over the re-serialized `errors` /
    /// `details` fields when present, otherwise the whole document. This
    /// is how Shopify's own idempotency signal ("already exists") is
    /// detected.
    #[must_use]
    pub fn contains_pattern(&self, patterns: &[String]) -> bool {
        let haystack = match self {
            Self::Json(value) => {
                let detail = value.get("errors").or_else(|| value.get("details"));
                detail.unwrap_or(value).to_string()
            }
            Self::Raw(text) => text.clone(),
        }
        .to_lowercase();

        patterns.iter().any(|p| haystack.contains(p.as_str()))
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Raw(text) => write!(f, "{text}"),
        }
    }
}

/// Errors that can occur inside the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or invalid configuration; surfaced before any network call.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Network or connection failure calling Shopify.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller's request was incomplete or inconsistent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Shopify was reachable but returned a non-success status.
    #[error("Shopify API error ({status}): {body}")]
    RemoteApi { status: u16, body: ErrorBody },

    /// No collect exists for the (product, collection) pair to remove.
    #[error("No collect found for product {product_id} in collection {collection_id}")]
    CollectNotFound { product_id: u64, collection_id: u64 },

    /// Creating the customer's personal collection failed.
    #[error("Failed to create collection: {source}")]
    CollectionCreationFailed {
        #[source]
        source: Box<EngineError>,
    },

    /// Could not fetch the current assignment metafield; merging without
    /// the current state would lose data, so the operation aborts.
    #[error("Failed to fetch assignment metafield: {source}")]
    MetafieldFetch {
        #[source]
        source: Box<EngineError>,
    },

    /// The merge succeeded in memory but writing it back failed; the
    /// caller needs to know the edit was not persisted.
    #[error("Failed to save assignment metafield: {source}")]
    MetafieldSave {
        #[source]
        source: Box<EngineError>,
    },

    /// A metafield value that should be a numeric identifier was not.
    #[error("Metafield {namespace}.{key} holds non-numeric value: {value}")]
    InvalidMetafieldValue {
        namespace: String,
        key: String,
        value: String,
    },
}

impl EngineError {
    /// Remote status code, when this error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            Self::CollectionCreationFailed { source }
            | Self::MetafieldFetch { source }
            | Self::MetafieldSave { source } => source.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patterns() -> Vec<String> {
        vec!["already exists".to_string()]
    }

    #[test]
    fn test_error_body_parses_json() {
        let body = ErrorBody::from_text(r#"{"errors":"boom"}"#.to_string());
        assert_eq!(body, ErrorBody::Json(json!({"errors": "boom"})));
    }

    #[test]
    fn test_error_body_falls_back_to_raw() {
        let body = ErrorBody::from_text("<html>502 Bad Gateway</html>".to_string());
        assert!(matches!(body, ErrorBody::Raw(_)));
    }

    #[test]
    fn test_contains_pattern_in_errors_field() {
        let body = ErrorBody::Json(json!({
            "errors": {"product_id": ["Already exists in this collection"]}
        }));
        assert!(body.contains_pattern(&patterns()));
    }

    #[test]
    fn test_contains_pattern_in_details_field() {
        let body = ErrorBody::Json(json!({"details": "collect already exists"}));
        assert!(body.contains_pattern(&patterns()));
    }

    #[test]
    fn test_contains_pattern_in_raw_body() {
        let body = ErrorBody::Raw("the collect ALREADY EXISTS".to_string());
        assert!(body.contains_pattern(&patterns()));
    }

    #[test]
    fn test_contains_pattern_misses() {
        let body = ErrorBody::Json(json!({"errors": "rate limited"}));
        assert!(!body.contains_pattern(&patterns()));
    }

    #[test]
    fn test_remote_api_display() {
        let err = EngineError::RemoteApi {
            status: 422,
            body: ErrorBody::Raw("nope".to_string()),
        };
        assert_eq!(err.to_string(), "Shopify API error (422): nope");
    }

    #[test]
    fn test_status_unwraps_through_wrappers() {
        let err = EngineError::MetafieldSave {
            source: Box::new(EngineError::RemoteApi {
                status: 500,
                body: ErrorBody::Raw(String::new()),
            }),
        };
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_collect_not_found_display() {
        let err = EngineError::CollectNotFound {
            product_id: 42,
            collection_id: 7,
        };
        assert_eq!(
            err.to_string(),
            "No collect found for product 42 in collection 7"
        );
    }
}
