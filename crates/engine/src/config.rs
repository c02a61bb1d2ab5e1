//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_SHOP_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_TOKEN` - Admin API access token
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - REST Admin API version (default: 2024-01)
//! - `DUPLICATE_COLLECT_PATTERNS` - Comma-separated substrings that mark a
//!   failed collect creation as "already exists" (default: `already exists`)
//!
//! Configuration is loaded once at startup. Missing credentials are a
//! startup error, never a per-request one.

use secrecy::SecretString;
use thiserror::Error;

/// Default REST Admin API version.
const DEFAULT_API_VERSION: &str = "2024-01";

/// Default substring Shopify uses in the 422 payload when a collect for
/// the same (product, collection) pair already exists.
const DEFAULT_DUPLICATE_PATTERN: &str = "already exists";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the admin token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub shop_domain: String,
    /// REST Admin API version (e.g., 2024-01)
    pub api_version: String,
    /// Admin API access token, sent as `X-Shopify-Access-Token`
    pub admin_token: SecretString,
    /// Substrings that identify a "collect already exists" error payload.
    ///
    /// The exact wording is Shopify's contract, not ours, so it is
    /// configurable rather than hard-coded to one observed string.
    pub duplicate_collect_patterns: Vec<String>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("shop_domain", &self.shop_domain)
            .field("api_version", &self.api_version)
            .field("admin_token", &"[REDACTED]")
            .field(
                "duplicate_collect_patterns",
                &self.duplicate_collect_patterns,
            )
            .finish()
    }
}

impl ShopifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let shop_domain = get_required_env("SHOPIFY_SHOP_DOMAIN")?;
        let admin_token = SecretString::from(get_required_env("SHOPIFY_ADMIN_TOKEN")?);
        let api_version = get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
        let duplicate_collect_patterns = parse_patterns(
            &get_env_or_default("DUPLICATE_COLLECT_PATTERNS", DEFAULT_DUPLICATE_PATTERN),
        )?;

        Ok(Self {
            shop_domain,
            api_version,
            admin_token,
            duplicate_collect_patterns,
        })
    }

    /// Base URL of the REST Admin API for this store and version.
    #[must_use]
    pub fn admin_api_base(&self) -> String {
        format!(
            "https://{}/admin/api/{}",
            self.shop_domain, self.api_version
        )
    }
}

/// Get a required environment variable, rejecting empty values.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    let value = std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::MissingEnvVar(key.to_string()));
    }
    Ok(value)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma-separated pattern list, trimming whitespace.
fn parse_patterns(raw: &str) -> Result<Vec<String>, ConfigError> {
    let patterns: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase)
        .collect();
    if patterns.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "DUPLICATE_COLLECT_PATTERNS".to_string(),
            "must contain at least one non-empty pattern".to_string(),
        ));
    }
    Ok(patterns)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ShopifyConfig {
        ShopifyConfig {
            shop_domain: "test.myshopify.com".to_string(),
            api_version: "2024-01".to_string(),
            admin_token: SecretString::from("shpat_test_token"),
            duplicate_collect_patterns: vec!["already exists".to_string()],
        }
    }

    #[test]
    fn test_admin_api_base() {
        let config = test_config();
        assert_eq!(
            config.admin_api_base(),
            "https://test.myshopify.com/admin/api/2024-01"
        );
    }

    #[test]
    fn test_parse_patterns_single() {
        let patterns = parse_patterns("already exists").unwrap();
        assert_eq!(patterns, vec!["already exists"]);
    }

    #[test]
    fn test_parse_patterns_multiple_trims_and_lowercases() {
        let patterns = parse_patterns("Already Exists , has already been taken").unwrap();
        assert_eq!(patterns, vec!["already exists", "has already been taken"]);
    }

    #[test]
    fn test_parse_patterns_rejects_empty() {
        assert!(parse_patterns(" , ,").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_test_token"));
    }
}
