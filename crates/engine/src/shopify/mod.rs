//! Shopify REST Admin API client.
//!
//! One method per remote call, each returning either a typed payload or
//! an [`EngineError`] carrying the remote status and a best-effort-parsed
//! body. The access token is attached as a default header at construction
//! time, so a missing credential fails at startup rather than per call.

mod types;

pub use types::*;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::config::ShopifyConfig;
use crate::error::{EngineError, ErrorBody};

/// Wrapper envelopes the REST Admin API uses around single resources.
#[derive(Deserialize)]
struct MetafieldEnvelope {
    metafield: Metafield,
}

#[derive(Deserialize)]
struct MetafieldsEnvelope {
    metafields: Vec<Metafield>,
}

#[derive(Deserialize)]
struct CustomCollectionEnvelope {
    custom_collection: CustomCollection,
}

#[derive(Deserialize)]
struct CollectEnvelope {
    collect: Collect,
}

#[derive(Deserialize)]
struct CollectsEnvelope {
    collects: Vec<Collect>,
}

/// Client for the Shopify REST Admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    /// Create a client for the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value
    /// or the HTTP client fails to build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, EngineError> {
        Self::with_base_url(&config.admin_api_base(), config.admin_token.expose_secret())
    }

    /// Create a client against an explicit API base URL.
    ///
    /// `base_url` must include the `/admin/api/{version}` prefix and no
    /// trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value
    /// or the HTTP client fails to build.
    pub fn with_base_url(base_url: &str, admin_token: &str) -> Result<Self, EngineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Shopify-Access-Token",
            HeaderValue::from_str(admin_token).map_err(|_| {
                EngineError::Config(crate::config::ConfigError::InvalidEnvVar(
                    "SHOPIFY_ADMIN_TOKEN".to_string(),
                    "not a valid header value".to_string(),
                ))
            })?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all metafields attached to a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn get_customer_metafields(
        &self,
        customer_id: u64,
    ) -> Result<Vec<Metafield>, EngineError> {
        let url = format!("{}/customers/{customer_id}/metafields.json", self.base_url);
        let response = self.client.get(&url).send().await?;
        let envelope: MetafieldsEnvelope = Self::parse_success(response).await?;
        Ok(envelope.metafields)
    }

    /// Create a metafield on an owner resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn create_metafield(
        &self,
        owner_id: u64,
        owner_resource: OwnerResource,
        namespace: &str,
        key: &str,
        value: &str,
        value_type: MetafieldType,
    ) -> Result<Metafield, EngineError> {
        let url = format!("{}/metafields.json", self.base_url);
        let body = json!({
            "metafield": {
                "namespace": namespace,
                "key": key,
                "value": value,
                "type": value_type,
                "owner_id": owner_id,
                "owner_resource": owner_resource.as_str(),
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: MetafieldEnvelope = Self::parse_success(response).await?;
        Ok(envelope.metafield)
    }

    /// Replace an existing metafield's value by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn update_metafield(
        &self,
        metafield_id: u64,
        value: &str,
        value_type: MetafieldType,
    ) -> Result<Metafield, EngineError> {
        let url = format!("{}/metafields/{metafield_id}.json", self.base_url);
        let body = json!({
            "metafield": {
                "id": metafield_id,
                "value": value,
                "type": value_type,
            }
        });

        let response = self.client.put(&url).json(&body).send().await?;
        let envelope: MetafieldEnvelope = Self::parse_success(response).await?;
        Ok(envelope.metafield)
    }

    /// Create a manually curated collection with the given title.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn create_collection(&self, title: &str) -> Result<CustomCollection, EngineError> {
        let url = format!("{}/custom_collections.json", self.base_url);
        let body = json!({ "custom_collection": { "title": title } });

        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: CustomCollectionEnvelope = Self::parse_success(response).await?;
        Ok(envelope.custom_collection)
    }

    /// Look up the collect for a (product, collection) pair, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn find_collect(
        &self,
        product_id: u64,
        collection_id: u64,
    ) -> Result<Option<Collect>, EngineError> {
        let url = format!(
            "{}/collects.json?product_id={product_id}&collection_id={collection_id}&limit=1",
            self.base_url
        );
        let response = self.client.get(&url).send().await?;
        let envelope: CollectsEnvelope = Self::parse_success(response).await?;
        Ok(envelope.collects.into_iter().next())
    }

    /// Create a collect associating a product with a collection.
    ///
    /// A 422 "already exists" is returned as a plain [`EngineError::RemoteApi`];
    /// recognizing it as idempotent success is the collect manager's job,
    /// since the pattern to match is configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn create_collect(
        &self,
        product_id: u64,
        collection_id: u64,
    ) -> Result<Collect, EngineError> {
        let url = format!("{}/collects.json", self.base_url);
        let body = json!({
            "collect": {
                "product_id": product_id,
                "collection_id": collection_id,
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: CollectEnvelope = Self::parse_success(response).await?;
        Ok(envelope.collect)
    }

    /// Delete a collect by its own identifier.
    ///
    /// Success is judged by status code alone; Shopify's delete responses
    /// may carry an empty body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify responds with a
    /// non-success status.
    pub async fn delete_collect(&self, collect_id: u64) -> Result<(), EngineError> {
        let url = format!("{}/collects/{collect_id}.json", self.base_url);
        let response = self.client.delete(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::RemoteApi {
                status: status.as_u16(),
                body: ErrorBody::from_text(text),
            });
        }
        Ok(())
    }

    /// Check the status and deserialize a success body, mapping any
    /// non-success response to [`EngineError::RemoteApi`] with a
    /// best-effort-parsed body.
    async fn parse_success<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, EngineError> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(EngineError::RemoteApi {
                status: status.as_u16(),
                body: ErrorBody::from_text(text),
            });
        }

        serde_json::from_str(&text).map_err(|e| EngineError::RemoteApi {
            status: status.as_u16(),
            body: ErrorBody::Raw(format!("unexpected response shape: {e}: {text}")),
        })
    }
}
