//! Idempotent product/collection association management.
//!
//! Shopify signals "this collect already exists" as a 422 error rather
//! than a success, so adding must absorb that error to be retry-safe.
//! Removal needs a lookup first: collects can only be deleted by their
//! own identifier, which is not derivable from the (product, collection)
//! pair.

use crate::error::EngineError;
use crate::shopify::AdminClient;

/// Result of an add operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new collect was created.
    Added,
    /// Shopify reported the collect already exists; treated as success.
    AlreadyPresent,
}

/// Adds and removes product/collection associations.
pub struct CollectManager<'a> {
    client: &'a AdminClient,
    duplicate_patterns: &'a [String],
}

impl<'a> CollectManager<'a> {
    #[must_use]
    pub const fn new(client: &'a AdminClient, duplicate_patterns: &'a [String]) -> Self {
        Self {
            client,
            duplicate_patterns,
        }
    }

    /// Associate a product with a collection.
    ///
    /// A client-error response whose body matches one of the configured
    /// duplicate patterns is Shopify's own idempotency signal and is
    /// reported as [`AddOutcome::AlreadyPresent`] rather than a failure.
    ///
    /// # Errors
    ///
    /// Any other transport or remote failure propagates with the remote
    /// status and body attached.
    pub async fn add(
        &self,
        product_id: u64,
        collection_id: u64,
    ) -> Result<AddOutcome, EngineError> {
        match self.client.create_collect(product_id, collection_id).await {
            Ok(collect) => {
                tracing::info!(
                    product_id,
                    collection_id,
                    collect_id = collect.id,
                    "collect created"
                );
                Ok(AddOutcome::Added)
            }
            Err(EngineError::RemoteApi { status, body })
                if (400..500).contains(&status)
                    && body.contains_pattern(self.duplicate_patterns) =>
            {
                tracing::info!(
                    product_id,
                    collection_id,
                    status,
                    "collect already exists, treating as success"
                );
                Ok(AddOutcome::AlreadyPresent)
            }
            Err(error) => Err(error),
        }
    }

    /// Remove the association between a product and a collection.
    ///
    /// Looks up the collect's identifier, then deletes it. Returns the
    /// identifier of the deleted collect.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CollectNotFound`] when no collect matches
    /// the pair (no delete is issued), or the remote/transport error from
    /// either call.
    pub async fn remove(&self, product_id: u64, collection_id: u64) -> Result<u64, EngineError> {
        let collect = self
            .client
            .find_collect(product_id, collection_id)
            .await?
            .ok_or(EngineError::CollectNotFound {
                product_id,
                collection_id,
            })?;

        self.client.delete_collect(collect.id).await?;
        tracing::info!(
            product_id,
            collection_id,
            collect_id = collect.id,
            "collect deleted"
        );
        Ok(collect.id)
    }
}
