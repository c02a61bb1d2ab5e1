//! Engine facade.
//!
//! One canonical request/response pair per exposed operation. The HTTP
//! layer normalizes wire spellings into these types; the engine never
//! sees alternate field names. Every response carries an explicit
//! `success` flag and a human-readable message, because some recovered
//! failures (duplicate collect, cache-write miss) are reported as
//! success with an explanation.

use serde::Serialize;

use crate::assignment::{AssignmentDocument, AssignmentMerger};
use crate::collect::{AddOutcome, CollectManager};
use crate::collection::{CollectionResolver, CollectionSource};
use crate::config::ShopifyConfig;
use crate::error::EngineError;
use crate::shopify::AdminClient;

/// Request to resolve a collection and associate a product with it.
#[derive(Debug, Clone, Copy)]
pub struct AddToCollectionRequest {
    /// Owner of the personal collection; required unless `collection_id`
    /// is supplied.
    pub customer_id: Option<u64>,
    pub product_id: u64,
    /// Explicit collection; skips resolution entirely when present.
    pub collection_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddToCollectionResponse {
    pub success: bool,
    pub message: String,
    pub collection_id: u64,
    pub outcome: AddOutcome,
    /// True when resolution had to create the collection.
    pub collection_created: bool,
}

/// Request to remove a product/collection association.
#[derive(Debug, Clone, Copy)]
pub struct RemoveFromCollectionRequest {
    pub product_id: u64,
    pub collection_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveFromCollectionResponse {
    pub success: bool,
    pub message: String,
    pub removed: bool,
}

/// Request to record a variant assignment for an employee address.
#[derive(Debug, Clone)]
pub struct AssignVariantRequest {
    pub employee_address_id: String,
    pub product_id: String,
    pub variant_id: String,
    /// Customer whose metafield holds the assignment ledger.
    pub customer_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignVariantResponse {
    pub success: bool,
    pub message: String,
    /// The full ledger after the edit, for caller-side display.
    pub assignments: AssignmentDocument,
}

/// The Collection Resolution & Assignment Merge Engine.
///
/// Holds no state between calls beyond the configured client; everything
/// durable is re-read from Shopify on each invocation.
pub struct Engine {
    client: AdminClient,
    config: ShopifyConfig,
}

impl Engine {
    /// Build an engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed from the
    /// configured credential.
    pub fn new(config: ShopifyConfig) -> Result<Self, EngineError> {
        let client = AdminClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Build an engine around an existing client.
    #[must_use]
    pub const fn from_parts(client: AdminClient, config: ShopifyConfig) -> Self {
        Self { client, config }
    }

    /// Resolve the target collection (creating it if needed) and
    /// associate the product with it.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when neither customer nor collection id is given;
    /// otherwise the resolver's or collect manager's error.
    pub async fn resolve_and_associate(
        &self,
        request: AddToCollectionRequest,
    ) -> Result<AddToCollectionResponse, EngineError> {
        let resolver = CollectionResolver::new(&self.client);
        let resolved = resolver
            .resolve(request.customer_id, request.collection_id)
            .await?;

        let manager = CollectManager::new(&self.client, &self.config.duplicate_collect_patterns);
        let outcome = manager
            .add(request.product_id, resolved.collection_id)
            .await?;

        let mut message = match outcome {
            AddOutcome::Added => format!(
                "Product {} added to collection {}",
                request.product_id, resolved.collection_id
            ),
            AddOutcome::AlreadyPresent => "Product already existed in collection".to_string(),
        };

        let collection_created = match resolved.source {
            CollectionSource::Created { cache_persisted } => {
                if !cache_persisted {
                    message.push_str(
                        "; collection id could not be cached, pass collection_id explicitly on \
                         the next request to avoid a duplicate collection",
                    );
                }
                true
            }
            _ => false,
        };

        Ok(AddToCollectionResponse {
            success: true,
            message,
            collection_id: resolved.collection_id,
            outcome,
            collection_created,
        })
    }

    /// Remove the product/collection association.
    ///
    /// # Errors
    ///
    /// [`EngineError::CollectNotFound`] when no association exists for
    /// the pair, or the remote/transport error from lookup or delete.
    pub async fn disassociate(
        &self,
        request: RemoveFromCollectionRequest,
    ) -> Result<RemoveFromCollectionResponse, EngineError> {
        let manager = CollectManager::new(&self.client, &self.config.duplicate_collect_patterns);
        manager
            .remove(request.product_id, request.collection_id)
            .await?;

        Ok(RemoveFromCollectionResponse {
            success: true,
            message: format!(
                "Product {} removed from collection {}",
                request.product_id, request.collection_id
            ),
            removed: true,
        })
    }

    /// Merge one variant assignment into the customer's ledger.
    ///
    /// # Errors
    ///
    /// `MetafieldFetch` when the current ledger cannot be read,
    /// `MetafieldSave` when the merged ledger cannot be written back.
    pub async fn assign_variant(
        &self,
        request: AssignVariantRequest,
    ) -> Result<AssignVariantResponse, EngineError> {
        let merger = AssignmentMerger::new(&self.client);
        let outcome = merger
            .merge(
                request.customer_id,
                &request.employee_address_id,
                &request.product_id,
                &request.variant_id,
            )
            .await?;

        let message = if outcome.variant_added {
            format!(
                "Variant {} assigned to address {}",
                request.variant_id, request.employee_address_id
            )
        } else {
            format!(
                "Variant {} was already assigned to address {}",
                request.variant_id, request.employee_address_id
            )
        };

        Ok(AssignVariantResponse {
            success: true,
            message,
            assignments: outcome.document,
        })
    }
}
