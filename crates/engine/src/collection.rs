//! Personal-collection resolution.
//!
//! Every B2B customer owns at most one "personal collection". Its
//! identifier is cached as a customer metafield; resolution finds that
//! cache or lazily creates the collection and writes the cache back.

use crate::error::EngineError;
use crate::shopify::{AdminClient, Metafield, MetafieldType, OwnerResource};

/// Preferred namespace/key for the cached collection identifier.
pub const PREFERRED_NAMESPACE: &str = "b2b";
pub const PREFERRED_KEY: &str = "personal_collection_id";

/// Legacy namespace/key from the earlier caching scheme. Read for
/// compatibility with collections created under it, never written.
pub const LEGACY_NAMESPACE: &str = "custom";
pub const LEGACY_KEY: &str = "collection_id";

/// How a collection identifier was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSource {
    /// Caller supplied the identifier; no lookup was performed.
    Explicit,
    /// Found under the preferred metafield.
    Cached,
    /// Found under the legacy metafield.
    CachedLegacy,
    /// Freshly created. When `cache_persisted` is false the metafield
    /// write failed after creation: the collection is usable for this
    /// request, but the next resolution for this customer will create a
    /// duplicate unless the caller passes the identifier explicitly.
    Created { cache_persisted: bool },
}

/// A usable collection identifier plus how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCollection {
    pub collection_id: u64,
    pub source: CollectionSource,
}

/// Finds or lazily creates a customer's personal collection.
///
/// Two concurrent resolutions for the same uncached customer can both
/// observe "not found" and both create a collection; Shopify has no
/// conditional writes, so the second metafield write wins and one
/// collection is orphaned. Accepted limitation, asserted by a test
/// rather than hidden.
pub struct CollectionResolver<'a> {
    client: &'a AdminClient,
}

impl<'a> CollectionResolver<'a> {
    #[must_use]
    pub const fn new(client: &'a AdminClient) -> Self {
        Self { client }
    }

    /// Resolve a usable collection identifier.
    ///
    /// An explicit `collection_id` always wins and is returned without an
    /// existence check (the subsequent collect call validates it
    /// implicitly). Otherwise the customer's metafields are searched,
    /// preferred namespace first, legacy second; a miss on both creates a
    /// collection titled `Kundeshop #<customer_id>` and caches its
    /// identifier under the preferred namespace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when neither identifier is supplied,
    /// `CollectionCreationFailed` when the lazy create fails, and the
    /// underlying transport/remote error for the metafield fetch. A
    /// failed cache write after a successful create is *not* an error; it
    /// is reported via [`CollectionSource::Created`] and logged.
    pub async fn resolve(
        &self,
        customer_id: Option<u64>,
        collection_id: Option<u64>,
    ) -> Result<ResolvedCollection, EngineError> {
        if let Some(collection_id) = collection_id {
            return Ok(ResolvedCollection {
                collection_id,
                source: CollectionSource::Explicit,
            });
        }

        let Some(customer_id) = customer_id else {
            return Err(EngineError::InvalidRequest(
                "either customer_id or collection_id is required".to_string(),
            ));
        };

        let metafields = self.client.get_customer_metafields(customer_id).await?;
        if let Some((metafield, source)) = find_cached_collection(&metafields) {
            let collection_id = parse_collection_id(metafield)?;
            tracing::debug!(customer_id, collection_id, ?source, "resolved cached collection");
            return Ok(ResolvedCollection {
                collection_id,
                source,
            });
        }

        self.create_and_cache(customer_id).await
    }

    /// Create the personal collection and write its identifier back as a
    /// customer metafield.
    async fn create_and_cache(&self, customer_id: u64) -> Result<ResolvedCollection, EngineError> {
        let title = personal_collection_title(customer_id);
        let collection = self
            .client
            .create_collection(&title)
            .await
            .map_err(|source| EngineError::CollectionCreationFailed {
                source: Box::new(source),
            })?;

        tracing::info!(
            customer_id,
            collection_id = collection.id,
            title = %collection.title,
            "created personal collection"
        );

        let cache_persisted = match self
            .client
            .create_metafield(
                customer_id,
                OwnerResource::Customer,
                PREFERRED_NAMESPACE,
                PREFERRED_KEY,
                &collection.id.to_string(),
                MetafieldType::NumberInteger,
            )
            .await
        {
            Ok(_) => true,
            Err(error) => {
                // Non-fatal for this request, but the next resolution
                // will create a duplicate collection.
                tracing::warn!(
                    customer_id,
                    collection_id = collection.id,
                    %error,
                    "collection created but caching its id failed"
                );
                false
            }
        };

        Ok(ResolvedCollection {
            collection_id: collection.id,
            source: CollectionSource::Created { cache_persisted },
        })
    }
}

/// Deterministic title for a customer's personal collection.
#[must_use]
pub fn personal_collection_title(customer_id: u64) -> String {
    format!("Kundeshop #{customer_id}")
}

/// Search metafields for a cached collection identifier, preferred
/// namespace/key first, legacy second.
fn find_cached_collection(metafields: &[Metafield]) -> Option<(&Metafield, CollectionSource)> {
    let preferred = metafields
        .iter()
        .find(|m| m.namespace == PREFERRED_NAMESPACE && m.key == PREFERRED_KEY)
        .map(|m| (m, CollectionSource::Cached));

    preferred.or_else(|| {
        metafields
            .iter()
            .find(|m| m.namespace == LEGACY_NAMESPACE && m.key == LEGACY_KEY)
            .map(|m| (m, CollectionSource::CachedLegacy))
    })
}

/// Parse a cached metafield value into a collection identifier.
fn parse_collection_id(metafield: &Metafield) -> Result<u64, EngineError> {
    metafield
        .value
        .trim()
        .parse::<u64>()
        .map_err(|_| EngineError::InvalidMetafieldValue {
            namespace: metafield.namespace.clone(),
            key: metafield.key.clone(),
            value: metafield.value.clone(),
        })
}
