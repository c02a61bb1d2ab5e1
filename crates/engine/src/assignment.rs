//! Employee variant-assignment ledger.
//!
//! The whole ledger for a customer lives in one multi-line-text metafield
//! as a JSON document: employee address id → product id → ordered,
//! deduplicated variant ids. Shopify offers no partial update on a
//! metafield value, so every edit is a wholesale read-modify-write of the
//! serialized document. The document type itself is pure and unit-tested;
//! [`AssignmentMerger`] wires it to the metafield round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::shopify::{AdminClient, Metafield, MetafieldType, OwnerResource};

/// Namespace/key of the assignment metafield.
pub const ASSIGNMENT_NAMESPACE: &str = "b2b";
pub const ASSIGNMENT_KEY: &str = "assigned_variants";

/// The nested assignment ledger.
///
/// Leaf lists preserve insertion order and never hold duplicates. Absent
/// keys mean empty, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentDocument(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl AssignmentDocument {
    /// Parse a stored metafield value, treating empty or malformed input
    /// as an empty document.
    ///
    /// A malformed value is a data-loss risk the platform gives us no way
    /// to avoid (there is nothing to merge into), so it is logged as a
    /// warning rather than failing the edit.
    #[must_use]
    pub fn parse_or_empty(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(raw) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(
                    %error,
                    stored_len = raw.len(),
                    "stored assignment document is not valid JSON, starting from empty"
                );
                Self::default()
            }
        }
    }

    /// Record a variant for a product under an employee address.
    ///
    /// Appends to the end of the product's variant list; returns `false`
    /// when the variant was already present (set semantics, order kept).
    pub fn assign(&mut self, address_id: &str, product_id: &str, variant_id: &str) -> bool {
        let variants = self
            .0
            .entry(address_id.to_string())
            .or_default()
            .entry(product_id.to_string())
            .or_default();

        if variants.iter().any(|v| v == variant_id) {
            return false;
        }
        variants.push(variant_id.to_string());
        true
    }

    /// Variants assigned to a product under an address; empty when absent.
    #[must_use]
    pub fn variants(&self, address_id: &str, product_id: &str) -> &[String] {
        self.0
            .get(address_id)
            .and_then(|products| products.get(product_id))
            .map_or(&[], Vec::as_slice)
    }

    /// Serialize for storage in the metafield.
    ///
    /// # Errors
    ///
    /// Propagates the (practically unreachable) serializer failure.
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of employee addresses with at least one entry.
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.0.len()
    }
}

/// Outcome of a merge, returned to the caller for display and debugging.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The full document after the edit.
    pub document: AssignmentDocument,
    /// True when the edit appended a variant (false: it was already there).
    pub variant_added: bool,
    /// True when no assignment metafield existed and one was created.
    pub metafield_created: bool,
}

/// Applies one assignment edit to the customer's stored document.
///
/// The read-modify-write has no conditional-update token: two concurrent
/// edits for the same customer race, and the later write silently
/// discards the earlier one. Accepted limitation of the platform;
/// resubmitting a merge is therefore only safe when no concurrent editor
/// exists.
pub struct AssignmentMerger<'a> {
    client: &'a AdminClient,
}

impl<'a> AssignmentMerger<'a> {
    #[must_use]
    pub const fn new(client: &'a AdminClient) -> Self {
        Self { client }
    }

    /// Merge one (address, product, variant) edit into the customer's
    /// assignment metafield and write the document back wholesale.
    ///
    /// # Errors
    ///
    /// [`EngineError::MetafieldFetch`] when the current state cannot be
    /// read (merging blind would lose data), [`EngineError::MetafieldSave`]
    /// when the in-memory merge succeeded but persisting it failed.
    pub async fn merge(
        &self,
        customer_id: u64,
        address_id: &str,
        product_id: &str,
        variant_id: &str,
    ) -> Result<MergeOutcome, EngineError> {
        let metafields = self
            .client
            .get_customer_metafields(customer_id)
            .await
            .map_err(|source| EngineError::MetafieldFetch {
                source: Box::new(source),
            })?;

        let existing = metafields
            .iter()
            .find(|m| m.namespace == ASSIGNMENT_NAMESPACE && m.key == ASSIGNMENT_KEY);

        let mut document = existing.map_or_else(AssignmentDocument::default, |m| {
            AssignmentDocument::parse_or_empty(&m.value)
        });

        let variant_added = document.assign(address_id, product_id, variant_id);
        let serialized = document.to_json()?;

        let metafield_created = self
            .save(customer_id, existing, &serialized)
            .await
            .map_err(|source| EngineError::MetafieldSave {
                source: Box::new(source),
            })?;

        tracing::info!(
            customer_id,
            address_id,
            product_id,
            variant_id,
            variant_added,
            metafield_created,
            "assignment merged"
        );

        Ok(MergeOutcome {
            document,
            variant_added,
            metafield_created,
        })
    }

    /// Replace the existing metafield in place, or create one when the
    /// customer has none. Returns true when a metafield was created.
    async fn save(
        &self,
        customer_id: u64,
        existing: Option<&Metafield>,
        value: &str,
    ) -> Result<bool, EngineError> {
        match existing {
            Some(metafield) => {
                self.client
                    .update_metafield(metafield.id, value, MetafieldType::MultiLineText)
                    .await?;
                Ok(false)
            }
            None => {
                self.client
                    .create_metafield(
                        customer_id,
                        OwnerResource::Customer,
                        ASSIGNMENT_NAMESPACE,
                        ASSIGNMENT_KEY,
                        value,
                        MetafieldType::MultiLineText,
                    )
                    .await?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_string_is_empty_document() {
        let doc = AssignmentDocument::parse_or_empty("   ");
        assert_eq!(doc, AssignmentDocument::default());
    }

    #[test]
    fn test_parse_malformed_json_recovers_to_empty() {
        let doc = AssignmentDocument::parse_or_empty("{not json at all");
        assert_eq!(doc, AssignmentDocument::default());
    }

    #[test]
    fn test_parse_round_trips_stored_shape() {
        let raw = r#"{"addr-1":{"p-9":["v-1","v-2"]}}"#;
        let doc = AssignmentDocument::parse_or_empty(raw);
        assert_eq!(doc.variants("addr-1", "p-9"), ["v-1", "v-2"]);
        assert_eq!(doc.to_json().unwrap(), raw);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut doc = AssignmentDocument::default();
        assert!(doc.assign("a", "p1", "v1"));
        assert!(!doc.assign("a", "p1", "v1"));
        assert_eq!(doc.variants("a", "p1"), ["v1"]);
    }

    #[test]
    fn test_assign_preserves_insertion_order() {
        let mut doc = AssignmentDocument::default();
        doc.assign("a", "p1", "v2");
        doc.assign("a", "p1", "v1");
        doc.assign("a", "p1", "v2");
        assert_eq!(doc.variants("a", "p1"), ["v2", "v1"]);
    }

    #[test]
    fn test_assign_is_additive_across_products() {
        let mut doc = AssignmentDocument::default();
        doc.assign("a", "p1", "v1");
        doc.assign("a", "p1", "v2");
        doc.assign("a", "p2", "v3");

        assert_eq!(doc.variants("a", "p1"), ["v1", "v2"]);
        assert_eq!(doc.variants("a", "p2"), ["v3"]);
        assert_eq!(doc.address_count(), 1);
    }

    #[test]
    fn test_assign_is_additive_across_addresses() {
        let mut doc = AssignmentDocument::default();
        doc.assign("a", "p1", "v1");
        doc.assign("b", "p1", "v1");

        assert_eq!(doc.variants("a", "p1"), ["v1"]);
        assert_eq!(doc.variants("b", "p1"), ["v1"]);
        assert_eq!(doc.address_count(), 2);
    }

    #[test]
    fn test_absent_keys_read_as_empty() {
        let doc = AssignmentDocument::default();
        assert!(doc.variants("missing", "also-missing").is_empty());
    }
}
