//! REST Admin API resource types.

use serde::{Deserialize, Serialize};

/// A metafield attached to an owner resource (customer or variant).
///
/// Values are always transported as strings; `value_type` declares how
/// Shopify should interpret them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metafield {
    pub id: u64,
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: MetafieldType,
}

/// The platform's metafield type identifiers (the subset we use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum MetafieldType {
    #[serde(rename = "number_integer")]
    NumberInteger,
    #[serde(rename = "single_line_text_field")]
    SingleLineText,
    #[serde(rename = "multi_line_text_field")]
    MultiLineText,
}

/// Resource kinds a metafield can be attached to (the subset we use).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerResource {
    Customer,
    Variant,
}

impl OwnerResource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Variant => "variant",
        }
    }
}

/// A manually curated collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomCollection {
    pub id: u64,
    pub title: String,
}

/// A product/collection association.
///
/// Carries its own identifier because Shopify has no delete-by-pair
/// operation; a collect must be looked up before it can be deleted.
#[derive(Debug, Clone, Deserialize)]
pub struct Collect {
    pub id: u64,
    pub product_id: u64,
    pub collection_id: u64,
}
