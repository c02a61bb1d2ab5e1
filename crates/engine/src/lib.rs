//! Kundeshop B2B engine.
//!
//! Mediates between the storefront and the Shopify REST Admin API to
//! maintain, per customer, a "personal collection" of products, and per
//! employee address a product/variant assignment ledger. All durable
//! state lives in Shopify metafields; this crate holds nothing between
//! calls.
//!
//! # Architecture
//!
//! - [`shopify::AdminClient`] — typed REST Admin API operations
//! - [`collection::CollectionResolver`] — find-or-create a customer's
//!   personal collection, cached in a customer metafield
//! - [`collect::CollectManager`] — idempotent product/collection
//!   association add and remove
//! - [`assignment::AssignmentMerger`] — read-modify-write merge of the
//!   JSON assignment document stored in a customer metafield
//! - [`Engine`] — facade exposing the three request/response contracts
//!   the HTTP layer adapts to
//!
//! Shopify offers no conditional writes, so the resolver and the merger
//! each carry a documented lost-update hazard under concurrent calls for
//! the same customer. The engine makes every operation safe to *retry*
//! (duplicate collect creation is absorbed, resolution is cached), but
//! it does not pretend to add transactions the platform lacks.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assignment;
pub mod collect;
pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod shopify;

pub use assignment::AssignmentDocument;
pub use config::{ConfigError, ShopifyConfig};
pub use engine::{
    AddToCollectionRequest, AddToCollectionResponse, AssignVariantRequest, AssignVariantResponse,
    Engine, RemoveFromCollectionRequest, RemoveFromCollectionResponse,
};
pub use error::{EngineError, ErrorBody};
pub use shopify::AdminClient;
