//! JSON endpoint handlers.
//!
//! The storefront's frontend has sent both camelCase and snake_case
//! field spellings over the years, and numeric identifiers sometimes
//! arrive as strings. Both are normalized here, at the boundary; the
//! engine only ever sees the canonical request types.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use kundeshop_engine::{
    AddToCollectionRequest, AddToCollectionResponse, AssignVariantRequest, AssignVariantResponse,
    RemoveFromCollectionRequest, RemoveFromCollectionResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Deserialize a u64 that may arrive as a JSON number or a string.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse::<u64>().map_err(serde::de::Error::custom),
    }
}

/// Optional variant of [`lenient_u64`].
fn lenient_u64_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "lenient_u64")] u64);

    Option::<Wrapper>::deserialize(deserializer).map(|opt| opt.map(|w| w.0))
}

/// Wire shape of `POST /add-to-collection`.
#[derive(Debug, Deserialize)]
pub struct AddToCollectionBody {
    #[serde(
        default,
        alias = "customerId",
        deserialize_with = "lenient_u64_opt"
    )]
    pub customer_id: Option<u64>,
    #[serde(alias = "productId", deserialize_with = "lenient_u64")]
    pub product_id: u64,
    #[serde(
        default,
        alias = "collectionId",
        deserialize_with = "lenient_u64_opt"
    )]
    pub collection_id: Option<u64>,
}

/// Wire shape of `POST /remove-from-collection`.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCollectionBody {
    #[serde(alias = "productId", deserialize_with = "lenient_u64")]
    pub product_id: u64,
    #[serde(alias = "collectionId", deserialize_with = "lenient_u64")]
    pub collection_id: u64,
}

/// Wire shape of `POST /assign-variant`.
#[derive(Debug, Deserialize)]
pub struct AssignVariantBody {
    #[serde(alias = "employeeAddressId", alias = "addressId", alias = "address_id")]
    pub employee_address_id: String,
    #[serde(alias = "productId")]
    pub product_id: String,
    #[serde(alias = "variantId")]
    pub variant_id: String,
    #[serde(alias = "customerId", deserialize_with = "lenient_u64")]
    pub customer_id: u64,
}

/// Resolve the customer's collection and add the product to it.
#[instrument(skip(state), fields(product_id = body.product_id))]
pub async fn add_to_collection(
    State(state): State<AppState>,
    Json(body): Json<AddToCollectionBody>,
) -> Result<Json<AddToCollectionResponse>, AppError> {
    let response = state
        .engine()
        .resolve_and_associate(AddToCollectionRequest {
            customer_id: body.customer_id,
            product_id: body.product_id,
            collection_id: body.collection_id,
        })
        .await?;
    Ok(Json(response))
}

/// Remove the product from the collection.
#[instrument(skip(state), fields(product_id = body.product_id, collection_id = body.collection_id))]
pub async fn remove_from_collection(
    State(state): State<AppState>,
    Json(body): Json<RemoveFromCollectionBody>,
) -> Result<Json<RemoveFromCollectionResponse>, AppError> {
    let response = state
        .engine()
        .disassociate(RemoveFromCollectionRequest {
            product_id: body.product_id,
            collection_id: body.collection_id,
        })
        .await?;
    Ok(Json(response))
}

/// Record a variant assignment for an employee address.
#[instrument(skip(state), fields(customer_id = body.customer_id, variant_id = %body.variant_id))]
pub async fn assign_variant(
    State(state): State<AppState>,
    Json(body): Json<AssignVariantBody>,
) -> Result<Json<AssignVariantResponse>, AppError> {
    let response = state
        .engine()
        .assign_variant(AssignVariantRequest {
            employee_address_id: body.employee_address_id,
            product_id: body.product_id,
            variant_id: body.variant_id,
            customer_id: body.customer_id,
        })
        .await?;
    Ok(Json(response))
}

/// Liveness endpoint.
pub async fn health() -> &'static str {
    "ok"
}
