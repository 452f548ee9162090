//! Product catalog.

use crate::errors::BoError;
use crate::handlers::{parse_body, IdPath};
use crate::models::{Product, ProductListResponse, ProductRequest};
use crate::routes::AppState;
use crate::services::product_service;
use crate::services::token_service::SessionClaims;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use common::types::ProductId;
use std::sync::Arc;
use tracing::instrument;

/// GET /api/product
#[instrument(skip_all, name = "bo.product.list")]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<ProductListResponse>, BoError> {
    let products = product_service::list_products(state.store.as_ref(), &claims.user).await?;
    Ok(Json(products))
}

/// GET /api/product/:id
#[instrument(skip_all, name = "bo.product.get")]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<Product>, BoError> {
    let product = product_service::get_product(state.store.as_ref(), &claims.user, id).await?;
    Ok(Json(product))
}

/// POST /api/product
#[instrument(skip_all, name = "bo.product.create")]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    body: Bytes,
) -> Result<(StatusCode, Json<Product>), BoError> {
    let request: ProductRequest = parse_body(&body)?;

    let product =
        product_service::create_product(state.store.as_ref(), &claims.user, request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/product/:id
#[instrument(skip_all, name = "bo.product.update")]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<ProductId>,
    body: Bytes,
) -> Result<Json<Product>, BoError> {
    let request: ProductRequest = parse_body(&body)?;

    let product =
        product_service::update_product(state.store.as_ref(), &claims.user, id, request).await?;
    Ok(Json(product))
}

/// DELETE /api/product/:id
#[instrument(skip_all, name = "bo.product.disable")]
pub async fn disable_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<Product>, BoError> {
    let product = product_service::disable_product(state.store.as_ref(), &claims.user, id).await?;
    Ok(Json(product))
}
