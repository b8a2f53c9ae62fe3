use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::errors::AppError;
use crate::models::{NotificationLevel, ProductDraft, ProductRow};
use crate::state::AppState;

use super::check_auth;

// GET /api/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProductRow>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let products = state.api.list_products().await.map_err(|e| {
        let err = AppError::upstream(e);
        tracing::error!(error = %err, "failed to load products");
        err
    })?;

    Ok(Json(products.into_iter().map(ProductRow::from).collect()))
}

// POST /api/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ProductRow>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    draft.validate().map_err(AppError::InvalidFields)?;
    draft.name = draft.name.trim().to_string();

    let product = state.api.create_product(&draft).await.map_err(|e| {
        let err = AppError::upstream(e);
        tracing::error!(error = %err, "failed to create product");
        state
            .notifier
            .notify(NotificationLevel::Error, "Could not save product", None);
        err
    })?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(ProductRow::from(product))))
}
