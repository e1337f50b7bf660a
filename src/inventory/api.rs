//! Inventory API Endpoints
//! Mission: Expose catalog management and stock operations

use crate::auth::{middleware::CurrentUser, policy};
use crate::inventory::{
    models::{ListQuery, SearchFilter, StockAdjustment, Sweet, SweetCreate, SweetUpdate},
    store::SweetStoreError,
};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::warn;

/// Add a sweet - POST /api/sweets
pub async fn add_sweet(
    State(state): State<AppState>,
    Json(payload): Json<SweetCreate>,
) -> Result<(StatusCode, Json<Sweet>), SweetApiError> {
    let sweet = state.sweets.add(&payload)?;
    Ok((StatusCode::CREATED, Json(sweet)))
}

/// List sweets - GET /api/sweets
pub async fn list_sweets(
    State(state): State<AppState>,
    Query(page): Query<ListQuery>,
) -> Result<Json<Vec<Sweet>>, SweetApiError> {
    let sweets = state.sweets.list(page.offset, page.limit)?;
    Ok(Json(sweets))
}

/// Search sweets - GET /api/sweets/search
pub async fn search_sweets(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<Vec<Sweet>>, SweetApiError> {
    let sweets = state.sweets.search(&filter)?;
    Ok(Json(sweets))
}

/// Update a sweet - PUT /api/sweets/:id
pub async fn update_sweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SweetUpdate>,
) -> Result<Json<Sweet>, SweetApiError> {
    let sweet = state.sweets.update(id, &payload)?;
    Ok(Json(sweet))
}

/// Delete a sweet - DELETE /api/sweets/:id (admin only)
pub async fn delete_sweet(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, SweetApiError> {
    policy::require_admin(&user)?;
    state.sweets.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Purchase stock - POST /api/sweets/:id/purchase
pub async fn purchase_sweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<Sweet>, SweetApiError> {
    let sweet = state.sweets.purchase(id, payload.quantity)?;
    Ok(Json(sweet))
}

/// Restock - POST /api/sweets/:id/restock (admin only)
pub async fn restock_sweet(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<Sweet>, SweetApiError> {
    policy::require_admin(&user)?;
    let sweet = state.sweets.restock(id, payload.quantity)?;
    Ok(Json(sweet))
}

/// Inventory API errors
#[derive(Debug)]
pub enum SweetApiError {
    Conflict,
    NotFound,
    InvalidQuantity,
    InsufficientStock,
    Forbidden,
    InternalError,
}

impl From<SweetStoreError> for SweetApiError {
    fn from(e: SweetStoreError) -> Self {
        match e {
            SweetStoreError::Conflict => SweetApiError::Conflict,
            SweetStoreError::NotFound => SweetApiError::NotFound,
            SweetStoreError::InvalidQuantity => SweetApiError::InvalidQuantity,
            SweetStoreError::InsufficientStock => SweetApiError::InsufficientStock,
            SweetStoreError::Database(_) => {
                warn!("Inventory store failure: {}", e);
                SweetApiError::InternalError
            }
        }
    }
}

impl From<policy::AuthzError> for SweetApiError {
    fn from(e: policy::AuthzError) -> Self {
        match e {
            // Unauthenticated callers never reach these handlers; the
            // middleware rejects them first.
            policy::AuthzError::Unauthenticated => SweetApiError::Forbidden,
            policy::AuthzError::Forbidden => SweetApiError::Forbidden,
        }
    }
}

impl IntoResponse for SweetApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SweetApiError::Conflict => (
                StatusCode::CONFLICT,
                "Sweet with same name & category already exists",
            ),
            SweetApiError::NotFound => (StatusCode::NOT_FOUND, "Sweet not found"),
            SweetApiError::InvalidQuantity => {
                (StatusCode::BAD_REQUEST, "Quantity must be positive")
            }
            SweetApiError::InsufficientStock => (StatusCode::BAD_REQUEST, "Not enough stock"),
            SweetApiError::Forbidden => (StatusCode::FORBIDDEN, "Admin privileges required"),
            SweetApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
