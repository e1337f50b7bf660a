//! Authentication API Endpoints
//! Mission: Provide registration, login and identity endpoints

use crate::auth::{
    middleware::CurrentUser,
    models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    user_store::UserStoreError,
};
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{info, warn};

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthApiError> {
    let user = state
        .users
        .register(&payload.username, &payload.email, &payload.password)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let user = state
        .users
        .authenticate(&payload.username, &payload.password)?;

    let (token, expires_in) = state.jwt.issue(&user).map_err(|e| {
        warn!("Token issuance failed: {}", e);
        AuthApiError::InternalError
    })?;

    info!("✅ Login successful: {}", user.username);

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Current user endpoint - GET /api/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from_user(&user))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    Conflict,
    InvalidCredentials,
    InternalError,
}

impl From<UserStoreError> for AuthApiError {
    fn from(e: UserStoreError) -> Self {
        match e {
            UserStoreError::Conflict => AuthApiError::Conflict,
            UserStoreError::InvalidCredentials => AuthApiError::InvalidCredentials,
            UserStoreError::Hash(_) | UserStoreError::Database(_) => {
                warn!("Credential store failure: {}", e);
                AuthApiError::InternalError
            }
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::Conflict => {
                (StatusCode::CONFLICT, "Username or email already registered")
            }
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_api_error_responses() {
        let conflict = AuthApiError::Conflict.into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let invalid = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let internal = AuthApiError::InternalError.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_errors_map_to_api_errors() {
        assert!(matches!(
            AuthApiError::from(UserStoreError::Conflict),
            AuthApiError::Conflict
        ));
        assert!(matches!(
            AuthApiError::from(UserStoreError::InvalidCredentials),
            AuthApiError::InvalidCredentials
        ));
    }
}
