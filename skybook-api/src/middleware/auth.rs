use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    RequestExt,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use skybook_core::identity::{CallerIdentity, Role};

use crate::error::{ApiError, AppError};
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims issued by the customer service on login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerClaims {
    pub sub: String,
    pub id: i64,
    pub rol: String,
    pub exp: usize,
}

impl CustomerClaims {
    pub fn into_identity(self) -> Option<CallerIdentity> {
        Role::from_claim(&self.rol).map(|role| CallerIdentity::new(self.id, role))
    }
}

// ============================================================================
// Caller Identity Middleware
// ============================================================================

/// Verifies the bearer token and stores the resulting `CallerIdentity` in the
/// request extensions. Handlers take it from there as an explicit argument.
pub async fn caller_identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    // 1. Extract token from Authorization header
    let TypedHeader(Authorization(bearer)) = req
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::AuthenticationError("Missing bearer token".to_string()).at(&path))?;

    // 2. Decode and validate JWT
    let token_data = decode::<CustomerClaims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(format!("Invalid token: {}", e)).at(&path))?;

    // 3. Map the role claim
    let caller = token_data
        .claims
        .into_identity()
        .ok_or_else(|| AppError::AuthorizationError("Unknown role".to_string()).at(&path))?;

    // 4. Inject identity into request extensions
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

// ============================================================================
// Admin Guard
// ============================================================================

/// Must run inside `caller_identity_middleware`.
pub async fn admin_only_middleware(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = req
        .extensions()
        .get::<CallerIdentity>()
        .map(CallerIdentity::is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(AppError::AuthorizationError("Administrator role required".to_string()).at(req.uri().path()));
    }

    Ok(next.run(req).await)
}
