use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyra_core::identity::Role;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::AuthenticationError("Malformed subject claim".to_string()))
    }

    pub fn role(&self) -> Result<Role, AppError> {
        Role::parse(&self.role)
            .ok_or_else(|| AppError::AuthorizationError(format!("Unknown role: {}", self.role)))
    }

    pub fn require_manager(&self) -> Result<Role, AppError> {
        let role = self.role()?;
        if !role.can_manage_tours() {
            return Err(AppError::AuthorizationError(
                "Manager access required".to_string(),
            ));
        }
        Ok(role)
    }

    pub fn require_admin(&self) -> Result<Role, AppError> {
        let role = self.role()?;
        if !role.can_manage_users() {
            return Err(AppError::AuthorizationError("Admin access required".to_string()));
        }
        Ok(role)
    }
}

// ============================================================================
// Authentication Middleware
// ============================================================================

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Reject tokens carrying a role we no longer recognize
    if Role::parse(&token_data.claims.role).is_none() {
        return Err(StatusCode::FORBIDDEN);
    }

    // 4. Inject claims into request extensions
    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}
