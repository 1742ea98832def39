use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use jsonwebtoken::{encode, EncodingKey, Header};
use voyra_core::identity::User;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: uuid::Uuid,
    pub full_name: String,
    pub role: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/login", post(login))
}

/// POST /v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .users
        .get_user_by_email(&req.email)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::AuthenticationError("Invalid credentials".to_string()))?;

    if !user.is_active {
        return Err(AppError::AuthenticationError("Account disabled".to_string()));
    }

    verify_password(&req.password, &user.password_hash)?;

    let token = issue_token(&state, &user)?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        full_name: user.full_name,
        role: user.role.as_str().to_string(),
    }))
}

pub fn issue_token(state: &AppState, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::AuthenticationError("Invalid credentials".to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::AuthenticationError("Invalid credentials".to_string()))
}
