use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyra_core::identity::{Role, User};
use voyra_core::validation;
use voyra_shared::models::events::{ChangeAction, ChangeEntity};

use crate::auth::hash_password;
use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_users).post(create_user))
        .route(
            "/v1/users/{id}",
            get(get_user).put(update_user).delete(deactivate_user),
        )
}

// ============================================================================
// Handlers (admin only)
// ============================================================================

/// GET /v1/users
async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    claims.require_admin()?;

    let users = state.users.list_users().await.map_err(AppError::internal)?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /v1/users
async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    claims.require_admin()?;

    validation::validate_email(&req.email).map_err(|e| AppError::ValidationError(e.to_string()))?;
    validation::validate_person_name("full_name", &req.full_name)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    if req.password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown role: {}", req.role)))?;

    if state
        .users
        .get_user_by_email(&req.email)
        .await
        .map_err(AppError::internal)?
        .is_some()
    {
        return Err(AppError::ConflictError(format!("Email {} already registered", req.email)));
    }

    let now = chrono::Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: req.email,
        password_hash: hash_password(&req.password)?,
        full_name: req.full_name,
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.users.create_user(&user).await.map_err(AppError::internal)?;
    state.publish_change(ChangeEntity::User, user.id, ChangeAction::Created);

    Ok(Json(UserResponse::from(user)))
}

/// GET /v1/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    claims.require_admin()?;

    let user = state
        .users
        .get_user(user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("User {} not found", user_id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /v1/users/{id}
async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    claims.require_admin()?;

    let mut user = state
        .users
        .get_user(user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("User {} not found", user_id)))?;

    if let Some(full_name) = req.full_name {
        validation::validate_person_name("full_name", &full_name)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        user.full_name = full_name;
    }
    if let Some(role) = req.role {
        user.role = Role::parse(&role)
            .ok_or_else(|| AppError::ValidationError(format!("Unknown role: {}", role)))?;
    }
    if let Some(is_active) = req.is_active {
        user.is_active = is_active;
    }
    if let Some(password) = req.password {
        if password.len() < 8 {
            return Err(AppError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        user.password_hash = hash_password(&password)?;
    }

    state.users.update_user(user_id, &user).await.map_err(AppError::internal)?;
    state.publish_change(ChangeEntity::User, user_id, ChangeAction::Updated);

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /v1/users/{id}
/// Accounts are deactivated, never removed.
async fn deactivate_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    claims.require_admin()?;

    if claims.user_id()? == user_id {
        return Err(AppError::ValidationError("Cannot deactivate yourself".to_string()));
    }

    state
        .users
        .get_user(user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("User {} not found", user_id)))?;

    state.users.deactivate_user(user_id).await.map_err(AppError::internal)?;
    state.publish_change(ChangeEntity::User, user_id, ChangeAction::Deleted);

    Ok(axum::http::StatusCode::NO_CONTENT)
}
