use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyra_catalog::tour::{Departure, Tour};
use voyra_core::identity::Role;
use voyra_shared::models::events::{ChangeAction, ChangeEntity};

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub code: String,
    pub name: String,
    pub destination: String,
    pub description: Option<String>,
    pub base_price_cents: i32,
    pub provider_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTourRequest {
    pub name: Option<String>,
    pub destination: Option<String>,
    pub description: Option<String>,
    pub base_price_cents: Option<i32>,
    pub provider_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListToursQuery {
    #[serde(default)]
    pub only_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateDepartureRequest {
    pub departure_date: NaiveDate,
    pub seat_capacity: i32,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub seats_available: i32,
    pub cached: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tours", get(list_tours).post(create_tour))
        .route(
            "/v1/tours/{id}",
            get(get_tour).put(update_tour).delete(deactivate_tour),
        )
        .route(
            "/v1/tours/{id}/departures",
            get(list_departures).post(create_departure),
        )
        .route(
            "/v1/tours/{id}/departures/{date}/availability",
            get(departure_availability),
        )
}

// ============================================================================
// Tour Handlers
// ============================================================================

/// GET /v1/tours
/// Providers only see their own tours; everyone else sees the catalog.
async fn list_tours(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListToursQuery>,
) -> Result<Json<Vec<Tour>>, AppError> {
    let provider_filter = match claims.role()? {
        Role::Provider => Some(claims.user_id()?),
        _ => None,
    };

    let tours = state
        .tours
        .list_tours(provider_filter, query.only_active)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(tours))
}

/// POST /v1/tours
async fn create_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTourRequest>,
) -> Result<Json<Tour>, AppError> {
    claims.require_manager()?;

    if req.code.trim().is_empty() || req.name.trim().is_empty() {
        return Err(AppError::ValidationError("code and name are required".to_string()));
    }
    if req.base_price_cents < 0 {
        return Err(AppError::ValidationError("base_price_cents must not be negative".to_string()));
    }

    let mut tour = Tour::new(req.code, req.name, req.destination, req.base_price_cents);
    tour.description = req.description;
    tour.provider_id = req.provider_id;
    if let Some(metadata) = req.metadata {
        tour.metadata = metadata;
    }

    state.tours.create_tour(&tour).await.map_err(AppError::internal)?;
    state.publish_change(ChangeEntity::Tour, tour.id, ChangeAction::Created);

    Ok(Json(tour))
}

/// GET /v1/tours/{id}
async fn get_tour(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<Tour>, AppError> {
    let tour = state
        .tours
        .get_tour(tour_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Tour {} not found", tour_id)))?;

    Ok(Json(tour))
}

/// PUT /v1/tours/{id}
async fn update_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(tour_id): Path<Uuid>,
    Json(req): Json<UpdateTourRequest>,
) -> Result<Json<Tour>, AppError> {
    claims.require_manager()?;

    let mut tour = state
        .tours
        .get_tour(tour_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Tour {} not found", tour_id)))?;

    if let Some(name) = req.name {
        tour.name = name;
    }
    if let Some(destination) = req.destination {
        tour.destination = destination;
    }
    if req.description.is_some() {
        tour.description = req.description;
    }
    if let Some(price) = req.base_price_cents {
        if price < 0 {
            return Err(AppError::ValidationError("base_price_cents must not be negative".to_string()));
        }
        tour.base_price_cents = price;
    }
    if req.provider_id.is_some() {
        tour.provider_id = req.provider_id;
    }
    if let Some(is_active) = req.is_active {
        tour.is_active = is_active;
    }
    if let Some(metadata) = req.metadata {
        tour.metadata = metadata;
    }

    state.tours.update_tour(tour_id, &tour).await.map_err(AppError::internal)?;
    state.publish_change(ChangeEntity::Tour, tour_id, ChangeAction::Updated);

    Ok(Json(tour))
}

/// DELETE /v1/tours/{id}
/// Soft delete: the tour drops out of the catalog but keeps its history.
async fn deactivate_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(tour_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    claims.require_manager()?;

    state
        .tours
        .get_tour(tour_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Tour {} not found", tour_id)))?;

    state.tours.deactivate_tour(tour_id).await.map_err(AppError::internal)?;
    state.publish_change(ChangeEntity::Tour, tour_id, ChangeAction::Deleted);

    Ok(axum::http::StatusCode::NO_CONTENT)
}

// ============================================================================
// Departure Handlers
// ============================================================================

/// GET /v1/tours/{id}/departures
async fn list_departures(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<Vec<Departure>>, AppError> {
    let departures = state
        .departures
        .list_departures(tour_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(departures))
}

/// POST /v1/tours/{id}/departures
async fn create_departure(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(tour_id): Path<Uuid>,
    Json(req): Json<CreateDepartureRequest>,
) -> Result<Json<Departure>, AppError> {
    claims.require_manager()?;

    if req.seat_capacity <= 0 {
        return Err(AppError::ValidationError("seat_capacity must be positive".to_string()));
    }

    state
        .tours
        .get_tour(tour_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Tour {} not found", tour_id)))?;

    if state
        .departures
        .get_departure(tour_id, req.departure_date)
        .await
        .map_err(AppError::internal)?
        .is_some()
    {
        return Err(AppError::ConflictError(format!(
            "Departure on {} already exists",
            req.departure_date
        )));
    }

    let departure = Departure::new(tour_id, req.departure_date, req.seat_capacity);
    state
        .departures
        .create_departure(&departure)
        .await
        .map_err(AppError::internal)?;

    // Seed the dashboard counter; the reconcile worker keeps it honest.
    if let Err(e) = state
        .redis
        .set_seat_availability(&tour_id, &req.departure_date, req.seat_capacity)
        .await
    {
        tracing::warn!("Failed to seed availability counter: {}", e);
    }

    state.publish_change(ChangeEntity::Departure, departure.id, ChangeAction::Created);

    Ok(Json(departure))
}

/// GET /v1/tours/{id}/departures/{date}/availability
/// Redis first, database on miss (and re-seed the counter).
async fn departure_availability(
    State(state): State<AppState>,
    Path((tour_id, departure_date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if let Ok(Some(seats)) = state.redis.get_seat_availability(&tour_id, &departure_date).await {
        return Ok(Json(AvailabilityResponse {
            tour_id,
            departure_date,
            seats_available: seats,
            cached: true,
        }));
    }

    let seats = state
        .departures
        .seats_available(tour_id, departure_date)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::NotFoundError(format!("No departure of {} on {}", tour_id, departure_date))
        })?;

    if let Err(e) = state
        .redis
        .set_seat_availability(&tour_id, &departure_date, seats)
        .await
    {
        tracing::warn!("Failed to re-seed availability counter: {}", e);
    }

    Ok(Json(AvailabilityResponse {
        tour_id,
        departure_date,
        seats_available: seats,
        cached: false,
    }))
}
