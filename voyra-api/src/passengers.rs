use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use voyra_core::identity::Role;
use voyra_core::validation;
use voyra_order::models::Order;
use voyra_passenger::model::{DepartureScope, Passenger};
use voyra_passenger::assign_group_colors;
use voyra_shared::models::events::{ChangeAction, ChangeEntity};
use voyra_shared::pii::Masked;

use crate::orders::{authorize_order_read, fetch_order};
use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

/// One manifest row as the dashboard submits it. Rows keep their ids across
/// edits so previously committed group colors survive a re-save.
#[derive(Debug, Deserialize)]
pub struct PassengerUpsert {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub document_no: Option<String>,
    pub phone: Option<String>,
    pub main_passenger_id: Option<Uuid>,
    #[serde(default)]
    pub is_related_to_next: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/orders/{id}/passengers",
            get(get_manifest).put(replace_manifest),
        )
        .route(
            "/v1/departures/{tour_id}/{date}/manifest",
            get(departure_manifest),
        )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/orders/{id}/passengers
async fn get_manifest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<Passenger>>, AppError> {
    let order = fetch_order(&state, order_id).await?;
    authorize_order_read(&state, &claims, &order).await?;

    let passengers = state
        .passengers
        .list_passengers(order_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(passengers))
}

/// PUT /v1/orders/{id}/passengers
/// Replace the manifest, re-running group-color assignment against the
/// colors already committed elsewhere in the same (tour, date) scope.
async fn replace_manifest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
    Json(rows): Json<Vec<PassengerUpsert>>,
) -> Result<Json<Vec<Passenger>>, AppError> {
    claims.require_manager()?;

    let order = fetch_order(&state, order_id).await?;

    validation::validate_party_size(rows.len(), state.booking.max_passengers_per_order)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    for row in &rows {
        validation::validate_person_name("first_name", &row.first_name)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validation::validate_person_name("last_name", &row.last_name)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        if let Some(birth_date) = row.birth_date {
            validation::validate_birth_date(birth_date)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
        }
    }

    // Colors already stored on this order survive the rebuild; the
    // assignment pass decides whether they still stand.
    let existing = state
        .passengers
        .list_passengers(order_id)
        .await
        .map_err(AppError::internal)?;
    let prior_colors: HashMap<Uuid, Option<String>> =
        existing.iter().map(|p| (p.id, p.group_color.clone())).collect();

    let mut passengers: Vec<Passenger> = rows
        .into_iter()
        .enumerate()
        .map(|(seq, row)| {
            let id = row.id.unwrap_or_else(Uuid::new_v4);
            let mut passenger = Passenger::new(order_id, seq as i32, row.first_name, row.last_name);
            passenger.id = id;
            passenger.birth_date = row.birth_date;
            passenger.document_no = row.document_no.map(Masked);
            passenger.phone = row.phone.map(Masked);
            passenger.main_passenger_id = row.main_passenger_id;
            passenger.is_related_to_next = row.is_related_to_next;
            passenger.group_color = prior_colors.get(&id).cloned().flatten();
            passenger
        })
        .collect();

    recolor(&state, &order, &mut passengers).await?;

    state
        .passengers
        .replace_manifest(order_id, &passengers)
        .await
        .map_err(AppError::internal)?;

    state.publish_change(ChangeEntity::Passenger, order_id, ChangeAction::Updated);

    Ok(Json(passengers))
}

/// GET /v1/departures/{tour_id}/{date}/manifest
/// The full passenger list for a departure, for managers and the tour's
/// provider.
async fn departure_manifest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((tour_id, departure_date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Vec<Passenger>>, AppError> {
    let role = claims.role()?;
    if !role.can_manage_tours() {
        if role != Role::Provider {
            return Err(AppError::AuthorizationError("Manifest access denied".to_string()));
        }
        let tour = state
            .tours
            .get_tour(tour_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::NotFoundError(format!("Tour {} not found", tour_id)))?;
        if tour.provider_id != Some(claims.user_id()?) {
            return Err(AppError::AuthorizationError("Not your tour".to_string()));
        }
    }

    let passengers = state
        .passengers
        .list_for_departure(DepartureScope { tour_id, departure_date })
        .await
        .map_err(AppError::internal)?;

    Ok(Json(passengers))
}

// ============================================================================
// Helpers
// ============================================================================

/// Run group-color assignment for an order's manifest. The scope only exists
/// while the order points at a real departure; otherwise every color nulls
/// out.
pub(crate) async fn recolor(
    state: &AppState,
    order: &Order,
    passengers: &mut [Passenger],
) -> Result<(), AppError> {
    let scope = state
        .departures
        .get_departure(order.tour_id, order.departure_date)
        .await
        .map_err(AppError::internal)?
        .map(|departure| DepartureScope {
            tour_id: departure.tour_id,
            departure_date: departure.departure_date,
        });

    let reserved: HashSet<String> = match scope {
        Some(scope) => state
            .passengers
            .reserved_colors(scope, order.id)
            .await
            .map_err(AppError::internal)?,
        None => HashSet::new(),
    };

    assign_group_colors(passengers, &reserved, &state.palette, scope.as_ref());
    Ok(())
}
