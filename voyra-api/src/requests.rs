use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use voyra_core::validation;
use voyra_order::requests::{PassengerRequest, RequestError, RequestStatus};
use voyra_passenger::model::Passenger;
use voyra_shared::models::events::{ChangeAction, ChangeEntity};
use voyra_shared::pii::Masked;

use crate::orders::fetch_order;
use crate::passengers::recolor;
use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub document_no: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/requests", get(list_requests).post(create_request))
        .route("/v1/requests/{id}/approve", post(approve_request))
        .route("/v1/requests/{id}/reject", post(reject_request))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/requests
/// Providers and customers ask for a manifest change; managers resolve it.
async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<PassengerRequest>, AppError> {
    validation::validate_person_name("first_name", &body.first_name)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    validation::validate_person_name("last_name", &body.last_name)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    if let Some(birth_date) = body.birth_date {
        validation::validate_birth_date(birth_date)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
    }

    state
        .departures
        .get_departure(body.tour_id, body.departure_date)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::NotFoundError(format!(
                "No departure of {} on {}",
                body.tour_id, body.departure_date
            ))
        })?;

    let mut request = PassengerRequest::new(
        body.tour_id,
        body.departure_date,
        claims.user_id()?,
        body.first_name,
        body.last_name,
    );
    request.birth_date = body.birth_date;
    request.document_no = body.document_no.map(Masked);
    request.note = body.note;

    state
        .requests
        .create_request(&request)
        .await
        .map_err(AppError::internal)?;

    state.publish_change(ChangeEntity::PassengerRequest, request.id, ChangeAction::Created);

    Ok(Json(request))
}

/// GET /v1/requests?status=
/// Managers see the whole queue; everyone else their own submissions.
async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Vec<PassengerRequest>>, AppError> {
    let status = match &query.status {
        Some(s) => Some(
            RequestStatus::parse(s)
                .ok_or_else(|| AppError::ValidationError(format!("Unknown status: {}", s)))?,
        ),
        None => None,
    };

    let requester_filter = if claims.role()?.can_resolve_requests() {
        None
    } else {
        Some(claims.user_id()?)
    };

    let requests = state
        .requests
        .list_requests(status, requester_filter)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(requests))
}

/// POST /v1/requests/{id}/approve
/// Append the requested passenger to the target order and recolor the
/// manifest.
async fn approve_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ApproveBody>,
) -> Result<Json<PassengerRequest>, AppError> {
    claims.require_manager()?;

    let mut request = fetch_request(&state, request_id).await?;

    let order = fetch_order(&state, body.order_id).await?;
    if order.tour_id != request.tour_id || order.departure_date != request.departure_date {
        return Err(AppError::ValidationError(
            "Order does not match the request's tour and departure".to_string(),
        ));
    }

    request
        .approve(claims.user_id()?, order.id)
        .map_err(map_request_error)?;

    // Append as a new main passenger, then let the color pass settle it.
    let mut passenger = Passenger::new(
        order.id,
        0, // repo assigns the next free position
        request.first_name.clone(),
        request.last_name.clone(),
    );
    passenger.birth_date = request.birth_date;
    passenger.document_no = request.document_no.clone();

    state
        .passengers
        .add_passenger(&passenger)
        .await
        .map_err(AppError::internal)?;

    let mut manifest = state
        .passengers
        .list_passengers(order.id)
        .await
        .map_err(AppError::internal)?;
    recolor(&state, &order, &mut manifest).await?;
    state
        .passengers
        .replace_manifest(order.id, &manifest)
        .await
        .map_err(AppError::internal)?;

    state
        .requests
        .update_request(request_id, &request)
        .await
        .map_err(AppError::internal)?;

    state.publish_change(ChangeEntity::PassengerRequest, request_id, ChangeAction::Updated);
    state.publish_change(ChangeEntity::Passenger, order.id, ChangeAction::Updated);
    tracing::info!("Request {} approved into order {}", request_id, order.id);

    Ok(Json(request))
}

/// POST /v1/requests/{id}/reject
async fn reject_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> Result<Json<PassengerRequest>, AppError> {
    claims.require_manager()?;

    let mut request = fetch_request(&state, request_id).await?;
    request
        .reject(claims.user_id()?, body.reason)
        .map_err(map_request_error)?;

    state
        .requests
        .update_request(request_id, &request)
        .await
        .map_err(AppError::internal)?;

    state.publish_change(ChangeEntity::PassengerRequest, request_id, ChangeAction::Updated);

    Ok(Json(request))
}

// ============================================================================
// Helpers
// ============================================================================

async fn fetch_request(state: &AppState, id: Uuid) -> Result<PassengerRequest, AppError> {
    state
        .requests
        .get_request(id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Request {} not found", id)))
}

fn map_request_error(err: RequestError) -> AppError {
    match err {
        RequestError::NotFound(msg) => AppError::NotFoundError(msg),
        RequestError::MissingOrder => {
            AppError::ValidationError("Approval requires a target order".to_string())
        }
        other @ RequestError::InvalidTransition { .. } => AppError::ConflictError(other.to_string()),
    }
}
