use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyra_core::identity::Role;
use voyra_order::manager::{OrderError, OrderLifecycle};
use voyra_order::models::{Order, OrderStatus};
use voyra_order::schedule::{group_schedule, DepartureDay};
use voyra_passenger::model::Passenger;
use voyra_shared::models::events::{ChangeAction, ChangeEntity};

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub seats: i32,
    pub note: Option<String>,
    /// Managers may book on behalf of a customer.
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub customer_id: Uuid,
    pub status: String,
    pub seats: i32,
    pub total_cents: i32,
    pub currency: String,
    pub note: Option<String>,
    pub passengers: Vec<Passenger>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl OrderResponse {
    fn new(order: Order, passengers: Vec<Passenger>) -> Self {
        Self {
            id: order.id,
            tour_id: order.tour_id,
            departure_date: order.departure_date,
            customer_id: order.customer_id,
            status: order.status.as_str().to_string(),
            seats: order.seats,
            total_cents: order.total_cents,
            currency: order.currency,
            note: order.note,
            passengers,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders).post(create_order))
        .route("/v1/orders/schedule", get(order_schedule))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/status", post(update_status))
        .route("/v1/orders/{id}/cancel", post(cancel_order))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/orders
/// Customers see their own orders; managers and admins see everything.
async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let customer_filter = match claims.role()? {
        Role::Admin | Role::Manager => None,
        Role::User => Some(claims.user_id()?),
        Role::Provider => {
            return Err(AppError::AuthorizationError(
                "Providers read departures via the manifest endpoint".to_string(),
            ))
        }
    };

    let orders = state
        .orders
        .list_orders(customer_filter)
        .await
        .map_err(AppError::internal)?;

    let mut responses = Vec::with_capacity(orders.len());
    for order in orders {
        responses.push(OrderResponse::new(order, Vec::new()));
    }

    Ok(Json(responses))
}

/// POST /v1/orders
async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let role = claims.role()?;
    if role == Role::Provider {
        return Err(AppError::AuthorizationError(
            "Providers submit passenger requests instead of orders".to_string(),
        ));
    }
    if req.seats <= 0 {
        return Err(AppError::ValidationError("seats must be positive".to_string()));
    }
    if !sale_window_open(&state.booking) {
        return Err(AppError::ConflictError("Sales window is closed".to_string()));
    }

    let customer_id = match (role, req.customer_id) {
        (Role::Admin | Role::Manager, Some(customer)) => customer,
        _ => claims.user_id()?,
    };

    // 1. Tour and departure must be sellable
    let tour = state
        .tours
        .get_tour(req.tour_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Tour {} not found", req.tour_id)))?;

    if !tour.is_active {
        return Err(AppError::ConflictError("Tour is no longer on sale".to_string()));
    }

    let departure = state
        .departures
        .get_departure(req.tour_id, req.departure_date)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::NotFoundError(format!(
                "No departure of {} on {}",
                req.tour_id, req.departure_date
            ))
        })?;

    if !departure.is_bookable() {
        return Err(AppError::ConflictError("Departure is closed".to_string()));
    }

    // 2. Seat check against the database, not the cache
    let available = state
        .departures
        .seats_available(req.tour_id, req.departure_date)
        .await
        .map_err(AppError::internal)?
        .unwrap_or(0);

    if available < req.seats {
        return Err(AppError::ConflictError(format!(
            "Not enough seats: requested {}, available {}",
            req.seats, available
        )));
    }

    // 3. Create the order
    let mut order = Order::new(req.tour_id, req.departure_date, customer_id, req.seats);
    order.total_cents = tour.base_price_cents.saturating_mul(req.seats);
    order.note = req.note;

    state.orders.create_order(&order).await.map_err(AppError::internal)?;

    // 4. Keep the cached counter roughly in step; worker reconciles drift
    if let Err(e) = state
        .redis
        .decr_seat_availability(&req.tour_id, &req.departure_date, req.seats)
        .await
    {
        tracing::warn!("Failed to decrement availability counter: {}", e);
    }

    state.publish_change(ChangeEntity::Order, order.id, ChangeAction::Created);
    tracing::info!(
        "Order {} created: {} seats on {} {}",
        order.id,
        order.seats,
        order.tour_id,
        order.departure_date
    );

    Ok(Json(OrderResponse::new(order, Vec::new())))
}

/// GET /v1/orders/{id}
/// Includes the manifest.
async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = fetch_order(&state, order_id).await?;
    authorize_order_read(&state, &claims, &order).await?;

    let passengers = state
        .passengers
        .list_passengers(order_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(OrderResponse::new(order, passengers)))
}

/// POST /v1/orders/{id}/status
/// Walk the order through its lifecycle. Managers only.
async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<OrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    claims.require_manager()?;

    let target = OrderStatus::parse(&req.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown status: {}", req.status)))?;

    let mut order = fetch_order(&state, order_id).await?;
    let previous = order.status;

    OrderLifecycle::transition_to(&mut order, target).map_err(map_order_error)?;

    state
        .orders
        .update_order_status(order_id, order.status)
        .await
        .map_err(AppError::internal)?;

    if target == OrderStatus::Cancelled {
        release_cached_seats(&state, &order).await;
    }

    state.publish_change(ChangeEntity::Order, order_id, ChangeAction::Updated);
    tracing::info!(
        "Order {} moved {} -> {}",
        order_id,
        previous.as_str(),
        order.status.as_str()
    );

    Ok(Json(OrderResponse::new(order, Vec::new())))
}

/// POST /v1/orders/{id}/cancel
/// Customers cancel their own orders; managers cancel any.
async fn cancel_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    let mut order = fetch_order(&state, order_id).await?;

    let role = claims.role()?;
    if !role.can_manage_tours() && order.customer_id != claims.user_id()? {
        return Err(AppError::AuthorizationError("Not your order".to_string()));
    }

    if order.status == OrderStatus::Cancelled {
        return Ok(axum::http::StatusCode::NO_CONTENT);
    }

    OrderLifecycle::cancel(&mut order).map_err(map_order_error)?;

    state
        .orders
        .update_order_status(order_id, order.status)
        .await
        .map_err(AppError::internal)?;

    release_cached_seats(&state, &order).await;
    state.publish_change(ChangeEntity::Order, order_id, ChangeAction::Updated);

    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// GET /v1/orders/schedule?from=&to=
/// The departure-day / tour grouping behind the orders dashboard.
async fn order_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<DepartureDay>>, AppError> {
    claims.require_manager()?;

    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let to = query.to.unwrap_or_else(|| from + Days::new(60));
    if to < from {
        return Err(AppError::ValidationError("to precedes from".to_string()));
    }

    let orders = state
        .orders
        .list_orders_between(from, to)
        .await
        .map_err(AppError::internal)?;
    let tours = state
        .tours
        .list_tours(None, false)
        .await
        .map_err(AppError::internal)?;
    let departures = state
        .departures
        .list_departures_between(from, to)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(group_schedule(orders, &tours, &departures)))
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) async fn fetch_order(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    state
        .orders
        .get_order(order_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))
}

/// Customers read their own orders, providers the orders on their tours,
/// managers and admins everything.
pub(crate) async fn authorize_order_read(
    state: &AppState,
    claims: &Claims,
    order: &Order,
) -> Result<(), AppError> {
    let role = claims.role()?;
    if role.can_manage_tours() {
        return Ok(());
    }
    let user_id = claims.user_id()?;
    if role == Role::User {
        if order.customer_id == user_id {
            return Ok(());
        }
        return Err(AppError::AuthorizationError("Not your order".to_string()));
    }

    let tour = state
        .tours
        .get_tour(order.tour_id)
        .await
        .map_err(AppError::internal)?;
    if tour.and_then(|t| t.provider_id) == Some(user_id) {
        return Ok(());
    }
    Err(AppError::AuthorizationError("Not your tour".to_string()))
}

async fn release_cached_seats(state: &AppState, order: &Order) {
    if let Err(e) = state
        .redis
        .incr_seat_availability(&order.tour_id, &order.departure_date, order.seats)
        .await
    {
        tracing::warn!("Failed to release availability counter: {}", e);
    }
}

/// Season bounds from config; an unset or unparseable bound does not block
/// sales.
fn sale_window_open(rules: &voyra_store::app_config::BookingRules) -> bool {
    let now = Utc::now();
    let parse = |s: &str| {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    };

    if let Some(start) = rules.sale_start.as_deref().and_then(parse) {
        if now < start {
            return false;
        }
    }
    if let Some(end) = rules.sale_end.as_deref().and_then(parse) {
        if now > end {
            return false;
        }
    }
    true
}

fn map_order_error(err: OrderError) -> AppError {
    match err {
        OrderError::NotFound(msg) => AppError::NotFoundError(msg),
        other @ OrderError::InvalidTransition { .. } => AppError::ConflictError(other.to_string()),
    }
}
