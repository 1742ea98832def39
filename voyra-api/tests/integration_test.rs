use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use voyra_api::state::{AppState, AuthConfig};
use voyra_api::{app, auth::hash_password};
use voyra_catalog::repository::{DepartureRepository, TourRepository};
use voyra_catalog::tour::{Departure, Tour};
use voyra_core::identity::{Role, User, UserRepository};
use voyra_order::models::{Order, OrderStatus};
use voyra_order::repository::{OrderRepository, RequestRepository};
use voyra_order::requests::{PassengerRequest, RequestStatus};
use voyra_passenger::model::{DepartureScope, Passenger};
use voyra_passenger::repository::PassengerRepository;
use voyra_passenger::GroupPalette;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// In-memory store backing the API for tests
// ============================================================================

#[derive(Default)]
struct MemStore {
    tours: Mutex<Vec<Tour>>,
    departures: Mutex<Vec<Departure>>,
    orders: Mutex<Vec<Order>>,
    passengers: Mutex<Vec<Passenger>>,
    requests: Mutex<Vec<PassengerRequest>>,
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl TourRepository for MemStore {
    async fn create_tour(&self, tour: &Tour) -> Result<Uuid, BoxError> {
        self.tours.lock().unwrap().push(tour.clone());
        Ok(tour.id)
    }

    async fn get_tour(&self, id: Uuid) -> Result<Option<Tour>, BoxError> {
        Ok(self.tours.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn list_tours(
        &self,
        provider_id: Option<Uuid>,
        only_active: bool,
    ) -> Result<Vec<Tour>, BoxError> {
        Ok(self
            .tours
            .lock()
            .unwrap()
            .iter()
            .filter(|t| provider_id.is_none() || t.provider_id == provider_id)
            .filter(|t| !only_active || t.is_active)
            .cloned()
            .collect())
    }

    async fn update_tour(&self, id: Uuid, tour: &Tour) -> Result<(), BoxError> {
        let mut tours = self.tours.lock().unwrap();
        if let Some(slot) = tours.iter_mut().find(|t| t.id == id) {
            *slot = tour.clone();
        }
        Ok(())
    }

    async fn deactivate_tour(&self, id: Uuid) -> Result<(), BoxError> {
        let mut tours = self.tours.lock().unwrap();
        if let Some(tour) = tours.iter_mut().find(|t| t.id == id) {
            tour.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl DepartureRepository for MemStore {
    async fn create_departure(&self, departure: &Departure) -> Result<Uuid, BoxError> {
        self.departures.lock().unwrap().push(departure.clone());
        Ok(departure.id)
    }

    async fn get_departure(
        &self,
        tour_id: Uuid,
        departure_date: NaiveDate,
    ) -> Result<Option<Departure>, BoxError> {
        Ok(self
            .departures
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.tour_id == tour_id && d.departure_date == departure_date)
            .cloned())
    }

    async fn list_departures(&self, tour_id: Uuid) -> Result<Vec<Departure>, BoxError> {
        Ok(self
            .departures
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.tour_id == tour_id)
            .cloned()
            .collect())
    }

    async fn list_departures_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Departure>, BoxError> {
        Ok(self
            .departures
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.departure_date >= from && d.departure_date <= to)
            .cloned()
            .collect())
    }

    async fn update_departure(&self, id: Uuid, departure: &Departure) -> Result<(), BoxError> {
        let mut departures = self.departures.lock().unwrap();
        if let Some(slot) = departures.iter_mut().find(|d| d.id == id) {
            *slot = departure.clone();
        }
        Ok(())
    }

    async fn seats_available(
        &self,
        tour_id: Uuid,
        departure_date: NaiveDate,
    ) -> Result<Option<i32>, BoxError> {
        let capacity = match self.get_departure(tour_id, departure_date).await? {
            Some(departure) => departure.seat_capacity,
            None => return Ok(None),
        };
        let booked: i32 = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| {
                o.tour_id == tour_id
                    && o.departure_date == departure_date
                    && o.status.holds_seats()
            })
            .map(|o| o.seats)
            .sum();
        Ok(Some(capacity - booked))
    }
}

#[async_trait]
impl OrderRepository for MemStore {
    async fn create_order(&self, order: &Order) -> Result<Uuid, BoxError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(order.id)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, BoxError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), BoxError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == id) {
            order.update_status(status);
        }
        Ok(())
    }

    async fn list_orders(&self, customer_id: Option<Uuid>) -> Result<Vec<Order>, BoxError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| customer_id.is_none() || Some(o.customer_id) == customer_id)
            .cloned()
            .collect())
    }

    async fn list_orders_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Order>, BoxError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.departure_date >= from && o.departure_date <= to)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PassengerRepository for MemStore {
    async fn list_passengers(&self, order_id: Uuid) -> Result<Vec<Passenger>, BoxError> {
        let mut passengers: Vec<Passenger> = self
            .passengers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        passengers.sort_by_key(|p| p.seq);
        Ok(passengers)
    }

    async fn list_for_departure(&self, scope: DepartureScope) -> Result<Vec<Passenger>, BoxError> {
        let order_ids: Vec<Uuid> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| {
                o.tour_id == scope.tour_id
                    && o.departure_date == scope.departure_date
                    && o.status.holds_seats()
            })
            .map(|o| o.id)
            .collect();
        Ok(self
            .passengers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| order_ids.contains(&p.order_id))
            .cloned()
            .collect())
    }

    async fn replace_manifest(
        &self,
        order_id: Uuid,
        passengers: &[Passenger],
    ) -> Result<(), BoxError> {
        {
            let mut stored = self.passengers.lock().unwrap();
            stored.retain(|p| p.order_id != order_id);
            for (seq, passenger) in passengers.iter().enumerate() {
                let mut row = passenger.clone();
                row.seq = seq as i32;
                stored.push(row);
            }
        }
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
            order.seats = passengers.len() as i32;
        }
        Ok(())
    }

    async fn add_passenger(&self, passenger: &Passenger) -> Result<Uuid, BoxError> {
        {
            let mut stored = self.passengers.lock().unwrap();
            let next_seq = stored
                .iter()
                .filter(|p| p.order_id == passenger.order_id)
                .map(|p| p.seq)
                .max()
                .map(|seq| seq + 1)
                .unwrap_or(0);
            let mut row = passenger.clone();
            row.seq = next_seq;
            stored.push(row);
        }
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == passenger.order_id) {
            order.seats += 1;
        }
        Ok(passenger.id)
    }

    async fn reserved_colors(
        &self,
        scope: DepartureScope,
        exclude_order: Uuid,
    ) -> Result<HashSet<String>, BoxError> {
        let order_ids: Vec<Uuid> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| {
                o.tour_id == scope.tour_id
                    && o.departure_date == scope.departure_date
                    && o.id != exclude_order
                    && o.status.holds_seats()
            })
            .map(|o| o.id)
            .collect();
        Ok(self
            .passengers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| order_ids.contains(&p.order_id))
            .filter_map(|p| p.group_color.clone())
            .collect())
    }
}

#[async_trait]
impl RequestRepository for MemStore {
    async fn create_request(&self, request: &PassengerRequest) -> Result<Uuid, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(request.id)
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<PassengerRequest>, BoxError> {
        Ok(self.requests.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        requested_by: Option<Uuid>,
    ) -> Result<Vec<PassengerRequest>, BoxError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| status.is_none() || Some(r.status) == status)
            .filter(|r| requested_by.is_none() || Some(r.requested_by) == requested_by)
            .cloned()
            .collect())
    }

    async fn update_request(&self, id: Uuid, request: &PassengerRequest) -> Result<(), BoxError> {
        let mut requests = self.requests.lock().unwrap();
        if let Some(slot) = requests.iter_mut().find(|r| r.id == id) {
            *slot = request.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemStore {
    async fn create_user(&self, user: &User) -> Result<Uuid, BoxError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(user.id)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, BoxError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, BoxError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, BoxError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_user(&self, id: Uuid, user: &User) -> Result<(), BoxError> {
        let mut users = self.users.lock().unwrap();
        if let Some(slot) = users.iter_mut().find(|u| u.id == id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn deactivate_user(&self, id: Uuid) -> Result<(), BoxError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.is_active = false;
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

const SECRET: &str = "integration-test-secret";

struct Harness {
    store: Arc<MemStore>,
    state: AppState,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(MemStore::default());
        // The client only parses the URL here; the rate limiter fails open
        // when nothing answers on the port.
        let redis = voyra_store::RedisClient::new("redis://127.0.0.1:1")
            .await
            .expect("redis url parse");
        let (sse_tx, _) = tokio::sync::broadcast::channel(16);

        let state = AppState {
            redis: Arc::new(redis),
            tours: store.clone(),
            departures: store.clone(),
            orders: store.clone(),
            passengers: store.clone(),
            requests: store.clone(),
            users: store.clone(),
            sse_tx,
            auth: AuthConfig {
                secret: SECRET.to_string(),
                expiration: 3600,
            },
            booking: voyra_store::app_config::BookingRules {
                max_passengers_per_order: 40,
                reconcile_interval_seconds: 60,
                reconcile_horizon_days: 120,
                sale_start: None,
                sale_end: None,
            },
            palette: GroupPalette::new(vec!["red".into(), "blue".into(), "green".into()]),
        };

        Self { store, state }
    }

    fn app(&self) -> axum::Router {
        app(self.state.clone()).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9999))))
    }

    fn seed_user(&self, role: Role, password: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}-{}@voyra.test", role.as_str().to_lowercase(), Uuid::new_v4()),
            password_hash: hash_password(password).unwrap(),
            full_name: format!("{} Account", role.as_str()),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.users.lock().unwrap().push(user.clone());
        user
    }

    fn token_for(&self, user: &User) -> String {
        let claims = voyra_api::middleware::auth::Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn seed_departure(&self, seat_capacity: i32) -> (Tour, Departure) {
        let tour = Tour::new("ALP-01".into(), "Alpes Trek".into(), "Chamonix".into(), 90_000);
        let departure = Departure::new(tour.id, NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(), seat_capacity);
        self.store.tours.lock().unwrap().push(tour.clone());
        self.store.departures.lock().unwrap().push(departure.clone());
        (tour, departure)
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Flows
// ============================================================================

#[tokio::test]
async fn test_login_and_protected_access() {
    let harness = Harness::new().await;
    let manager = harness.seed_user(Role::Manager, "s3cret-pass");

    // Wrong password is rejected
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            "/v1/auth/login",
            None,
            serde_json::json!({"email": manager.email, "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials yield a token
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            "/v1/auth/login",
            None,
            serde_json::json!({"email": manager.email, "password": "s3cret-pass"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["role"], "MANAGER");

    // The token opens protected routes; no token does not
    let response = harness.app().oneshot(get_request("/v1/tours", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = harness.app().oneshot(get_request("/v1/tours", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cannot_manage_catalog() {
    let harness = Harness::new().await;
    let customer = harness.seed_user(Role::User, "customer-pass");
    let token = harness.token_for(&customer);

    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            "/v1/tours",
            Some(&token),
            serde_json::json!({
                "code": "X1",
                "name": "Backdoor Tour",
                "destination": "Nowhere",
                "base_price_cents": 1
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_order_flow_reserves_seats() {
    let harness = Harness::new().await;
    let manager = harness.seed_user(Role::Manager, "pass-123-ok");
    let customer = harness.seed_user(Role::User, "pass-456-ok");
    let (tour, departure) = harness.seed_departure(4);
    let token = harness.token_for(&customer);
    let manager_token = harness.token_for(&manager);

    // Customer books 3 of 4 seats
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            "/v1/orders",
            Some(&token),
            serde_json::json!({
                "tour_id": tour.id,
                "departure_date": departure.departure_date,
                "seats": 3
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["total_cents"], 270_000);
    let order_id = body["id"].as_str().unwrap().to_string();

    // A second order for 2 seats exceeds capacity
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            "/v1/orders",
            Some(&token),
            serde_json::json!({
                "tour_id": tour.id,
                "departure_date": departure.departure_date,
                "seats": 2
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Manager walks the order through its lifecycle
    for status in ["CONFIRMED", "PAID"] {
        let response = harness
            .app()
            .oneshot(json_request(
                "POST",
                &format!("/v1/orders/{}/status", order_id),
                Some(&manager_token),
                serde_json::json!({"status": status}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Skipping straight to COMPLETED from PAID works; going back does not
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            &format!("/v1/orders/{}/status", order_id),
            Some(&manager_token),
            serde_json::json!({"status": "CONFIRMED"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_manifest_coloring_over_http() {
    let harness = Harness::new().await;
    let manager = harness.seed_user(Role::Manager, "pass-789-ok");
    let (tour, departure) = harness.seed_departure(20);
    let token = harness.token_for(&manager);

    let order = Order::new(tour.id, departure.departure_date, manager.id, 0);
    harness.store.orders.lock().unwrap().push(order.clone());

    // A(linked) B C: the first two share a color, C starts the next chain
    let response = harness
        .app()
        .oneshot(json_request(
            "PUT",
            &format!("/v1/orders/{}/passengers", order.id),
            Some(&token),
            serde_json::json!([
                {"first_name": "Ana", "last_name": "Sousa", "is_related_to_next": true},
                {"first_name": "Bruno", "last_name": "Sousa"},
                {"first_name": "Clara", "last_name": "Mota"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body[0]["group_color"], "red");
    assert_eq!(body[1]["group_color"], "red");
    assert_eq!(body[2]["group_color"], "blue");

    // Saving the same manifest again must not reshuffle colors
    let rows: Vec<serde_json::Value> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p["id"],
                "first_name": p["first_name"],
                "last_name": p["last_name"],
                "main_passenger_id": p["main_passenger_id"],
                "is_related_to_next": p["is_related_to_next"],
            })
        })
        .collect();

    let response = harness
        .app()
        .oneshot(json_request(
            "PUT",
            &format!("/v1/orders/{}/passengers", order.id),
            Some(&token),
            serde_json::Value::Array(rows),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["group_color"], "red");
    assert_eq!(body[1]["group_color"], "red");
    assert_eq!(body[2]["group_color"], "blue");
}

#[tokio::test]
async fn test_colors_respect_other_orders_in_scope() {
    let harness = Harness::new().await;
    let manager = harness.seed_user(Role::Manager, "pass-abc-ok");
    let (tour, departure) = harness.seed_departure(20);
    let token = harness.token_for(&manager);

    // Another order on the same departure already committed "red"
    let other_order = Order::new(tour.id, departure.departure_date, manager.id, 1);
    harness.store.orders.lock().unwrap().push(other_order.clone());
    let mut committed = Passenger::new(other_order.id, 0, "Dora".into(), "Lima".into());
    committed.group_color = Some("red".to_string());
    harness.store.passengers.lock().unwrap().push(committed);

    let order = Order::new(tour.id, departure.departure_date, manager.id, 0);
    harness.store.orders.lock().unwrap().push(order.clone());

    let response = harness
        .app()
        .oneshot(json_request(
            "PUT",
            &format!("/v1/orders/{}/passengers", order.id),
            Some(&token),
            serde_json::json!([
                {"first_name": "Eva", "last_name": "Reis"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // red is reserved by the other order's chain
    assert_eq!(body[0]["group_color"], "blue");
}

#[tokio::test]
async fn test_request_approval_appends_to_manifest() {
    let harness = Harness::new().await;
    let manager = harness.seed_user(Role::Manager, "pass-def-ok");
    let provider = harness.seed_user(Role::Provider, "pass-ghi-ok");
    let (tour, departure) = harness.seed_departure(20);

    let order = Order::new(tour.id, departure.departure_date, manager.id, 0);
    harness.store.orders.lock().unwrap().push(order.clone());

    // Provider files the request
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            "/v1/requests",
            Some(&harness.token_for(&provider)),
            serde_json::json!({
                "tour_id": tour.id,
                "departure_date": departure.departure_date,
                "first_name": "Filip",
                "last_name": "Horak"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let request_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Manager approves it into the order
    let manager_token = harness.token_for(&manager);
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            &format!("/v1/requests/{}/approve", request_id),
            Some(&manager_token),
            serde_json::json!({"order_id": order.id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "APPROVED");

    // The passenger landed on the manifest with a color
    let response = harness
        .app()
        .oneshot(get_request(
            &format!("/v1/orders/{}/passengers", order.id),
            Some(&manager_token),
        ))
        .await
        .unwrap();
    let manifest = body_json(response).await;
    assert_eq!(manifest.as_array().unwrap().len(), 1);
    assert_eq!(manifest[0]["first_name"], "Filip");
    assert_eq!(manifest[0]["group_color"], "red");

    // A second approval of the same request is rejected
    let response = harness
        .app()
        .oneshot(json_request(
            "POST",
            &format!("/v1/requests/{}/approve", request_id),
            Some(&manager_token),
            serde_json::json!({"order_id": order.id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_schedule_groups_by_day_and_tour() {
    let harness = Harness::new().await;
    let manager = harness.seed_user(Role::Manager, "pass-jkl-ok");
    let (tour, departure) = harness.seed_departure(30);
    let token = harness.token_for(&manager);

    let mut paid = Order::new(tour.id, departure.departure_date, manager.id, 5);
    paid.status = OrderStatus::Paid;
    let mut cancelled = Order::new(tour.id, departure.departure_date, manager.id, 2);
    cancelled.status = OrderStatus::Cancelled;
    harness.store.orders.lock().unwrap().push(paid);
    harness.store.orders.lock().unwrap().push(cancelled);

    let response = harness
        .app()
        .oneshot(get_request(
            "/v1/orders/schedule?from=2026-09-01&to=2026-09-30",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body.as_array().unwrap().len(), 1);
    let day = &body[0];
    assert_eq!(day["departure_date"], "2026-09-12");
    assert_eq!(day["seats_booked"], 5);
    let bucket = &day["tours"][0];
    assert_eq!(bucket["tour_name"], "Alpes Trek");
    assert_eq!(bucket["seat_capacity"], 30);
    assert_eq!(bucket["seats_available"], 25);
    assert_eq!(bucket["orders"].as_array().unwrap().len(), 2);
}
