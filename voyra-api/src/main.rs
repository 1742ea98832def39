use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voyra_api::{app, state::{AppState, AuthConfig}};
use voyra_passenger::GroupPalette;
use voyra_store::order_repo::StoreOrderRepository;
use voyra_store::passenger_repo::StorePassengerRepository;
use voyra_store::request_repo::StoreRequestRepository;
use voyra_store::tour_repo::StoreTourRepository;
use voyra_store::user_repo::StoreUserRepository;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyra_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = voyra_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Voyra API on port {}", config.server.port);

    // Postgres Connection
    let db = voyra_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis Connection
    let redis_client = voyra_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis_arc = Arc::new(redis_client);

    // SSE Broadcast Channel
    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let tour_repo = Arc::new(StoreTourRepository::new(db.pool.clone()));
    let departure_repo = Arc::new(StoreTourRepository::new(db.pool.clone()));

    let app_state = AppState {
        redis: redis_arc.clone(),
        tours: tour_repo,
        departures: departure_repo.clone(),
        orders: Arc::new(StoreOrderRepository::new(db.pool.clone())),
        passengers: Arc::new(StorePassengerRepository::new(db.pool.clone())),
        requests: Arc::new(StoreRequestRepository::new(db.pool.clone())),
        users: Arc::new(StoreUserRepository::new(db.pool.clone())),
        sse_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        booking: config.booking.clone(),
        palette: GroupPalette::new(config.palette.colors.clone()),
    };

    // Seat counter reconciliation
    tokio::spawn(voyra_api::worker::start_reconcile_worker(
        config.booking.reconcile_interval_seconds,
        config.booking.reconcile_horizon_days,
        departure_repo,
        redis_arc,
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
