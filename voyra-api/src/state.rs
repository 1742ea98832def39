use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;
use voyra_catalog::repository::{DepartureRepository, TourRepository};
use voyra_core::identity::UserRepository;
use voyra_order::repository::{OrderRepository, RequestRepository};
use voyra_passenger::repository::PassengerRepository;
use voyra_passenger::GroupPalette;
use voyra_shared::models::events::{ChangeAction, ChangeEntity, ChangeEvent};
use voyra_store::app_config::BookingRules;
use voyra_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub redis: Arc<RedisClient>,
    pub tours: Arc<dyn TourRepository>,
    pub departures: Arc<dyn DepartureRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub passengers: Arc<dyn PassengerRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sse_tx: broadcast::Sender<ChangeEvent>,
    pub auth: AuthConfig,
    pub booking: BookingRules,
    pub palette: GroupPalette,
}

impl AppState {
    /// Fan a mutation out to the dashboards. Nobody listening is fine.
    pub fn publish_change(&self, entity: ChangeEntity, entity_id: Uuid, action: ChangeAction) {
        let _ = self.sse_tx.send(ChangeEvent {
            entity,
            entity_id,
            action,
            at: Utc::now().timestamp(),
        });
    }
}
