use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{DepartureScope, Passenger};

/// Repository trait for manifest data access
#[async_trait]
pub trait PassengerRepository: Send + Sync {
    async fn list_passengers(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Passenger>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_departure(
        &self,
        scope: DepartureScope,
    ) -> Result<Vec<Passenger>, Box<dyn std::error::Error + Send + Sync>>;

    /// Replace an order's manifest wholesale. Positions follow slice order.
    async fn replace_manifest(
        &self,
        order_id: Uuid,
        passengers: &[Passenger],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn add_passenger(
        &self,
        passenger: &Passenger,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    /// Group colors persisted for the scope by orders other than
    /// `exclude_order`: the "used colors" set the assignment pass seeds its
    /// taken set with.
    async fn reserved_colors(
        &self,
        scope: DepartureScope,
        exclude_order: Uuid,
    ) -> Result<HashSet<String>, Box<dyn std::error::Error + Send + Sync>>;
}
