use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::tour::{Departure, Tour};

/// Repository trait for tour catalog access
#[async_trait]
pub trait TourRepository: Send + Sync {
    async fn create_tour(
        &self,
        tour: &Tour,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_tour(
        &self,
        id: Uuid,
    ) -> Result<Option<Tour>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_tours(
        &self,
        provider_id: Option<Uuid>,
        only_active: bool,
    ) -> Result<Vec<Tour>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_tour(
        &self,
        id: Uuid,
        tour: &Tour,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn deactivate_tour(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for departure access
#[async_trait]
pub trait DepartureRepository: Send + Sync {
    async fn create_departure(
        &self,
        departure: &Departure,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_departure(
        &self,
        tour_id: Uuid,
        departure_date: NaiveDate,
    ) -> Result<Option<Departure>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_departures(
        &self,
        tour_id: Uuid,
    ) -> Result<Vec<Departure>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_departures_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Departure>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_departure(
        &self,
        id: Uuid,
        departure: &Departure,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Capacity minus seats held by non-cancelled orders, straight from the
    /// database. The Redis counter is only a cache of this number.
    async fn seats_available(
        &self,
        tour_id: Uuid,
        departure_date: NaiveDate,
    ) -> Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>>;
}
