use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepartureStatus {
    Scheduled,
    Closed,
    Cancelled,
}

/// A sellable tour in the catalog. Ownership sits with a provider account;
/// managers and admins edit everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub destination: String,
    pub description: Option<String>,
    pub base_price_cents: i32,
    pub provider_id: Option<Uuid>,
    pub is_active: bool,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tour {
    pub fn new(code: String, name: String, destination: String, base_price_cents: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            destination,
            description: None,
            base_price_cents,
            provider_id: None,
            is_active: true,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One dated run of a tour. The (tour_id, departure_date) pair scopes seat
/// counters and passenger group colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Departure {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub seat_capacity: i32,
    pub status: DepartureStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Departure {
    pub fn new(tour_id: Uuid, departure_date: NaiveDate, seat_capacity: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tour_id,
            departure_date,
            seat_capacity,
            status: DepartureStatus::Scheduled,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.status == DepartureStatus::Scheduled
    }
}
