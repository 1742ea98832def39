use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Paid,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "PAID" => Some(OrderStatus::Paid),
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Cancelled orders keep their manifest rows but stop counting against
    /// seat capacity.
    pub fn holds_seats(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

/// A booking of seats on one departure of one tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub seats: i32,
    pub total_cents: i32,
    pub currency: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(tour_id: Uuid, departure_date: NaiveDate, customer_id: Uuid, seats: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tour_id,
            departure_date,
            customer_id,
            status: OrderStatus::Pending,
            seats,
            total_cents: 0,
            currency: "EUR".to_string(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}
