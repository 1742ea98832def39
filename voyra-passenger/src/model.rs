use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyra_shared::pii::Masked;

/// The (tour, departure date) pair group colors are meaningful within.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DepartureScope {
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
}

/// One row of an order's manifest, in manifest order (`seq`).
///
/// `main_passenger_id = None` marks a main traveler; `Some(id)` marks a
/// dependent of that main. `is_related_to_next` is only read on mains and
/// links this main's group to the next main in sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub order_id: Uuid,
    pub seq: i32,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub document_no: Option<Masked<String>>,
    pub phone: Option<Masked<String>>,
    pub main_passenger_id: Option<Uuid>,
    pub is_related_to_next: bool,
    pub group_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Passenger {
    pub fn new(order_id: Uuid, seq: i32, first_name: String, last_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            seq,
            first_name,
            last_name,
            birth_date: None,
            document_no: None,
            phone: None,
            main_passenger_id: None,
            is_related_to_next: false,
            group_color: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn dependent_of(mut self, main_id: Uuid) -> Self {
        self.main_passenger_id = Some(main_id);
        self
    }

    pub fn linked_to_next(mut self) -> Self {
        self.is_related_to_next = true;
        self
    }

    pub fn is_main(&self) -> bool {
        self.main_passenger_id.is_none()
    }
}
