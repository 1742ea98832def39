use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyra_shared::pii::Masked;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<RequestStatus> {
        match s {
            "PENDING" => Some(RequestStatus::Pending),
            "APPROVED" => Some(RequestStatus::Approved),
            "REJECTED" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// A manifest change submitted by a provider or customer account. Managers
/// resolve it; the manifest itself is never edited from those roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerRequest {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub order_id: Option<Uuid>,
    pub requested_by: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub document_no: Option<Masked<String>>,
    pub note: Option<String>,
    pub status: RequestStatus,
    pub resolved_by: Option<Uuid>,
    pub resolution_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PassengerRequest {
    pub fn new(
        tour_id: Uuid,
        departure_date: NaiveDate,
        requested_by: Uuid,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tour_id,
            departure_date,
            order_id: None,
            requested_by,
            first_name,
            last_name,
            birth_date: None,
            document_no: None,
            note: None,
            status: RequestStatus::Pending,
            resolved_by: None,
            resolution_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approve into a target order's manifest.
    pub fn approve(&mut self, resolver: Uuid, order_id: Uuid) -> Result<(), RequestError> {
        self.ensure_pending("APPROVED")?;
        self.status = RequestStatus::Approved;
        self.order_id = Some(order_id);
        self.resolved_by = Some(resolver);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn reject(&mut self, resolver: Uuid, reason: Option<String>) -> Result<(), RequestError> {
        self.ensure_pending("REJECTED")?;
        self.status = RequestStatus::Rejected;
        self.resolved_by = Some(resolver);
        self.resolution_note = reason;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_pending(&self, target: &str) -> Result<(), RequestError> {
        if self.status != RequestStatus::Pending {
            return Err(RequestError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Passenger request not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Approval requires a target order")]
    MissingOrder,
}
