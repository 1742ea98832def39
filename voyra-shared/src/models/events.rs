use uuid::Uuid;

/// Entities the change feed reports on.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEntity {
    Tour,
    Departure,
    Order,
    Passenger,
    PassengerRequest,
    User,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Published on the in-process broadcast channel after every successful
/// mutation; dashboards consume it over SSE and refetch.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ChangeEvent {
    pub entity: ChangeEntity,
    pub entity_id: Uuid,
    pub action: ChangeAction,
    pub at: i64,
}
