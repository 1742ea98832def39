use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use voyra_order::repository::RequestRepository;
use voyra_order::requests::{PassengerRequest, RequestStatus};
use voyra_shared::pii::Masked;

pub struct StoreRequestRepository {
    pool: PgPool,
}

impl StoreRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    tour_id: Uuid,
    departure_date: NaiveDate,
    order_id: Option<Uuid>,
    requested_by: Uuid,
    first_name: String,
    last_name: String,
    birth_date: Option<NaiveDate>,
    document_no: Option<String>,
    note: Option<String>,
    status: String,
    resolved_by: Option<Uuid>,
    resolution_note: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<RequestRow> for PassengerRequest {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status = RequestStatus::parse(&row.status)
            .ok_or_else(|| format!("Unknown request status: {}", row.status))?;
        Ok(PassengerRequest {
            id: row.id,
            tour_id: row.tour_id,
            departure_date: row.departure_date,
            order_id: row.order_id,
            requested_by: row.requested_by,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            document_no: row.document_no.map(Masked),
            note: row.note,
            status,
            resolved_by: row.resolved_by,
            resolution_note: row.resolution_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const REQUEST_COLUMNS: &str = "id, tour_id, departure_date, order_id, requested_by, first_name, last_name, birth_date, document_no, note, status, resolved_by, resolution_note, created_at, updated_at";

#[async_trait]
impl RequestRepository for StoreRequestRepository {
    async fn create_request(
        &self,
        request: &PassengerRequest,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO passenger_requests (id, tour_id, departure_date, order_id, requested_by, first_name, last_name, birth_date, document_no, note, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(request.id)
        .bind(request.tour_id)
        .bind(request.departure_date)
        .bind(request.order_id)
        .bind(request.requested_by)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.birth_date)
        .bind(request.document_no.as_ref().map(|d| d.0.clone()))
        .bind(&request.note)
        .bind(request.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(request.id)
    }

    async fn get_request(
        &self,
        id: Uuid,
    ) -> Result<Option<PassengerRequest>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM passenger_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PassengerRequest::try_from).transpose()
    }

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        requested_by: Option<Uuid>,
    ) -> Result<Vec<PassengerRequest>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {}
            FROM passenger_requests
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR requested_by = $2)
            ORDER BY created_at DESC
            "#,
            REQUEST_COLUMNS
        ))
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(requested_by)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PassengerRequest::try_from).collect()
    }

    async fn update_request(
        &self,
        id: Uuid,
        request: &PassengerRequest,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE passenger_requests
            SET order_id = $1, status = $2, resolved_by = $3, resolution_note = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(request.order_id)
        .bind(request.status.as_str())
        .bind(request.resolved_by)
        .bind(&request.resolution_note)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
