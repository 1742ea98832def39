use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use voyra_catalog::repository::{DepartureRepository, TourRepository};
use voyra_catalog::tour::{Departure, DepartureStatus, Tour};

pub struct StoreTourRepository {
    pool: PgPool,
}

impl StoreTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    code: String,
    name: String,
    destination: String,
    description: Option<String>,
    base_price_cents: i32,
    provider_id: Option<Uuid>,
    is_active: bool,
    metadata: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            code: row.code,
            name: row.name,
            destination: row.destination,
            description: row.description,
            base_price_cents: row.base_price_cents,
            provider_id: row.provider_id,
            is_active: row.is_active,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DepartureRow {
    id: Uuid,
    tour_id: Uuid,
    departure_date: NaiveDate,
    seat_capacity: i32,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<DepartureRow> for Departure {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: DepartureRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "SCHEDULED" => DepartureStatus::Scheduled,
            "CLOSED" => DepartureStatus::Closed,
            "CANCELLED" => DepartureStatus::Cancelled,
            other => return Err(format!("Unknown departure status: {}", other).into()),
        };
        Ok(Departure {
            id: row.id,
            tour_id: row.tour_id,
            departure_date: row.departure_date,
            seat_capacity: row.seat_capacity,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn departure_status_str(status: &DepartureStatus) -> &'static str {
    match status {
        DepartureStatus::Scheduled => "SCHEDULED",
        DepartureStatus::Closed => "CLOSED",
        DepartureStatus::Cancelled => "CANCELLED",
    }
}

#[async_trait]
impl TourRepository for StoreTourRepository {
    async fn create_tour(
        &self,
        tour: &Tour,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO tours (id, code, name, destination, description, base_price_cents, provider_id, is_active, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(tour.id)
        .bind(&tour.code)
        .bind(&tour.name)
        .bind(&tour.destination)
        .bind(&tour.description)
        .bind(tour.base_price_cents)
        .bind(tour.provider_id)
        .bind(tour.is_active)
        .bind(&tour.metadata)
        .execute(&self.pool)
        .await?;

        Ok(tour.id)
    }

    async fn get_tour(
        &self,
        id: Uuid,
    ) -> Result<Option<Tour>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, TourRow>(
            "SELECT id, code, name, destination, description, base_price_cents, provider_id, is_active, metadata, created_at, updated_at FROM tours WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Tour::from))
    }

    async fn list_tours(
        &self,
        provider_id: Option<Uuid>,
        only_active: bool,
    ) -> Result<Vec<Tour>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, TourRow>(
            r#"
            SELECT id, code, name, destination, description, base_price_cents, provider_id, is_active, metadata, created_at, updated_at
            FROM tours
            WHERE ($1::uuid IS NULL OR provider_id = $1)
              AND (NOT $2 OR is_active)
            ORDER BY name
            "#,
        )
        .bind(provider_id)
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Tour::from).collect())
    }

    async fn update_tour(
        &self,
        id: Uuid,
        tour: &Tour,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE tours
            SET code = $1, name = $2, destination = $3, description = $4,
                base_price_cents = $5, provider_id = $6, is_active = $7,
                metadata = $8, updated_at = NOW()
            WHERE id = $9
            "#,
        )
        .bind(&tour.code)
        .bind(&tour.name)
        .bind(&tour.destination)
        .bind(&tour.description)
        .bind(tour.base_price_cents)
        .bind(tour.provider_id)
        .bind(tour.is_active)
        .bind(&tour.metadata)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn deactivate_tour(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE tours SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DepartureRepository for StoreTourRepository {
    async fn create_departure(
        &self,
        departure: &Departure,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO departures (id, tour_id, departure_date, seat_capacity, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(departure.id)
        .bind(departure.tour_id)
        .bind(departure.departure_date)
        .bind(departure.seat_capacity)
        .bind(departure_status_str(&departure.status))
        .execute(&self.pool)
        .await?;

        Ok(departure.id)
    }

    async fn get_departure(
        &self,
        tour_id: Uuid,
        departure_date: NaiveDate,
    ) -> Result<Option<Departure>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, DepartureRow>(
            "SELECT id, tour_id, departure_date, seat_capacity, status, created_at, updated_at FROM departures WHERE tour_id = $1 AND departure_date = $2",
        )
        .bind(tour_id)
        .bind(departure_date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Departure::try_from).transpose()
    }

    async fn list_departures(
        &self,
        tour_id: Uuid,
    ) -> Result<Vec<Departure>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, DepartureRow>(
            "SELECT id, tour_id, departure_date, seat_capacity, status, created_at, updated_at FROM departures WHERE tour_id = $1 ORDER BY departure_date",
        )
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Departure::try_from).collect()
    }

    async fn list_departures_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Departure>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, DepartureRow>(
            "SELECT id, tour_id, departure_date, seat_capacity, status, created_at, updated_at FROM departures WHERE departure_date BETWEEN $1 AND $2 ORDER BY departure_date",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Departure::try_from).collect()
    }

    async fn update_departure(
        &self,
        id: Uuid,
        departure: &Departure,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE departures
            SET seat_capacity = $1, status = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(departure.seat_capacity)
        .bind(departure_status_str(&departure.status))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn seats_available(
        &self,
        tour_id: Uuid,
        departure_date: NaiveDate,
    ) -> Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>> {
        let available = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT (d.seat_capacity - COALESCE(SUM(o.seats), 0))::int
            FROM departures d
            LEFT JOIN orders o
              ON o.tour_id = d.tour_id
             AND o.departure_date = d.departure_date
             AND o.status <> 'CANCELLED'
            WHERE d.tour_id = $1 AND d.departure_date = $2
            GROUP BY d.seat_capacity
            "#,
        )
        .bind(tour_id)
        .bind(departure_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(available)
    }
}
