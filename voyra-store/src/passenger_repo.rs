use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use voyra_passenger::model::{DepartureScope, Passenger};
use voyra_passenger::repository::PassengerRepository;
use voyra_shared::pii::Masked;

pub struct StorePassengerRepository {
    pool: PgPool,
}

impl StorePassengerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    order_id: Uuid,
    seq: i32,
    first_name: String,
    last_name: String,
    birth_date: Option<NaiveDate>,
    document_no: Option<String>,
    phone: Option<String>,
    main_passenger_id: Option<Uuid>,
    is_related_to_next: bool,
    group_color: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PassengerRow> for Passenger {
    fn from(row: PassengerRow) -> Self {
        Passenger {
            id: row.id,
            order_id: row.order_id,
            seq: row.seq,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            document_no: row.document_no.map(Masked),
            phone: row.phone.map(Masked),
            main_passenger_id: row.main_passenger_id,
            is_related_to_next: row.is_related_to_next,
            group_color: row.group_color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PASSENGER_COLUMNS: &str = "id, order_id, seq, first_name, last_name, birth_date, document_no, phone, main_passenger_id, is_related_to_next, group_color, created_at, updated_at";

#[async_trait]
impl PassengerRepository for StorePassengerRepository {
    async fn list_passengers(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Passenger>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, PassengerRow>(&format!(
            "SELECT {} FROM passengers WHERE order_id = $1 ORDER BY seq",
            PASSENGER_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }

    async fn list_for_departure(
        &self,
        scope: DepartureScope,
    ) -> Result<Vec<Passenger>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, PassengerRow>(&format!(
            r#"
            SELECT {}
            FROM passengers p
            WHERE p.order_id IN (
                SELECT id FROM orders
                WHERE tour_id = $1 AND departure_date = $2 AND status <> 'CANCELLED'
            )
            ORDER BY p.order_id, p.seq
            "#,
            "p.id, p.order_id, p.seq, p.first_name, p.last_name, p.birth_date, p.document_no, p.phone, p.main_passenger_id, p.is_related_to_next, p.group_color, p.created_at, p.updated_at"
        ))
        .bind(scope.tour_id)
        .bind(scope.departure_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }

    async fn replace_manifest(
        &self,
        order_id: Uuid,
        passengers: &[Passenger],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM passengers WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for (seq, passenger) in passengers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO passengers (id, order_id, seq, first_name, last_name, birth_date, document_no, phone, main_passenger_id, is_related_to_next, group_color)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(passenger.id)
            .bind(order_id)
            .bind(seq as i32)
            .bind(&passenger.first_name)
            .bind(&passenger.last_name)
            .bind(passenger.birth_date)
            .bind(passenger.document_no.as_ref().map(|d| d.0.clone()))
            .bind(passenger.phone.as_ref().map(|p| p.0.clone()))
            .bind(passenger.main_passenger_id)
            .bind(passenger.is_related_to_next)
            .bind(&passenger.group_color)
            .execute(&mut *tx)
            .await?;
        }

        // The order's seat count tracks its manifest size.
        sqlx::query("UPDATE orders SET seats = $1, updated_at = NOW() WHERE id = $2")
            .bind(passengers.len() as i32)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn add_passenger(
        &self,
        passenger: &Passenger,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO passengers (id, order_id, seq, first_name, last_name, birth_date, document_no, phone, main_passenger_id, is_related_to_next, group_color)
            VALUES ($1, $2,
                    (SELECT COALESCE(MAX(seq), -1) + 1 FROM passengers WHERE order_id = $2),
                    $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(passenger.id)
        .bind(passenger.order_id)
        .bind(&passenger.first_name)
        .bind(&passenger.last_name)
        .bind(passenger.birth_date)
        .bind(passenger.document_no.as_ref().map(|d| d.0.clone()))
        .bind(passenger.phone.as_ref().map(|p| p.0.clone()))
        .bind(passenger.main_passenger_id)
        .bind(passenger.is_related_to_next)
        .bind(&passenger.group_color)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE orders SET seats = (SELECT COUNT(*) FROM passengers WHERE order_id = $1), updated_at = NOW() WHERE id = $1",
        )
        .bind(passenger.order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(passenger.id)
    }

    async fn reserved_colors(
        &self,
        scope: DepartureScope,
        exclude_order: Uuid,
    ) -> Result<HashSet<String>, Box<dyn std::error::Error + Send + Sync>> {
        let colors = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT p.group_color
            FROM passengers p
            JOIN orders o ON o.id = p.order_id
            WHERE o.tour_id = $1
              AND o.departure_date = $2
              AND o.id <> $3
              AND o.status <> 'CANCELLED'
              AND p.group_color IS NOT NULL
            "#,
        )
        .bind(scope.tour_id)
        .bind(scope.departure_date)
        .bind(exclude_order)
        .fetch_all(&self.pool)
        .await?;

        Ok(colors.into_iter().collect())
    }
}
