use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use voyra_order::models::{Order, OrderStatus};
use voyra_order::repository::OrderRepository;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    tour_id: Uuid,
    departure_date: NaiveDate,
    customer_id: Uuid,
    status: String,
    seats: i32,
    total_cents: i32,
    currency: String,
    note: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| format!("Unknown order status: {}", row.status))?;
        Ok(Order {
            id: row.id,
            tour_id: row.tour_id,
            departure_date: row.departure_date,
            customer_id: row.customer_id,
            status,
            seats: row.seats,
            total_cents: row.total_cents,
            currency: row.currency,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, tour_id, departure_date, customer_id, status, seats, total_cents, currency, note, created_at, updated_at";

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, tour_id, departure_date, customer_id, status, seats, total_cents, currency, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id)
        .bind(order.tour_id)
        .bind(order.departure_date)
        .bind(order.customer_id)
        .bind(order.status.as_str())
        .bind(order.seats)
        .bind(order.total_cents)
        .bind(&order.currency)
        .bind(&order.note)
        .execute(&self.pool)
        .await?;

        Ok(order.id)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_orders(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE ($1::uuid IS NULL OR customer_id = $1) ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_orders_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE departure_date BETWEEN $1 AND $2 ORDER BY departure_date, created_at",
            ORDER_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
