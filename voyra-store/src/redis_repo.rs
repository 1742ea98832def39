use chrono::NaiveDate;
use redis::{AsyncCommands, RedisResult};
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

fn availability_key(tour_id: &Uuid, departure_date: &NaiveDate) -> String {
    format!("departure:{}:{}:available", tour_id, departure_date)
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_seat_availability(
        &self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
    ) -> RedisResult<Option<i32>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(availability_key(tour_id, departure_date)).await
    }

    pub async fn set_seat_availability(
        &self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
        seats: i32,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set(availability_key(tour_id, departure_date), seats).await
    }

    pub async fn decr_seat_availability(
        &self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
        seats: i32,
    ) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // If the key exists, DECRBY it. If not, return nil and let the next
        // availability read re-seed it from the database.
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 1 then
                return redis.call("DECRBY", KEYS[1], ARGV[1])
            else
                return nil
            end
        "#,
        );

        script
            .key(availability_key(tour_id, departure_date))
            .arg(seats)
            .invoke_async(&mut conn)
            .await
    }

    pub async fn incr_seat_availability(
        &self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
        seats: i32,
    ) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 1 then
                return redis.call("INCRBY", KEYS[1], ARGV[1])
            else
                return nil
            end
        "#,
        );

        script
            .key(availability_key(tour_id, departure_date))
            .arg(seats)
            .invoke_async(&mut conn)
            .await
    }

    pub async fn del_seat_availability(
        &self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let removed: i64 = conn.del(availability_key(tour_id, departure_date)).await?;
        if removed > 0 {
            info!("Dropped availability counter for {} {}", tour_id, departure_date);
        }
        Ok(())
    }

    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}
