use std::sync::Arc;

use chrono::{Days, Utc};
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use voyra_catalog::repository::DepartureRepository;
use voyra_catalog::SeatLedger;
use voyra_store::RedisClient;

/// Periodically recompute seat availability for upcoming departures from
/// Postgres and reseed the Redis counters. Handlers nudge the counters
/// optimistically; this loop is what makes them trustworthy.
pub async fn start_reconcile_worker(
    interval_seconds: u64,
    horizon_days: i64,
    departures: Arc<dyn DepartureRepository>,
    redis: Arc<RedisClient>,
) {
    info!("Availability worker started, reconciling every {}s", interval_seconds);

    loop {
        sleep(Duration::from_secs(interval_seconds)).await;

        if let Err(e) = reconcile(horizon_days, departures.as_ref(), &redis).await {
            error!("Availability reconciliation failed: {}", e);
        }
    }
}

async fn reconcile(
    horizon_days: i64,
    departures: &dyn DepartureRepository,
    redis: &RedisClient,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let today = Utc::now().date_naive();
    let horizon = today + Days::new(horizon_days.max(0) as u64);

    let upcoming = departures.list_departures_between(today, horizon).await?;

    let mut ledger = SeatLedger::new();
    for departure in &upcoming {
        ledger.initialize(departure.tour_id, departure.departure_date, departure.seat_capacity);

        let available = departures
            .seats_available(departure.tour_id, departure.departure_date)
            .await?
            .unwrap_or(departure.seat_capacity);

        let booked = departure.seat_capacity - available;
        if booked > 0 {
            if let Err(e) = ledger.reserve(&departure.tour_id, &departure.departure_date, booked) {
                // Overbooked departure: counter goes to zero, managers sort
                // out the rest.
                tracing::warn!(
                    "Departure {} {} is over capacity: {}",
                    departure.tour_id,
                    departure.departure_date,
                    e
                );
            }
        }

        let seats = ledger
            .get(&departure.tour_id, &departure.departure_date)
            .map(|count| count.available_seats)
            .unwrap_or(0)
            .max(0);

        redis
            .set_seat_availability(&departure.tour_id, &departure.departure_date, seats)
            .await?;
    }

    info!("Reconciled availability for {} departures", upcoming.len());
    Ok(())
}
