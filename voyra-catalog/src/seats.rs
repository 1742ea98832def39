use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Seat accounting for one departure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatCount {
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub available_seats: i32,
    pub seat_capacity: i32,
    pub reserved_seats: i32,
}

/// In-memory seat ledger keyed by (tour, departure date). The Redis counter
/// mirrors `available_seats` for dashboard reads; this ledger is the
/// authority during a single request.
pub struct SeatLedger {
    departures: HashMap<(Uuid, NaiveDate), SeatCount>,
}

impl SeatLedger {
    pub fn new() -> Self {
        Self {
            departures: HashMap::new(),
        }
    }

    /// Seed the ledger for a departure at full capacity.
    pub fn initialize(&mut self, tour_id: Uuid, departure_date: NaiveDate, seat_capacity: i32) {
        self.departures.insert(
            (tour_id, departure_date),
            SeatCount {
                tour_id,
                departure_date,
                available_seats: seat_capacity,
                seat_capacity,
                reserved_seats: 0,
            },
        );
    }

    pub fn get(&self, tour_id: &Uuid, departure_date: &NaiveDate) -> Option<&SeatCount> {
        self.departures.get(&(*tour_id, *departure_date))
    }

    /// Reserve seats (order confirmed, payment pending).
    pub fn reserve(
        &mut self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
        seats: i32,
    ) -> Result<(), SeatError> {
        let count = self
            .departures
            .get_mut(&(*tour_id, *departure_date))
            .ok_or_else(|| SeatError::NotFound(format!("{} {}", tour_id, departure_date)))?;

        if count.available_seats < seats {
            return Err(SeatError::InsufficientSeats {
                requested: seats,
                available: count.available_seats,
            });
        }

        count.available_seats -= seats;
        count.reserved_seats += seats;

        Ok(())
    }

    /// Release reserved seats (order cancelled before payment).
    pub fn release(
        &mut self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
        seats: i32,
    ) -> Result<(), SeatError> {
        let count = self
            .departures
            .get_mut(&(*tour_id, *departure_date))
            .ok_or_else(|| SeatError::NotFound(format!("{} {}", tour_id, departure_date)))?;

        count.available_seats = (count.available_seats + seats).min(count.seat_capacity);
        count.reserved_seats = count.reserved_seats.saturating_sub(seats);

        Ok(())
    }

    /// Commit reserved seats (order paid).
    pub fn commit(
        &mut self,
        tour_id: &Uuid,
        departure_date: &NaiveDate,
        seats: i32,
    ) -> Result<(), SeatError> {
        let count = self
            .departures
            .get_mut(&(*tour_id, *departure_date))
            .ok_or_else(|| SeatError::NotFound(format!("{} {}", tour_id, departure_date)))?;

        if count.reserved_seats < seats {
            return Err(SeatError::InsufficientReserved {
                requested: seats,
                reserved: count.reserved_seats,
            });
        }

        count.reserved_seats -= seats;

        Ok(())
    }

    /// Load factor for a departure.
    pub fn get_utilization(&self, tour_id: &Uuid, departure_date: &NaiveDate) -> Option<f64> {
        self.departures.get(&(*tour_id, *departure_date)).map(|count| {
            if count.seat_capacity == 0 {
                0.0
            } else {
                1.0 - (count.available_seats as f64 / count.seat_capacity as f64)
            }
        })
    }
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("Departure not found: {0}")]
    NotFound(String),

    #[error("Insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("Insufficient reserved seats: requested {requested}, reserved {reserved}")]
    InsufficientReserved { requested: i32, reserved: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 3).unwrap()
    }

    #[test]
    fn test_seat_lifecycle() {
        let mut ledger = SeatLedger::new();
        let tour_id = Uuid::new_v4();

        ledger.initialize(tour_id, date(), 40);
        assert_eq!(ledger.get(&tour_id, &date()).unwrap().available_seats, 40);

        ledger.reserve(&tour_id, &date(), 6).unwrap();
        assert_eq!(ledger.get(&tour_id, &date()).unwrap().available_seats, 34);
        assert_eq!(ledger.get(&tour_id, &date()).unwrap().reserved_seats, 6);

        ledger.commit(&tour_id, &date(), 6).unwrap();
        assert_eq!(ledger.get(&tour_id, &date()).unwrap().reserved_seats, 0);

        let utilization = ledger.get_utilization(&tour_id, &date()).unwrap();
        assert!((utilization - 0.15).abs() < 0.01);
    }

    #[test]
    fn test_cannot_reserve_past_capacity() {
        let mut ledger = SeatLedger::new();
        let tour_id = Uuid::new_v4();

        ledger.initialize(tour_id, date(), 4);
        let result = ledger.reserve(&tour_id, &date(), 5);
        assert!(matches!(
            result,
            Err(SeatError::InsufficientSeats { requested: 5, available: 4 })
        ));
    }

    #[test]
    fn test_release_is_capped_at_capacity() {
        let mut ledger = SeatLedger::new();
        let tour_id = Uuid::new_v4();

        ledger.initialize(tour_id, date(), 10);
        ledger.reserve(&tour_id, &date(), 3).unwrap();
        // Double release must not push availability past capacity.
        ledger.release(&tour_id, &date(), 3).unwrap();
        ledger.release(&tour_id, &date(), 3).unwrap();
        let count = ledger.get(&tour_id, &date()).unwrap();
        assert_eq!(count.available_seats, 10);
        assert_eq!(count.reserved_seats, 0);
    }
}
