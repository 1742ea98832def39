pub mod repository;
pub mod seats;
pub mod tour;

pub use seats::{SeatError, SeatLedger};
pub use tour::{Departure, DepartureStatus, Tour};
