pub mod manager;
pub mod models;
pub mod repository;
pub mod requests;
pub mod schedule;

pub use manager::OrderError;
pub use models::{Order, OrderStatus};
pub use requests::{PassengerRequest, RequestError, RequestStatus};
