use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Order, OrderStatus};
use crate::requests::{PassengerRequest, RequestStatus};

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for passenger change requests
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create_request(
        &self,
        request: &PassengerRequest,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_request(
        &self,
        id: Uuid,
    ) -> Result<Option<PassengerRequest>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        requested_by: Option<Uuid>,
    ) -> Result<Vec<PassengerRequest>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_request(
        &self,
        id: Uuid,
        request: &PassengerRequest,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
