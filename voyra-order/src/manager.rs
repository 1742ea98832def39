use crate::models::{Order, OrderStatus};

/// Guards order state transitions. The repository persists whatever status
/// the guard lets through; handlers never write a status directly.
pub struct OrderLifecycle;

impl OrderLifecycle {
    /// Transition: Pending → Confirmed (seats reserved against the departure)
    pub fn confirm(order: &mut Order) -> Result<(), OrderError> {
        Self::step(order, OrderStatus::Pending, OrderStatus::Confirmed)
    }

    /// Transition: Confirmed → Paid
    pub fn mark_paid(order: &mut Order) -> Result<(), OrderError> {
        Self::step(order, OrderStatus::Confirmed, OrderStatus::Paid)
    }

    /// Transition: Paid → Completed (tour departed)
    pub fn complete(order: &mut Order) -> Result<(), OrderError> {
        Self::step(order, OrderStatus::Paid, OrderStatus::Completed)
    }

    /// Cancel from any live status; completed orders are history.
    pub fn cancel(order: &mut Order) -> Result<(), OrderError> {
        if matches!(order.status, OrderStatus::Completed | OrderStatus::Cancelled) {
            return Err(OrderError::InvalidTransition {
                from: order.status.as_str().to_string(),
                to: "CANCELLED".to_string(),
            });
        }
        order.update_status(OrderStatus::Cancelled);
        Ok(())
    }

    /// Dispatch a requested target status through the matching guard.
    pub fn transition_to(order: &mut Order, target: OrderStatus) -> Result<(), OrderError> {
        match target {
            OrderStatus::Confirmed => Self::confirm(order),
            OrderStatus::Paid => Self::mark_paid(order),
            OrderStatus::Completed => Self::complete(order),
            OrderStatus::Cancelled => Self::cancel(order),
            OrderStatus::Pending => Err(OrderError::InvalidTransition {
                from: order.status.as_str().to_string(),
                to: "PENDING".to_string(),
            }),
        }
    }

    fn step(order: &mut Order, expected: OrderStatus, target: OrderStatus) -> Result<(), OrderError> {
        if order.status != expected {
            return Err(OrderError::InvalidTransition {
                from: order.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        order.update_status(target);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
