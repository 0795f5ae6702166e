// src/models/order.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Lifecycle of an order. Stored as uppercase TEXT in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::BadRequest(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }

    /// Only pending orders may be cancelled; PAID and CANCELLED are final.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

/// Represents the 'orders' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub shipping_address: String,

    /// Sum of item price x quantity, computed at checkout time.
    pub total_amount: f64,

    pub status: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Line-item snapshot; price is frozen at purchase time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
}

/// An order together with its line items.
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// DTO for the checkout form.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must not be blank."))]
    pub full_name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Phone must not be blank."))]
    pub phone: String,
    #[validate(length(min = 1, max = 500, message = "Shipping address must not be blank."))]
    pub shipping_address: String,
}

/// DTO for the status overwrite endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        for s in ["PENDING", "PAID", "CANCELLED"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn parse_rejects_unknown_and_lowercase() {
        assert!(OrderStatus::parse("SHIPPED").is_err());
        assert!(OrderStatus::parse("pending").is_err());
        assert!(OrderStatus::parse("").is_err());
    }

    #[test]
    fn only_pending_is_cancellable() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(!OrderStatus::Paid.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }
}
