// src/models/payment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'payments' table. At most one payment per order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,

    /// Copied from the order total when the payment is opened.
    pub amount: f64,

    pub provider: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for opening a payment against a pending order.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub order_id: i64,
    #[validate(length(min = 1, max = 50, message = "Provider must not be blank."))]
    pub provider: String,
}

/// DTO for confirming a payment with the gateway's transaction id.
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmPaymentRequest {
    pub order_id: i64,
    #[validate(length(min = 1, message = "Transaction id must not be blank."))]
    pub transaction_id: String,
}
