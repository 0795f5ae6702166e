// src/models/information.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'information' table: site contact records.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Information {
    pub id: i64,
    pub email: String,
    pub phone_number: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating or updating a contact record.
#[derive(Debug, Deserialize, Validate)]
pub struct InformationRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Phone number must not be blank."))]
    pub phone_number: String,
}
