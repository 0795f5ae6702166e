// src/models/banner.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'banners' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Banner {
    pub id: i64,
    pub image_url: String,
    pub image_public_id: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
