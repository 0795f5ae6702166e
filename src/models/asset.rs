// src/models/asset.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'assets' table: standalone uploaded images the admin
/// panel links from rich-text content.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub image_url: String,
    pub image_public_id: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
