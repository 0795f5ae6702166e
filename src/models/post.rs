use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,

    /// Author identifier as sent by the frontend (external auth uid).
    pub uid: String,

    pub title: String,
    pub description: String,
    pub category: String,

    /// Lifetime view total, kept in sync with the per-day rows.
    pub views: i32,

    /// Sanitized HTML body.
    pub content: String,

    pub image_url: Option<String>,
    pub image_public_id: Option<String>,

    pub slug: String,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub meta_url: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One row per (post, calendar day), created lazily on the first view.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub post_id: i64,
    pub date: chrono::NaiveDate,
    pub view_count: i32,
}

/// A post together with its per-day view rows.
#[derive(Debug, Serialize)]
pub struct PostWithViews {
    #[serde(flatten)]
    pub post: Post,
    pub daily_views: Vec<PostView>,
}

/// Query parameters for post search.
#[derive(Debug, Deserialize)]
pub struct PostSearchParams {
    /// Keyword matched against title and description.
    pub q: Option<String>,

    /// Exact category filter; takes precedence over the keyword.
    pub category: Option<String>,
}
