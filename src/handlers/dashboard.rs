// src/handlers/dashboard.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::{
    error::AppError,
    models::{post::Post, product::Product},
};

/// Site-wide totals shown at the top of the admin panel.
#[derive(Debug, Serialize, FromRow)]
pub struct DashboardStats {
    pub product_count: i64,
    pub post_count: i64,
    pub product_views: i64,
    pub post_views: i64,
}

/// Aggregated counts and view totals.
/// Admin only.
pub async fn get_stats(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let stats = sqlx::query_as::<_, DashboardStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products) AS product_count,
            (SELECT COUNT(*) FROM posts) AS post_count,
            (SELECT COALESCE(SUM(views), 0) FROM products) AS product_views,
            (SELECT COALESCE(SUM(views), 0) FROM posts) AS post_views
        "#,
    )
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load dashboard stats: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(stats))
}

/// The five most recently added products.
/// Admin only.
pub async fn recent_products(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products ORDER BY created_at DESC LIMIT 5",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products))
}

/// The five most recently published posts.
/// Admin only.
pub async fn recent_posts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC LIMIT 5")
        .fetch_all(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(posts))
}

/// The five most viewed products.
/// Admin only.
pub async fn top_products(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY views DESC LIMIT 5")
            .fetch_all(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products))
}
