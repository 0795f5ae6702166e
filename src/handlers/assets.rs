// src/handlers/assets.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{api::media, error::AppError, models::asset::Asset, state::AppState};

/// Lists all uploaded assets, newest first.
pub async fn list_assets(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let assets = sqlx::query_as::<_, Asset>("SELECT * FROM assets ORDER BY created_at DESC")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assets: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(assets))
}

/// Uploads a standalone image asset, bounded to 1200x1200.
pub async fn create_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("asset").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
            file = Some((file_name, bytes.to_vec()));
        }
    }

    let (file_name, bytes) =
        file.ok_or(AppError::BadRequest("A 'file' field is required".to_string()))?;

    let uploaded = media::upload(
        &state.http_client,
        state.config.media_api_url.as_deref(),
        &file_name,
        bytes,
        "assets",
        1200,
        1200,
    )
    .await?;

    let asset = sqlx::query_as::<_, Asset>(
        "INSERT INTO assets (image_url, image_public_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(&uploaded.url)
    .bind(&uploaded.public_id)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create asset: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// Deletes an asset row and its hosted image (best-effort).
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let asset = sqlx::query_as::<_, Asset>("DELETE FROM assets WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete asset: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Asset not found".to_string()))?;

    if let Some(public_id) = &asset.image_public_id {
        if let Err(e) = media::delete(
            &state.http_client,
            state.config.media_api_url.as_deref(),
            public_id,
        )
        .await
        {
            tracing::warn!("Failed to delete asset image: {:?}", e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
