// src/handlers/banners.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{api::media, error::AppError, models::banner::Banner, state::AppState};

/// Lists all banners, newest first.
pub async fn list_banners(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let banners = sqlx::query_as::<_, Banner>("SELECT * FROM banners ORDER BY created_at DESC")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list banners: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(banners))
}

/// Uploads a banner image and stores the resulting row.
pub async fn create_banner(
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
            let file_name = field.file_name().unwrap_or("banner").to_string();
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
        "banners",
        1920,
        1080,
    )
    .await?;

    let banner = sqlx::query_as::<_, Banner>(
        "INSERT INTO banners (image_url, image_public_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(&uploaded.url)
    .bind(&uploaded.public_id)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create banner: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(banner)))
}

/// Deletes a banner. The hosted image is removed best-effort; a failure
/// there only orphans the file at the media host.
pub async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let banner = sqlx::query_as::<_, Banner>("DELETE FROM banners WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete banner: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Banner not found".to_string()))?;

    if let Some(public_id) = &banner.image_public_id {
        if let Err(e) = media::delete(
            &state.http_client,
            state.config.media_api_url.as_deref(),
            public_id,
        )
        .await
        {
            tracing::warn!("Failed to delete banner image: {:?}", e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
