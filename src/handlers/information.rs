// src/handlers/information.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::information::{Information, InformationRequest},
};

/// Lists contact records, newest first.
pub async fn list_information(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let records = sqlx::query_as::<_, Information>(
        "SELECT * FROM information ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list information records: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(records))
}

/// Creates a contact record.
pub async fn create_information(
    State(pool): State<PgPool>,
    Json(payload): Json<InformationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let record = sqlx::query_as::<_, Information>(
        "INSERT INTO information (email, phone_number) VALUES ($1, $2) RETURNING *",
    )
    .bind(&payload.email)
    .bind(&payload.phone_number)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create information record: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Updates a contact record.
pub async fn update_information(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<InformationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let record = sqlx::query_as::<_, Information>(
        "UPDATE information SET email = $1, phone_number = $2 WHERE id = $3 RETURNING *",
    )
    .bind(&payload.email)
    .bind(&payload.phone_number)
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update information record: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("Information record not found".to_string()))?;

    Ok(Json(record))
}

/// Deletes a contact record.
pub async fn delete_information(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM information WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete information record: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Information record not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
