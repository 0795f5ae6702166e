// src/handlers/payments.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        order::{Order, OrderStatus},
        payment::{ConfirmPaymentRequest, CreatePaymentRequest, Payment},
    },
};

const PROVIDERS: [&str; 2] = ["momo", "cod"];

/// Opens a payment against a pending order.
///
/// The amount is copied from the order total; the UNIQUE (order_id)
/// constraint enforces at most one payment per order.
pub async fn create_payment(
    State(pool): State<PgPool>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if !PROVIDERS.contains(&payload.provider.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown payment provider: {}",
            payload.provider
        )));
    }

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(payload.order_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Order not found".to_string()))?;

    if OrderStatus::parse(&order.status)? != OrderStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "Order {} is not payable from status {}",
            order.id, order.status
        )));
    }

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (order_id, amount, provider)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(order.total_amount)
    .bind(&payload.provider)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Order {} already has a payment", order.id))
        } else {
            tracing::error!("Failed to create payment: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Marks a payment successful and its order paid, in one transaction.
pub async fn confirm_payment(
    State(pool): State<PgPool>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Failed to begin payment confirmation: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = 'PAID' WHERE id = $1 RETURNING *",
    )
    .bind(payload.order_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if order.is_none() {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments SET status = 'SUCCESS', transaction_id = $1
        WHERE order_id = $2
        RETURNING *
        "#,
    )
    .bind(&payload.transaction_id)
    .bind(payload.order_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?
    .ok_or(AppError::NotFound("Payment not found".to_string()))?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit payment confirmation: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(payment))
}

/// Fetches the payment row for an order.
pub async fn get_payment(
    State(pool): State<PgPool>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch payment: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Payment not found".to_string()))?;

    Ok(Json(payment))
}
