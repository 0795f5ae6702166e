// src/handlers/orders.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::{
    error::AppError,
    models::order::{
        CheckoutRequest, Order, OrderItem, OrderStatus, OrderWithItems, UpdateStatusRequest,
    },
};

/// Cart row joined with the live product price, as seen at checkout time.
#[derive(Debug, FromRow)]
struct CheckoutRow {
    cart_item_id: i64,
    product_id: i64,
    quantity: i32,
    price: f64,
}

fn order_total(rows: &[(f64, i32)]) -> f64 {
    rows.iter().map(|(price, qty)| price * f64::from(*qty)).sum()
}

/// Converts the user's cart into an order.
///
/// Runs as a single transaction: an advisory lock keyed by the user id
/// serializes concurrent checkouts for the same user, the cart rows are
/// read with live product prices, the order and its line-item snapshots
/// are inserted, and exactly the consumed cart rows are deleted. Any
/// failure rolls the whole thing back.
pub async fn checkout(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Failed to begin checkout transaction: {:?}", e);
        AppError::InternalServerError(format!("Checkout failed: {}", e))
    })?;

    // Held until commit/rollback; two checkouts for one user never interleave.
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Checkout failed: {}", e)))?;

    let user_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Checkout failed: {}", e)))?;

    if user_exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let rows = sqlx::query_as::<_, CheckoutRow>(
        r#"
        SELECT ci.id AS cart_item_id, ci.product_id, ci.quantity, p.price
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| AppError::InternalServerError(format!("Checkout failed: {}", e)))?;

    if rows.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let pairs: Vec<(f64, i32)> = rows.iter().map(|r| (r.price, r.quantity)).collect();
    let total = order_total(&pairs);

    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (user_id, full_name, email, phone, shipping_address, total_amount)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&payload.full_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.shipping_address)
    .bind(total)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert order: {:?}", e);
        AppError::InternalServerError(format!("Checkout failed: {}", e))
    })?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(row.product_id)
        .bind(row.quantity)
        .bind(row.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Checkout failed: {}", e)))?;
        items.push(item);
    }

    let consumed: Vec<i64> = rows.iter().map(|r| r.cart_item_id).collect();
    sqlx::query("DELETE FROM cart_items WHERE id = ANY($1)")
        .bind(&consumed)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Checkout failed: {}", e)))?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit checkout: {:?}", e);
        AppError::InternalServerError(format!("Checkout failed: {}", e))
    })?;

    Ok((StatusCode::CREATED, Json(OrderWithItems { order, items })))
}

/// Overwrites an order's status with any known status value.
pub async fn update_status(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = OrderStatus::parse(&payload.status)?;

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update order status: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

/// Cancels a pending order. PAID and CANCELLED orders are final.
pub async fn cancel(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Single conditional UPDATE so a concurrent payment cannot slip between
    // a status check and the write.
    let cancelled = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = 'CANCELLED' WHERE id = $1 AND status = 'PENDING' RETURNING *",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to cancel order: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if let Some(order) = cancelled {
        return Ok(Json(order));
    }

    let existing = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    match existing {
        None => Err(AppError::NotFound("Order not found".to_string())),
        Some(order) => Err(AppError::InvalidCancellation(format!(
            "Order {} cannot be cancelled from status {}",
            order.id, order.status
        ))),
    }
}

/// Lists a user's orders, newest first, each with its line items.
pub async fn get_user_orders(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list orders: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let all_items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut result: Vec<OrderWithItems> = orders
        .into_iter()
        .map(|order| OrderWithItems {
            order,
            items: Vec::new(),
        })
        .collect();

    for item in all_items {
        if let Some(entry) = result.iter_mut().find(|o| o.order.id == item.order_id) {
            entry.items.push(item);
        }
    }

    Ok(Json(result))
}

/// Fetches a single order with its line items.
pub async fn get_order(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch order: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Order not found".to_string()))?;

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(OrderWithItems { order, items }))
}
