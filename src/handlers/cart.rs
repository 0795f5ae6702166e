// src/handlers/cart.rs

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
    models::cart::{AddToCartRequest, CartItem, CartItemWithProduct, UpdateQuantityRequest},
};

/// Adds a product to a user's cart.
///
/// One row per (user, product): adding a product already in the cart merges
/// the quantities in a single upsert instead of inserting a second row.
pub async fn add_to_cart(
    State(pool): State<PgPool>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(payload.user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if user.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let product = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if product.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to add to cart: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Lists a user's cart, joined with the product fields the storefront shows.
pub async fn get_cart(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let items = sqlx::query_as::<_, CartItemWithProduct>(
        r#"
        SELECT ci.id, ci.user_id, ci.product_id, ci.quantity,
               p.title, p.price, p.image_url, p.slug
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load cart: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(items))
}

/// Overwrites a cart row's quantity.
pub async fn update_quantity(
    State(pool): State<PgPool>,
    Path(cart_item_id): Path<i64>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let item = sqlx::query_as::<_, CartItem>(
        "UPDATE cart_items SET quantity = $1 WHERE id = $2 RETURNING *",
    )
    .bind(payload.quantity)
    .bind(cart_item_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update cart quantity: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("Cart item not found".to_string()))?;

    Ok(Json(item))
}

/// Removes a cart row. Deleting an id that is already gone is not an error.
pub async fn remove_item(
    State(pool): State<PgPool>,
    Path(cart_item_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(cart_item_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove cart item: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(StatusCode::NO_CONTENT)
}
