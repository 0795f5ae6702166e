// src/handlers/users.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::user::{
        ToggleFavoritePostRequest, ToggleFavoriteProductRequest, UpdateUserRequest, User,
    },
    utils::{hash::hash_password, jwt::Claims},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id DESC")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(users))
}

/// Updates account fields. Absent fields are left untouched.
pub async fn update_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.email.is_none() && payload.username.is_none() && payload.password.is_none() {
        let user = fetch_user(&pool, id).await?;
        return Ok(Json(user));
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");

    if let Some(email) = payload.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email);
    }

    if let Some(username) = payload.username {
        separated.push("username = ");
        separated.push_bind_unseparated(username);
    }

    if let Some(password) = payload.password {
        let hashed = hash_password(&password)?;
        separated.push("password = ");
        separated.push_bind_unseparated(hashed);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already in use".to_string())
        } else {
            tracing::error!("Failed to update user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = fetch_user(&pool, id).await?;
    Ok(Json(user))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Prevent self-deletion
    let current_user_id = claims.sub.parse::<i64>().unwrap_or(0);
    if id == current_user_id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Toggles a post id in the user's favorites list.
pub async fn toggle_favorite_post(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ToggleFavoritePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    toggle_favorite(&pool, user_id, &payload.post_id, "favorites_post").await
}

/// Toggles a product id in the user's favorites list.
pub async fn toggle_favorite_product(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ToggleFavoriteProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    toggle_favorite(&pool, user_id, &payload.product_id, "favorites_product").await
}

async fn toggle_favorite(
    pool: &PgPool,
    user_id: i64,
    value: &str,
    column: &str,
) -> Result<Json<User>, AppError> {
    let user = fetch_user(pool, user_id).await?;

    let mut favorites = match column {
        "favorites_post" => user.favorites_post.clone(),
        _ => user.favorites_product.clone(),
    };

    if let Some(pos) = favorites.iter().position(|s| s == value) {
        favorites.remove(pos);
    } else {
        favorites.push(value.to_string());
    }

    // column is one of two fixed names, never user input
    let sql = format!("UPDATE users SET {} = $1 WHERE id = $2 RETURNING *", column);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&favorites)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle favorite: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(user))
}

async fn fetch_user(pool: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("User not found".to_string()))
}
