// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    api::media,
    error::{AppError, is_unique_violation},
    models::product::{
        CreateProductRequest, Product, ProductSearchParams, UpdateProductRequest,
    },
    state::AppState,
    utils::slug::slugify,
};

/// Lists all products, newest first.
pub async fn list_products(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

    Ok(Json(products))
}

/// Searches products. A category filter takes precedence over the keyword.
pub async fn search_products(
    State(pool): State<PgPool>,
    Query(params): Query<ProductSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = if let Some(category) = params.category.filter(|c| !c.is_empty()) {
        sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE LOWER(category) = LOWER($1) ORDER BY created_at DESC",
        )
        .bind(category)
        .fetch_all(&pool)
        .await
    } else {
        let q = params.q.unwrap_or_default();
        let pattern = format!("%{}%", q);
        sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE title ILIKE $1 OR description ILIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&pool)
        .await
    }
    .map_err(|e| {
        tracing::error!("Failed to search products: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(products))
}

/// Lists products in one category. The match is case-insensitive.
pub async fn get_products_by_category(
    State(pool): State<PgPool>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE LOWER(category) = LOWER($1) ORDER BY created_at DESC",
    )
    .bind(category)
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products))
}

/// Fetches one product by slug.
pub async fn get_product_detail(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// The two products with the largest discounts, for the storefront hero.
pub async fn get_top_discounted(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE discount > 0 ORDER BY discount DESC LIMIT 2",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products))
}

/// All discounted products, steepest discount first, capped at 20.
pub async fn get_discounted_products(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE discount > 0 ORDER BY discount DESC LIMIT 20",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products))
}

/// Creates a product. The slug is derived from the title and suffixed
/// with -1, -2, ... until it is unique.
pub async fn create_product(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let slug = unique_slug(&pool, &payload.title).await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products
        (title, description, category, price, discount, rating, url, image_url,
         image_public_id, slug)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(&payload.title)
    .bind(payload.description.unwrap_or_default())
    .bind(payload.category.unwrap_or_default())
    .bind(payload.price)
    .bind(payload.discount.unwrap_or(0.0))
    .bind(payload.rating.unwrap_or(0.0))
    .bind(&payload.url)
    .bind(&payload.image_url)
    .bind(&payload.image_public_id)
    .bind(&slug)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            // Lost the race against a concurrent insert of the same title.
            AppError::Conflict(format!("Slug '{}' already exists", slug))
        } else {
            tracing::error!("Failed to create product: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Updates a product. Absent fields are left untouched; the image pair is
/// only replaced when a new image_url is supplied.
pub async fn update_product(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
    let mut separated = builder.separated(", ");
    let mut dirty = false;

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
        dirty = true;
    }
    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
        dirty = true;
    }
    if let Some(category) = payload.category {
        separated.push("category = ");
        separated.push_bind_unseparated(category);
        dirty = true;
    }
    if let Some(price) = payload.price {
        separated.push("price = ");
        separated.push_bind_unseparated(price);
        dirty = true;
    }
    if let Some(discount) = payload.discount {
        separated.push("discount = ");
        separated.push_bind_unseparated(discount);
        dirty = true;
    }
    if let Some(rating) = payload.rating {
        separated.push("rating = ");
        separated.push_bind_unseparated(rating);
        dirty = true;
    }
    if let Some(url) = payload.url {
        separated.push("url = ");
        separated.push_bind_unseparated(url);
        dirty = true;
    }
    if let Some(image_url) = payload.image_url {
        separated.push("image_url = ");
        separated.push_bind_unseparated(image_url);
        separated.push("image_public_id = ");
        separated.push_bind_unseparated(payload.image_public_id.clone());
        dirty = true;
    }

    if !dirty {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .ok_or(AppError::NotFound("Product not found".to_string()))?;
        return Ok(Json(product));
    }

    builder.push(" WHERE slug = ");
    builder.push_bind(&slug);
    builder.push(" RETURNING *");

    let product = builder
        .build_query_as::<Product>()
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update product: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Deletes a product by slug, removing its hosted image best-effort.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product =
        sqlx::query_as::<_, Product>("DELETE FROM products WHERE slug = $1 RETURNING *")
            .bind(&slug)
            .fetch_optional(&state.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete product: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?
            .ok_or(AppError::NotFound("Product not found".to_string()))?;

    if let Some(public_id) = &product.image_public_id {
        if let Err(e) = media::delete(
            &state.http_client,
            state.config.media_api_url.as_deref(),
            public_id,
        )
        .await
        {
            tracing::warn!("Failed to delete product image: {:?}", e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn unique_slug(pool: &PgPool, title: &str) -> Result<String, AppError> {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut suffix = 1;

    loop {
        let taken = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE slug = $1")
            .bind(&candidate)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        if taken.is_none() {
            return Ok(candidate);
        }

        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
}
