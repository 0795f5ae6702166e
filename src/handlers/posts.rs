// src/handlers/posts.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    api::media,
    error::{AppError, is_unique_violation},
    models::post::{Post, PostSearchParams, PostView, PostWithViews},
    state::AppState,
    utils::{html::clean_html, slug::slugify},
};

/// Lists all posts, newest first.
pub async fn list_posts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(posts))
}

/// Searches posts. A category filter takes precedence over the keyword.
pub async fn search_posts(
    State(pool): State<PgPool>,
    Query(params): Query<PostSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let posts = if let Some(category) = params.category.filter(|c| !c.is_empty()) {
        sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE category = $1 ORDER BY created_at DESC",
        )
        .bind(category)
        .fetch_all(&pool)
        .await
    } else {
        let q = params.q.unwrap_or_default();
        let pattern = format!("%{}%", q);
        sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE title ILIKE $1 OR description ILIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&pool)
        .await
    }
    .map_err(|e| {
        tracing::error!("Failed to search posts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(posts))
}

/// Lists posts in one category, newest first.
pub async fn get_posts_by_category(
    State(pool): State<PgPool>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let posts = sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE category = $1 ORDER BY created_at DESC",
    )
    .bind(category)
    .fetch_all(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(posts))
}

/// Fetches one post by slug, including its per-day view rows.
pub async fn get_post(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let daily_views = fetch_daily_views(&pool, post.id).await?;

    Ok(Json(PostWithViews { post, daily_views }))
}

/// The five most recent posts.
pub async fn get_newest_posts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let posts =
        sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC LIMIT 5")
            .fetch_all(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(posts))
}

/// The single most recent post.
pub async fn get_top_post(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC LIMIT 1")
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("No posts yet".to_string()))?;

    Ok(Json(post))
}

/// Registers one view on a post.
///
/// Bumps the lifetime counter and upserts today's per-day row in a single
/// transaction; the UNIQUE (post_id, date) index makes concurrent views
/// for the same day land on one row instead of racing read-then-write.
pub async fn increase_view(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Failed to begin view transaction: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let post = sqlx::query_as::<_, Post>(
        "UPDATE posts SET views = views + 1 WHERE slug = $1 RETURNING *",
    )
    .bind(&slug)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO post_views (post_id, date, view_count)
        VALUES ($1, CURRENT_DATE, 1)
        ON CONFLICT (post_id, date)
        DO UPDATE SET view_count = post_views.view_count + 1
        "#,
    )
    .bind(post.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert daily view row: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let daily_views = sqlx::query_as::<_, PostView>(
        "SELECT * FROM post_views WHERE post_id = $1 ORDER BY date",
    )
    .bind(post.id)
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit view transaction: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    // The lifetime counter was bumped before the daily rows were read, so
    // the returned post already reflects this view.
    Ok(Json(PostWithViews { post, daily_views }))
}

/// Fields collected from the post multipart form.
#[derive(Debug, Default)]
struct PostForm {
    uid: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    content: Option<String>,
    slug: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_keywords: Option<String>,
    meta_url: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                form.image = Some((file_name, bytes.to_vec()));
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
                match other {
                    "uid" => form.uid = Some(value),
                    "title" => form.title = Some(value),
                    "description" => form.description = Some(value),
                    "category" => form.category = Some(value),
                    "content" => form.content = Some(value),
                    "slug" => form.slug = Some(value),
                    "meta_title" => form.meta_title = Some(value),
                    "meta_description" => form.meta_description = Some(value),
                    "meta_keywords" => form.meta_keywords = Some(value),
                    "meta_url" => form.meta_url = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// Creates a post from a multipart form.
///
/// The HTML body is sanitized, the optional image is pushed to the media
/// service, and the slug (client-sent or derived from the title) must be
/// unique.
pub async fn create_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_post_form(multipart).await?;

    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(AppError::BadRequest("Title must not be blank".to_string()))?;

    let slug = match form.slug.filter(|s| !s.trim().is_empty()) {
        Some(s) => s,
        None => slugify(&title),
    };

    let content = clean_html(&form.content.unwrap_or_default());

    let (image_url, image_public_id) = match form.image {
        Some((file_name, bytes)) => {
            let uploaded = media::upload(
                &state.http_client,
                state.config.media_api_url.as_deref(),
                &file_name,
                bytes,
                "posts",
                870,
                870,
            )
            .await?;
            (Some(uploaded.url), Some(uploaded.public_id))
        }
        None => (None, None),
    };

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts
        (uid, title, description, category, content, image_url, image_public_id,
         slug, meta_title, meta_description, meta_keywords, meta_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(form.uid.unwrap_or_default())
    .bind(&title)
    .bind(form.description.unwrap_or_default())
    .bind(form.category.unwrap_or_default())
    .bind(&content)
    .bind(&image_url)
    .bind(&image_public_id)
    .bind(&slug)
    .bind(&form.meta_title)
    .bind(&form.meta_description)
    .bind(&form.meta_keywords)
    .bind(&form.meta_url)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Slug '{}' already exists", slug))
        } else {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Updates a post from a multipart form. Absent fields are left untouched;
/// the stored image is only replaced when a new file is sent.
pub async fn update_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_post_form(multipart).await?;

    let existing = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let new_image = match form.image {
        Some((file_name, bytes)) => {
            let uploaded = media::upload(
                &state.http_client,
                state.config.media_api_url.as_deref(),
                &file_name,
                bytes,
                "posts",
                870,
                870,
            )
            .await?;
            Some(uploaded)
        }
        None => None,
    };

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE posts SET ");
    let mut separated = builder.separated(", ");
    let mut dirty = false;

    if let Some(title) = form.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
        dirty = true;
    }
    if let Some(description) = form.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
        dirty = true;
    }
    if let Some(category) = form.category {
        separated.push("category = ");
        separated.push_bind_unseparated(category);
        dirty = true;
    }
    if let Some(content) = form.content {
        separated.push("content = ");
        separated.push_bind_unseparated(clean_html(&content));
        dirty = true;
    }
    if let Some(meta_title) = form.meta_title {
        separated.push("meta_title = ");
        separated.push_bind_unseparated(meta_title);
        dirty = true;
    }
    if let Some(meta_description) = form.meta_description {
        separated.push("meta_description = ");
        separated.push_bind_unseparated(meta_description);
        dirty = true;
    }
    if let Some(meta_keywords) = form.meta_keywords {
        separated.push("meta_keywords = ");
        separated.push_bind_unseparated(meta_keywords);
        dirty = true;
    }
    if let Some(meta_url) = form.meta_url {
        separated.push("meta_url = ");
        separated.push_bind_unseparated(meta_url);
        dirty = true;
    }
    if let Some(uploaded) = &new_image {
        separated.push("image_url = ");
        separated.push_bind_unseparated(uploaded.url.clone());
        separated.push("image_public_id = ");
        separated.push_bind_unseparated(uploaded.public_id.clone());
        dirty = true;
    }

    if !dirty {
        let daily_views = fetch_daily_views(&state.pool, existing.id).await?;
        return Ok(Json(PostWithViews {
            post: existing,
            daily_views,
        }));
    }

    builder.push(" WHERE slug = ");
    builder.push_bind(&slug);
    builder.push(" RETURNING *");

    let post = builder
        .build_query_as::<Post>()
        .fetch_one(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    // The new file is already stored; losing the old one only orphans it
    // at the media host, so a failed delete is logged and ignored.
    if new_image.is_some() {
        if let Some(old_id) = &existing.image_public_id {
            if let Err(e) = media::delete(
                &state.http_client,
                state.config.media_api_url.as_deref(),
                old_id,
            )
            .await
            {
                tracing::warn!("Failed to delete replaced post image: {:?}", e);
            }
        }
    }

    let daily_views = fetch_daily_views(&state.pool, post.id).await?;
    Ok(Json(PostWithViews { post, daily_views }))
}

/// Deletes a post by slug. Its per-day view rows cascade.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, Post>("DELETE FROM posts WHERE slug = $1 RETURNING *")
        .bind(&slug)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if let Some(public_id) = &post.image_public_id {
        if let Err(e) = media::delete(
            &state.http_client,
            state.config.media_api_url.as_deref(),
            public_id,
        )
        .await
        {
            tracing::warn!("Failed to delete post image: {:?}", e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_daily_views(pool: &PgPool, post_id: i64) -> Result<Vec<PostView>, AppError> {
    sqlx::query_as::<_, PostView>("SELECT * FROM post_views WHERE post_id = $1 ORDER BY date")
        .bind(post_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}
