// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub username: String,

    /// User role: 'User' or 'Admin'.
    pub role: String,

    /// Ids of favorited posts / products, kept as opaque strings.
    pub favorites_post: Vec<String>,
    pub favorites_product: Vec<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 2,
        max = 50,
        message = "Username length must be between 2 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Successful login payload: a bearer token plus the account it belongs to.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: User,
}

/// DTO for updating account fields. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 50))]
    pub username: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
}

/// DTO for toggling a post in the favorites array.
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleFavoritePostRequest {
    #[validate(length(min = 1, message = "A post id is required."))]
    pub post_id: String,
}

/// DTO for toggling a product in the favorites array.
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleFavoriteProductRequest {
    #[validate(length(min = 1, message = "A product id is required."))]
    pub product_id: String,
}
