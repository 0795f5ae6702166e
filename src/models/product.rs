// src/models/product.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'products' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,

    /// Unit price. Order items snapshot this value at purchase time.
    pub price: f64,

    /// Discount percentage, 0 when the product is not on sale.
    pub discount: f64,

    pub views: i32,
    pub rating: f64,

    /// Optional external shop link.
    pub url: Option<String>,

    pub image_url: Option<String>,
    pub image_public_id: Option<String>,

    pub slug: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new product. The slug is derived from the title.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 characters."
    ))]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

/// DTO for updating a product. Absent fields are left untouched;
/// image fields are only replaced when a new image_url is supplied.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

/// Query parameters for product search.
#[derive(Debug, Deserialize)]
pub struct ProductSearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
}
