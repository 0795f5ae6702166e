use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'cart_items' table in the database.
/// One row per (user, product); re-adding merges quantities.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Cart row joined with the product fields the storefront renders.
#[derive(Debug, FromRow, Serialize)]
pub struct CartItemWithProduct {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub title: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub slug: String,
}

/// DTO for adding a product to a cart.
#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub user_id: i64,
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
}

/// DTO for overwriting a cart row's quantity.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
}
