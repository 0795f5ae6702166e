// tests/content_tests.rs

use gearstore_backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;

async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "content_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
        media_api_url: None,
        frontend_origin: None,
    };

    let state = AppState {
        pool,
        config,
        http_client: reqwest::Client::new(),
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn unique_slug(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Creates a post through the multipart endpoint and returns its JSON.
async fn create_post(
    address: &str,
    client: &reqwest::Client,
    slug: &str,
    content: &str,
) -> serde_json::Value {
    let form = reqwest::multipart::Form::new()
        .text("title", format!("Post {}", slug))
        .text("description", "A test post")
        .text("category", "news")
        .text("content", content.to_string())
        .text("slug", slug.to_string());

    let response = client
        .post(&format!("{}/api/posts", address))
        .multipart(form)
        .send()
        .await
        .expect("Create post failed");

    assert_eq!(response.status().as_u16(), 201);
    response.json().await.expect("Failed to parse post json")
}

#[tokio::test]
async fn create_post_sanitizes_content() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("sanitize");

    // Act
    let post = create_post(
        &address,
        &client,
        &slug,
        r#"<p>Hello</p><script>alert("boom")</script>"#,
    )
    .await;

    // Assert: markup survives, script does not
    let content = post["content"].as_str().unwrap();
    assert!(content.contains("<p>Hello</p>"));
    assert!(!content.contains("<script>"));
    assert_eq!(post["views"], 0);
}

#[tokio::test]
async fn create_post_duplicate_slug_conflicts() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("dupe");
    create_post(&address, &client, &slug, "<p>first</p>").await;

    // Act
    let form = reqwest::multipart::Form::new()
        .text("title", "Another title")
        .text("slug", slug.clone());
    let response = client
        .post(&format!("{}/api/posts", address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn repeated_views_accumulate_in_one_daily_row() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("views");
    create_post(&address, &client, &slug, "<p>watch me</p>").await;

    // Act: three views on the same day
    let mut last = serde_json::Value::Null;
    for _ in 0..3 {
        last = client
            .put(&format!("{}/api/posts/{}/view", address, slug))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }

    // Assert: lifetime total is 3 and today's single row carries all of it
    assert_eq!(last["views"], 3);
    let daily = last["daily_views"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["view_count"], 3);

    // A plain fetch agrees
    let fetched: serde_json::Value = client
        .get(&format!("{}/api/posts/{}", address, slug))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["views"], 3);
    assert_eq!(fetched["daily_views"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn views_on_separate_days_keep_separate_rows() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("days");
    let post = create_post(&address, &client, &slug, "<p>old news</p>").await;
    let post_id = post["id"].as_i64().unwrap();

    // A view that happened yesterday
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO post_views (post_id, date, view_count) VALUES ($1, CURRENT_DATE - 1, 4)",
    )
    .bind(post_id)
    .execute(&pool)
    .await
    .unwrap();

    // Act: one view today
    let body: serde_json::Value = client
        .put(&format!("{}/api/posts/{}/view", address, slug))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: yesterday's row is untouched, today gets its own
    let daily = body["daily_views"].as_array().unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0]["view_count"], 4);
    assert_eq!(daily[1]["view_count"], 1);
}

#[tokio::test]
async fn view_of_unknown_slug_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(&format!("{}/api/posts/{}/view", address, unique_slug("ghost")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn new_post_has_no_daily_rows_until_viewed() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("lazy");
    create_post(&address, &client, &slug, "<p>quiet</p>").await;

    // Act
    let fetched: serde_json::Value = client
        .get(&format!("{}/api/posts/{}", address, slug))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert!(fetched["daily_views"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_post_changes_fields_and_resanitizes() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("edit");
    create_post(&address, &client, &slug, "<p>v1</p>").await;

    // Act
    let form = reqwest::multipart::Form::new()
        .text("title", "Edited title")
        .text("content", r#"<p>v2</p><script>x()</script>"#);
    let updated: serde_json::Value = client
        .put(&format!("{}/api/posts/{}", address, slug))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(updated["title"], "Edited title");
    let content = updated["content"].as_str().unwrap();
    assert!(content.contains("<p>v2</p>"));
    assert!(!content.contains("<script>"));
}

#[tokio::test]
async fn delete_post_then_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let slug = unique_slug("gone");
    create_post(&address, &client, &slug, "<p>bye</p>").await;

    // Act
    let deleted = client
        .delete(&format!("{}/api/posts/{}", address, slug))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    // Assert
    let fetched = client
        .get(&format!("{}/api/posts/{}", address, slug))
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status().as_u16(), 404);

    let deleted_again = client
        .delete(&format!("{}/api/posts/{}", address, slug))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted_again.status().as_u16(), 404);
}

#[tokio::test]
async fn post_search_prefers_category_filter() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let category = unique_slug("cat");

    let form = reqwest::multipart::Form::new()
        .text("title", "Filtered post")
        .text("category", category.clone())
        .text("slug", unique_slug("filtered"));
    client
        .post(&format!("{}/api/posts", address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    // Act: q matches nothing, category matches the new post
    let results: Vec<serde_json::Value> = client
        .get(&format!(
            "{}/api/posts/search?q=zzz_no_such_title&category={}",
            address, category
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["category"], category.as_str());

    // The category listing agrees
    let listed: Vec<serde_json::Value> = client
        .get(&format!("{}/api/posts/category/{}", address, category))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn product_slugs_get_uniquified() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let title = format!("Same Gadget {}", &uuid::Uuid::new_v4().to_string()[..8]);

    // Act: create two products with the identical title
    let first: serde_json::Value = client
        .post(&format!("{}/api/products/create", address))
        .json(&serde_json::json!({ "title": title, "price": 1.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let second: serde_json::Value = client
        .post(&format!("{}/api/products/create", address))
        .json(&serde_json::json!({ "title": title, "price": 1.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    let first_slug = first["slug"].as_str().unwrap();
    let second_slug = second["slug"].as_str().unwrap();
    assert_ne!(first_slug, second_slug);
    assert_eq!(second_slug, format!("{}-1", first_slug));
}

#[tokio::test]
async fn product_category_match_is_case_insensitive() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let category = unique_slug("headsets");

    client
        .post(&format!("{}/api/products/create", address))
        .json(&serde_json::json!({
            "title": format!("Cased Gadget {}", &uuid::Uuid::new_v4().to_string()[..8]),
            "price": 20.0,
            "category": category.to_uppercase()
        }))
        .send()
        .await
        .unwrap();

    // Act: query with lowercase
    let results: Vec<serde_json::Value> = client
        .get(&format!("{}/api/products/category/{}", address, category))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn discounted_product_endpoints() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for discount in [15.0, 35.0, 55.0] {
        client
            .post(&format!("{}/api/products/create", address))
            .json(&serde_json::json!({
                "title": format!("Sale Gadget {}", &uuid::Uuid::new_v4().to_string()[..8]),
                "price": 50.0,
                "discount": discount
            }))
            .send()
            .await
            .unwrap();
    }

    // Act
    let top2: Vec<serde_json::Value> = client
        .get(&format!("{}/api/products/top2product", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let discounted: Vec<serde_json::Value> = client
        .get(&format!("{}/api/products/getdiscountproducts", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: two rows, steepest first; the full list never exceeds 20
    assert_eq!(top2.len(), 2);
    assert!(top2[0]["discount"].as_f64().unwrap() >= top2[1]["discount"].as_f64().unwrap());
    assert!(discounted.len() <= 20);
    for product in &discounted {
        assert!(product["discount"].as_f64().unwrap() > 0.0);
    }
}

#[tokio::test]
async fn banner_upload_requires_file_and_media_service() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Listing works without any media service
    let list = client
        .get(&format!("{}/api/banners", address))
        .send()
        .await
        .unwrap();
    assert_eq!(list.status().as_u16(), 200);

    // No 'file' field at all
    let no_file = client
        .post(&format!("{}/api/banners", address))
        .multipart(reqwest::multipart::Form::new().text("note", "nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(no_file.status().as_u16(), 400);

    // With a file but MEDIA_API_URL unset, the upload fails server-side
    let part = reqwest::multipart::Part::bytes(vec![0u8; 16]).file_name("banner.png");
    let with_file = client
        .post(&format!("{}/api/banners", address))
        .multipart(reqwest::multipart::Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(with_file.status().as_u16(), 500);

    // Deleting a banner that does not exist
    let missing = client
        .delete(&format!("{}/api/banners/999999999", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn asset_delete_missing_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .delete(&format!("{}/api/assets/999999999", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn product_update_and_delete_by_slug() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let created: serde_json::Value = client
        .post(&format!("{}/api/products/create", address))
        .json(&serde_json::json!({
            "title": format!("Mutable Gadget {}", &uuid::Uuid::new_v4().to_string()[..8]),
            "price": 10.0
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let slug = created["slug"].as_str().unwrap();

    // Act: partial update leaves other fields alone
    let updated: serde_json::Value = client
        .put(&format!("{}/api/products/update/{}", address, slug))
        .json(&serde_json::json!({ "price": 12.5 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!((updated["price"].as_f64().unwrap() - 12.5).abs() < 1e-9);
    assert_eq!(updated["title"], created["title"]);

    // Delete, then the detail page is gone
    let deleted = client
        .delete(&format!("{}/api/products/delete/{}", address, slug))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let detail = client
        .get(&format!("{}/api/products/detail/{}", address, slug))
        .send()
        .await
        .unwrap();
    assert_eq!(detail.status().as_u16(), 404);

    let update_missing = client
        .put(&format!("{}/api/products/update/{}", address, slug))
        .json(&serde_json::json!({ "price": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_missing.status().as_u16(), 404);
}
