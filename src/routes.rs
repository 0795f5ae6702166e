// src/routes.rs

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{
        assets, auth, banners, cart, categories, dashboard, information, orders, payments,
        posts, products, users,
    },
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (users, posts, products, cart, orders, ...).
/// * Applies global middleware (Trace, CORS, body limit for uploads).
/// * Injects global state (pool, config, HTTP client).
pub fn create_router(state: AppState) -> Router {
    let mut origins: Vec<HeaderValue> = vec![
        "http://localhost:3000".parse().unwrap(),
        "http://localhost:5173".parse().unwrap(),
    ];
    if let Some(frontend) = &state.config.frontend_origin {
        if let Ok(origin) = frontend.parse() {
            origins.push(origin);
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // let governor_conf = GovernorConfigBuilder::default()
    //     .per_second(2)
    //     .burst_size(5)
    //     .finish()
    //     .unwrap();

    // let governor_conf = Arc::new(governor_conf);

    let user_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/{id}", put(users::update_user))
        .route("/{id}/toggle-post", put(users::toggle_favorite_post))
        .route("/{id}/toggle-product", put(users::toggle_favorite_product))
        // Protected management routes: Auth first, then Admin check
        .merge(
            Router::new()
                .route("/", get(users::list_users))
                .route("/{id}", delete(users::delete_user))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/search", get(posts::search_posts))
        .route("/newest", get(posts::get_newest_posts))
        .route("/top1", get(posts::get_top_post))
        .route("/category/{category}", get(posts::get_posts_by_category))
        .route(
            "/{slug}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{slug}/view", put(posts::increase_view));

    let product_routes = Router::new()
        .route("/", get(products::list_products))
        .route("/search", get(products::search_products))
        .route("/category/{category}", get(products::get_products_by_category))
        .route("/detail/{slug}", get(products::get_product_detail))
        .route("/top2product", get(products::get_top_discounted))
        .route("/getdiscountproducts", get(products::get_discounted_products))
        .route("/create", post(products::create_product))
        .route("/update/{slug}", put(products::update_product))
        .route("/delete/{slug}", delete(products::delete_product));

    let category_routes = Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        );

    let cart_routes = Router::new()
        .route("/add", post(cart::add_to_cart))
        .route("/{id}", get(cart::get_cart).delete(cart::remove_item))
        .route("/{id}/quantity", put(cart::update_quantity));

    let order_routes = Router::new()
        .route("/checkout/{user_id}", post(orders::checkout))
        .route("/user/{user_id}", get(orders::get_user_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/cancel", post(orders::cancel));

    let banner_routes = Router::new()
        .route("/", get(banners::list_banners).post(banners::create_banner))
        .route("/{id}", delete(banners::delete_banner));

    let asset_routes = Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/{id}", delete(assets::delete_asset));

    let information_routes = Router::new()
        .route(
            "/",
            get(information::list_information).post(information::create_information),
        )
        .route(
            "/{id}",
            put(information::update_information).delete(information::delete_information),
        );

    let payment_routes = Router::new()
        .route("/", post(payments::create_payment))
        .route("/confirm", post(payments::confirm_payment))
        .route("/{order_id}", get(payments::get_payment));

    let dashboard_routes = Router::new()
        .route("/stats", get(dashboard::get_stats))
        .route("/recent-products", get(dashboard::recent_products))
        .route("/recent-posts", get(dashboard::recent_posts))
        .route("/top-products", get(dashboard::top_products))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/posts", post_routes)
        .nest("/api/products", product_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/cart", cart_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/banners", banner_routes)
        .nest("/api/assets", asset_routes)
        .nest("/api/information", information_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/dashboard", dashboard_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Image uploads; matches the old 10MB multipart cap
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        // .layer(GovernorLayer::new(governor_conf))
        .with_state(state)
}
