use axum::{routing::get, Router};

pub mod carts;
pub mod products;
pub mod system;
pub mod views;

/// JSON API under `/api`.
pub fn api_router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/cart", carts::router())
}

/// Server-rendered pages.
pub fn page_router() -> Router {
    Router::new()
        .route("/", get(views::home))
        .route("/realtimeproducts", get(views::realtime_products))
        .route("/carts/:cid", get(views::cart))
}
