use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopfront_core::{CartId, ProductId};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_cart))
        .route("/:cid", get(get_cart).delete(clear_cart))
        .route(
            "/:cid/product/:pid",
            post(add_product).delete(remove_product),
        )
}

pub async fn create_cart(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.carts().create().await {
        Ok(cart) => (StatusCode::CREATED, Json(cart)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cid): Path<String>,
) -> axum::response::Response {
    let cart_id = match errors::parse_id::<CartId>(&cid) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.carts().get(cart_id).await {
        Ok(cart) => Json(cart).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cid): Path<String>,
) -> axum::response::Response {
    let cart_id = match errors::parse_id::<CartId>(&cid) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.carts().clear(cart_id).await {
        Ok(cart) => Json(cart).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn add_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path((cid, pid)): Path<(String, String)>,
) -> axum::response::Response {
    let (cart_id, product_id) = match parse_ids(&cid, &pid) {
        Ok(ids) => ids,
        Err(res) => return res,
    };

    match services.carts().add_product(cart_id, product_id).await {
        Ok(cart) => Json(cart).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path((cid, pid)): Path<(String, String)>,
) -> axum::response::Response {
    let (cart_id, product_id) = match parse_ids(&cid, &pid) {
        Ok(ids) => ids,
        Err(res) => return res,
    };

    match services.carts().remove_product(cart_id, product_id).await {
        Ok(cart) => Json(cart).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_ids(cid: &str, pid: &str) -> Result<(CartId, ProductId), axum::response::Response> {
    Ok((errors::parse_id(cid)?, errors::parse_id(pid)?))
}
