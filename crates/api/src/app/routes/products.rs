use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use shopfront_core::ProductId;
use shopfront_products::ProductInput;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:pid", get(get_product).delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ProductInput>,
) -> axum::response::Response {
    match services.products().create(body).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(json!({
                "success": outcome.success,
                "message": outcome.message,
                "product": outcome.value,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products().list().await {
        Ok(items) => Json(json!({ "items": items })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(pid): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ProductId>(&pid) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.products().get(id).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(pid): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ProductId>(&pid) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.products().delete(id).await {
        Ok(outcome) => Json(json!({
            "success": outcome.success,
            "message": outcome.message,
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
