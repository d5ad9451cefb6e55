use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::error;

use shopfront_core::CartId;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn home(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let products = match services.products().list().await {
        Ok(products) => products,
        Err(e) => return errors::store_error_to_response(e),
    };
    page(services.views().home(&products))
}

pub async fn realtime_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let products = match services.products().list().await {
        Ok(products) => products,
        Err(e) => return errors::store_error_to_response(e),
    };
    page(services.views().realtime_products(&products))
}

pub async fn cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cid): Path<String>,
) -> axum::response::Response {
    let cart_id = match errors::parse_id::<CartId>(&cid) {
        Ok(id) => id,
        Err(res) => return res,
    };

    let cart = match services.carts().get(cart_id).await {
        Ok(cart) => cart,
        Err(e) => return errors::store_error_to_response(e),
    };
    let catalog = match services.products().list().await {
        Ok(products) => products,
        Err(e) => return errors::store_error_to_response(e),
    };
    page(services.views().cart(&cart, &catalog))
}

fn page(rendered: Result<String, handlebars::RenderError>) -> axum::response::Response {
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render page");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "render_error", e.to_string())
        }
    }
}
