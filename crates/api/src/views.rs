//! Server-rendered pages.
//!
//! Templates are compiled into the binary and registered once at startup.

use anyhow::anyhow;
use handlebars::{Handlebars, RenderError};
use serde::Serialize;
use serde_json::json;

use shopfront_carts::Cart;
use shopfront_products::Product;

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("home", include_str!("../templates/home.hbs")),
    ("realtime_products", include_str!("../templates/realtime_products.hbs")),
    ("cart", include_str!("../templates/cart.hbs")),
];

pub struct Views {
    registry: Handlebars<'static>,
}

/// One rendered cart row, joined with the product it refers to.
#[derive(Debug, Serialize)]
struct CartRow {
    name: String,
    code: String,
    price: String,
    quantity: u32,
    subtotal: String,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut registry = Handlebars::new();
        for (name, source) in PARTIALS {
            registry
                .register_partial(name, *source)
                .map_err(|e| anyhow!("invalid partial '{name}': {e}"))?;
        }
        for (name, source) in PAGES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| anyhow!("invalid template '{name}': {e}"))?;
        }
        Ok(Self { registry })
    }

    /// Static product listing at `/`.
    pub fn home(&self, products: &[Product]) -> Result<String, RenderError> {
        self.registry
            .render("home", &json!({ "title": "Products", "products": products }))
    }

    /// Listing with the live add/delete form at `/realtimeproducts`.
    pub fn realtime_products(&self, products: &[Product]) -> Result<String, RenderError> {
        self.registry.render(
            "realtime_products",
            &json!({ "title": "Realtime products", "products": products }),
        )
    }

    /// Cart contents. Lines whose product no longer exists are shown as unknown.
    pub fn cart(&self, cart: &Cart, catalog: &[Product]) -> Result<String, RenderError> {
        let mut total = 0.0;
        let lines: Vec<CartRow> = cart
            .lines()
            .iter()
            .map(|line| {
                match catalog.iter().find(|p| p.id_typed() == line.product_id) {
                    Some(product) => {
                        let subtotal = product.price() * f64::from(line.quantity);
                        total += subtotal;
                        CartRow {
                            name: product.name().to_string(),
                            code: product.code().to_string(),
                            price: format!("{:.2}", product.price()),
                            quantity: line.quantity,
                            subtotal: format!("{subtotal:.2}"),
                        }
                    }
                    None => CartRow {
                        name: "Unknown product".to_string(),
                        code: line.product_id.to_string(),
                        price: "-".to_string(),
                        quantity: line.quantity,
                        subtotal: "-".to_string(),
                    },
                }
            })
            .collect();

        self.registry.render(
            "cart",
            &json!({
                "title": "Cart",
                "cartId": cart.id_typed().to_string(),
                "lines": lines,
                "total": format!("{total:.2}"),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::{CartId, ProductId};
    use shopfront_products::ProductInput;

    use super::*;

    fn product(code: &str, price: f64) -> Product {
        ProductInput {
            name: Some(format!("<b>{code}</b>")),
            price: Some(price.into()),
            code: Some(code.into()),
            stock: Some(3.0.into()),
            ..ProductInput::default()
        }
        .validate()
        .unwrap()
        .into_product(ProductId::new())
    }

    #[test]
    fn home_lists_products_and_escapes_text() {
        let views = Views::new().unwrap();
        let html = views.home(&[product("P001", 1.5)]).unwrap();
        assert!(html.contains("P001"));
        assert!(html.contains("&lt;b&gt;P001"));
        assert!(!html.contains("<b>P001"));
        assert!(!html.contains("No products yet."));

        let empty = views.home(&[]).unwrap();
        assert!(empty.contains("No products yet."));
    }

    #[test]
    fn realtime_page_loads_the_socket_client() {
        let views = Views::new().unwrap();
        let html = views.realtime_products(&[]).unwrap();
        assert!(html.contains("/static/js/realtime.js"));
        assert!(html.contains("product-form"));
    }

    #[test]
    fn cart_page_totals_known_lines() {
        let views = Views::new().unwrap();
        let pen = product("P001", 1.5);
        let mut cart = Cart::empty(CartId::new());
        cart.add_product(pen.id_typed());
        cart.add_product(pen.id_typed());
        cart.add_product(ProductId::new());

        let html = views.cart(&cart, &[pen]).unwrap();
        assert!(html.contains("Total: $3.00"));
        assert!(html.contains("Unknown product"));
    }
}
