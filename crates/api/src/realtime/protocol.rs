//! Wire protocol for the realtime channel.
//!
//! Frames are JSON objects of the form `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use shopfront_products::{Product, ProductInput};

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Create a product from a client-supplied candidate.
    AddProduct(ProductInput),
    /// Delete a product by its id (textual form).
    DeleteProduct(String),
}

/// Messages sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Catalog snapshot plus the outcome of the mutation that triggered it.
    UpdateProducts(UpdateProducts),
    /// Sent only to the client whose frame could not be understood.
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProducts {
    /// Absent when the catalog could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_products: Option<Vec<Product>>,
    pub success: bool,
    pub message: String,
}

impl UpdateProducts {
    pub fn succeeded(all_products: Vec<Product>, message: impl Into<String>) -> Self {
        Self {
            all_products: Some(all_products),
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(all_products: Option<Vec<Product>>, message: impl Into<String>) -> Self {
        Self {
            all_products,
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn add_product_frame_accepts_textual_numbers() {
        let frame = json!({
            "event": "addProduct",
            "data": {"name": "Pen", "price": "1.5", "code": "P001", "stock": 10, "imageUrl": "/pen.png"}
        });
        let ClientEvent::AddProduct(input) = serde_json::from_value(frame).unwrap() else {
            panic!("expected addProduct");
        };
        let product = input.validate().unwrap();
        assert_eq!(product.code(), "P001");
    }

    #[test]
    fn delete_product_frame_carries_a_bare_id() {
        let frame = json!({"event": "deleteProduct", "data": "0190a8f2-0000-7000-8000-000000000000"});
        assert_eq!(
            serde_json::from_value::<ClientEvent>(frame).unwrap(),
            ClientEvent::DeleteProduct("0190a8f2-0000-7000-8000-000000000000".into())
        );
    }

    #[test]
    fn unknown_events_are_rejected() {
        let frame = json!({"event": "dropTables", "data": {}});
        assert!(serde_json::from_value::<ClientEvent>(frame).is_err());
    }

    #[test]
    fn failed_update_without_listing_omits_all_products() {
        let event = ServerEvent::UpdateProducts(UpdateProducts::failed(None, "boom"));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "updateProducts", "data": {"success": false, "message": "boom"}})
        );
    }

    #[test]
    fn successful_update_lists_products() {
        let event = ServerEvent::UpdateProducts(UpdateProducts::succeeded(Vec::new(), "ok"));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "updateProducts", "data": {"allProducts": [], "success": true, "message": "ok"}})
        );
    }
}
