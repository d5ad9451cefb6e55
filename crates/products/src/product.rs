use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult, Entity, ProductId};
use shopfront_events::Event;

/// Entity type name used on event envelopes.
pub const ENTITY_TYPE: &str = "products.product";

/// A numeric field as submitted by a client.
///
/// HTML forms and hand-written socket payloads send numbers as text as often as
/// JSON numbers; both are accepted and coerced during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Coerce to a finite, non-negative number.
    fn non_negative(&self, field: &str) -> DomainResult<f64> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| DomainError::validation(format!("{field} must be a number")))?,
        };

        if !value.is_finite() {
            return Err(DomainError::validation(format!("{field} must be a finite number")));
        }
        if value < 0.0 {
            return Err(DomainError::validation(format!("{field} cannot be negative")));
        }
        // `-0.0` passes the check above; store it as `0.0`.
        Ok(value + 0.0)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

/// Unvalidated product candidate, exactly as extracted from a request.
///
/// Missing fields stay `None`; nothing is defaulted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Numeric>,
    pub image_url: Option<String>,
    pub code: Option<String>,
    pub stock: Option<Numeric>,
}

impl ProductInput {
    /// Enforce required fields and coerce numerics.
    ///
    /// Code uniqueness is not checked here: it needs the stored collection.
    pub fn validate(self) -> DomainResult<NewProduct> {
        let name = required_text(self.name, "name")?;
        let code = required_text(self.code, "code")?;

        let price = self
            .price
            .ok_or_else(|| DomainError::validation("price is required"))?
            .non_negative("price")?;

        let stock = self
            .stock
            .ok_or_else(|| DomainError::validation("stock is required"))?
            .non_negative("stock")?;
        if stock.fract() != 0.0 {
            return Err(DomainError::validation("stock must be a whole number"));
        }
        if stock > f64::from(u32::MAX) {
            return Err(DomainError::validation("stock is too large"));
        }

        Ok(NewProduct {
            name,
            description: optional_text(self.description),
            price,
            image_url: optional_text(self.image_url),
            code,
            stock: stock as u32,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// A validated product that has not been assigned an id yet.
///
/// This is the document shape persisted by storage adapters. Outside this crate
/// it can only be built through [`ProductInput::validate`] (or read back from a
/// store that was written through it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    code: String,
    stock: u32,
}

impl NewProduct {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach the persistence-assigned id.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            code: self.code,
            stock: self.stock,
        }
    }
}

/// A stored catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    code: String,
    stock: u32,
}

impl Product {
    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product: Product,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductDeleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: ProductId,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductDeleted(ProductDeleted),
}

impl ProductEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductEvent::ProductCreated(e) => e.product.id_typed(),
            ProductEvent::ProductDeleted(e) => e.product_id,
        }
    }

    /// Human-readable outcome shown to clients after the mutation.
    pub fn message(&self) -> String {
        match self {
            ProductEvent::ProductCreated(e) => {
                format!("Product '{}' created successfully", e.product.code())
            }
            ProductEvent::ProductDeleted(e) => {
                format!("Product '{}' deleted successfully", e.code)
            }
        }
    }
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::ProductDeleted(_) => "products.product.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductDeleted(e) => e.occurred_at,
        }
    }
}
