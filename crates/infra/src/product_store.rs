//! Product Store: the catalog's business-rule boundary.
//!
//! Every product mutation in the application goes through [`ProductStore`]. It
//! validates candidates, enforces code uniqueness, persists through the
//! injected [`ProductRepository`], and publishes a domain event once the change
//! is durable.
//!
//! ## Mutation Flow
//!
//! ```text
//! ProductInput
//!   ↓
//! 1. Validate (required fields, numeric coercion)
//!   ↓
//! 2. Fast-path duplicate check (find_by_code)
//!   ↓
//! 3. Persist (repository assigns id; unique index is the real guard)
//!   ↓
//! 4. Publish ProductCreated / ProductDeleted on the domain bus
//! ```
//!
//! Step 2 only produces a friendlier early rejection; two concurrent creates with
//! the same code can both pass it, and the repository's constraint then rejects
//! the loser with the same `DuplicateCode` error.
//!
//! Nothing is retried: a successful call mutates storage exactly once.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, instrument};

use shopfront_core::{DomainError, ProductId};
use shopfront_events::{EventBus, EventEnvelope};
use shopfront_products::{
    Product, ProductCreated, ProductDeleted, ProductEvent, ProductInput, ENTITY_TYPE,
};

use crate::persistence::{ProductRepository, StoreError};

/// Success descriptor returned by mutating store operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub value: T,
}

impl<T> Outcome<T> {
    pub fn ok(message: impl Into<String>, value: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            value,
        }
    }
}

/// Domain bus message type for product events.
pub type ProductEnvelope = EventEnvelope<ProductEvent>;

/// Validates, persists, and announces product mutations.
///
/// ## Generic Parameters
///
/// - `B`: domain event bus the store publishes to after each successful mutation
pub struct ProductStore<B> {
    repo: Arc<dyn ProductRepository>,
    bus: B,
}

impl<B> ProductStore<B>
where
    B: EventBus<ProductEnvelope>,
{
    pub fn new(repo: Arc<dyn ProductRepository>, bus: B) -> Self {
        Self { repo, bus }
    }

    /// Shared handle to the underlying repository (read-only callers such as carts).
    pub fn repository(&self) -> Arc<dyn ProductRepository> {
        self.repo.clone()
    }

    /// Validate and persist a new product.
    #[instrument(skip(self, candidate), fields(code = ?candidate.code), err)]
    pub async fn create(&self, candidate: ProductInput) -> Result<Outcome<Product>, StoreError> {
        let new_product = candidate.validate()?;

        if self.repo.find_by_code(new_product.code()).await?.is_some() {
            return Err(DomainError::duplicate_code(new_product.code()).into());
        }

        let product = self.repo.insert(new_product).await?;

        let event = ProductEvent::ProductCreated(ProductCreated {
            product: product.clone(),
            occurred_at: Utc::now(),
        });
        let message = event.message();
        self.announce(event);

        Ok(Outcome::ok(message, product))
    }

    /// All stored products in insertion order.
    pub async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("product {id}")).into())
    }

    /// Remove a product by id.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: ProductId) -> Result<Outcome<()>, StoreError> {
        let product = self.get(id).await?;

        // A concurrent delete may win between the lookup and the removal.
        if !self.repo.remove(id).await? {
            return Err(DomainError::not_found(format!("product {id}")).into());
        }

        let event = ProductEvent::ProductDeleted(ProductDeleted {
            product_id: id,
            code: product.code().to_string(),
            occurred_at: Utc::now(),
        });
        let message = event.message();
        self.announce(event);

        Ok(Outcome::ok(message, ()))
    }

    /// Publish after the mutation is durable.
    ///
    /// A publish failure does not undo the mutation, so it is logged rather
    /// than returned: the caller's write did succeed.
    fn announce(&self, event: ProductEvent) {
        let envelope = EventEnvelope::wrap(ENTITY_TYPE, event.product_id(), event);
        let event_type = envelope.event_type();

        match self.bus.publish(envelope) {
            Ok(()) => debug!(event_type, "published product event"),
            Err(e) => error!(event_type, error = %e, "failed to publish product event"),
        }
    }
}
