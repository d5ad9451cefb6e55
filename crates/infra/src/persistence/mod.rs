//! Persistence client boundary.
//!
//! Stores talk to durable storage only through these traits. Implementations
//! own connection lifecycle, id assignment, and the unique constraint on
//! product codes.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use shopfront_carts::Cart;
use shopfront_core::{CartId, DomainError, DomainResult, ProductId};
use shopfront_products::{NewProduct, Product};

pub use in_memory::{InMemoryCartRepository, InMemoryCollection, InMemoryProductRepository};
pub use postgres::PostgresDocumentStore;

/// Failure surfaced by a store or persistence adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Business-rule failure (validation, duplicate code, not found, bad id).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store could not be reached or failed mid-operation.
    #[error("connection error: {0}")]
    Connection(String),

    /// A stored document could not be decoded.
    #[error("stored document is malformed: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Durable product collection.
///
/// `insert` must enforce code uniqueness atomically (unique index or an
/// equivalent check under the collection's write lock) and report violations
/// as `DomainError::DuplicateCode`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a validated product and assign its id.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError>;

    /// All products in insertion order.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Returns `false` if nothing was removed.
    async fn remove(&self, id: ProductId) -> Result<bool, StoreError>;
}

/// A change applied to one cart inside [`CartRepository::update`].
pub type CartMutation = Box<dyn FnOnce(&mut Cart) -> DomainResult<()> + Send>;

/// Box a closure as a [`CartMutation`].
pub fn cart_mutation<F>(f: F) -> CartMutation
where
    F: FnOnce(&mut Cart) -> DomainResult<()> + Send + 'static,
{
    Box::new(f)
}

/// Durable cart collection.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Persist a new, empty cart and assign its id.
    async fn create(&self) -> Result<Cart, StoreError>;

    async fn find(&self, id: CartId) -> Result<Option<Cart>, StoreError>;

    /// Apply `mutation` to the stored cart and persist the result atomically.
    ///
    /// Concurrent updates of one cart are serialized: each sees the previous
    /// one's result. If the mutation fails nothing is written. `NotFound` if
    /// the cart was never created.
    async fn update(&self, id: CartId, mutation: CartMutation) -> Result<Cart, StoreError>;
}
