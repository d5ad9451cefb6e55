//! In-memory collections for tests/dev.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use shopfront_carts::Cart;
use shopfront_core::{CartId, DomainError, Entity, ProductId};
use shopfront_products::{NewProduct, Product};

use super::{CartMutation, CartRepository, ProductRepository, StoreError};

/// Insertion-ordered collection of entities keyed by `Entity::id`.
///
/// Not optimized for large collections: lookups are linear scans.
#[derive(Debug)]
pub struct InMemoryCollection<E> {
    inner: RwLock<Vec<E>>,
}

impl<E> InMemoryCollection<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<E> Default for InMemoryCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryCollection<E>
where
    E: Entity + Clone,
{
    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<E>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::connection("in-memory collection lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<E>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::connection("in-memory collection lock poisoned"))
    }

    pub fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        Ok(self.read()?.iter().find(|e| e.id() == id).cloned())
    }

    pub fn find_by<F>(&self, pred: F) -> Result<Option<E>, StoreError>
    where
        F: Fn(&E) -> bool,
    {
        Ok(self.read()?.iter().find(|e| pred(e)).cloned())
    }

    pub fn list(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.read()?.clone())
    }

    /// Append `make()`'s entity unless `conflict` matches an existing one.
    ///
    /// The check and the append happen under one write lock.
    pub fn insert_unless<C, F>(&self, conflict: C, make: F) -> Result<Option<E>, StoreError>
    where
        C: Fn(&E) -> bool,
        F: FnOnce() -> E,
    {
        let mut items = self.write()?;
        if items.iter().any(|e| conflict(e)) {
            return Ok(None);
        }
        let entity = make();
        items.push(entity.clone());
        Ok(Some(entity))
    }

    /// Mutate the entity with `id` under the write lock.
    ///
    /// The change is applied to a copy and stored only if `f` succeeds.
    /// Returns `Ok(None)` if absent.
    pub fn update<F>(&self, id: &E::Id, f: F) -> Result<Option<E>, StoreError>
    where
        F: FnOnce(&mut E) -> Result<(), StoreError>,
    {
        let mut items = self.write()?;
        let Some(slot) = items.iter_mut().find(|e| e.id() == id) else {
            return Ok(None);
        };
        let mut updated = slot.clone();
        f(&mut updated)?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    pub fn remove(&self, id: &E::Id) -> Result<bool, StoreError> {
        let mut items = self.write()?;
        let before = items.len();
        items.retain(|e| e.id() != id);
        Ok(items.len() != before)
    }
}

/// In-memory product collection.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: InMemoryCollection<Product>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let code = product.code().to_string();
        self.products
            .insert_unless(
                |existing| existing.code() == code,
                || product.into_product(ProductId::new()),
            )?
            .ok_or_else(|| DomainError::duplicate_code(code.clone()).into())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.products.get(&id)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError> {
        self.products.find_by(|p| p.code() == code)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.products.list()
    }

    async fn remove(&self, id: ProductId) -> Result<bool, StoreError> {
        self.products.remove(&id)
    }
}

/// In-memory cart collection.
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: InMemoryCollection<Cart>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn create(&self) -> Result<Cart, StoreError> {
        let cart = Cart::empty(CartId::new());
        self.carts.insert_unless(|_| false, || cart.clone())?;
        Ok(cart)
    }

    async fn find(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        self.carts.get(&id)
    }

    async fn update(&self, id: CartId, mutation: CartMutation) -> Result<Cart, StoreError> {
        self.carts
            .update(&id, |cart| mutation(cart).map_err(StoreError::from))?
            .ok_or_else(|| DomainError::not_found(format!("cart {id}")).into())
    }
}
