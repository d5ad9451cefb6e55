//! Cart Store: cart lifecycle over the cart and product collections.

use std::sync::Arc;

use tracing::instrument;

use shopfront_carts::Cart;
use shopfront_core::{CartId, DomainError, ProductId};

use crate::persistence::{cart_mutation, CartRepository, ProductRepository, StoreError};

pub struct CartStore {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CartStore {
    pub fn new(carts: Arc<dyn CartRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { carts, products }
    }

    pub async fn create(&self) -> Result<Cart, StoreError> {
        self.carts.create().await
    }

    pub async fn get(&self, id: CartId) -> Result<Cart, StoreError> {
        self.carts
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("cart {id}")).into())
    }

    /// Add one unit of an existing product.
    #[instrument(skip(self), err)]
    pub async fn add_product(&self, cart_id: CartId, product_id: ProductId) -> Result<Cart, StoreError> {
        if self.products.find(product_id).await?.is_none() {
            // A missing cart is reported before a missing product.
            self.get(cart_id).await?;
            return Err(DomainError::not_found(format!("product {product_id}")).into());
        }

        self.carts
            .update(
                cart_id,
                cart_mutation(move |cart| {
                    cart.add_product(product_id);
                    Ok(())
                }),
            )
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn remove_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Cart, StoreError> {
        self.carts
            .update(cart_id, cart_mutation(move |cart| cart.remove_product(product_id)))
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn clear(&self, cart_id: CartId) -> Result<Cart, StoreError> {
        self.carts
            .update(
                cart_id,
                cart_mutation(|cart| {
                    cart.clear();
                    Ok(())
                }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{InMemoryCartRepository, InMemoryProductRepository};
    use shopfront_products::ProductInput;

    async fn fixture() -> (CartStore, ProductId) {
        let products = Arc::new(InMemoryProductRepository::new());
        let pen = ProductInput {
            name: Some("Pen".into()),
            price: Some(1.5.into()),
            code: Some("P001".into()),
            stock: Some(10.0.into()),
            ..ProductInput::default()
        }
        .validate()
        .unwrap();
        let pen = products.insert(pen).await.unwrap();

        let store = CartStore::new(Arc::new(InMemoryCartRepository::new()), products);
        (store, pen.id_typed())
    }

    #[tokio::test]
    async fn adding_twice_increments_quantity_and_persists() {
        let (store, pen) = fixture().await;
        let cart = store.create().await.unwrap();

        store.add_product(cart.id_typed(), pen).await.unwrap();
        let cart = store.add_product(cart.id_typed(), pen).await.unwrap();
        assert_eq!(cart.quantity_of(pen), 2);

        let reloaded = store.get(cart.id_typed()).await.unwrap();
        assert_eq!(reloaded, cart);
    }

    #[tokio::test]
    async fn unknown_product_or_cart_is_not_found() {
        let (store, pen) = fixture().await;
        let cart = store.create().await.unwrap();

        let err = store.add_product(cart.id_typed(), ProductId::new()).await.unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::NotFound(_))));

        let err = store.add_product(CartId::new(), pen).await.unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::NotFound(_))));
        assert!(store.get(cart.id_typed()).await.unwrap().lines().is_empty());
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let (store, pen) = fixture().await;
        let cart = store.create().await.unwrap();
        store.add_product(cart.id_typed(), pen).await.unwrap();

        let cart = store.remove_product(cart.id_typed(), pen).await.unwrap();
        assert!(cart.lines().is_empty());

        let err = store.remove_product(cart.id_typed(), pen).await.unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::NotFound(_))));

        store.add_product(cart.id_typed(), pen).await.unwrap();
        let cart = store.clear(cart.id_typed()).await.unwrap();
        assert!(cart.lines().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_all_counted() {
        let (store, pen) = fixture().await;
        let store = Arc::new(store);
        let cart_id = store.create().await.unwrap().id_typed();

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add_product(cart_id, pen).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.get(cart_id).await.unwrap().quantity_of(pen), 32);
    }
}
