//! Handles decoded client events.
//!
//! Successful mutations are announced by the store on the domain bus. Rejected
//! `addProduct` attempts are reported to the same [`CatalogFanout`], which
//! publishes every `updateProducts` in order. Failed deletes are logged and
//! nothing is sent.

use std::sync::Arc;

use tracing::{debug, warn};

use shopfront_core::ProductId;
use shopfront_infra::ProductStore;
use shopfront_products::ProductInput;

use super::{CatalogFanout, ClientEvent, DomainBus};

#[derive(Clone)]
pub struct RealtimeGateway {
    products: Arc<ProductStore<DomainBus>>,
    fanout: CatalogFanout,
}

impl RealtimeGateway {
    pub fn new(products: Arc<ProductStore<DomainBus>>, fanout: CatalogFanout) -> Self {
        Self { products, fanout }
    }

    pub async fn handle(&self, event: ClientEvent) {
        match event {
            ClientEvent::AddProduct(input) => self.add_product(input).await,
            ClientEvent::DeleteProduct(raw_id) => self.delete_product(&raw_id).await,
        }
    }

    async fn add_product(&self, input: ProductInput) {
        match self.products.create(input).await {
            Ok(outcome) => debug!(product_id = %outcome.value.id_typed(), "addProduct accepted"),
            Err(e) => {
                warn!(error = %e, "addProduct rejected");
                self.fanout.reject(e.to_string());
            }
        }
    }

    async fn delete_product(&self, raw_id: &str) {
        let id = match raw_id.parse::<ProductId>() {
            Ok(id) => id,
            Err(e) => {
                warn!(raw_id, error = %e, "deleteProduct ignored");
                return;
            }
        };

        match self.products.delete(id).await {
            Ok(_) => debug!(product_id = %id, "deleteProduct accepted"),
            Err(e) => warn!(product_id = %id, error = %e, "deleteProduct failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use shopfront_events::{EventBus, InMemoryEventBus, RecvTimeoutError, Subscription};
    use shopfront_infra::persistence::InMemoryProductRepository;
    use shopfront_infra::{ProductRepository, StoreError};
    use shopfront_products::{NewProduct, Product};

    use super::*;
    use crate::realtime::{RealtimeBus, ServerEvent, UpdateProducts};

    struct Harness {
        gateway: RealtimeGateway,
        store: Arc<ProductStore<DomainBus>>,
        realtime: RealtimeBus,
        /// Subscribed from the start; used to wait for setup broadcasts.
        feed: Subscription<ServerEvent>,
    }

    impl Harness {
        fn with(repo: Arc<dyn ProductRepository>) -> Self {
            let domain: DomainBus = Arc::new(InMemoryEventBus::new());
            let realtime: RealtimeBus = Arc::new(InMemoryEventBus::new());
            let feed = realtime.subscribe();
            let store = Arc::new(ProductStore::new(repo.clone(), domain.clone()));
            let fanout = CatalogFanout::spawn(repo, &domain, realtime.clone());

            Self {
                gateway: RealtimeGateway::new(store.clone(), fanout),
                store,
                realtime,
                feed,
            }
        }

        fn new() -> Self {
            Self::with(Arc::new(InMemoryProductRepository::new()))
        }

        /// Create through the store and wait until its broadcast went out, so
        /// later subscribers start from a quiet channel.
        async fn seed(&mut self, code: &str) -> Product {
            let product = self.store.create(pen(code)).await.unwrap().value;
            let update = next_update(&mut self.feed).await;
            assert!(update.success);
            product
        }
    }

    fn pen(code: &str) -> ProductInput {
        ProductInput {
            name: Some("Pen".into()),
            price: Some(1.5.into()),
            code: Some(code.into()),
            stock: Some(10.0.into()),
            ..ProductInput::default()
        }
    }

    async fn next_update(sub: &mut Subscription<ServerEvent>) -> UpdateProducts {
        match sub.recv_timeout(Duration::from_secs(1)).await {
            Ok(ServerEvent::UpdateProducts(update)) => update,
            other => panic!("expected updateProducts, got {other:?}"),
        }
    }

    async fn assert_silent(sub: &mut Subscription<ServerEvent>) {
        assert!(matches!(
            sub.recv_timeout(Duration::from_millis(100)).await,
            Err(RecvTimeoutError::Timeout)
        ));
    }

    #[tokio::test]
    async fn add_product_broadcasts_listing_to_every_client() {
        let h = Harness::new();
        let mut a = h.realtime.subscribe();
        let mut b = h.realtime.subscribe();

        h.gateway.handle(ClientEvent::AddProduct(pen("P001"))).await;

        for sub in [&mut a, &mut b] {
            let update = next_update(sub).await;
            assert!(update.success);
            assert_eq!(update.message, "Product 'P001' created successfully");
            let products = update.all_products.unwrap();
            assert_eq!(products.len(), 1);
            assert_eq!(products[0].code(), "P001");
        }
        assert_silent(&mut a).await;
    }

    #[tokio::test]
    async fn back_to_back_adds_are_broadcast_in_order() {
        let h = Harness::new();
        let mut sub = h.realtime.subscribe();

        h.gateway.handle(ClientEvent::AddProduct(pen("P001"))).await;
        h.gateway.handle(ClientEvent::AddProduct(pen("P001"))).await;

        let first = next_update(&mut sub).await;
        assert!(first.success, "first update was {first:?}");
        assert_eq!(first.message, "Product 'P001' created successfully");

        let second = next_update(&mut sub).await;
        assert!(!second.success);
        assert_eq!(second.message, "a product with code 'P001' already exists");
        assert_eq!(second.all_products.unwrap().len(), 1);
        assert_silent(&mut sub).await;
    }

    #[tokio::test]
    async fn add_then_delete_is_broadcast_in_order() {
        let h = Harness::new();
        let mut sub = h.realtime.subscribe();

        h.gateway.handle(ClientEvent::AddProduct(pen("P001"))).await;
        let id = h.store.list().await.unwrap()[0].id_typed();
        h.gateway
            .handle(ClientEvent::DeleteProduct(id.to_string()))
            .await;

        assert_eq!(
            next_update(&mut sub).await.message,
            "Product 'P001' created successfully"
        );
        let deleted = next_update(&mut sub).await;
        assert_eq!(deleted.message, "Product 'P001' deleted successfully");
        assert_eq!(deleted.all_products, Some(Vec::new()));
    }

    #[tokio::test]
    async fn duplicate_add_broadcasts_failure_with_unchanged_listing() {
        let mut h = Harness::new();
        h.seed("P001").await;
        let mut sub = h.realtime.subscribe();

        h.gateway.handle(ClientEvent::AddProduct(pen("P001"))).await;

        let update = next_update(&mut sub).await;
        assert!(!update.success);
        assert!(update.message.contains("P001"));
        assert_eq!(update.all_products.unwrap().len(), 1);
        assert_silent(&mut sub).await;
    }

    #[tokio::test]
    async fn invalid_add_broadcasts_validation_failure() {
        let h = Harness::new();
        let mut sub = h.realtime.subscribe();

        h.gateway
            .handle(ClientEvent::AddProduct(ProductInput {
                name: None,
                ..pen("P001")
            }))
            .await;

        let update = next_update(&mut sub).await;
        assert!(!update.success);
        assert_eq!(update.message, "validation failed: name is required");
        assert_eq!(update.all_products, Some(Vec::new()));
    }

    #[tokio::test]
    async fn delete_product_broadcasts_remaining_listing() {
        let mut h = Harness::new();
        let doomed = h.seed("P001").await;
        h.seed("P002").await;
        let mut sub = h.realtime.subscribe();

        h.gateway
            .handle(ClientEvent::DeleteProduct(doomed.id_typed().to_string()))
            .await;

        let update = next_update(&mut sub).await;
        assert!(update.success);
        assert_eq!(update.message, "Product 'P001' deleted successfully");
        let codes: Vec<_> = update
            .all_products
            .unwrap()
            .iter()
            .map(|p| p.code().to_string())
            .collect();
        assert_eq!(codes, vec!["P002"]);
    }

    #[tokio::test]
    async fn failed_deletes_are_not_broadcast() {
        let mut h = Harness::new();
        h.seed("P001").await;
        let mut sub = h.realtime.subscribe();

        h.gateway
            .handle(ClientEvent::DeleteProduct(ProductId::new().to_string()))
            .await;
        h.gateway
            .handle(ClientEvent::DeleteProduct("not-an-id".into()))
            .await;

        assert_silent(&mut sub).await;
        assert_eq!(h.store.list().await.unwrap().len(), 1);
    }

    /// Every call fails as if the database were down.
    struct UnreachableRepository;

    #[async_trait]
    impl ProductRepository for UnreachableRepository {
        async fn insert(&self, _product: NewProduct) -> Result<Product, StoreError> {
            Err(StoreError::connection("database unavailable"))
        }

        async fn find(&self, _id: ProductId) -> Result<Option<Product>, StoreError> {
            Err(StoreError::connection("database unavailable"))
        }

        async fn find_by_code(&self, _code: &str) -> Result<Option<Product>, StoreError> {
            Err(StoreError::connection("database unavailable"))
        }

        async fn list(&self) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::connection("database unavailable"))
        }

        async fn remove(&self, _id: ProductId) -> Result<bool, StoreError> {
            Err(StoreError::connection("database unavailable"))
        }
    }

    #[tokio::test]
    async fn failed_add_without_readable_catalog_omits_listing() {
        let h = Harness::with(Arc::new(UnreachableRepository));
        let mut sub = h.realtime.subscribe();

        h.gateway.handle(ClientEvent::AddProduct(pen("P001"))).await;

        let update = next_update(&mut sub).await;
        assert!(!update.success);
        assert!(update.all_products.is_none());
        assert!(update.message.contains("database unavailable"));
    }
}
