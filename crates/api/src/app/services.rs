//! Service wiring: repositories, stores, buses, and the realtime gateway.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use shopfront_events::InMemoryEventBus;
use shopfront_infra::persistence::{
    InMemoryCartRepository, InMemoryProductRepository, PostgresDocumentStore,
};
use shopfront_infra::{CartRepository, CartStore, ProductRepository, ProductStore, Settings};

use crate::realtime::{CatalogFanout, DomainBus, RealtimeBus, RealtimeGateway};
use crate::views::Views;

/// Everything request handlers need, shared behind an `Arc`.
pub struct AppServices {
    products: Arc<ProductStore<DomainBus>>,
    carts: CartStore,
    realtime: RealtimeBus,
    gateway: RealtimeGateway,
    views: Views,
}

impl AppServices {
    /// Wire the stores over the given repositories and start the catalog fan-out.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartRepository>,
    ) -> anyhow::Result<Self> {
        let domain: DomainBus = Arc::new(InMemoryEventBus::new());
        let realtime: RealtimeBus = Arc::new(InMemoryEventBus::new());

        let fanout = CatalogFanout::spawn(products.clone(), &domain, realtime.clone());

        let product_store = Arc::new(ProductStore::new(products.clone(), domain));
        let gateway = RealtimeGateway::new(product_store.clone(), fanout);

        Ok(Self {
            products: product_store,
            carts: CartStore::new(carts, products),
            realtime,
            gateway,
            views: Views::new()?,
        })
    }

    /// Fresh in-memory collections (dev and tests).
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::new(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryCartRepository::new()),
        )
    }

    pub fn products(&self) -> &ProductStore<DomainBus> {
        &self.products
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    pub fn realtime(&self) -> &RealtimeBus {
        &self.realtime
    }

    pub fn gateway(&self) -> &RealtimeGateway {
        &self.gateway
    }

    pub fn views(&self) -> &Views {
        &self.views
    }
}

/// Build services from settings.
///
/// - `USE_PERSISTENT_STORES=false` (default): in-memory collections.
/// - `USE_PERSISTENT_STORES=true`: Postgres document collections at `DB_URL`.
pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    if !settings.use_persistent_stores {
        info!("using in-memory stores");
        return AppServices::in_memory();
    }

    let store = PostgresDocumentStore::connect(&settings.db_url)
        .await
        .context("failed to connect to the document store at DB_URL")?;
    info!("connected to document store");

    let store = Arc::new(store);
    AppServices::new(store.clone(), store)
}
