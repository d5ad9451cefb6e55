//! Single publisher of `updateProducts`.
//!
//! Every catalog update reaches clients through one task, so broadcasts go out
//! in the order their causes happened. Two inputs feed it:
//!
//! - product domain events from the store (successful mutations)
//! - rejected `addProduct` attempts reported by the gateway
//!
//! The domain subscription is polled first. A mutation's event is enqueued
//! before its `create`/`delete` call returns, so it is already queued by the
//! time any later rejection from the same caller is reported, and is
//! broadcast ahead of it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use shopfront_events::EventBus;
use shopfront_infra::product_store::ProductEnvelope;
use shopfront_infra::ProductRepository;
use shopfront_products::ProductEvent;

use super::{DomainBus, RealtimeBus, ServerEvent, UpdateProducts};

/// Handle for reporting rejected mutations to the fan-out task.
#[derive(Debug, Clone)]
pub struct CatalogFanout {
    rejections: mpsc::UnboundedSender<String>,
}

impl CatalogFanout {
    /// Subscribe to `domain` and spawn the broadcasting task.
    ///
    /// The subscription is taken before this returns, so events published
    /// afterwards are never missed. The task ends once the domain bus and
    /// every handle are dropped.
    pub fn spawn(
        products: Arc<dyn ProductRepository>,
        domain: &DomainBus,
        realtime: RealtimeBus,
    ) -> Self {
        let events = domain.subscribe();
        let (tx, rejections) = mpsc::unbounded_channel();

        let task = Broadcaster { products, realtime };
        tokio::spawn(task.run(events, rejections));

        Self { rejections: tx }
    }

    /// Broadcast `success:false` with `message` and the current listing.
    pub fn reject(&self, message: impl Into<String>) {
        if self.rejections.send(message.into()).is_err() {
            error!("catalog fan-out stopped; rejection not broadcast");
        }
    }
}

struct Broadcaster {
    products: Arc<dyn ProductRepository>,
    realtime: RealtimeBus,
}

impl Broadcaster {
    async fn run(
        self,
        mut events: shopfront_events::Subscription<ProductEnvelope>,
        mut rejections: mpsc::UnboundedReceiver<String>,
    ) {
        loop {
            tokio::select! {
                biased;

                Some(envelope) = events.recv() => self.changed(envelope).await,
                Some(message) = rejections.recv() => self.rejected(message).await,
                else => break,
            }
        }
    }

    async fn changed(&self, envelope: ProductEnvelope) {
        info!(
            event_type = envelope.event_type(),
            entity_id = envelope.entity_id(),
            "catalog changed"
        );

        let update = match self.products.list().await {
            Ok(all) => UpdateProducts::succeeded(all, envelope.payload().message()),
            Err(e) => match envelope.payload() {
                ProductEvent::ProductCreated(_) => UpdateProducts::failed(None, e.to_string()),
                ProductEvent::ProductDeleted(_) => {
                    warn!(error = %e, "failed to list products after delete; not broadcast");
                    return;
                }
            },
        };
        self.publish(update);
    }

    async fn rejected(&self, message: String) {
        let all_products = match self.products.list().await {
            Ok(all) => Some(all),
            Err(e) => {
                error!(error = %e, "failed to list products after rejected addProduct");
                None
            }
        };
        self.publish(UpdateProducts::failed(all_products, message));
    }

    fn publish(&self, update: UpdateProducts) {
        if let Err(e) = self.realtime.publish(ServerEvent::UpdateProducts(update)) {
            error!(error = %e, "failed to broadcast updateProducts");
        }
    }
}
