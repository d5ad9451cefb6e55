//! Realtime catalog channel.
//!
//! Clients connect over a WebSocket at `/ws`, send `addProduct` /
//! `deleteProduct` events, and receive `updateProducts` snapshots whenever the
//! catalog changes.
//!
//! ```text
//!  socket ──ClientEvent──▶ RealtimeGateway ──▶ ProductStore ──▶ DomainBus
//!                                 │                                │
//!                         (rejected adds)                          │
//!                                 ▼                                ▼
//!                            CatalogFanout ◀───────────────────────┘
//!                                 │
//!                          updateProducts
//!                                 ▼
//!                            RealtimeBus ──▶ every connected socket
//! ```
//!
//! Successful mutations reach clients through the domain bus, so a REST call
//! and a socket event produce the same broadcast.

use std::sync::Arc;

use shopfront_events::InMemoryEventBus;
use shopfront_infra::product_store::ProductEnvelope;

pub mod fanout;
pub mod gateway;
pub mod protocol;
pub mod socket;

pub use fanout::CatalogFanout;
pub use gateway::RealtimeGateway;
pub use protocol::{ClientEvent, ErrorPayload, ServerEvent, UpdateProducts};

/// Domain bus carrying product events out of the store.
pub type DomainBus = Arc<InMemoryEventBus<ProductEnvelope>>;

/// Bus every connected socket subscribes to.
pub type RealtimeBus = Arc<InMemoryEventBus<ServerEvent>>;
