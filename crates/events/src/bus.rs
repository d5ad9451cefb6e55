//! Event publishing/subscription abstraction (mechanics only).
//!
//! This module provides the **event bus pattern**: a pub/sub mechanism for
//! distributing messages to every interested consumer (realtime connections,
//! fan-out workers, loggers).
//!
//! ## Guarantees
//!
//! - **Broadcast**: every live subscription receives its own copy of each message.
//! - **Per-publisher ordering**: messages from one publisher arrive in publish order.
//! - **No persistence**: the bus distributes, the persistence layer stores.
//! - **Unbounded**: there is no backpressure; slow subscribers buffer in memory.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};

/// Error returned by [`Subscription::recv_timeout`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
    #[error("timed out waiting for a message")]
    Timeout,
    #[error("event bus closed")]
    Disconnected,
}

/// A subscription to an event stream.
///
/// ## Usage Pattern
///
/// ```ignore
/// let mut subscription = bus.subscribe();
/// while let Some(message) = subscription.recv().await {
///     forward(message).await?;
/// }
/// ```
///
/// Dropping the subscription unsubscribes it; the bus prunes it on the next publish.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: UnboundedReceiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait until the next message is available. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Wait for up to `timeout` for a message.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(RecvTimeoutError::Disconnected),
            Err(_) => Err(RecvTimeoutError::Timeout),
        }
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// ProductStore (persist) ──► domain bus ──► fan-out worker ──► realtime bus ──► sockets
/// ```
///
/// Publishers call `publish` only after the state change the message describes
/// is durable, so a subscriber reading back from persistence always observes it.
///
/// The trait requires `Send + Sync`: many request tasks publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for std::sync::Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
