//! Infrastructure layer: persistence adapters, stores, configuration.

pub mod cart_store;
pub mod config;
pub mod persistence;
pub mod product_store;

pub use cart_store::CartStore;
pub use config::Settings;
pub use persistence::{CartRepository, ProductRepository, StoreError};
pub use product_store::{Outcome, ProductStore};
