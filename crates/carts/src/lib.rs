//! Shopping carts domain module.
//!
//! Pure state transitions over a cart's product lines; existence of the
//! referenced products is checked by the infrastructure layer.

pub mod cart;

pub use cart::{Cart, CartLine};
