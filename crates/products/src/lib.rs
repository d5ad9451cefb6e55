//! Products domain module.
//!
//! This crate contains the catalog's business rules (required fields, numeric
//! coercion, event shapes), implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod product;

pub use product::{
    NewProduct, Numeric, Product, ProductCreated, ProductDeleted, ProductEvent, ProductInput,
    ENTITY_TYPE,
};
