//! HTTP and realtime surface of the shop: JSON API, pages, and the product socket.

pub mod app;
pub mod realtime;
pub mod views;
