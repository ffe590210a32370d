//! Storage abstractions for service layer
//!
//! In-memory stores shared between concurrent request handlers.

pub mod map_store;
