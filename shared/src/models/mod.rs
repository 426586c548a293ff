//! Data models
//!
//! `service_request` holds what the user types and what goes over the wire;
//! `reference` holds the read-only lookup tables the form is built from.

pub mod reference;
pub mod service_request;

// Re-exports
pub use reference::*;
pub use service_request::*;
