//! SR Client - HTTP client for the ticket service
//!
//! Provides network-based HTTP calls to the service-request API.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared wire types for convenience
pub use shared::{HealthResponse, ServiceRequestCreate, TicketResponse};
