//! Shared types for the service-request intake
//!
//! Form values, submission wire types and reference data used by both
//! the HTTP client and the form engine.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    AssigneeContact, FormFields, HealthResponse, Priority, ReferenceData, ServiceRequestCreate,
    Ticket, TicketResponse,
};
