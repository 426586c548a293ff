//! External ticket service seam
//!
//! The controller only sees [`TicketService`]; the HTTP client implements it
//! for production and tests plug in their own.

use async_trait::async_trait;
use shared::{ServiceRequestCreate, TicketResponse};
use sr_client::{ClientError, HttpClient};
use thiserror::Error;

/// Message shown when the failure carries nothing the user can act on
pub const GENERIC_FAILURE_MESSAGE: &str = "서버 오류가 발생했습니다. 다시 시도해주세요.";

/// Why a submission did not produce a ticket
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status; `message` comes from the response body
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Success status but the body is not a ticket
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl SubmissionError {
    /// Text for the failure notification
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            Self::Network(_) | Self::MalformedResponse(_) => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<ClientError> for SubmissionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, message } => Self::Rejected { status, message },
            ClientError::Http(e) => Self::Network(e.to_string()),
            ClientError::InvalidResponse(msg) => Self::MalformedResponse(msg),
            ClientError::Serialization(e) => Self::MalformedResponse(e.to_string()),
        }
    }
}

/// Files a service request and returns the created ticket
#[async_trait]
pub trait TicketService: Send + Sync {
    async fn submit(&self, payload: ServiceRequestCreate) -> Result<TicketResponse, SubmissionError>;
}

#[async_trait]
impl TicketService for HttpClient {
    async fn submit(&self, payload: ServiceRequestCreate) -> Result<TicketResponse, SubmissionError> {
        Ok(self.submit_service_request(&payload).await?)
    }
}
