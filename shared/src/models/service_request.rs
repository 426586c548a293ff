//! Service Request Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Values entered on the intake form (one service request).
///
/// Enumerated fields (`company`, `system_name`, `assignee`, `request_type`)
/// are plain strings; the UI restricts them to the configured reference data.
/// Optional text fields use the empty string for "not filled".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub company: String,
    pub team: String,
    pub requester: String,
    pub title: String,
    pub system_name: String,
    pub assignee: String,
    pub request_type: String,
    #[serde(with = "crate::util::flexible_date")]
    pub request_date: Option<NaiveDate>,
    #[serde(with = "crate::util::flexible_date")]
    pub due_date: Option<NaiveDate>,
    pub description: String,
    pub attachment_url: String,
    pub reply_email: String,
}

impl FormFields {
    /// True when no field carries a value.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Copy every non-empty value of `other` over `self`
    pub fn overlay(&mut self, other: &FormFields) {
        fn text(target: &mut String, value: &str) {
            if !value.trim().is_empty() {
                *target = value.to_string();
            }
        }

        text(&mut self.company, &other.company);
        text(&mut self.team, &other.team);
        text(&mut self.requester, &other.requester);
        text(&mut self.title, &other.title);
        text(&mut self.system_name, &other.system_name);
        text(&mut self.assignee, &other.assignee);
        text(&mut self.request_type, &other.request_type);
        text(&mut self.description, &other.description);
        text(&mut self.attachment_url, &other.attachment_url);
        text(&mut self.reply_email, &other.reply_email);
        if other.request_date.is_some() {
            self.request_date = other.request_date;
        }
        if other.due_date.is_some() {
            self.due_date = other.due_date;
        }
    }
}

/// Ticket priority accepted by the ticket service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "낮음")]
    Low,
    #[default]
    #[serde(rename = "보통")]
    Normal,
    #[serde(rename = "높음")]
    High,
    #[serde(rename = "긴급")]
    Urgent,
}

/// Create service request payload (`POST /api/sr/`)
///
/// Dates serialize as `yyyy-MM-dd`. Absent optional values serialize as
/// `null`, never as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequestCreate {
    pub title: String,
    pub team: String,
    pub assignee: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub system_name: String,
    pub request_date: NaiveDate,
    pub requester: String,
    pub summary: Option<String>,
    pub attachment_url: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub reply_email: Option<String>,
}

/// Ticket returned by the ticket service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i64,
    pub ticket_id: String,
    pub status: String,
    #[serde(default)]
    pub notion_page_id: Option<String>,
}

/// The part of a ticket shown to the user after a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub status: String,
}

impl From<TicketResponse> for Ticket {
    fn from(response: TicketResponse) -> Self {
        Self {
            ticket_id: response.ticket_id,
            status: response.status,
        }
    }
}

/// Health check response (`GET /api/health`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}
