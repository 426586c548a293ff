//! Form values → submission payload

use shared::{FormFields, Priority, ReferenceData, ServiceRequestCreate};
use std::collections::BTreeMap;

/// Priority sent with every request; the form has no priority input
pub const DEFAULT_PRIORITY: Priority = Priority::Normal;

/// Request-type label → ticket category.
///
/// Labels without an entry pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMapping {
    table: BTreeMap<String, String>,
}

impl CategoryMapping {
    /// Every label maps to itself
    pub fn identity<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = labels
            .into_iter()
            .map(|label| {
                let label = label.into();
                (label.clone(), label)
            })
            .collect();
        Self { table }
    }

    /// Identity over the configured request types, then the configured overrides
    pub fn from_reference(data: &ReferenceData) -> Self {
        let mut mapping = Self::identity(data.request_types.iter().cloned());
        for (label, category) in &data.category_map {
            mapping.set(label.clone(), category.clone());
        }
        mapping
    }

    pub fn set(&mut self, label: impl Into<String>, category: impl Into<String>) {
        self.table.insert(label.into(), category.into());
    }

    pub fn category_for(&self, label: &str) -> String {
        self.table
            .get(label)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build the wire payload from validated form values.
///
/// Returns `None` only when `request_date` is missing, which validation rejects.
pub fn build_payload(fields: &FormFields, mapping: &CategoryMapping) -> Option<ServiceRequestCreate> {
    Some(ServiceRequestCreate {
        title: fields.title.trim().to_string(),
        team: fields.team.trim().to_string(),
        assignee: fields.assignee.trim().to_string(),
        description: fields.description.clone(),
        category: mapping.category_for(fields.request_type.trim()),
        priority: DEFAULT_PRIORITY,
        system_name: fields.system_name.trim().to_string(),
        request_date: fields.request_date?,
        requester: fields.requester.trim().to_string(),
        summary: None,
        attachment_url: non_empty(&fields.attachment_url),
        due_date: fields.due_date,
        reply_email: non_empty(&fields.reply_email),
    })
}
