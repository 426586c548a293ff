//! Reference Data Model
//!
//! Closed sets the form offers as choices. Loaded once at startup and never
//! edited by the user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A person responsible for a system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeContact {
    pub name: String,
    pub email: String,
}

/// Companies, systems, request types and the system → assignee directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub companies: Vec<String>,
    pub systems: Vec<String>,
    pub request_types: Vec<String>,
    /// system name → responsible contacts
    pub assignees: BTreeMap<String, Vec<AssigneeContact>>,
    /// request type label → ticket category; labels not listed map to themselves
    #[serde(default)]
    pub category_map: BTreeMap<String, String>,
}

impl ReferenceData {
    /// Contacts responsible for `system` (empty for unknown systems)
    pub fn assignees_for(&self, system: &str) -> &[AssigneeContact] {
        self.assignees.get(system).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `name` is listed as a contact for `system`
    pub fn is_assignee_of(&self, system: &str, name: &str) -> bool {
        self.assignees_for(system).iter().any(|c| c.name == name)
    }

    /// Cross-table inconsistencies, one human-readable line each
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for system in self.assignees.keys() {
            if !self.systems.contains(system) {
                issues.push(format!("assignee directory lists unknown system '{system}'"));
            }
        }
        for label in self.category_map.keys() {
            if !self.request_types.contains(label) {
                issues.push(format!("category map lists unknown request type '{label}'"));
            }
        }
        for (name, set) in [
            ("companies", &self.companies),
            ("systems", &self.systems),
            ("request_types", &self.request_types),
        ] {
            if set.is_empty() {
                issues.push(format!("{name} is empty"));
            }
        }

        issues
    }
}
