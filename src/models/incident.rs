//! Incident create payload.

use serde::{Deserialize, Serialize};

/// One incident to be created.
///
/// Serializes to exactly the JSON body the create endpoint expects:
/// `{"short_description", "caller_id", "assignment_group"}`.
/// Caller and group are opaque sys_id strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentSpec {
    /// One-line summary shown in incident lists.
    pub short_description: String,

    /// sys_id of the user reporting the incident.
    pub caller_id: String,

    /// sys_id of the group the incident is routed to.
    pub assignment_group: String,
}

impl IncidentSpec {
    /// Creates a new incident spec.
    pub fn new(
        short_description: impl Into<String>,
        caller_id: impl Into<String>,
        assignment_group: impl Into<String>,
    ) -> Self {
        Self {
            short_description: short_description.into(),
            caller_id: caller_id.into(),
            assignment_group: assignment_group.into(),
        }
    }
}
