//! Per-item results of a batch create.
//!
//! A batch never aborts on a failed item, so the report holds exactly one
//! [`Outcome`] per input spec, in input order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of creating one incident in a batch.
///
/// Serializes as `{"index": 1, "status": "success", "response": {...}}`
/// or `{"index": 2, "status": "failed", "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The incident was created.
    Success {
        /// 1-based position in the input.
        index: usize,
        /// Decoded body returned by the create call.
        response: serde_json::Value,
    },
    /// The create call failed.
    Failed {
        /// 1-based position in the input.
        index: usize,
        /// Human-readable description of the failure.
        error: String,
    },
}

/// Status half of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Serialized as `"success"`.
    Success,
    /// Serialized as `"failed"`.
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => f.write_str("success"),
            OutcomeStatus::Failed => f.write_str("failed"),
        }
    }
}

impl Outcome {
    /// Returns the 1-based input position this outcome belongs to.
    pub fn index(&self) -> usize {
        match self {
            Outcome::Success { index, .. } | Outcome::Failed { index, .. } => *index,
        }
    }

    /// Returns whether the item succeeded or failed.
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Outcome::Success { .. } => OutcomeStatus::Success,
            Outcome::Failed { .. } => OutcomeStatus::Failed,
        }
    }

    /// Returns true if the incident was created.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Returns the decoded create response, if the item succeeded.
    pub fn response(&self) -> Option<&serde_json::Value> {
        match self {
            Outcome::Success { response, .. } => Some(response),
            Outcome::Failed { .. } => None,
        }
    }

    /// Returns the failure description, if the item failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Ordered outcomes of a batch, one per input item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchReport {
    outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// Number of outcomes (always equal to the number of input items).
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true for the report of an empty batch.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterates outcomes in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    /// Number of items that were created.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of items that failed.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Returns the outcomes in input order.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Consumes the report, returning the outcomes.
    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }
}

impl<'a> IntoIterator for &'a BatchReport {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_report() -> BatchReport {
        let mut report = BatchReport::with_capacity(2);
        report.push(Outcome::Success {
            index: 1,
            response: json!({"number": "INC0001"}),
        });
        report.push(Outcome::Failed {
            index: 2,
            error: "Request failed: 500".to_string(),
        });
        report
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let report = sample_report();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!([
                {"index": 1, "status": "success", "response": {"number": "INC0001"}},
                {"index": 2, "status": "failed", "error": "Request failed: 500"}
            ])
        );
    }

    #[test]
    fn test_report_counts() {
        let report = sample_report();
        assert_eq!(report.len(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_empty());
        assert!(BatchReport::default().is_empty());
    }

    #[test]
    fn test_outcome_accessors() {
        let report = sample_report();
        let first = &report.outcomes()[0];
        assert_eq!(first.index(), 1);
        assert_eq!(first.status(), OutcomeStatus::Success);
        assert_eq!(first.response().unwrap()["number"], "INC0001");
        assert!(first.error().is_none());

        let second = &report.outcomes()[1];
        assert_eq!(second.status().to_string(), "failed");
        assert_eq!(second.error(), Some("Request failed: 500"));
        assert!(second.response().is_none());
    }

    #[test]
    fn test_report_deserializes_from_printed_form() {
        let printed = serde_json::to_string(&sample_report()).unwrap();
        let parsed: BatchReport = serde_json::from_str(&printed).unwrap();
        assert_eq!(parsed, sample_report());
    }
}
