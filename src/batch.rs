//! Batch incident creation.
//!
//! [`submit_batch`] walks an ordered list of [`IncidentSpec`]s, creates each
//! one through an [`IncidentSubmitter`], and records a per-item [`Outcome`].
//! A failed item never stops the batch: the report always has one outcome
//! per input, in input order, with 1-based indices.
//!
//! Items are submitted strictly one after another. There is no rollback and
//! no retry; each create is independent.

use async_trait::async_trait;

use crate::error::SnowcapError;
use crate::models::{BatchReport, IncidentSpec, Outcome};

/// Something that can create a single incident.
///
/// [`TableClient`](crate::client::TableClient) is the production
/// implementation.
#[async_trait]
pub trait IncidentSubmitter: Send + Sync {
    /// Creates one incident and returns the created record.
    async fn submit(&self, spec: &IncidentSpec) -> Result<serde_json::Value, SnowcapError>;

    /// Removes secrets from an error message before it is reported.
    fn sanitize(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Creates every incident in `specs`, in order, and reports each result.
pub async fn submit_batch<S>(submitter: &S, specs: &[IncidentSpec]) -> BatchReport
where
    S: IncidentSubmitter + ?Sized,
{
    tracing::info!(count = specs.len(), "Submitting incident batch");

    let mut report = BatchReport::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        let index = i + 1;
        let outcome = match submitter.submit(spec).await {
            Ok(response) => {
                tracing::debug!(index, "Incident created");
                Outcome::Success { index, response }
            }
            Err(e) => {
                let error = submitter.sanitize(&e.to_string());
                tracing::warn!(
                    index,
                    kind = ?e.kind(),
                    error = %error,
                    "Failed to create incident"
                );
                Outcome::Failed { index, error }
            }
        };
        report.push(outcome);
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Incident batch complete"
    );

    report
}
