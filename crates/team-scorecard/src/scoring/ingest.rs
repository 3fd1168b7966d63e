use serde::Serialize;
use tracing::{info, warn};

use super::repository::StoreError;

/// Result of a batch insert; partial failures are reported here, not as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub inserted: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// A batch that was rejected before any row was processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("no {0} records supplied")]
    EmptyBatch(&'static str),
}

/// Try the bulk path first; on failure insert row by row and count what sticks.
pub(crate) fn insert_batch<T>(
    kind: &'static str,
    records: Vec<T>,
    bulk: impl FnOnce(&[T]) -> Result<usize, StoreError>,
    mut single: impl FnMut(T) -> Result<(), StoreError>,
) -> Result<BatchOutcome, IngestError> {
    if records.is_empty() {
        return Err(IngestError::EmptyBatch(kind));
    }

    let attempted = records.len();
    match bulk(&records) {
        Ok(inserted) => {
            info!(kind, inserted, "bulk insert succeeded");
            return Ok(BatchOutcome {
                attempted,
                inserted,
                failed: attempted.saturating_sub(inserted),
                errors: Vec::new(),
            });
        }
        Err(err) => {
            warn!(kind, error = %err, "bulk insert failed, retrying row by row");
        }
    }

    let mut outcome = BatchOutcome {
        attempted,
        ..BatchOutcome::default()
    };
    for (index, record) in records.into_iter().enumerate() {
        match single(record) {
            Ok(()) => outcome.inserted += 1,
            Err(err) => {
                outcome.failed += 1;
                outcome.errors.push(format!("row {index}: {err}"));
            }
        }
    }

    info!(
        kind,
        inserted = outcome.inserted,
        failed = outcome.failed,
        "row-by-row insert finished"
    );
    Ok(outcome)
}
