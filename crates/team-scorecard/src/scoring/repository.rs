use serde::Serialize;

use super::config::ScoringConfig;
use super::domain::{
    ActivityRecord, IncomingCallRecord, NameAliasMapping, OutgoingCallRecord, PeriodFilter,
};

/// Storage abstraction over the record tables, alias table and scoring config slot.
pub trait RecordStore: Send + Sync {
    fn find_activity(&self, filter: &PeriodFilter) -> Result<Vec<ActivityRecord>, StoreError>;
    fn find_incoming_calls(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<IncomingCallRecord>, StoreError>;
    fn find_outgoing_calls(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<OutgoingCallRecord>, StoreError>;

    fn find_alias_mappings(&self) -> Result<Vec<NameAliasMapping>, StoreError>;
    fn insert_alias_mapping(&self, mapping: NameAliasMapping) -> Result<(), StoreError>;

    fn scoring_config(&self) -> Result<Option<ScoringConfig>, StoreError>;
    fn replace_scoring_config(&self, config: ScoringConfig) -> Result<(), StoreError>;

    /// Remove one month from all three record tables as a single unit.
    fn delete_period(&self, month: &str, year: i32) -> Result<DeletionSummary, StoreError>;

    fn insert_activity(&self, record: ActivityRecord) -> Result<(), StoreError>;
    /// All-or-nothing bulk insert.
    fn insert_activities(&self, records: &[ActivityRecord]) -> Result<usize, StoreError>;

    fn insert_incoming_call(&self, record: IncomingCallRecord) -> Result<(), StoreError>;
    fn insert_incoming_calls(&self, records: &[IncomingCallRecord]) -> Result<usize, StoreError>;

    fn insert_outgoing_call(&self, record: OutgoingCallRecord) -> Result<(), StoreError>;
    fn insert_outgoing_calls(&self, records: &[OutgoingCallRecord]) -> Result<usize, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record rejected: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Rows removed per table by a period delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionSummary {
    pub activity: usize,
    pub incoming_calls: usize,
    pub outgoing_calls: usize,
}

impl DeletionSummary {
    pub fn total(&self) -> usize {
        self.activity + self.incoming_calls + self.outgoing_calls
    }
}
