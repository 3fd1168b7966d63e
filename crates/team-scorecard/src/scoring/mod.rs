//! Scoring and aggregation engine for monthly call-center and sales performance.
//!
//! Records flow from a [`RecordStore`] through the [`NameIdentityResolver`] into the
//! [`AggregationEngine`], which builds score matrices from the stored [`ScoringConfig`]
//! and resolves each metric to a level between 1 and 10.

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod fixtures;
pub mod format;
pub mod identity;
pub mod ingest;
pub mod level;
pub mod matrix;
pub mod memory;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregate::{
    AggregateMetrics, AggregationEngine, CombinedScore, MonthRecords, PersonTotals,
    ScoringProfile, COMPANY_KEY,
};
pub use config::{Benchmark, Metric, MetricBenchmarks, ScoringConfig, ScoringScope, ScoringWeights};
pub use domain::{
    ActivityCategory, ActivityRecord, IncomingCallRecord, NameAliasMapping, OutgoingCallRecord,
    PeriodFilter,
};
pub use fixtures::{FixtureError, FixturePaths, FixtureSet, SeedSummary};
pub use identity::NameIdentityResolver;
pub use ingest::{BatchOutcome, IngestError};
pub use level::{resolve, ResolveMode, ScoreLevel};
pub use matrix::{MatrixFamily, ScoreMatrix, Threshold};
pub use memory::InMemoryRecordStore;
pub use report::{
    Granularity, MetricScore, ReportEnvelope, ReportMetadata, ScoredReport, ScoredReportRow,
    ScoredRowView, UnknownGranularity,
};
pub use repository::{DeletionSummary, RecordStore, StoreError};
pub use router::{scorecard_router, ReportQuery};
pub use service::{ReportError, ScorecardService};
