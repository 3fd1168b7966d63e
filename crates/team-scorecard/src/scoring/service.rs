use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::aggregate::{AggregationEngine, MonthRecords};
use super::config::ScoringConfig;
use super::domain::{
    ActivityRecord, IncomingCallRecord, NameAliasMapping, OutgoingCallRecord, PeriodFilter,
};
use super::identity::NameIdentityResolver;
use super::ingest::{insert_batch, BatchOutcome, IngestError};
use super::repository::{DeletionSummary, RecordStore, StoreError};
use super::report::{Granularity, ReportMetadata, ScoredReport, REPORT_FORMAT_VERSION};
use crate::config::DEFAULT_QUALIFY_THRESHOLD_MINUTES;

/// Service composing the record store with the aggregation engine.
pub struct ScorecardService<S> {
    store: Arc<S>,
    qualify_threshold_minutes: f64,
}

impl<S> ScorecardService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_threshold(store, DEFAULT_QUALIFY_THRESHOLD_MINUTES)
    }

    pub fn with_threshold(store: Arc<S>, qualify_threshold_minutes: f64) -> Self {
        Self {
            store,
            qualify_threshold_minutes,
        }
    }

    pub fn individual_report(
        &self,
        months: &[String],
        year: i32,
    ) -> Result<ScoredReport, ReportError> {
        self.report(Granularity::Individual, months, year)
    }

    pub fn team_report(&self, months: &[String], year: i32) -> Result<ScoredReport, ReportError> {
        self.report(Granularity::Team, months, year)
    }

    pub fn department_report(
        &self,
        months: &[String],
        year: i32,
    ) -> Result<ScoredReport, ReportError> {
        self.report(Granularity::Department, months, year)
    }

    pub fn company_report(
        &self,
        months: &[String],
        year: i32,
    ) -> Result<ScoredReport, ReportError> {
        self.report(Granularity::Company, months, year)
    }

    /// Score every requested month independently and concatenate the rows in request order.
    #[instrument(skip(self), fields(threshold = self.qualify_threshold_minutes))]
    pub fn report(
        &self,
        granularity: Granularity,
        months: &[String],
        year: i32,
    ) -> Result<ScoredReport, ReportError> {
        let months: Vec<String> = months
            .iter()
            .map(|month| month.trim().to_string())
            .filter(|month| !month.is_empty())
            .collect();
        if months.is_empty() {
            return Err(ReportError::NoMonths);
        }

        let config = self.store.scoring_config()?;
        if config.is_none() {
            warn!(%granularity, "no scoring configuration stored; every level degrades to 1");
        }
        let aliases = self.store.find_alias_mappings()?;
        let engine = AggregationEngine::new(config.as_ref(), self.qualify_threshold_minutes);

        let mut rows = Vec::new();
        for month in &months {
            let filter = PeriodFilter::new(month.clone(), year);
            let activity = self.store.find_activity(&filter)?;
            let incoming = self.store.find_incoming_calls(&filter)?;
            let outgoing = self.store.find_outgoing_calls(&filter)?;

            let resolver = NameIdentityResolver::build(&aliases, &activity);
            let records = MonthRecords {
                activity: &activity,
                incoming: &incoming,
                outgoing: &outgoing,
            };
            rows.extend(engine.aggregate(granularity, month, records, &resolver));
        }

        info!(%granularity, rows = rows.len(), "report assembled");

        let metadata = ReportMetadata {
            format_version: REPORT_FORMAT_VERSION,
            granularity,
            timestamp: Utc::now(),
            total_records: rows.len(),
            months,
            year,
            qualify_threshold_minutes: self.qualify_threshold_minutes,
            scoring_configured: config.is_some(),
        };

        Ok(ScoredReport { rows, metadata })
    }

    pub fn import_activity(
        &self,
        records: Vec<ActivityRecord>,
    ) -> Result<BatchOutcome, IngestError> {
        insert_batch(
            "activity",
            records,
            |rows| self.store.insert_activities(rows),
            |row| self.store.insert_activity(row),
        )
    }

    pub fn import_incoming_calls(
        &self,
        records: Vec<IncomingCallRecord>,
    ) -> Result<BatchOutcome, IngestError> {
        insert_batch(
            "incoming call",
            records,
            |rows| self.store.insert_incoming_calls(rows),
            |row| self.store.insert_incoming_call(row),
        )
    }

    pub fn import_outgoing_calls(
        &self,
        records: Vec<OutgoingCallRecord>,
    ) -> Result<BatchOutcome, IngestError> {
        insert_batch(
            "outgoing call",
            records,
            |rows| self.store.insert_outgoing_calls(rows),
            |row| self.store.insert_outgoing_call(row),
        )
    }

    pub fn add_alias(&self, mapping: NameAliasMapping) -> Result<(), StoreError> {
        self.store.insert_alias_mapping(mapping)
    }

    pub fn delete_period(&self, month: &str, year: i32) -> Result<DeletionSummary, StoreError> {
        let summary = self.store.delete_period(month, year)?;
        info!(
            month,
            year,
            activity = summary.activity,
            incoming_calls = summary.incoming_calls,
            outgoing_calls = summary.outgoing_calls,
            "period deleted"
        );
        Ok(summary)
    }

    pub fn scoring_config(&self) -> Result<Option<ScoringConfig>, StoreError> {
        self.store.scoring_config()
    }

    pub fn update_scoring_config(&self, config: ScoringConfig) -> Result<(), StoreError> {
        let total = config.weights.total();
        if (total - 100.0).abs() > f64::EPSILON {
            warn!(total, "scoring weights do not sum to 100");
        }
        self.store.replace_scoring_config(config)
    }
}

/// Error raised while assembling a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("at least one month is required")]
    NoMonths,
    #[error(transparent)]
    Store(#[from] StoreError),
}
