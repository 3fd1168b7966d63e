use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::config::{Benchmark, MetricBenchmarks, ScoringConfig, ScoringWeights};
use crate::scoring::domain::{
    ActivityCategory, ActivityRecord, IncomingCallRecord, NameAliasMapping, OutgoingCallRecord,
    PeriodFilter,
};
use crate::scoring::memory::InMemoryRecordStore;
use crate::scoring::repository::{DeletionSummary, RecordStore, StoreError};
use crate::scoring::service::ScorecardService;

pub(super) const YEAR: i32 = 2024;
pub(super) const MONTH: &str = "Januar";

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig {
        individual: MetricBenchmarks {
            tcm: Benchmark::new(1000.0, 100.0),
            ce: Benchmark::new(35.0, 3.0),
            ts: Benchmark::new(50000.0, 5000.0),
            rbsl: Benchmark::new(40.0, 5.0),
        },
        group: MetricBenchmarks {
            tcm: Benchmark::new(900.0, 100.0),
            ce: Benchmark::new(35.0, 3.0),
            ts: Benchmark::new(40000.0, 5000.0),
            rbsl: Benchmark::new(40.0, 5.0),
        },
        weights: ScoringWeights {
            tcm: 40.0,
            ce: 20.0,
            ts: 30.0,
            rbsl: 10.0,
        },
    }
}

pub(super) fn activity(
    person: &str,
    team: &str,
    department: &str,
    category: &str,
    sale_value: f64,
) -> ActivityRecord {
    ActivityRecord {
        person_name: person.to_string(),
        team: team.to_string(),
        department: department.to_string(),
        activity_category: ActivityCategory::from(category),
        sale_value,
        year: YEAR,
        month_name: MONTH.to_string(),
        alternative_names: None,
    }
}

pub(super) fn incoming(person: &str, minutes: f64) -> IncomingCallRecord {
    IncomingCallRecord {
        person_name: person.to_string(),
        minutes,
        year: YEAR,
        month_name: MONTH.to_string(),
    }
}

pub(super) fn outgoing(person: &str, count: f64, minutes: f64) -> OutgoingCallRecord {
    OutgoingCallRecord {
        person_name: person.to_string(),
        outgoing_count: count,
        regular_call_minutes: minutes,
        company_call_minutes: 15.0,
        year: YEAR,
        month_name: MONTH.to_string(),
    }
}

pub(super) fn months() -> Vec<String> {
    vec![MONTH.to_string()]
}

/// Two teams in one department: Nord has a qualifying and a non-qualifying member.
pub(super) fn seeded_store() -> Arc<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::with_config(scoring_config()));

    store
        .insert_activities(&[
            activity("Kari Nordmann", "Nord", "Bergen", "liv", 30000.0),
            activity("Kari Nordmann", "Nord", "Bergen", "skade", 20000.0),
            activity("Ola Hansen", "Nord", "Bergen", "skade", 10000.0),
            activity("Per Berg", "Sør", "Bergen", "liv", 45000.0),
        ])
        .expect("seed activity");
    store
        .insert_incoming_calls(&[
            incoming("Kari Nordmann", 600.0),
            incoming("Ola Hansen", 500.0),
            incoming("Per Berg", 700.0),
        ])
        .expect("seed incoming");
    store
        .insert_outgoing_calls(&[
            outgoing("Kari Nordmann", 90.0, 300.0),
            outgoing("Per Berg", 40.0, 400.0),
        ])
        .expect("seed outgoing");

    store
}

pub(super) fn build_service() -> (ScorecardService<InMemoryRecordStore>, Arc<InMemoryRecordStore>) {
    let store = seeded_store();
    (ScorecardService::new(store.clone()), store)
}

/// Store whose bulk inserts always fail so the row-by-row fallback runs.
#[derive(Default)]
pub(super) struct BulkFailingStore {
    pub(super) inner: InMemoryRecordStore,
    pub(super) bulk_attempts: AtomicUsize,
}

impl BulkFailingStore {
    pub(super) fn bulk_attempts(&self) -> usize {
        self.bulk_attempts.load(Ordering::SeqCst)
    }

    fn fail_bulk(&self) -> StoreError {
        self.bulk_attempts.fetch_add(1, Ordering::SeqCst);
        StoreError::Unavailable("bulk endpoint offline".to_string())
    }
}

impl RecordStore for BulkFailingStore {
    fn find_activity(&self, filter: &PeriodFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        self.inner.find_activity(filter)
    }

    fn find_incoming_calls(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<IncomingCallRecord>, StoreError> {
        self.inner.find_incoming_calls(filter)
    }

    fn find_outgoing_calls(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<OutgoingCallRecord>, StoreError> {
        self.inner.find_outgoing_calls(filter)
    }

    fn find_alias_mappings(&self) -> Result<Vec<NameAliasMapping>, StoreError> {
        self.inner.find_alias_mappings()
    }

    fn insert_alias_mapping(&self, mapping: NameAliasMapping) -> Result<(), StoreError> {
        self.inner.insert_alias_mapping(mapping)
    }

    fn scoring_config(&self) -> Result<Option<ScoringConfig>, StoreError> {
        self.inner.scoring_config()
    }

    fn replace_scoring_config(&self, config: ScoringConfig) -> Result<(), StoreError> {
        self.inner.replace_scoring_config(config)
    }

    fn delete_period(&self, month: &str, year: i32) -> Result<DeletionSummary, StoreError> {
        self.inner.delete_period(month, year)
    }

    fn insert_activity(&self, record: ActivityRecord) -> Result<(), StoreError> {
        self.inner.insert_activity(record)
    }

    fn insert_activities(&self, _records: &[ActivityRecord]) -> Result<usize, StoreError> {
        Err(self.fail_bulk())
    }

    fn insert_incoming_call(&self, record: IncomingCallRecord) -> Result<(), StoreError> {
        self.inner.insert_incoming_call(record)
    }

    fn insert_incoming_calls(&self, _records: &[IncomingCallRecord]) -> Result<usize, StoreError> {
        Err(self.fail_bulk())
    }

    fn insert_outgoing_call(&self, record: OutgoingCallRecord) -> Result<(), StoreError> {
        self.inner.insert_outgoing_call(record)
    }

    fn insert_outgoing_calls(&self, _records: &[OutgoingCallRecord]) -> Result<usize, StoreError> {
        Err(self.fail_bulk())
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl RecordStore for UnavailableStore {
    fn find_activity(&self, _filter: &PeriodFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        offline()
    }

    fn find_incoming_calls(
        &self,
        _filter: &PeriodFilter,
    ) -> Result<Vec<IncomingCallRecord>, StoreError> {
        offline()
    }

    fn find_outgoing_calls(
        &self,
        _filter: &PeriodFilter,
    ) -> Result<Vec<OutgoingCallRecord>, StoreError> {
        offline()
    }

    fn find_alias_mappings(&self) -> Result<Vec<NameAliasMapping>, StoreError> {
        offline()
    }

    fn insert_alias_mapping(&self, _mapping: NameAliasMapping) -> Result<(), StoreError> {
        offline()
    }

    fn scoring_config(&self) -> Result<Option<ScoringConfig>, StoreError> {
        offline()
    }

    fn replace_scoring_config(&self, _config: ScoringConfig) -> Result<(), StoreError> {
        offline()
    }

    fn delete_period(&self, _month: &str, _year: i32) -> Result<DeletionSummary, StoreError> {
        offline()
    }

    fn insert_activity(&self, _record: ActivityRecord) -> Result<(), StoreError> {
        offline()
    }

    fn insert_activities(&self, _records: &[ActivityRecord]) -> Result<usize, StoreError> {
        offline()
    }

    fn insert_incoming_call(&self, _record: IncomingCallRecord) -> Result<(), StoreError> {
        offline()
    }

    fn insert_incoming_calls(&self, _records: &[IncomingCallRecord]) -> Result<usize, StoreError> {
        offline()
    }

    fn insert_outgoing_call(&self, _record: OutgoingCallRecord) -> Result<(), StoreError> {
        offline()
    }

    fn insert_outgoing_calls(&self, _records: &[OutgoingCallRecord]) -> Result<usize, StoreError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
