use super::common::*;
use crate::scoring::config::ScoringConfig;
use crate::scoring::domain::{NameAliasMapping, PeriodFilter};
use crate::scoring::ingest::IngestError;
use crate::scoring::level::ScoreLevel;
use crate::scoring::matrix::Threshold;
use crate::scoring::memory::InMemoryRecordStore;
use crate::scoring::report::{Granularity, ReportEnvelope, REPORT_FORMAT_VERSION};
use crate::scoring::repository::{RecordStore, StoreError};
use crate::scoring::service::{ReportError, ScorecardService};
use std::sync::Arc;

fn level(level: u8, score: f64) -> ScoreLevel {
    ScoreLevel::new(level, Threshold::Value(score))
}

#[test]
fn individual_report_lists_every_person() {
    let (service, _) = build_service();
    let report = service
        .individual_report(&months(), YEAR)
        .expect("report builds");

    let keys: Vec<&str> = report.rows.iter().map(|row| row.entity_key.as_str()).collect();
    assert_eq!(keys, ["Kari Nordmann", "Ola Hansen", "Per Berg"]);

    let kari = &report.rows[0];
    assert_eq!(kari.tcm.value, 900.0);
    assert_eq!(kari.tcm.level, level(4, 900.0));
    assert_eq!(kari.ce.level, level(10, 0.0));
    assert_eq!(kari.ts.level, level(5, 50000.0));
    assert_eq!(kari.rbsl.level, level(9, 60.0));
    assert_eq!(kari.team.as_deref(), Some("Nord"));
    assert_eq!(kari.qualified, Some(true));
    assert_eq!(kari.combined, None);

    let ola = &report.rows[1];
    assert_eq!(ola.qualified, Some(false));
    assert_eq!(ola.tcm.level, ScoreLevel::unscored());
    assert_eq!(ola.rbsl.level, level(1, 0.0));
}

#[test]
fn team_report_uses_weighted_combined_score() {
    let (service, _) = build_service();
    let report = service.team_report(&months(), YEAR).expect("report builds");

    assert_eq!(report.rows.len(), 2);
    let nord = &report.rows[0];
    assert_eq!(nord.entity_key, "Nord");
    assert_eq!(nord.members, Some(2));
    assert_eq!(nord.qualified_members, Some(1));
    assert_eq!(nord.tcm.level, level(5, 900.0));
    assert_eq!(nord.ts.level, level(7, 50000.0));
    assert_eq!(nord.rbsl.level, level(9, 60.0));
    let combined = nord.combined.expect("weighted total");
    assert!((combined - 7.0).abs() < 1e-9, "{combined}");

    let sor = &report.rows[1];
    assert_eq!(sor.entity_key, "Sør");
    let combined = sor.combined.expect("weighted total");
    assert!((combined - 7.6).abs() < 1e-9, "{combined}");
}

#[test]
fn department_and_company_use_mean_of_levels() {
    let (service, _) = build_service();

    let department = service
        .department_report(&months(), YEAR)
        .expect("report builds");
    let bergen = &department.rows[0];
    assert_eq!(bergen.entity_key, "Bergen");
    assert_eq!(bergen.tcm.value, 1000.0);
    assert_eq!(bergen.qualified_members, Some(2));
    assert_eq!(bergen.combined, Some(8.0));

    let company = service.company_report(&months(), YEAR).expect("report builds");
    assert_eq!(company.rows.len(), 1);
    assert_eq!(company.rows[0].rbsl.value, 3.75);
    assert_eq!(company.rows[0].combined, Some(8.0));
}

#[test]
fn metadata_describes_the_request() {
    let (service, _) = build_service();
    let report = service
        .company_report(&[" Januar ".to_string()], YEAR)
        .expect("report builds");

    assert_eq!(report.metadata.format_version, REPORT_FORMAT_VERSION);
    assert_eq!(report.metadata.granularity, Granularity::Company);
    assert_eq!(report.metadata.months, ["Januar"]);
    assert_eq!(report.metadata.year, YEAR);
    assert_eq!(report.metadata.total_records, 1);
    assert!(report.metadata.scoring_configured);
}

#[test]
fn months_are_scored_independently_in_request_order() {
    let (service, store) = build_service();
    let mut february = incoming("Kari Nordmann", 2000.0);
    february.month_name = "Februar".to_string();
    store.insert_incoming_call(february).expect("insert");

    let report = service
        .individual_report(&["Februar".to_string(), "Januar".to_string()], YEAR)
        .expect("report builds");

    assert_eq!(report.rows[0].month, "Februar");
    assert_eq!(report.rows[0].tcm.value, 2000.0);
    assert_eq!(report.rows[1].month, "Januar");
    assert_eq!(report.rows[1].tcm.value, 900.0);
}

#[test]
fn report_without_months_is_rejected() {
    let (service, _) = build_service();
    match service.team_report(&[" ".to_string()], YEAR) {
        Err(ReportError::NoMonths) => {}
        other => panic!("expected missing months error, got {other:?}"),
    }
}

#[test]
fn report_degrades_when_config_missing() {
    let store = Arc::new(InMemoryRecordStore::new());
    store
        .insert_incoming_calls(&[incoming("Kari Nordmann", 900.0)])
        .expect("seed");
    let service = ScorecardService::new(store);

    let report = service
        .individual_report(&months(), YEAR)
        .expect("report builds");
    assert!(!report.metadata.scoring_configured);
    assert_eq!(report.rows[0].tcm.level, ScoreLevel::unscored());
}

#[test]
fn store_failures_surface_as_failed_envelopes() {
    let service = ScorecardService::new(Arc::new(UnavailableStore));
    let result = service.team_report(&months(), YEAR);
    assert!(matches!(
        result,
        Err(ReportError::Store(StoreError::Unavailable(_)))
    ));

    let envelope = ReportEnvelope::from(result);
    assert!(!envelope.success);
    assert_eq!(
        envelope.message.as_deref(),
        Some("store unavailable: database offline")
    );
}

#[test]
fn custom_threshold_changes_qualification() {
    let store = seeded_store();
    let service = ScorecardService::with_threshold(store, 400.0);
    let report = service.team_report(&months(), YEAR).expect("report builds");
    assert_eq!(report.rows[0].qualified_members, Some(2));
}

#[test]
fn import_rejects_empty_batches() {
    let (service, _) = build_service();
    assert_eq!(
        service.import_activity(Vec::new()),
        Err(IngestError::EmptyBatch("activity"))
    );
}

#[test]
fn import_falls_back_to_single_rows_and_counts_failures() {
    let store = Arc::new(BulkFailingStore::default());
    let service = ScorecardService::new(store.clone());

    let mut broken = incoming("", 10.0);
    broken.year = 0;
    let outcome = service
        .import_incoming_calls(vec![incoming("Kari", 10.0), broken, incoming("Ola", 20.0)])
        .expect("batch processed");

    assert_eq!(store.bulk_attempts(), 1);
    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.failed, 1);
    assert!(!outcome.is_complete());

    let stored = store
        .find_incoming_calls(&PeriodFilter::default())
        .expect("read");
    assert_eq!(stored.len(), 2);
}

#[test]
fn invalid_bulk_batch_is_retried_row_by_row() {
    let store = Arc::new(InMemoryRecordStore::new());
    let service = ScorecardService::new(store.clone());

    let outcome = service
        .import_activity(vec![
            activity("Kari", "Nord", "Bergen", "liv", 100.0),
            activity(" ", "Nord", "Bergen", "liv", 100.0),
        ])
        .expect("batch processed");

    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
}

#[test]
fn delete_period_reports_per_table_counts() {
    let (service, store) = build_service();
    let summary = service.delete_period("januar", YEAR).expect("delete");

    assert_eq!(summary.activity, 4);
    assert_eq!(summary.incoming_calls, 3);
    assert_eq!(summary.outgoing_calls, 2);
    assert!(store
        .find_activity(&PeriodFilter::new(MONTH, YEAR))
        .expect("read")
        .is_empty());
}

#[test]
fn aliases_take_effect_on_the_next_report() {
    let (service, store) = build_service();
    store
        .insert_incoming_call(incoming("K. Nordmann", 200.0))
        .expect("insert");

    service
        .add_alias(NameAliasMapping::new("Kari Nordmann", "K. Nordmann"))
        .expect("alias stored");
    assert_eq!(
        service.add_alias(NameAliasMapping::new("K. Nordmann", "Kari Nordmann")),
        Err(StoreError::Conflict)
    );

    let report = service
        .individual_report(&months(), YEAR)
        .expect("report builds");
    let merged = report
        .rows
        .iter()
        .find(|row| row.entity_key == "K. Nordmann")
        .expect("merged row");
    assert_eq!(merged.tcm.value, 1100.0);
    assert_eq!(merged.alternate_name.as_deref(), Some("Kari Nordmann"));
    assert!(report.rows.iter().all(|row| row.entity_key != "Kari Nordmann"));
}

#[test]
fn scoring_config_round_trips_through_the_service() {
    let store = Arc::new(InMemoryRecordStore::new());
    let service = ScorecardService::new(store);
    assert_eq!(service.scoring_config().expect("read"), None);

    service
        .update_scoring_config(scoring_config())
        .expect("write");
    assert_eq!(service.scoring_config().expect("read"), Some(scoring_config()));

    service
        .update_scoring_config(ScoringConfig::default())
        .expect("overwrite");
    assert_eq!(
        service.scoring_config().expect("read"),
        Some(ScoringConfig::default())
    );
}
