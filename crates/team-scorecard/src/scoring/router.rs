use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;

use super::config::ScoringConfig;
use super::domain::{ActivityRecord, IncomingCallRecord, NameAliasMapping, OutgoingCallRecord};
use super::ingest::{BatchOutcome, IngestError};
use super::report::{Granularity, ReportEnvelope};
use super::repository::{RecordStore, StoreError};
use super::service::{ReportError, ScorecardService};

/// Router builder exposing report, import and configuration endpoints.
pub fn scorecard_router<S>(service: Arc<ScorecardService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/reports/:granularity", get(report_handler::<S>))
        .route("/api/v1/records/activity", post(activity_handler::<S>))
        .route(
            "/api/v1/records/incoming-calls",
            post(incoming_calls_handler::<S>),
        )
        .route(
            "/api/v1/records/outgoing-calls",
            post(outgoing_calls_handler::<S>),
        )
        .route(
            "/api/v1/periods/:year/:month",
            delete(delete_period_handler::<S>),
        )
        .route(
            "/api/v1/scoring-config",
            get(get_config_handler::<S>).put(put_config_handler::<S>),
        )
        .route("/api/v1/aliases", post(alias_handler::<S>))
        .with_state(service)
}

/// `months` is a comma separated list; `year` defaults to the current year.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub months: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl ReportQuery {
    pub fn month_list(&self) -> Vec<String> {
        self.months
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|month| !month.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::Conflict => StatusCode::CONFLICT,
        StoreError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Path(granularity): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let granularity = match granularity.parse::<Granularity>() {
        Ok(granularity) => granularity,
        Err(error) => {
            let envelope = ReportEnvelope::failure(error.to_string());
            return (StatusCode::BAD_REQUEST, Json(envelope)).into_response();
        }
    };

    let year = query.year.unwrap_or_else(|| Utc::now().year());
    match service.report(granularity, &query.month_list(), year) {
        Ok(report) => (StatusCode::OK, Json(ReportEnvelope::from(report))).into_response(),
        Err(ReportError::NoMonths) => {
            let envelope = ReportEnvelope::failure(ReportError::NoMonths.to_string());
            (StatusCode::BAD_REQUEST, Json(envelope)).into_response()
        }
        Err(ReportError::Store(error)) => {
            tracing::error!(%error, %granularity, "report failed");
            let envelope = ReportEnvelope::failure(error.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
        }
    }
}

fn batch_response(result: Result<BatchOutcome, IngestError>) -> Response {
    match result {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}

pub(crate) async fn activity_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Json(records): Json<Vec<ActivityRecord>>,
) -> Response
where
    S: RecordStore + 'static,
{
    batch_response(service.import_activity(records))
}

pub(crate) async fn incoming_calls_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Json(records): Json<Vec<IncomingCallRecord>>,
) -> Response
where
    S: RecordStore + 'static,
{
    batch_response(service.import_incoming_calls(records))
}

pub(crate) async fn outgoing_calls_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Json(records): Json<Vec<OutgoingCallRecord>>,
) -> Response
where
    S: RecordStore + 'static,
{
    batch_response(service.import_outgoing_calls(records))
}

pub(crate) async fn delete_period_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Path((year, month)): Path<(i32, String)>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.delete_period(&month, year) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(store_status(&error), error.to_string()),
    }
}

pub(crate) async fn get_config_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.scoring_config() {
        Ok(Some(config)) => (StatusCode::OK, Json(config)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "scoring configuration not set"),
        Err(error) => error_response(store_status(&error), error.to_string()),
    }
}

pub(crate) async fn put_config_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Json(config): Json<ScoringConfig>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.update_scoring_config(config) {
        Ok(()) => (StatusCode::OK, Json(config)).into_response(),
        Err(error) => error_response(store_status(&error), error.to_string()),
    }
}

pub(crate) async fn alias_handler<S>(
    State(service): State<Arc<ScorecardService<S>>>,
    Json(mapping): Json<NameAliasMapping>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.add_alias(mapping) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(StoreError::Conflict) => {
            error_response(StatusCode::CONFLICT, "alias mapping already exists")
        }
        Err(error) => error_response(store_status(&error), error.to_string()),
    }
}
