use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::Metric;
use super::format::{format_count, format_level, format_percent, format_score};
use super::level::ScoreLevel;

pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Report granularity; each one selects a scoring profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Individual,
    Team,
    Department,
    Company,
}

impl Granularity {
    pub const fn ordered() -> [Granularity; 4] {
        [
            Granularity::Individual,
            Granularity::Team,
            Granularity::Department,
            Granularity::Company,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Granularity::Individual => "individual",
            Granularity::Team => "team",
            Granularity::Department => "department",
            Granularity::Company => "company",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report granularity '{0}' (expected individual, team, department or company)")]
pub struct UnknownGranularity(pub String);

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "individual" | "person" | "people" => Ok(Granularity::Individual),
            "team" | "teams" => Ok(Granularity::Team),
            "department" | "departments" => Ok(Granularity::Department),
            "company" => Ok(Granularity::Company),
            _ => Err(UnknownGranularity(value.to_string())),
        }
    }
}

/// Raw metric value and the level it earned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricScore {
    pub value: f64,
    pub level: ScoreLevel,
}

/// One scored entity for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReportRow {
    pub entity_key: String,
    pub month: String,
    pub granularity: Granularity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_name: Option<String>,
    /// Whether an individual clears the qualification threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_members: Option<usize>,
    pub tcm: MetricScore,
    pub ce: MetricScore,
    pub ts: MetricScore,
    pub rbsl: MetricScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined: Option<f64>,
}

impl ScoredReportRow {
    pub fn metric(&self, metric: Metric) -> &MetricScore {
        match metric {
            Metric::Tcm => &self.tcm,
            Metric::Ce => &self.ce,
            Metric::Ts => &self.ts,
            Metric::Rbsl => &self.rbsl,
        }
    }

    pub fn view(&self) -> ScoredRowView {
        ScoredRowView {
            entity_key: self.entity_key.clone(),
            month: self.month.clone(),
            call_minutes: format_count(self.tcm.value),
            call_minutes_level: format_level(Some(&self.tcm.level)),
            call_efficiency: format_percent(self.ce.value),
            call_efficiency_level: format_level(Some(&self.ce.level)),
            total_sales: format_count(self.ts.value),
            total_sales_level: format_level(Some(&self.ts.level)),
            liv_ratio: format_percent(self.rbsl.value),
            liv_ratio_level: format_level(Some(&self.rbsl.level)),
            combined: format_score(self.combined),
        }
    }
}

/// Display-ready strings for a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRowView {
    pub entity_key: String,
    pub month: String,
    pub call_minutes: String,
    pub call_minutes_level: String,
    pub call_efficiency: String,
    pub call_efficiency_level: String,
    pub total_sales: String,
    pub total_sales_level: String,
    pub liv_ratio: String,
    pub liv_ratio_level: String,
    pub combined: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub format_version: &'static str,
    pub granularity: Granularity,
    pub timestamp: DateTime<Utc>,
    pub total_records: usize,
    pub months: Vec<String>,
    pub year: i32,
    pub qualify_threshold_minutes: f64,
    pub scoring_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReport {
    pub rows: Vec<ScoredReportRow>,
    pub metadata: ReportMetadata,
}

/// Wire envelope: `{success, data, metadata}` or `{success: false, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ScoredReportRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReportEnvelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            metadata: None,
            message: Some(message.into()),
        }
    }
}

impl From<ScoredReport> for ReportEnvelope {
    fn from(report: ScoredReport) -> Self {
        Self {
            success: true,
            data: Some(report.rows),
            metadata: Some(report.metadata),
            message: None,
        }
    }
}

impl<E: fmt::Display> From<Result<ScoredReport, E>> for ReportEnvelope {
    fn from(result: Result<ScoredReport, E>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}
