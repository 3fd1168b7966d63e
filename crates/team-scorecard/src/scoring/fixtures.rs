//! Local CSV exports used to populate a store from the command line.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::info;

use super::domain::{
    lenient_f64, lenient_i32, ActivityCategory, ActivityRecord, IncomingCallRecord,
    NameAliasMapping, OutgoingCallRecord,
};
use super::ingest::{BatchOutcome, IngestError};
use super::repository::{RecordStore, StoreError};
use super::service::ScorecardService;

#[derive(Debug)]
pub enum FixtureError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    Ingest(IngestError),
    Store(StoreError),
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            FixtureError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            FixtureError::Ingest(err) => write!(f, "could not import fixture: {}", err),
            FixtureError::Store(err) => write!(f, "could not store fixture: {}", err),
        }
    }
}

impl std::error::Error for FixtureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FixtureError::Io { source, .. } => Some(source),
            FixtureError::Csv(err) => Some(err),
            FixtureError::Ingest(err) => Some(err),
            FixtureError::Store(err) => Some(err),
        }
    }
}

impl From<csv::Error> for FixtureError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<IngestError> for FixtureError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<StoreError> for FixtureError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

#[derive(Debug, Deserialize)]
struct ActivityRow {
    #[serde(alias = "Name", alias = "Navn")]
    person_name: String,
    #[serde(default, alias = "Team")]
    team: String,
    #[serde(default, alias = "Department", alias = "Avdeling")]
    department: String,
    #[serde(default, alias = "Category", alias = "Kategori")]
    activity_category: String,
    #[serde(default, alias = "Sale", deserialize_with = "lenient_f64")]
    sale_value: f64,
    #[serde(alias = "Year", alias = "År", deserialize_with = "lenient_i32")]
    year: i32,
    #[serde(alias = "Month", alias = "Måned")]
    month_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    alternative_names: Option<String>,
}

impl From<ActivityRow> for ActivityRecord {
    fn from(row: ActivityRow) -> Self {
        ActivityRecord {
            person_name: row.person_name,
            team: row.team,
            department: row.department,
            activity_category: ActivityCategory::from(row.activity_category),
            sale_value: row.sale_value,
            year: row.year,
            month_name: row.month_name,
            alternative_names: row.alternative_names,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IncomingRow {
    #[serde(alias = "Name", alias = "Navn")]
    person_name: String,
    #[serde(default, alias = "Minutes", deserialize_with = "lenient_f64")]
    minutes: f64,
    #[serde(alias = "Year", alias = "År", deserialize_with = "lenient_i32")]
    year: i32,
    #[serde(alias = "Month", alias = "Måned")]
    month_name: String,
}

impl From<IncomingRow> for IncomingCallRecord {
    fn from(row: IncomingRow) -> Self {
        IncomingCallRecord {
            person_name: row.person_name,
            minutes: row.minutes,
            year: row.year,
            month_name: row.month_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OutgoingRow {
    #[serde(alias = "Name", alias = "Navn")]
    person_name: String,
    #[serde(default, alias = "Outgoing", deserialize_with = "lenient_f64")]
    outgoing_count: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    regular_call_minutes: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    company_call_minutes: f64,
    #[serde(alias = "Year", alias = "År", deserialize_with = "lenient_i32")]
    year: i32,
    #[serde(alias = "Month", alias = "Måned")]
    month_name: String,
}

impl From<OutgoingRow> for OutgoingCallRecord {
    fn from(row: OutgoingRow) -> Self {
        OutgoingCallRecord {
            person_name: row.person_name,
            outgoing_count: row.outgoing_count,
            regular_call_minutes: row.regular_call_minutes,
            company_call_minutes: row.company_call_minutes,
            year: row.year,
            month_name: row.month_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AliasRow {
    name: String,
    #[serde(alias = "alternate")]
    alternate_name: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_rows<R, Row, T>(reader: R) -> Result<Vec<T>, FixtureError>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    T: From<Row>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<Row>() {
        records.push(T::from(row?));
    }
    Ok(records)
}

pub fn parse_activity<R: Read>(reader: R) -> Result<Vec<ActivityRecord>, FixtureError> {
    parse_rows::<R, ActivityRow, ActivityRecord>(reader)
}

pub fn parse_incoming_calls<R: Read>(reader: R) -> Result<Vec<IncomingCallRecord>, FixtureError> {
    parse_rows::<R, IncomingRow, IncomingCallRecord>(reader)
}

pub fn parse_outgoing_calls<R: Read>(reader: R) -> Result<Vec<OutgoingCallRecord>, FixtureError> {
    parse_rows::<R, OutgoingRow, OutgoingCallRecord>(reader)
}

pub fn parse_aliases<R: Read>(reader: R) -> Result<Vec<NameAliasMapping>, FixtureError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut mappings = Vec::new();
    for row in csv_reader.deserialize::<AliasRow>() {
        let row = row?;
        mappings.push(NameAliasMapping::new(row.name, row.alternate_name));
    }
    Ok(mappings)
}

fn open(path: &Path) -> Result<std::fs::File, FixtureError> {
    std::fs::File::open(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Optional CSV export paths; missing tables are simply left empty.
#[derive(Debug, Clone, Default)]
pub struct FixturePaths {
    pub activity: Option<PathBuf>,
    pub incoming_calls: Option<PathBuf>,
    pub outgoing_calls: Option<PathBuf>,
    pub aliases: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    pub activity: Vec<ActivityRecord>,
    pub incoming_calls: Vec<IncomingCallRecord>,
    pub outgoing_calls: Vec<OutgoingCallRecord>,
    pub aliases: Vec<NameAliasMapping>,
}

/// Per-table outcomes of seeding a store; `None` when the table had no rows.
#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub activity: Option<BatchOutcome>,
    pub incoming_calls: Option<BatchOutcome>,
    pub outgoing_calls: Option<BatchOutcome>,
    pub aliases: usize,
}

impl FixtureSet {
    pub fn load(paths: &FixturePaths) -> Result<Self, FixtureError> {
        let mut set = FixtureSet::default();
        if let Some(path) = &paths.activity {
            set.activity = parse_activity(open(path)?)?;
        }
        if let Some(path) = &paths.incoming_calls {
            set.incoming_calls = parse_incoming_calls(open(path)?)?;
        }
        if let Some(path) = &paths.outgoing_calls {
            set.outgoing_calls = parse_outgoing_calls(open(path)?)?;
        }
        if let Some(path) = &paths.aliases {
            set.aliases = parse_aliases(open(path)?)?;
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
            && self.incoming_calls.is_empty()
            && self.outgoing_calls.is_empty()
            && self.aliases.is_empty()
    }

    /// Push every table through the service's batch import path.
    pub fn seed<S>(self, service: &ScorecardService<S>) -> Result<SeedSummary, FixtureError>
    where
        S: RecordStore + 'static,
    {
        let mut summary = SeedSummary::default();

        if !self.activity.is_empty() {
            summary.activity = Some(service.import_activity(self.activity)?);
        }
        if !self.incoming_calls.is_empty() {
            summary.incoming_calls = Some(service.import_incoming_calls(self.incoming_calls)?);
        }
        if !self.outgoing_calls.is_empty() {
            summary.outgoing_calls = Some(service.import_outgoing_calls(self.outgoing_calls)?);
        }
        for mapping in self.aliases {
            match service.add_alias(mapping) {
                Ok(()) => summary.aliases += 1,
                Err(StoreError::Conflict) => {}
                Err(err) => return Err(err.into()),
            }
        }

        info!(aliases = summary.aliases, "fixtures seeded");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_rows_trim_and_coerce() {
        let data = "\
person_name , team, department, activity_category, sale_value, year, month_name, alternative_names
 Jon Doe ,Nord,Bergen,LIV,\"12 000,5\",2024,Januar,
Kari,Sør,Oslo,skade,abc,2024,Januar,\"K. Berg; Kari B\"
";
        let records = parse_activity(data.as_bytes()).expect("parses");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].person_name, "Jon Doe");
        assert_eq!(records[0].activity_category, ActivityCategory::Liv);
        assert_eq!(records[0].sale_value, 12000.5);
        assert_eq!(records[0].alternative_names, None);
        assert_eq!(records[1].sale_value, 0.0);
        assert_eq!(
            records[1].alternative_names.as_deref(),
            Some("K. Berg; Kari B")
        );
    }

    #[test]
    fn header_aliases_are_accepted() {
        let data = "Navn,Minutes,År,Måned\nOla,120,2024,Mars\n";
        let records = parse_incoming_calls(data.as_bytes()).expect("parses");
        assert_eq!(records[0].person_name, "Ola");
        assert_eq!(records[0].minutes, 120.0);
        assert_eq!(records[0].month_name, "Mars");
    }

    #[test]
    fn missing_file_reports_path() {
        let paths = FixturePaths {
            activity: Some(PathBuf::from("/nonexistent/activity.csv")),
            ..FixturePaths::default()
        };
        let err = FixtureSet::load(&paths).expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/activity.csv"));
    }
}
