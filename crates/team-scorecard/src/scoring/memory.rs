use std::sync::{Mutex, MutexGuard, RwLock};

use tracing::debug;

use super::config::ScoringConfig;
use super::domain::{
    ActivityRecord, IncomingCallRecord, NameAliasMapping, OutgoingCallRecord, PeriodFilter,
};
use super::identity::normalize_name;
use super::repository::{DeletionSummary, RecordStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    activity: Vec<ActivityRecord>,
    incoming: Vec<IncomingCallRecord>,
    outgoing: Vec<OutgoingCallRecord>,
    aliases: Vec<NameAliasMapping>,
}

/// Process-local store used by the server binary, the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: Mutex<Tables>,
    config: RwLock<Option<ScoringConfig>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            tables: Mutex::default(),
            config: RwLock::new(Some(config)),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("record tables lock poisoned".to_string()))
    }
}

fn check_period(person_name: &str, month_name: &str, year: i32) -> Result<(), StoreError> {
    if person_name.trim().is_empty() {
        return Err(StoreError::Rejected("person_name is required".to_string()));
    }
    if month_name.trim().is_empty() {
        return Err(StoreError::Rejected("month_name is required".to_string()));
    }
    if year <= 0 {
        return Err(StoreError::Rejected(format!("invalid year {year}")));
    }
    Ok(())
}

trait Validated {
    fn validate(&self) -> Result<(), StoreError>;
}

impl Validated for ActivityRecord {
    fn validate(&self) -> Result<(), StoreError> {
        check_period(&self.person_name, &self.month_name, self.year)
    }
}

impl Validated for IncomingCallRecord {
    fn validate(&self) -> Result<(), StoreError> {
        check_period(&self.person_name, &self.month_name, self.year)
    }
}

impl Validated for OutgoingCallRecord {
    fn validate(&self) -> Result<(), StoreError> {
        check_period(&self.person_name, &self.month_name, self.year)
    }
}

fn insert_all<T: Validated + Clone>(table: &mut Vec<T>, records: &[T]) -> Result<usize, StoreError> {
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|err| StoreError::Rejected(format!("row {index}: {err}")))?;
    }
    table.extend_from_slice(records);
    Ok(records.len())
}

fn insert_one<T: Validated>(table: &mut Vec<T>, record: T) -> Result<(), StoreError> {
    record.validate()?;
    table.push(record);
    Ok(())
}

fn remove_period<T>(
    table: &mut Vec<T>,
    filter: &PeriodFilter,
    period: impl Fn(&T) -> (&str, i32),
) -> usize {
    let before = table.len();
    table.retain(|record| {
        let (month, year) = period(record);
        !filter.matches(month, year)
    });
    before - table.len()
}

impl RecordStore for InMemoryRecordStore {
    fn find_activity(&self, filter: &PeriodFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .activity
            .iter()
            .filter(|record| filter.matches(&record.month_name, record.year))
            .cloned()
            .collect())
    }

    fn find_incoming_calls(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<IncomingCallRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .incoming
            .iter()
            .filter(|record| filter.matches(&record.month_name, record.year))
            .cloned()
            .collect())
    }

    fn find_outgoing_calls(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<OutgoingCallRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .outgoing
            .iter()
            .filter(|record| filter.matches(&record.month_name, record.year))
            .cloned()
            .collect())
    }

    fn find_alias_mappings(&self) -> Result<Vec<NameAliasMapping>, StoreError> {
        Ok(self.tables()?.aliases.clone())
    }

    fn insert_alias_mapping(&self, mapping: NameAliasMapping) -> Result<(), StoreError> {
        let name = normalize_name(&mapping.name);
        let alternate = normalize_name(&mapping.alternate_name);
        if name.is_empty() || alternate.is_empty() {
            return Err(StoreError::Rejected(
                "alias mapping needs two names".to_string(),
            ));
        }

        let mut tables = self.tables()?;
        let duplicate = tables.aliases.iter().any(|existing| {
            let existing_name = normalize_name(&existing.name);
            let existing_alternate = normalize_name(&existing.alternate_name);
            (existing_name == name && existing_alternate == alternate)
                || (existing_name == alternate && existing_alternate == name)
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        tables.aliases.push(NameAliasMapping::new(name, alternate));
        Ok(())
    }

    fn scoring_config(&self) -> Result<Option<ScoringConfig>, StoreError> {
        let slot = self
            .config
            .read()
            .map_err(|_| StoreError::Unavailable("config lock poisoned".to_string()))?;
        Ok(*slot)
    }

    fn replace_scoring_config(&self, config: ScoringConfig) -> Result<(), StoreError> {
        let mut slot = self
            .config
            .write()
            .map_err(|_| StoreError::Unavailable("config lock poisoned".to_string()))?;
        *slot = Some(config);
        Ok(())
    }

    fn delete_period(&self, month: &str, year: i32) -> Result<DeletionSummary, StoreError> {
        let filter = PeriodFilter::new(month, year);
        let mut tables = self.tables()?;

        let summary = DeletionSummary {
            activity: remove_period(&mut tables.activity, &filter, |record| {
                (record.month_name.as_str(), record.year)
            }),
            incoming_calls: remove_period(&mut tables.incoming, &filter, |record| {
                (record.month_name.as_str(), record.year)
            }),
            outgoing_calls: remove_period(&mut tables.outgoing, &filter, |record| {
                (record.month_name.as_str(), record.year)
            }),
        };

        debug!(month, year, removed = summary.total(), "deleted period");
        Ok(summary)
    }

    fn insert_activity(&self, record: ActivityRecord) -> Result<(), StoreError> {
        insert_one(&mut self.tables()?.activity, record)
    }

    fn insert_activities(&self, records: &[ActivityRecord]) -> Result<usize, StoreError> {
        insert_all(&mut self.tables()?.activity, records)
    }

    fn insert_incoming_call(&self, record: IncomingCallRecord) -> Result<(), StoreError> {
        insert_one(&mut self.tables()?.incoming, record)
    }

    fn insert_incoming_calls(&self, records: &[IncomingCallRecord]) -> Result<usize, StoreError> {
        insert_all(&mut self.tables()?.incoming, records)
    }

    fn insert_outgoing_call(&self, record: OutgoingCallRecord) -> Result<(), StoreError> {
        insert_one(&mut self.tables()?.outgoing, record)
    }

    fn insert_outgoing_calls(&self, records: &[OutgoingCallRecord]) -> Result<usize, StoreError> {
        insert_all(&mut self.tables()?.outgoing, records)
    }
}
