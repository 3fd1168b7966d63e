use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Sales activity line captured by data entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub person_name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub activity_category: ActivityCategory,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sale_value: f64,
    #[serde(deserialize_with = "lenient_i32")]
    pub year: i32,
    pub month_name: String,
    /// Free-text list of other spellings for `person_name`, comma or semicolon separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_names: Option<String>,
}

/// Minutes spent on inbound calls for one person in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingCallRecord {
    pub person_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub minutes: f64,
    #[serde(deserialize_with = "lenient_i32")]
    pub year: i32,
    pub month_name: String,
}

/// Outbound dialing totals; company call minutes are kept but never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingCallRecord {
    pub person_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub outgoing_count: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub regular_call_minutes: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub company_call_minutes: f64,
    #[serde(deserialize_with = "lenient_i32")]
    pub year: i32,
    pub month_name: String,
}

/// Undirected pairing between two spellings of the same person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAliasMapping {
    pub name: String,
    pub alternate_name: String,
}

impl NameAliasMapping {
    pub fn new(name: impl Into<String>, alternate_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alternate_name: alternate_name.into(),
        }
    }
}

/// Insurance line a sale belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityCategory {
    Liv,
    Skade,
    #[default]
    Unspecified,
    Other(String),
}

impl ActivityCategory {
    pub fn label(&self) -> &str {
        match self {
            ActivityCategory::Liv => "liv",
            ActivityCategory::Skade => "skade",
            ActivityCategory::Unspecified => "",
            ActivityCategory::Other(raw) => raw,
        }
    }
}

impl From<&str> for ActivityCategory {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("liv") {
            ActivityCategory::Liv
        } else if trimmed.eq_ignore_ascii_case("skade") {
            ActivityCategory::Skade
        } else if trimmed.is_empty() {
            ActivityCategory::Unspecified
        } else {
            ActivityCategory::Other(trimmed.to_string())
        }
    }
}

impl From<String> for ActivityCategory {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ActivityCategory> for String {
    fn from(value: ActivityCategory) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Month/year selector shared by every store query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl PeriodFilter {
    pub fn new(month: impl Into<String>, year: i32) -> Self {
        Self {
            month: Some(month.into()),
            year: Some(year),
        }
    }

    pub fn matches(&self, month_name: &str, year: i32) -> bool {
        let month_matches = self
            .month
            .as_deref()
            .map(|month| same_month(month, month_name))
            .unwrap_or(true);
        let year_matches = self.year.map(|wanted| wanted == year).unwrap_or(true);
        month_matches && year_matches
    }
}

/// Month names are compared trimmed and case-insensitively.
pub fn same_month(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn into_f64(self) -> f64 {
        match self {
            LooseNumber::Number(value) if value.is_finite() => value,
            LooseNumber::Number(_) => 0.0,
            LooseNumber::Text(raw) => parse_lenient(&raw),
        }
    }
}

/// Parse a stored numeric string, treating anything unreadable as zero.
///
/// Accepts a decimal comma and grouping spaces as exported by Norwegian spreadsheets.
/// When both `,` and `.` appear, the later one is the decimal separator and the other
/// is grouping.
pub fn parse_lenient(raw: &str) -> f64 {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{a0}')
        .collect();

    let grouping = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => Some('.'),
        (Some(_), Some(_)) => Some(','),
        _ => None,
    };

    let cleaned: String = compact
        .chars()
        .filter(|ch| Some(*ch) != grouping)
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(value.map(LooseNumber::into_f64).unwrap_or(0.0))
}

pub(crate) fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}
