//! Display strings for report values. Zero is shown as "-" so empty cells and
//! genuine zeros look the same on the dashboard; the aggregates keep true zeros.

use super::level::ScoreLevel;

pub const PLACEHOLDER: &str = "-";

const GROUP_SEPARATOR: char = ' ';

/// Whole-number rendering with thousands grouping, e.g. `12 345`.
pub fn format_count(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let rounded = value.round();
    if rounded == 0.0 {
        return "0".to_string();
    }

    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Ratio rendered as a one-decimal percentage, e.g. `0.3333` -> `33.3%`.
pub fn format_percent(ratio: f64) -> String {
    if ratio == 0.0 || !ratio.is_finite() {
        return PLACEHOLDER.to_string();
    }

    format!("{:.1}%", ratio * 100.0)
}

/// One-decimal rendering for combined scores.
pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(score) if score != 0.0 && score.is_finite() => format!("{score:.1}"),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_level(level: Option<&ScoreLevel>) -> String {
    match level {
        Some(level) => level.level.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}
