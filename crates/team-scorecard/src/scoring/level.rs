use serde::Serialize;

use super::matrix::{MatrixEntry, ScoreMatrix, Threshold, LEVEL_COUNT};

/// Values under this are treated as zero call efficiency.
const NEAR_ZERO: f64 = 0.001;

/// Level awarded for a metric together with the threshold that was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreLevel {
    pub level: u8,
    pub score: Threshold,
}

impl ScoreLevel {
    pub const fn new(level: u8, score: Threshold) -> Self {
        Self { level, score }
    }

    /// Sentinel used when no threshold applies or no configuration exists.
    pub const fn unscored() -> Self {
        Self::new(1, Threshold::Excluded)
    }
}

/// Comparison rule used when matching a value against a matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolveMode {
    /// Raw value must reach the threshold (`>=`).
    AtLeast,
    /// Value is a ratio compared as a percentage with strict `>`; near-zero is best.
    CallEfficiency { fallback: ScoreLevel },
    /// Value is a ratio compared as a percentage with `>=`.
    Ratio,
}

pub fn resolve(value: f64, matrix: &ScoreMatrix, mode: ResolveMode) -> ScoreLevel {
    let ranked = ranked_entries(matrix);

    match mode {
        ResolveMode::AtLeast => first_match(&ranked, |score| value >= score)
            .unwrap_or_else(ScoreLevel::unscored),
        ResolveMode::CallEfficiency { fallback } => {
            if value == 0.0 || value < NEAR_ZERO {
                return ScoreLevel::new(LEVEL_COUNT, Threshold::Value(0.0));
            }

            let percent = value * 100.0;
            first_match(&ranked, |score| percent > score).unwrap_or(fallback)
        }
        ResolveMode::Ratio => {
            let percent = value * 100.0;
            first_match(&ranked, |score| percent >= score)
                .unwrap_or(ScoreLevel::new(1, Threshold::Value(0.0)))
        }
    }
}

/// Scored entries sorted by threshold, highest first; ties keep the higher level first.
fn ranked_entries(matrix: &ScoreMatrix) -> Vec<(MatrixEntry, f64)> {
    let mut ranked: Vec<(MatrixEntry, f64)> = matrix
        .entries()
        .iter()
        .filter_map(|entry| entry.score.value().map(|score| (*entry, score)))
        .collect();
    ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
    ranked
}

fn first_match(
    ranked: &[(MatrixEntry, f64)],
    clears: impl Fn(f64) -> bool,
) -> Option<ScoreLevel> {
    ranked
        .iter()
        .find(|(_, score)| clears(*score))
        .map(|(entry, _)| ScoreLevel::new(entry.level, entry.score))
}
