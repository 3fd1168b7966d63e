use std::fmt;

use serde::{Serialize, Serializer};

use super::config::Benchmark;

pub const LEVEL_COUNT: u8 = 10;
pub const BENCHMARK_LEVEL: u8 = 5;

/// Threshold for one level; `Excluded` renders as "-" and never matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Value(f64),
    Excluded,
}

impl Threshold {
    pub fn value(self) -> Option<f64> {
        match self {
            Threshold::Value(value) => Some(value),
            Threshold::Excluded => None,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Value(value) if value.fract() == 0.0 => write!(f, "{value:.0}"),
            Threshold::Value(value) => write!(f, "{value}"),
            Threshold::Excluded => f.write_str("-"),
        }
    }
}

impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Threshold::Value(value) => serializer.serialize_f64(*value),
            Threshold::Excluded => serializer.serialize_str("-"),
        }
    }
}

/// How a benchmark/interval pair spreads over the ten levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixFamily {
    /// Higher is better; level 1 is excluded.
    Linear,
    /// Lower is better; level 10 is pinned to zero.
    Inverted,
    /// Higher is better; level 1 is pinned to zero.
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixEntry {
    pub level: u8,
    pub score: Threshold,
}

/// Ten entries ordered from level 10 down to level 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMatrix {
    family: MatrixFamily,
    entries: Vec<MatrixEntry>,
}

impl ScoreMatrix {
    pub fn build(family: MatrixFamily, benchmark: Benchmark) -> Self {
        let entries = (1..=LEVEL_COUNT)
            .rev()
            .map(|level| MatrixEntry {
                level,
                score: threshold_for(family, level, benchmark),
            })
            .collect();

        Self { family, entries }
    }

    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    pub fn score_at(&self, level: u8) -> Option<Threshold> {
        self.entries
            .iter()
            .find(|entry| entry.level == level)
            .map(|entry| entry.score)
    }
}

fn threshold_for(family: MatrixFamily, level: u8, benchmark: Benchmark) -> Threshold {
    let Benchmark {
        benchmark,
        interval,
    } = benchmark;

    if level == BENCHMARK_LEVEL {
        return Threshold::Value(benchmark);
    }

    let offset = f64::from(level) - f64::from(BENCHMARK_LEVEL);

    match family {
        MatrixFamily::Linear => {
            if level == 1 {
                Threshold::Excluded
            } else {
                Threshold::Value(benchmark + offset * interval)
            }
        }
        MatrixFamily::Inverted => {
            if level == LEVEL_COUNT {
                Threshold::Value(0.0)
            } else {
                Threshold::Value(benchmark - offset * interval)
            }
        }
        MatrixFamily::Ratio => {
            if level == 1 {
                Threshold::Value(0.0)
            } else {
                Threshold::Value(benchmark + offset * interval)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(matrix: &ScoreMatrix) -> Vec<Option<f64>> {
        matrix
            .entries()
            .iter()
            .map(|entry| entry.score.value())
            .collect()
    }

    #[test]
    fn linear_family_matches_worked_example() {
        let matrix = ScoreMatrix::build(MatrixFamily::Linear, Benchmark::new(1000.0, 100.0));
        assert_eq!(matrix.score_at(5), Some(Threshold::Value(1000.0)));
        assert_eq!(matrix.score_at(6), Some(Threshold::Value(1100.0)));
        assert_eq!(matrix.score_at(9), Some(Threshold::Value(1400.0)));
        assert_eq!(matrix.score_at(10), Some(Threshold::Value(1500.0)));
        assert_eq!(matrix.score_at(2), Some(Threshold::Value(700.0)));
        assert_eq!(matrix.score_at(1), Some(Threshold::Excluded));
    }

    #[test]
    fn inverted_family_matches_worked_example() {
        let matrix = ScoreMatrix::build(MatrixFamily::Inverted, Benchmark::new(35.0, 3.0));
        assert_eq!(matrix.score_at(10), Some(Threshold::Value(0.0)));
        assert_eq!(matrix.score_at(9), Some(Threshold::Value(23.0)));
        assert_eq!(matrix.score_at(6), Some(Threshold::Value(32.0)));
        assert_eq!(matrix.score_at(5), Some(Threshold::Value(35.0)));
        assert_eq!(matrix.score_at(4), Some(Threshold::Value(38.0)));
        assert_eq!(matrix.score_at(1), Some(Threshold::Value(47.0)));
    }

    #[test]
    fn ratio_family_pins_level_one_to_zero() {
        let matrix = ScoreMatrix::build(MatrixFamily::Ratio, Benchmark::new(40.0, 5.0));
        assert_eq!(matrix.score_at(10), Some(Threshold::Value(65.0)));
        assert_eq!(matrix.score_at(7), Some(Threshold::Value(50.0)));
        assert_eq!(matrix.score_at(5), Some(Threshold::Value(40.0)));
        assert_eq!(matrix.score_at(2), Some(Threshold::Value(25.0)));
        assert_eq!(matrix.score_at(1), Some(Threshold::Value(0.0)));
    }

    #[test]
    fn level_five_equals_benchmark_for_every_family() {
        for family in [
            MatrixFamily::Linear,
            MatrixFamily::Inverted,
            MatrixFamily::Ratio,
        ] {
            for (benchmark, interval) in [(0.0, 0.0), (12.5, 0.75), (-3.0, 2.0), (9000.0, -50.0)] {
                let matrix = ScoreMatrix::build(family, Benchmark::new(benchmark, interval));
                assert_eq!(
                    matrix.score_at(BENCHMARK_LEVEL),
                    Some(Threshold::Value(benchmark)),
                    "{family:?} with benchmark {benchmark}"
                );
            }
        }
    }

    #[test]
    fn entries_run_from_ten_down_to_one() {
        let matrix = ScoreMatrix::build(MatrixFamily::Linear, Benchmark::new(10.0, 1.0));
        let levels: Vec<u8> = matrix.entries().iter().map(|entry| entry.level).collect();
        assert_eq!(levels, vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn linear_scores_strictly_increase_with_level() {
        let matrix = ScoreMatrix::build(MatrixFamily::Linear, Benchmark::new(250.0, 12.5));
        let values: Vec<f64> = scores(&matrix).into_iter().flatten().collect();
        assert_eq!(values.len(), 9);
        assert!(values.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn inverted_scores_decrease_from_level_one_to_nine() {
        let matrix = ScoreMatrix::build(MatrixFamily::Inverted, Benchmark::new(35.0, 3.0));
        let below_ten: Vec<f64> = matrix
            .entries()
            .iter()
            .filter(|entry| entry.level < LEVEL_COUNT)
            .filter_map(|entry| entry.score.value())
            .collect();
        assert!(below_ten.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn threshold_display_trims_whole_numbers() {
        assert_eq!(Threshold::Value(47.0).to_string(), "47");
        assert_eq!(Threshold::Value(32.5).to_string(), "32.5");
        assert_eq!(Threshold::Excluded.to_string(), "-");
    }
}
