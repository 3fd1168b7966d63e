use serde::{Deserialize, Serialize};

use super::domain::lenient_f64;

/// The four scored metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Total call minutes.
    Tcm,
    /// Outgoing calls per call minute.
    Ce,
    /// Total sales.
    Ts,
    /// Liv share of sales.
    Rbsl,
}

impl Metric {
    pub const fn ordered() -> [Metric; 4] {
        [Metric::Tcm, Metric::Ce, Metric::Ts, Metric::Rbsl]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Metric::Tcm => "Total Call Minutes",
            Metric::Ce => "Call Efficiency",
            Metric::Ts => "Total Sales",
            Metric::Rbsl => "Liv/Skade Ratio",
        }
    }
}

/// Which benchmark column set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringScope {
    Individual,
    /// Shared by team, department and company reports.
    Group,
}

/// Benchmark (level 5 threshold) and the step between adjacent levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub benchmark: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub interval: f64,
}

impl Benchmark {
    pub const fn new(benchmark: f64, interval: f64) -> Self {
        Self {
            benchmark,
            interval,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBenchmarks {
    #[serde(default)]
    pub tcm: Benchmark,
    #[serde(default)]
    pub ce: Benchmark,
    #[serde(default)]
    pub ts: Benchmark,
    #[serde(default)]
    pub rbsl: Benchmark,
}

impl MetricBenchmarks {
    pub fn get(&self, metric: Metric) -> Benchmark {
        match metric {
            Metric::Tcm => self.tcm,
            Metric::Ce => self.ce,
            Metric::Ts => self.ts,
            Metric::Rbsl => self.rbsl,
        }
    }
}

/// Percentage weights for the team dashboard total; expected to sum to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tcm: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ce: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ts: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rbsl: f64,
}

impl ScoringWeights {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Tcm => self.tcm,
            Metric::Ce => self.ce,
            Metric::Ts => self.ts,
            Metric::Rbsl => self.rbsl,
        }
    }

    pub fn total(&self) -> f64 {
        self.tcm + self.ce + self.ts + self.rbsl
    }
}

/// The single active scoring configuration row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub individual: MetricBenchmarks,
    #[serde(default)]
    pub group: MetricBenchmarks,
    #[serde(default)]
    pub weights: ScoringWeights,
}

impl ScoringConfig {
    pub fn benchmark(&self, scope: ScoringScope, metric: Metric) -> Benchmark {
        match scope {
            ScoringScope::Individual => self.individual.get(metric),
            ScoringScope::Group => self.group.get(metric),
        }
    }
}
