use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use team_scorecard::scoring::{
    Benchmark, Granularity, InMemoryRecordStore, MetricBenchmarks, ScorecardService,
    ScoringConfig, ScoringWeights,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Benchmarks a fresh deployment starts from until someone stores a real configuration.
pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig {
        individual: MetricBenchmarks {
            tcm: Benchmark::new(1000.0, 100.0),
            ce: Benchmark::new(35.0, 3.0),
            ts: Benchmark::new(60000.0, 10000.0),
            rbsl: Benchmark::new(40.0, 5.0),
        },
        group: MetricBenchmarks {
            tcm: Benchmark::new(1100.0, 100.0),
            ce: Benchmark::new(33.0, 3.0),
            ts: Benchmark::new(70000.0, 10000.0),
            rbsl: Benchmark::new(45.0, 5.0),
        },
        weights: ScoringWeights {
            tcm: 30.0,
            ce: 20.0,
            ts: 30.0,
            rbsl: 20.0,
        },
    }
}

pub(crate) fn in_memory_service(
    qualify_threshold_minutes: f64,
) -> ScorecardService<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::with_config(default_scoring_config()));
    ScorecardService::with_threshold(store, qualify_threshold_minutes)
}

pub(crate) fn parse_granularity(raw: &str) -> Result<Granularity, String> {
    raw.parse::<Granularity>().map_err(|err| err.to_string())
}
