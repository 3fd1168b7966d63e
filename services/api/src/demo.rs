use crate::infra::{in_memory_service, parse_granularity};
use chrono::{Datelike, Local};
use clap::Args;
use std::path::PathBuf;
use team_scorecard::config::AppConfig;
use team_scorecard::error::AppError;
use team_scorecard::scoring::{
    ActivityCategory, ActivityRecord, FixturePaths, FixtureSet, Granularity, IncomingCallRecord,
    Metric, NameAliasMapping, OutgoingCallRecord, RecordStore, ReportEnvelope, ScorecardService,
    ScoredReport, ScoredReportRow, SeedSummary,
};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// individual, team, department or company
    #[arg(long, value_parser = parse_granularity, default_value = "individual")]
    pub(crate) granularity: Granularity,
    /// Month name to score; repeat for several months
    #[arg(long = "month", required = true)]
    pub(crate) months: Vec<String>,
    /// Report year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Activity CSV export
    #[arg(long)]
    pub(crate) activity: Option<PathBuf>,
    /// Incoming call CSV export
    #[arg(long)]
    pub(crate) incoming_calls: Option<PathBuf>,
    /// Outgoing call CSV export
    #[arg(long)]
    pub(crate) outgoing_calls: Option<PathBuf>,
    /// Name alias CSV (name, alternate_name)
    #[arg(long)]
    pub(crate) aliases: Option<PathBuf>,
    /// Print the JSON envelope instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print JSON envelopes instead of tables
    #[arg(long)]
    pub(crate) json: bool,
}

const DEMO_YEAR: i32 = 2024;
const DEMO_MONTH: &str = "Januar";

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        granularity,
        months,
        year,
        activity,
        incoming_calls,
        outgoing_calls,
        aliases,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = in_memory_service(config.scoring.qualify_threshold_minutes);

    let fixtures = FixtureSet::load(&FixturePaths {
        activity,
        incoming_calls,
        outgoing_calls,
        aliases,
    })?;
    if fixtures.is_empty() {
        println!("No CSV exports supplied; the report will be empty.");
    }
    let seeded = fixtures.seed(&service)?;
    print_seed_summary(&seeded);

    let year = year.unwrap_or_else(|| Local::now().year());
    let report = service.report(granularity, &months, year)?;
    render(report, json);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Team scorecard demo ({DEMO_MONTH} {DEMO_YEAR})");

    let service = in_memory_service(team_scorecard::config::DEFAULT_QUALIFY_THRESHOLD_MINUTES);
    let seeded = seed_demo_records(&service)?;
    print_seed_summary(&seeded);

    let months = vec![DEMO_MONTH.to_string()];
    for granularity in Granularity::ordered() {
        let report = service.report(granularity, &months, DEMO_YEAR)?;
        render(report, args.json);
    }

    Ok(())
}

fn seed_demo_records<S>(service: &ScorecardService<S>) -> Result<SeedSummary, AppError>
where
    S: RecordStore + 'static,
{
    let people = [
        ("Kari Nordmann", "Nord", "Bergen", 620.0, 150.0, 48.0),
        ("Ola Hansen", "Nord", "Bergen", 410.0, 90.0, 31.0),
        ("Per Berg", "Sør", "Bergen", 780.0, 260.0, 95.0),
        ("Nina Lie", "Vest", "Stavanger", 900.0, 120.0, 40.0),
        ("Jon D.", "Vest", "Stavanger", 540.0, 0.0, 0.0),
    ];

    let mut fixtures = FixtureSet::default();
    for (person, team, department, incoming, outgoing_minutes, outgoing_count) in people {
        fixtures.incoming_calls.push(IncomingCallRecord {
            person_name: person.to_string(),
            minutes: incoming,
            year: DEMO_YEAR,
            month_name: DEMO_MONTH.to_string(),
        });
        if outgoing_minutes > 0.0 {
            fixtures.outgoing_calls.push(OutgoingCallRecord {
                person_name: person.to_string(),
                outgoing_count,
                regular_call_minutes: outgoing_minutes,
                company_call_minutes: 12.0,
                year: DEMO_YEAR,
                month_name: DEMO_MONTH.to_string(),
            });
        }
        for (category, value) in [("liv", 38000.0), ("skade", 27000.0)] {
            fixtures.activity.push(ActivityRecord {
                person_name: person.to_string(),
                team: team.to_string(),
                department: department.to_string(),
                activity_category: ActivityCategory::from(category),
                sale_value: value,
                year: DEMO_YEAR,
                month_name: DEMO_MONTH.to_string(),
                alternative_names: None,
            });
        }
    }

    // the same person logged under a second spelling by the phone system
    fixtures.incoming_calls.push(IncomingCallRecord {
        person_name: "Jon Doe".to_string(),
        minutes: 300.0,
        year: DEMO_YEAR,
        month_name: DEMO_MONTH.to_string(),
    });
    fixtures
        .aliases
        .push(NameAliasMapping::new("Jon Doe", "Jon D."));

    Ok(fixtures.seed(service)?)
}

fn print_seed_summary(summary: &SeedSummary) {
    let tables = [
        ("activity", &summary.activity),
        ("incoming calls", &summary.incoming_calls),
        ("outgoing calls", &summary.outgoing_calls),
    ];
    for (label, outcome) in tables {
        if let Some(outcome) = outcome {
            println!(
                "- {label}: {} of {} rows imported",
                outcome.inserted, outcome.attempted
            );
            for error in &outcome.errors {
                println!("  - {error}");
            }
        }
    }
    if summary.aliases > 0 {
        println!("- aliases: {}", summary.aliases);
    }
}

fn render(report: ScoredReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(&ReportEnvelope::from(report)) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Report payload unavailable: {}", err),
        }
        return;
    }

    let metadata = &report.metadata;
    println!(
        "\n{} report | {} {} | threshold {} min{}",
        metadata.granularity,
        metadata.months.join(", "),
        metadata.year,
        metadata.qualify_threshold_minutes,
        if metadata.scoring_configured {
            ""
        } else {
            " | no scoring configuration"
        }
    );

    if report.rows.is_empty() {
        println!("No rows.");
        return;
    }

    println!(
        "{:<18} {:<8} {:>9} {:>3} {:>7} {:>3} {:>11} {:>3} {:>7} {:>3} {:>6}",
        "Entity", "Month", "Minutes", "L", "CE", "L", "Sales", "L", "Liv", "L", "Total"
    );
    for row in &report.rows {
        let view = row.view();
        println!(
            "{:<18} {:<8} {:>9} {:>3} {:>7} {:>3} {:>11} {:>3} {:>7} {:>3} {:>6}",
            view.entity_key,
            view.month,
            view.call_minutes,
            view.call_minutes_level,
            view.call_efficiency,
            view.call_efficiency_level,
            view.total_sales,
            view.total_sales_level,
            view.liv_ratio,
            view.liv_ratio_level,
            view.combined
        );
    }

    if report.rows.len() > 1 {
        for (metric, row) in metric_leaders(&report.rows) {
            println!(
                "  top {}: {} ({}, level {})",
                metric.label(),
                row.entity_key,
                row.month,
                row.metric(metric).level.level
            );
        }
    }
}

/// Highest-level row per metric; the first row wins ties.
fn metric_leaders(rows: &[ScoredReportRow]) -> Vec<(Metric, &ScoredReportRow)> {
    Metric::ordered()
        .into_iter()
        .filter_map(|metric| {
            rows.iter()
                .fold(None, |best: Option<&ScoredReportRow>, row| match best {
                    Some(current)
                        if current.metric(metric).level.level
                            >= row.metric(metric).level.level =>
                    {
                        Some(current)
                    }
                    _ => Some(row),
                })
                .map(|row| (metric, row))
        })
        .collect()
}
