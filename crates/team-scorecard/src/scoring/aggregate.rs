use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use super::config::{Metric, ScoringConfig, ScoringScope};
use super::domain::{ActivityCategory, ActivityRecord, IncomingCallRecord, OutgoingCallRecord};
use super::identity::NameIdentityResolver;
use super::level::{resolve, ResolveMode, ScoreLevel};
use super::matrix::{MatrixFamily, ScoreMatrix, Threshold};
use super::report::{Granularity, MetricScore, ScoredReportRow};

/// Group key used for the company-wide bucket.
pub const COMPANY_KEY: &str = "all";

/// How the optional combined score of a row is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedScore {
    None,
    /// Unweighted mean of the four levels.
    Mean,
    /// Levels multiplied by the configured percentage weights.
    Weighted,
}

/// Per-granularity knobs. The differences between variants are intentional and kept explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringProfile {
    pub scope: ScoringScope,
    pub ce_fallback: ScoreLevel,
    pub rbsl_family: MatrixFamily,
    pub combined: CombinedScore,
}

impl ScoringProfile {
    pub const fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Individual => Self {
                scope: ScoringScope::Individual,
                ce_fallback: ScoreLevel::new(1, Threshold::Value(47.0)),
                rbsl_family: MatrixFamily::Linear,
                combined: CombinedScore::None,
            },
            Granularity::Team => Self {
                scope: ScoringScope::Group,
                ce_fallback: ScoreLevel::unscored(),
                rbsl_family: MatrixFamily::Ratio,
                combined: CombinedScore::Weighted,
            },
            Granularity::Department | Granularity::Company => Self {
                scope: ScoringScope::Group,
                ce_fallback: ScoreLevel::unscored(),
                rbsl_family: MatrixFamily::Ratio,
                combined: CombinedScore::Mean,
            },
        }
    }
}

/// Summed call and sales figures for one entity in one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub total_call_minutes: f64,
    pub total_outgoing_calls: f64,
    pub total_sales: f64,
    pub liv_sales: f64,
    pub skade_sales: f64,
}

impl AggregateMetrics {
    pub fn call_efficiency(&self) -> f64 {
        ratio(self.total_outgoing_calls, self.total_call_minutes)
    }

    pub fn liv_share(&self) -> f64 {
        ratio(self.liv_sales, self.total_sales)
    }

    pub fn liv_to_skade(&self) -> f64 {
        ratio(self.liv_sales, self.skade_sales)
    }

    fn add(&mut self, other: &AggregateMetrics) {
        self.total_call_minutes += other.total_call_minutes;
        self.total_outgoing_calls += other.total_outgoing_calls;
        self.total_sales += other.total_sales;
        self.liv_sales += other.liv_sales;
        self.skade_sales += other.skade_sales;
    }

    fn divided_by(&self, count: usize) -> AggregateMetrics {
        if count == 0 {
            return AggregateMetrics::default();
        }
        let count = count as f64;
        AggregateMetrics {
            total_call_minutes: self.total_call_minutes / count,
            total_outgoing_calls: self.total_outgoing_calls / count,
            total_sales: self.total_sales / count,
            liv_sales: self.liv_sales / count,
            skade_sales: self.skade_sales / count,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Per-person totals after name canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonTotals {
    pub canonical_name: String,
    pub team: Option<String>,
    pub department: Option<String>,
    pub metrics: AggregateMetrics,
}

/// Records for one month, as returned by the store.
#[derive(Debug, Clone, Copy)]
pub struct MonthRecords<'a> {
    pub activity: &'a [ActivityRecord],
    pub incoming: &'a [IncomingCallRecord],
    pub outgoing: &'a [OutgoingCallRecord],
}

/// Fold raw records into per-canonical-name totals, sorted by name.
pub fn fold_people(records: MonthRecords<'_>, resolver: &NameIdentityResolver) -> Vec<PersonTotals> {
    let mut people: HashMap<String, PersonTotals> = HashMap::new();

    for record in records.activity {
        let Some(person) = person_entry(&mut people, resolver, &record.person_name) else {
            continue;
        };
        if !record.team.trim().is_empty() {
            person.team = Some(record.team.trim().to_string());
        }
        if !record.department.trim().is_empty() {
            person.department = Some(record.department.trim().to_string());
        }

        person.metrics.total_sales += record.sale_value;
        match record.activity_category {
            ActivityCategory::Liv => person.metrics.liv_sales += record.sale_value,
            ActivityCategory::Skade => person.metrics.skade_sales += record.sale_value,
            ActivityCategory::Unspecified | ActivityCategory::Other(_) => {}
        }
    }

    for record in records.incoming {
        if let Some(person) = person_entry(&mut people, resolver, &record.person_name) {
            person.metrics.total_call_minutes += record.minutes;
        }
    }

    for record in records.outgoing {
        if let Some(person) = person_entry(&mut people, resolver, &record.person_name) {
            person.metrics.total_call_minutes += record.regular_call_minutes;
            person.metrics.total_outgoing_calls += record.outgoing_count;
        }
    }

    let mut people: Vec<PersonTotals> = people.into_values().collect();
    people.sort_by(|left, right| left.canonical_name.cmp(&right.canonical_name));
    people
}

fn person_entry<'m>(
    people: &'m mut HashMap<String, PersonTotals>,
    resolver: &NameIdentityResolver,
    name: &str,
) -> Option<&'m mut PersonTotals> {
    let canonical = resolver.canonicalize(name);
    if canonical.is_empty() {
        return None;
    }
    Some(
        people
            .entry(canonical.clone())
            .or_insert_with(|| PersonTotals {
                canonical_name: canonical,
                team: None,
                department: None,
                metrics: AggregateMetrics::default(),
            }),
    )
}

/// Turns per-person totals into scored rows for one granularity.
#[derive(Debug, Clone, Copy)]
pub struct AggregationEngine<'a> {
    config: Option<&'a ScoringConfig>,
    qualify_threshold_minutes: f64,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(config: Option<&'a ScoringConfig>, qualify_threshold_minutes: f64) -> Self {
        Self {
            config,
            qualify_threshold_minutes,
        }
    }

    pub fn qualifies(&self, person: &PersonTotals) -> bool {
        person.metrics.total_call_minutes > self.qualify_threshold_minutes
    }

    pub fn aggregate(
        &self,
        granularity: Granularity,
        month: &str,
        records: MonthRecords<'_>,
        resolver: &NameIdentityResolver,
    ) -> Vec<ScoredReportRow> {
        let people = fold_people(records, resolver);
        debug!(
            %granularity,
            month,
            people = people.len(),
            "folded month records"
        );

        match granularity {
            Granularity::Individual => self.individual_rows(month, &people, resolver),
            Granularity::Team => {
                self.group_rows(granularity, month, &people, |person| person.team.as_deref())
            }
            Granularity::Department => self.group_rows(granularity, month, &people, |person| {
                person.department.as_deref()
            }),
            Granularity::Company => {
                self.group_rows(granularity, month, &people, |_| Some(COMPANY_KEY))
            }
        }
    }

    fn individual_rows(
        &self,
        month: &str,
        people: &[PersonTotals],
        resolver: &NameIdentityResolver,
    ) -> Vec<ScoredReportRow> {
        let profile = ScoringProfile::for_granularity(Granularity::Individual);

        people
            .iter()
            .map(|person| {
                let metrics = &person.metrics;
                let mut row = self.score_row(
                    Granularity::Individual,
                    profile,
                    &person.canonical_name,
                    month,
                    [
                        metrics.total_call_minutes,
                        metrics.call_efficiency(),
                        metrics.total_sales,
                        metrics.liv_share(),
                    ],
                );
                row.team = person.team.clone();
                row.department = person.department.clone();
                row.alternate_name = resolver
                    .alternate_name(&person.canonical_name)
                    .map(str::to_string);
                row.qualified = Some(self.qualifies(person));
                row
            })
            .collect()
    }

    fn group_rows<'p>(
        &self,
        granularity: Granularity,
        month: &str,
        people: &'p [PersonTotals],
        key_of: impl Fn(&'p PersonTotals) -> Option<&'p str>,
    ) -> Vec<ScoredReportRow> {
        let profile = ScoringProfile::for_granularity(granularity);
        let mut groups: BTreeMap<&'p str, Vec<&'p PersonTotals>> = BTreeMap::new();

        for person in people {
            if let Some(key) = key_of(person) {
                groups.entry(key).or_default().push(person);
            }
        }

        if granularity == Granularity::Company {
            groups.entry(COMPANY_KEY).or_default();
        }

        groups
            .into_iter()
            .map(|(key, members)| {
                let qualifying: Vec<&PersonTotals> = members
                    .iter()
                    .copied()
                    .filter(|person| self.qualifies(person))
                    .collect();

                let mut totals = AggregateMetrics::default();
                for person in &qualifying {
                    totals.add(&person.metrics);
                }
                let average = totals.divided_by(qualifying.len());

                let rbsl = if granularity == Granularity::Company {
                    totals.liv_to_skade()
                } else {
                    average.liv_share()
                };

                let mut row = self.score_row(
                    granularity,
                    profile,
                    key,
                    month,
                    [
                        average.total_call_minutes,
                        average.call_efficiency(),
                        average.total_sales,
                        rbsl,
                    ],
                );
                row.members = Some(members.len());
                row.qualified_members = Some(qualifying.len());
                row
            })
            .collect()
    }

    /// `values` are ordered as [`Metric::ordered`].
    fn score_row(
        &self,
        granularity: Granularity,
        profile: ScoringProfile,
        entity_key: &str,
        month: &str,
        values: [f64; 4],
    ) -> ScoredReportRow {
        let [tcm, ce, ts, rbsl] = Metric::ordered().map(|metric| {
            let value = values[metric as usize];
            MetricScore {
                value,
                level: self.level_for(profile, metric, value),
            }
        });

        let combined = self.combined_score(profile.combined, [&tcm, &ce, &ts, &rbsl]);

        ScoredReportRow {
            entity_key: entity_key.to_string(),
            month: month.to_string(),
            granularity,
            team: None,
            department: None,
            alternate_name: None,
            qualified: None,
            members: None,
            qualified_members: None,
            tcm,
            ce,
            ts,
            rbsl,
            combined,
        }
    }

    pub fn level_for(&self, profile: ScoringProfile, metric: Metric, value: f64) -> ScoreLevel {
        let Some(config) = self.config else {
            return ScoreLevel::unscored();
        };

        let (family, mode) = match metric {
            Metric::Tcm | Metric::Ts => (MatrixFamily::Linear, ResolveMode::AtLeast),
            Metric::Ce => (
                MatrixFamily::Inverted,
                ResolveMode::CallEfficiency {
                    fallback: profile.ce_fallback,
                },
            ),
            Metric::Rbsl => (profile.rbsl_family, ResolveMode::Ratio),
        };

        let matrix = ScoreMatrix::build(family, config.benchmark(profile.scope, metric));
        resolve(value, &matrix, mode)
    }

    fn combined_score(&self, rule: CombinedScore, scores: [&MetricScore; 4]) -> Option<f64> {
        match rule {
            CombinedScore::None => None,
            CombinedScore::Mean => {
                let sum: f64 = scores.iter().map(|score| f64::from(score.level.level)).sum();
                Some(sum / scores.len() as f64)
            }
            CombinedScore::Weighted => {
                let weights = self.config?.weights;
                let total = Metric::ordered()
                    .iter()
                    .zip(scores)
                    .map(|(metric, score)| {
                        f64::from(score.level.level) * weights.get(*metric) / 100.0
                    })
                    .sum();
                Some(total)
            }
        }
    }
}
