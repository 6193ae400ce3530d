//! Rolls raw reports, rewards and collection tasks up into the dashboard's
//! headline totals and chart series.
//!
//! Everything here is a pure function of its inputs. Malformed amounts count
//! as zero; nothing in this module returns an error or panics.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::models::{
    ChartSeries, CollectionTask, CompositionSlice, ImpactSummary, MonthlyBucket, RecyclingRate,
    Report, Reward, SustainabilityMetrics,
};

/// Number of calendar months in the collection chart, current month included.
pub const MONTH_WINDOW: usize = 6;

/// kg of CO2 offset per kg of waste collected.
pub const CO2_PER_KG: f64 = 0.5;
/// kWh saved per kg collected.
pub const ENERGY_PER_KG: f64 = 12.5;
/// Litres of water saved per kg collected.
pub const WATER_PER_KG: f64 = 8.2;
/// kg of CO2 one tree absorbs, for the trees-equivalent figure.
pub const CO2_PER_TREE: f64 = 15.0;

/// Split applied to tasks whose label names no category:
/// organic, recyclable, hazardous.
pub const DEFAULT_SPLIT: (f64, f64, f64) = (0.45, 0.35, 0.20);

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Fixed assumptions behind one recycling-rate row.
///
/// No per-category collection data exists, so the rate is the ratio of two
/// assumed shares of total waste, capped. It is a placeholder figure.
pub struct RecyclingHeuristic {
    pub category: &'static str,
    pub recycled_share: f64,
    pub generated_share: f64,
    pub target: u32,
    pub cap: u32,
}

pub const RECYCLING_HEURISTICS: [RecyclingHeuristic; 5] = [
    RecyclingHeuristic {
        category: "Plastic",
        recycled_share: 0.25,
        generated_share: 0.30,
        target: 75,
        cap: 95,
    },
    RecyclingHeuristic {
        category: "Paper",
        recycled_share: 0.30,
        generated_share: 0.35,
        target: 85,
        cap: 95,
    },
    RecyclingHeuristic {
        category: "Glass",
        recycled_share: 0.15,
        generated_share: 0.15,
        target: 90,
        cap: 95,
    },
    RecyclingHeuristic {
        category: "Metal",
        recycled_share: 0.10,
        generated_share: 0.12,
        target: 80,
        cap: 95,
    },
    RecyclingHeuristic {
        category: "Organic",
        recycled_share: 0.40,
        generated_share: 0.45,
        target: 95,
        cap: 100,
    },
];

/// Static composition breakdown; independent of the records.
pub fn waste_composition() -> Vec<CompositionSlice> {
    [
        ("Organic", 45, "#16a34a"),
        ("Recyclable", 35, "#22c55e"),
        ("Non-Recyclable", 15, "#84cc16"),
        ("Hazardous", 5, "#fbbf24"),
    ]
    .into_iter()
    .map(|(name, value, color)| CompositionSlice {
        name: name.to_string(),
        value,
        color: color.to_string(),
    })
    .collect()
}

fn magnitude_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(\.\d+)?").expect("static regex"))
}

/// First integer or decimal token in a free-text amount, or 0.
///
/// A leading sign is not part of the token: `"-3 kg"` reads as 3.
pub fn extract_magnitude(amount: &str) -> f64 {
    magnitude_regex()
        .find(amount)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Round to one decimal place, halves away from zero.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round_whole(x: f64) -> i64 {
    x.round() as i64
}

/// Headline totals for the dashboard.
pub fn compute_impact_summary(
    reports: &[Report],
    rewards: &[Reward],
    tasks: &[CollectionTask],
) -> ImpactSummary {
    let raw_waste: f64 = tasks.iter().map(|t| extract_magnitude(&t.amount)).sum();
    let tokens_earned = rewards
        .iter()
        .map(|r| r.points.unwrap_or(0))
        .fold(0i64, |acc, p| acc.saturating_add(p));

    ImpactSummary {
        waste_collected: round1(raw_waste),
        reports_submitted: reports.len(),
        tokens_earned,
        co2_offset: round1(raw_waste * CO2_PER_KG),
    }
}

/// Chart series as of today's UTC date.
pub fn compute_chart_series(
    reports: &[Report],
    rewards: &[Reward],
    tasks: &[CollectionTask],
    summary: &ImpactSummary,
) -> ChartSeries {
    compute_chart_series_at(reports, rewards, tasks, summary, Utc::now().date_naive())
}

/// Chart series with the six-month window ending at `today`'s month.
///
/// Reports and rewards feed only the summary today; they are accepted here
/// so callers hand the same three lists to both steps.
pub fn compute_chart_series_at(
    _reports: &[Report],
    _rewards: &[Reward],
    tasks: &[CollectionTask],
    summary: &ImpactSummary,
    today: NaiveDate,
) -> ChartSeries {
    ChartSeries {
        waste_collection: monthly_buckets(tasks, today),
        recycling_rates: recycling_rates(summary.waste_collected),
        sustainability_metrics: sustainability_metrics(summary),
        waste_composition: waste_composition(),
    }
}

/// Months since year zero, so windows can be compared across year ends.
fn month_index(year: i32, month0: u32) -> i64 {
    year as i64 * 12 + month0 as i64
}

fn monthly_buckets(tasks: &[CollectionTask], today: NaiveDate) -> Vec<MonthlyBucket> {
    let last = month_index(today.year(), today.month0());
    let first = last - (MONTH_WINDOW as i64 - 1);

    let mut buckets: Vec<MonthlyBucket> = (first..=last)
        .map(|idx| MonthlyBucket {
            month: MONTH_LABELS[idx.rem_euclid(12) as usize].to_string(),
            year: idx.div_euclid(12) as i32,
            organic: 0.0,
            recyclable: 0.0,
            hazardous: 0.0,
            total: 0.0,
        })
        .collect();

    for task in tasks {
        let created = task.created_at.date_naive();
        let idx = month_index(created.year(), created.month0());
        if idx < first || idx > last {
            continue;
        }
        let bucket = &mut buckets[(idx - first) as usize];
        let amount = extract_magnitude(&task.amount);
        let label = task.waste_type.as_deref().unwrap_or("").to_lowercase();

        if label.contains("organic") {
            bucket.organic += amount;
        } else if label.contains("recycl") {
            bucket.recyclable += amount;
        } else if label.contains("hazard") {
            bucket.hazardous += amount;
        } else {
            let (organic, recyclable, hazardous) = DEFAULT_SPLIT;
            bucket.organic += amount * organic;
            bucket.recyclable += amount * recyclable;
            bucket.hazardous += amount * hazardous;
        }
        bucket.total += amount;
    }

    for bucket in &mut buckets {
        bucket.organic = round1(bucket.organic);
        bucket.recyclable = round1(bucket.recyclable);
        bucket.hazardous = round1(bucket.hazardous);
        bucket.total = round1(bucket.total);
    }

    buckets
}

fn recycling_rates(total_waste: f64) -> Vec<RecyclingRate> {
    RECYCLING_HEURISTICS
        .iter()
        .map(|h| {
            // With nothing collected the ratio is undefined; report zero
            let rate = if total_waste > 0.0 {
                let recycled = total_waste * h.recycled_share;
                let generated = total_waste * h.generated_share;
                let pct = recycled / generated * 100.0;
                (pct.round() as u32).min(h.cap)
            } else {
                0
            };
            RecyclingRate {
                category: h.category.to_string(),
                rate,
                target: h.target,
            }
        })
        .collect()
}

fn sustainability_metrics(summary: &ImpactSummary) -> SustainabilityMetrics {
    SustainabilityMetrics {
        carbon_reduction: round_whole(summary.co2_offset),
        energy_saved: round_whole(summary.waste_collected * ENERGY_PER_KG),
        water_saved: round_whole(summary.waste_collected * WATER_PER_KG),
        trees_equivalent: round_whole(summary.co2_offset / CO2_PER_TREE),
    }
}
