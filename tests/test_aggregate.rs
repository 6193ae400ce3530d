//! Aggregation tests: impact totals, monthly buckets and the heuristic
//! chart figures.

use chrono::{NaiveDate, TimeZone, Utc};
use swachh_sdk::aggregate::{
    compute_chart_series_at, compute_impact_summary, extract_magnitude, round1,
};
use swachh_sdk::models::{
    ChartSeries, CollectionTask, ImpactSummary, Report, Reward, WasteMetric,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn task(amount: &str, waste_type: Option<&str>, (y, m, d): (i32, u32, u32)) -> CollectionTask {
    CollectionTask {
        id: 0,
        location: "Somewhere".to_string(),
        waste_type: waste_type.map(str::to_string),
        amount: amount.to_string(),
        status: "completed".to_string(),
        created_at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
    }
}

fn reward(points: Option<i64>) -> Reward {
    Reward {
        id: 0,
        user_id: 1,
        points,
        name: "grant".to_string(),
        description: None,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    }
}

fn report() -> Report {
    Report {
        id: 0,
        user_id: 1,
        location: "Main St".to_string(),
        waste_type: "plastic".to_string(),
        amount: "1 kg".to_string(),
        image_url: None,
        verification_result: None,
        status: "pending".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

// ---------------------------------------------------------------------------
// extract_magnitude
// ---------------------------------------------------------------------------

#[test]
fn magnitude_reads_first_numeric_token() {
    assert_eq!(extract_magnitude("2kg"), 2.0);
    assert_eq!(extract_magnitude("1.5 kg"), 1.5);
    assert_eq!(extract_magnitude("approx 12.25 liters, maybe 3"), 12.25);
}

#[test]
fn magnitude_of_malformed_text_is_zero() {
    assert_eq!(extract_magnitude(""), 0.0);
    assert_eq!(extract_magnitude("abc"), 0.0);
    assert_eq!(extract_magnitude("a few bags"), 0.0);
}

#[test]
fn magnitude_ignores_leading_sign() {
    assert_eq!(extract_magnitude("-3 kg"), 3.0);
}

// ---------------------------------------------------------------------------
// compute_impact_summary
// ---------------------------------------------------------------------------

#[test]
fn summary_never_fails_on_malformed_amounts() {
    let tasks = vec![
        task("", None, (2024, 6, 1)),
        task("lots", Some("organic"), (2024, 6, 1)),
        task("-4kg", Some("hazardous"), (2024, 6, 1)),
        task("...", Some("recyclable"), (2024, 6, 1)),
    ];
    let summary = compute_impact_summary(&[], &[], &tasks);
    assert_eq!(summary.waste_collected, 4.0);
}

#[test]
fn waste_collected_sums_magnitudes() {
    let tasks = vec![
        task("2kg", None, (2024, 6, 1)),
        task("1.5 kg", None, (2024, 6, 2)),
        task("abc", None, (2024, 6, 3)),
    ];
    let summary = compute_impact_summary(&[], &[], &tasks);
    assert_eq!(summary.waste_collected, 3.5);
}

#[test]
fn co2_offset_rounds_half_away_from_zero() {
    let tasks = vec![task("2kg", None, (2024, 6, 1)), task("1.5 kg", None, (2024, 6, 2))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    // 3.5 * 0.5 = 1.75
    assert_eq!(summary.co2_offset, 1.8);
}

#[test]
fn tokens_treat_missing_points_as_zero() {
    let rewards = vec![reward(Some(10)), reward(None), reward(Some(5))];
    let summary = compute_impact_summary(&[], &rewards, &[]);
    assert_eq!(summary.tokens_earned, 15);
}

#[test]
fn token_total_saturates_instead_of_overflowing() {
    let rewards = vec![reward(Some(i64::MAX)), reward(Some(1)), reward(None)];
    let summary = compute_impact_summary(&[], &rewards, &[]);
    assert_eq!(summary.tokens_earned, i64::MAX);
}

#[test]
fn reports_submitted_counts_reports() {
    let summary = compute_impact_summary(&[report(), report(), report()], &[], &[]);
    assert_eq!(summary.reports_submitted, 3);
}

#[test]
fn empty_inputs_give_zero_summary_and_six_zero_buckets() {
    let summary = compute_impact_summary(&[], &[], &[]);
    assert_eq!(summary, ImpactSummary::default());

    let charts = compute_chart_series_at(&[], &[], &[], &summary, today());
    assert_eq!(charts.waste_collection.len(), 6);
    for bucket in &charts.waste_collection {
        for metric in WasteMetric::ALL {
            assert_eq!(bucket.value(metric), 0.0);
        }
    }
    assert_eq!(charts.sustainability_metrics.carbon_reduction, 0);
    assert_eq!(charts.sustainability_metrics.trees_equivalent, 0);
}

// ---------------------------------------------------------------------------
// Monthly buckets
// ---------------------------------------------------------------------------

#[test]
fn window_is_six_months_ending_today_oldest_first() {
    let charts = compute_chart_series_at(&[], &[], &[], &ImpactSummary::default(), today());
    let months: Vec<&str> = charts.waste_collection.iter().map(|b| b.month.as_str()).collect();
    assert_eq!(months, vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
    assert!(charts.waste_collection.iter().all(|b| b.year == 2024));
}

#[test]
fn out_of_window_task_counts_in_total_only() {
    let tasks = vec![
        task("3 kg", Some("organic"), (2024, 5, 10)),
        task("7 kg", Some("organic"), (2023, 12, 31)),
    ];
    let summary = compute_impact_summary(&[], &[], &tasks);
    assert_eq!(summary.waste_collected, 10.0);

    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let bucketed: f64 = charts.waste_collection.iter().map(|b| b.total).sum();
    assert_eq!(bucketed, 3.0);
}

#[test]
fn same_month_of_previous_year_is_outside_window() {
    let tasks = vec![task("5 kg", Some("organic"), (2023, 6, 20))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let jun = charts.waste_collection.last().unwrap();
    assert_eq!(jun.month, "Jun");
    assert_eq!(jun.total, 0.0);
}

#[test]
fn labelled_task_fills_only_its_category() {
    let tasks = vec![task("10 kg", Some("Organic Waste"), (2024, 6, 1))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let jun = charts.waste_collection.last().unwrap();
    assert_eq!(jun.organic, 10.0);
    assert_eq!(jun.recyclable, 0.0);
    assert_eq!(jun.hazardous, 0.0);
    assert_eq!(jun.total, 10.0);
}

#[test]
fn label_matching_is_case_insensitive_substring() {
    let tasks = vec![
        task("2 kg", Some("RECYCLED paper"), (2024, 4, 1)),
        task("3 kg", Some("Hazardous chemicals"), (2024, 4, 2)),
    ];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let apr = &charts.waste_collection[3];
    assert_eq!(apr.month, "Apr");
    assert_eq!(apr.recyclable, 2.0);
    assert_eq!(apr.hazardous, 3.0);
    assert_eq!(apr.organic, 0.0);
}

#[test]
fn untyped_task_is_split_45_35_20() {
    let tasks = vec![task("10 kg", None, (2024, 6, 1))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let jun = charts.waste_collection.last().unwrap();
    assert_eq!(jun.organic, 4.5);
    assert_eq!(jun.recyclable, 3.5);
    assert_eq!(jun.hazardous, 2.0);
    assert_eq!(jun.total, 10.0);
}

#[test]
fn unrecognized_label_is_split_like_untyped() {
    let tasks = vec![task("10 kg", Some("mixed"), (2024, 6, 1))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    assert_eq!(charts.waste_collection.last().unwrap().organic, 4.5);
}

#[test]
fn series_exposes_selected_metric() {
    let tasks = vec![task("10 kg", None, (2024, 6, 1))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let points = charts.series(WasteMetric::Recyclable);
    assert_eq!(points.len(), 6);
    assert_eq!(points[5], ("Jun".to_string(), 3.5));
}

// ---------------------------------------------------------------------------
// Heuristic figures
// ---------------------------------------------------------------------------

#[test]
fn sustainability_metrics_scale_with_totals() {
    let tasks = vec![task("30 kg", None, (2024, 6, 1))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let m = charts.sustainability_metrics;
    assert_eq!(m.carbon_reduction, 15);
    assert_eq!(m.energy_saved, 375);
    assert_eq!(m.water_saved, 246);
    assert_eq!(m.trees_equivalent, 1);
}

#[test]
fn recycling_rates_are_capped_and_keep_targets() {
    let tasks = vec![task("8 kg", None, (2024, 6, 1))];
    let summary = compute_impact_summary(&[], &[], &tasks);
    let charts = compute_chart_series_at(&[], &[], &tasks, &summary, today());
    let glass = charts
        .recycling_rates
        .iter()
        .find(|r| r.category == "Glass")
        .unwrap();
    assert_eq!(glass.rate, 95);
    assert_eq!(glass.target, 90);
    assert!(charts.recycling_rates.iter().all(|r| r.rate <= 100));
}

#[test]
fn composition_is_fixed() {
    let charts = compute_chart_series_at(&[], &[], &[], &ImpactSummary::default(), today());
    let total: u32 = charts.waste_composition.iter().map(|s| s.value).sum();
    assert_eq!(total, 100);
    assert_eq!(charts.waste_composition[0].name, "Organic");
    assert_eq!(charts.waste_composition[0].color, "#16a34a");
}

#[test]
fn fallback_has_no_buckets_and_zero_rates() {
    let charts = ChartSeries::fallback();
    assert!(charts.waste_collection.is_empty());
    assert_eq!(charts.recycling_rates.len(), 5);
    assert!(charts.recycling_rates.iter().all(|r| r.rate == 0 && r.target > 0));
    assert_eq!(charts.waste_composition.len(), 4);
}

#[test]
fn round1_examples() {
    assert_eq!(round1(1.75), 1.8);
    assert_eq!(round1(3.14159), 3.1);
    assert_eq!(round1(0.0), 0.0);
}
