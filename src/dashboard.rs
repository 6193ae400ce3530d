//! The impact dashboard: one fetch of the three record lists, rolled up.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::aggregate;
use crate::config::DASHBOARD_FETCH_LIMIT;
use crate::error::Result;
use crate::models::{ChartSeries, CollectionTask, ImpactSummary, Report, Reward};
use crate::SwachhSdk;

/// Message shown when any of the dashboard fetches fails.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load report data. Please try again later.";

/// Where the dashboard reads its records from.
pub trait RecordSource {
    fn recent_reports(&self, limit: usize) -> Result<Vec<Report>>;
    fn all_rewards(&self) -> Result<Vec<Reward>>;
    fn collection_tasks(&self, limit: usize) -> Result<Vec<CollectionTask>>;
}

impl RecordSource for SwachhSdk {
    fn recent_reports(&self, limit: usize) -> Result<Vec<Report>> {
        self.reports().recent(limit)
    }

    fn all_rewards(&self) -> Result<Vec<Reward>> {
        self.rewards().all()
    }

    fn collection_tasks(&self, limit: usize) -> Result<Vec<CollectionTask>> {
        self.tasks().list(limit)
    }
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: ImpactSummary,
    pub charts: ChartSeries,
    /// Banner text when the records could not be loaded.
    #[serde(default)]
    pub error: Option<String>,
    /// Whether reloading might help.
    #[serde(default)]
    pub retryable: bool,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    /// Fetch the three record lists and aggregate them.
    ///
    /// All or nothing: if any fetch fails the view falls back to zeroed
    /// totals and placeholder charts with an error banner.
    pub fn load<S: RecordSource + ?Sized>(source: &S) -> Self {
        let fetched = source
            .recent_reports(DASHBOARD_FETCH_LIMIT)
            .and_then(|reports| Ok((reports, source.all_rewards()?)))
            .and_then(|(reports, rewards)| {
                Ok((reports, rewards, source.collection_tasks(DASHBOARD_FETCH_LIMIT)?))
            });

        match fetched {
            Ok((reports, rewards, tasks)) => Self::from_records(&reports, &rewards, &tasks),
            Err(e) => {
                error!(error = %e, "error fetching impact data");
                Self::fallback(LOAD_ERROR_MESSAGE)
            }
        }
    }

    /// Aggregate already-fetched records as of today's UTC date.
    pub fn from_records(reports: &[Report], rewards: &[Reward], tasks: &[CollectionTask]) -> Self {
        Self::from_records_at(reports, rewards, tasks, Utc::now().date_naive())
    }

    pub fn from_records_at(
        reports: &[Report],
        rewards: &[Reward],
        tasks: &[CollectionTask],
        today: NaiveDate,
    ) -> Self {
        let summary = aggregate::compute_impact_summary(reports, rewards, tasks);
        let charts = aggregate::compute_chart_series_at(reports, rewards, tasks, &summary, today);
        info!(
            reports = reports.len(),
            rewards = rewards.len(),
            tasks = tasks.len(),
            waste_collected = summary.waste_collected,
            "dashboard aggregated"
        );
        Self {
            summary,
            charts,
            error: None,
            retryable: false,
            generated_at: Utc::now(),
        }
    }

    /// Zeroed view carrying an error banner.
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            summary: ImpactSummary::default(),
            charts: ChartSeries::fallback(),
            error: Some(message.into()),
            retryable: true,
            generated_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
