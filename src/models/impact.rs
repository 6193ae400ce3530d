use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ImpactSummary: Headline totals shown on the dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    /// Kilograms collected across all tasks, one decimal.
    pub waste_collected: f64,
    pub reports_submitted: usize,
    pub tokens_earned: i64,
    /// Kilograms of CO2 offset, one decimal.
    pub co2_offset: f64,
}

// ---------------------------------------------------------------------------
// WasteMetric: Which series of a monthly bucket a chart shows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteMetric {
    #[default]
    Total,
    Organic,
    Recyclable,
    Hazardous,
}

impl WasteMetric {
    pub const ALL: [WasteMetric; 4] = [
        WasteMetric::Total,
        WasteMetric::Organic,
        WasteMetric::Recyclable,
        WasteMetric::Hazardous,
    ];
}

impl std::str::FromStr for WasteMetric {
    type Err = crate::error::SwachhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(WasteMetric::Total),
            "organic" => Ok(WasteMetric::Organic),
            "recyclable" => Ok(WasteMetric::Recyclable),
            "hazardous" => Ok(WasteMetric::Hazardous),
            other => Err(crate::error::SwachhError::InvalidArgument(format!(
                "Unknown waste metric: {}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// MonthlyBucket: Collected waste for one calendar month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// Short month name, e.g. `"Mar"`.
    pub month: String,
    pub year: i32,
    pub organic: f64,
    pub recyclable: f64,
    pub hazardous: f64,
    pub total: f64,
}

impl MonthlyBucket {
    pub fn value(&self, metric: WasteMetric) -> f64 {
        match metric {
            WasteMetric::Total => self.total,
            WasteMetric::Organic => self.organic,
            WasteMetric::Recyclable => self.recyclable,
            WasteMetric::Hazardous => self.hazardous,
        }
    }
}

// ---------------------------------------------------------------------------
// RecyclingRate / SustainabilityMetrics / CompositionSlice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingRate {
    pub category: String,
    /// Percent, heuristic.
    pub rate: u32,
    pub target: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityMetrics {
    /// kg CO2
    pub carbon_reduction: i64,
    /// kWh
    pub energy_saved: i64,
    /// litres
    pub water_saved: i64,
    pub trees_equivalent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSlice {
    pub name: String,
    /// Percent of the whole.
    pub value: u32,
    /// Hex colour used by the pie chart.
    pub color: String,
}

// ---------------------------------------------------------------------------
// ChartSeries: Everything the report page plots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub waste_collection: Vec<MonthlyBucket>,
    pub recycling_rates: Vec<RecyclingRate>,
    pub sustainability_metrics: SustainabilityMetrics,
    pub waste_composition: Vec<CompositionSlice>,
}

impl ChartSeries {
    /// Series shown when the records could not be fetched: no monthly
    /// buckets, every rate at zero next to its target, the fixed composition.
    pub fn fallback() -> Self {
        Self {
            waste_collection: Vec::new(),
            recycling_rates: crate::aggregate::RECYCLING_HEURISTICS
                .iter()
                .map(|h| RecyclingRate {
                    category: h.category.to_string(),
                    rate: 0,
                    target: h.target,
                })
                .collect(),
            sustainability_metrics: SustainabilityMetrics::default(),
            waste_composition: crate::aggregate::waste_composition(),
        }
    }

    /// `(label, value)` points for one metric, oldest month first.
    pub fn series(&self, metric: WasteMetric) -> Vec<(String, f64)> {
        self.waste_collection
            .iter()
            .map(|b| (b.month.clone(), b.value(metric)))
            .collect()
    }
}
