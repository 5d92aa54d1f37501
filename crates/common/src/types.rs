//! Domain types shared across the dashboard core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Series Points ─────────────────────────────────────────────────────

/// One sample of the reference (price) series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub tstamp: DateTime<Utc>,
    pub price: f64,
}

/// One sample of a text-derived weight series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub tstamp: DateTime<Utc>,
    /// How prevalent the search text was at this point in time.
    pub prevalence: f64,
    /// Aggregate sentiment of the matching documents.
    pub sentiment: f64,
    /// Present when this point is tied to a notable linked event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significant: Option<Significant>,
}

/// A linked annotation attached to a significant data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Significant {
    pub title: String,
    pub url: String,
}

// ── Series ───────────────────────────────────────────────────────────

/// The independently loaded reference series for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Start of the covered range.
    pub from: DateTime<Utc>,
    #[serde(default)]
    pub points: Vec<PricePoint>,
}

/// A resolved weight series for one search text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSeries {
    /// Start of the covered range.
    pub from: DateTime<Utc>,
    #[serde(default)]
    pub statistics: Option<SeriesStats>,
    #[serde(default)]
    pub points: Vec<WeightPoint>,
}

/// Summary statistics reported by the backend alongside a weight series.
/// Carried opaquely into the combined structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    #[serde(default)]
    pub mean_prevalence: f64,
    #[serde(default)]
    pub peak_prevalence: f64,
    #[serde(default)]
    pub mean_sentiment: f64,
    #[serde(default)]
    pub document_count: u64,
}

/// A loaded weight series annotated with its registry entry's text and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedSeries {
    pub text: String,
    pub color: String,
    #[serde(flatten)]
    pub series: WeightSeries,
}

// ── Combined Structure ────────────────────────────────────────────────

/// The merged structure of reference price data and all loaded weight
/// series, feeding the chart. Rebuilt whole on every input change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedTimeSeries {
    pub meta: CombinedMeta,
    pub price: CombinedPrice,
    pub weights: Vec<LoadedSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedMeta {
    /// Earliest start across every contributing series.
    pub from: DateTime<Utc>,
    /// Statistics from the first loaded weight series, if any.
    pub weights_stats: Option<SeriesStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPrice {
    pub color: String,
    pub points: Vec<PricePoint>,
}

// ── Display ──────────────────────────────────────────────────────────

/// Which weight metric is plotted. Passed explicitly into the chart
/// adapter rather than read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Prevalence,
    Sentiment,
}

impl Metric {
    /// Extract this metric's value from a weight point.
    pub fn of(self, point: &WeightPoint) -> f64 {
        match self {
            Metric::Prevalence => point.prevalence,
            Metric::Sentiment => point.sentiment,
        }
    }
}
