//! Per-chart views of a filtered measure dataset.

use serde::Serialize;

use super::kde::Kde;
use super::model::{CentileRow, MeasureRecord, ResolvedFilters};
use super::qq::IdentityLines;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
    pub subject_id: String,
}

/// Points of one site, in row order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteSeries {
    pub site: String,
    pub points: Vec<SeriesPoint>,
}

impl SiteSeries {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.subject_id.clone()).collect()
    }
}

/// Chart 1: raw score against age.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterPayload {
    pub sites_data: Vec<SiteSeries>,
}

/// Chart 2: centile curves under harmonized scores.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CentilePayload {
    pub centile_columns: Vec<String>,
    pub centiles: Vec<CentileRow>,
    pub sites_data: Vec<SiteSeries>,
}

/// Chart 3: Q-Q points with per-site identity lines.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QqPayload {
    pub identity_lines: IdentityLines,
    pub sites_data: Vec<SiteSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteDistribution {
    pub site: String,
    pub z_values: Vec<f64>,
    pub subjects: Vec<String>,
    pub bin_start: f64,
    pub bin_width: f64,
    pub kde: Option<Kde>,
}

impl SiteDistribution {
    /// KDE rescaled to histogram counts (`count × bin width`).
    pub fn scaled_kde(&self) -> Option<Kde> {
        self.kde
            .as_ref()
            .map(|kde| kde.scaled(self.z_values.len() as f64 * self.bin_width))
    }
}

/// Chart 4: Z-score histograms with density overlays.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistogramPayload {
    pub bins: usize,
    pub sites: Vec<SiteDistribution>,
}

/// Everything the coordinator needs to draw one measure under one filter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPayload {
    pub measure_id: String,
    pub scale_name: String,
    pub display_name: String,
    pub filters: ResolvedFilters,
    /// Rows that passed the filter, used by the data export.
    pub records: Vec<MeasureRecord>,
    pub chart1: ScatterPayload,
    pub chart2: CentilePayload,
    pub chart3: QqPayload,
    pub chart4: HistogramPayload,
}

impl ChartPayload {
    /// Sites in first-occurrence order; index `i` gets palette colour `i`.
    pub fn sites(&self) -> Vec<&str> {
        self.chart1
            .sites_data
            .iter()
            .map(|series| series.site.as_str())
            .collect()
    }
}
