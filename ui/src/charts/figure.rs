//! Figure description in the shape `Plotly.newPlot` expects.
//!
//! Everything here serializes straight to the JSON Plotly consumes. Fields the
//! coordinator needs but Plotly must not see (`Trace::role`) are skipped.

use serde::Serialize;
use serde_json::{json, Value};

/// The four chart positions of a measure view, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartSlot {
    Scatter,
    Centile,
    Qq,
    Histogram,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 4] = [
        ChartSlot::Scatter,
        ChartSlot::Centile,
        ChartSlot::Qq,
        ChartSlot::Histogram,
    ];

    pub fn index(self) -> usize {
        match self {
            ChartSlot::Scatter => 0,
            ChartSlot::Centile => 1,
            ChartSlot::Qq => 2,
            ChartSlot::Histogram => 3,
        }
    }

    /// DOM id of the container the chart is drawn into.
    pub fn target_id(self) -> &'static str {
        match self {
            ChartSlot::Scatter => "chart1",
            ChartSlot::Centile => "chart2",
            ChartSlot::Qq => "chart3",
            ChartSlot::Histogram => "chart4",
        }
    }

    pub fn x_title(self) -> &'static str {
        match self {
            ChartSlot::Scatter | ChartSlot::Centile => "Age (years)",
            ChartSlot::Qq => "Theoretical quantiles",
            ChartSlot::Histogram => "Z-score",
        }
    }

    pub fn y_title(self) -> &'static str {
        match self {
            ChartSlot::Scatter => "Raw score",
            ChartSlot::Centile => "Harmonized score",
            ChartSlot::Qq => "Z-score (site offset)",
            ChartSlot::Histogram => "Count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Histogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    Markers,
    Lines,
}

/// What the coordinator may do with a trace.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TraceRole {
    /// Per-subject points; restyled on highlight. Carries the site colour.
    Subjects { base_color: String },
    /// Reference curves, histogram bars, identity lines.
    #[default]
    Decoration,
}

/// A colour for every point or one colour for all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    Uniform(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: Paint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<MarkerSize>,
}

impl Marker {
    pub fn uniform(color: &str, size: f64) -> Self {
        Self {
            color: Paint::Uniform(color.to_string()),
            size: Some(MarkerSize::Uniform(size)),
        }
    }

    /// Color of point `index`.
    pub fn color_at(&self, index: usize) -> Option<&str> {
        match &self.color {
            Paint::Uniform(color) => Some(color),
            Paint::PerPoint(colors) => colors.get(index).map(String::as_str),
        }
    }

    pub fn size_at(&self, index: usize) -> Option<f64> {
        match self.size.as_ref()? {
            MarkerSize::Uniform(size) => Some(*size),
            MarkerSize::PerPoint(sizes) => sizes.get(index).copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBins {
    pub start: f64,
    pub end: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    pub name: String,
    pub x: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    /// Subject ids, one per point.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub customdata: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    pub showlegend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xbins: Option<HistogramBins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<&'static str>,
    #[serde(skip)]
    pub role: TraceRole,
}

impl Trace {
    pub fn new(kind: TraceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            mode: None,
            name: name.into(),
            x: Vec::new(),
            y: Vec::new(),
            marker: None,
            line: None,
            customdata: Vec::new(),
            hovertemplate: None,
            showlegend: true,
            opacity: None,
            xbins: None,
            hoverinfo: None,
            role: TraceRole::Decoration,
        }
    }

    pub fn base_color(&self) -> Option<&str> {
        match &self.role {
            TraceRole::Subjects { base_color } => Some(base_color),
            TraceRole::Decoration => None,
        }
    }

    pub fn is_subjects(&self) -> bool {
        matches!(self.role, TraceRole::Subjects { .. })
    }

    pub fn contains_subject(&self, subject: &str) -> bool {
        self.is_subjects() && self.customdata.iter().any(|label| label == subject)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub gridcolor: &'static str,
    pub zeroline: bool,
    pub autorange: bool,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            gridcolor: "rgba(0,0,0,0.1)",
            zeroline: false,
            autorange: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub margin: Margin,
    pub showlegend: bool,
    pub hovermode: &'static str,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
}

impl Layout {
    pub fn for_slot(slot: ChartSlot) -> Self {
        Self {
            xaxis: Axis::titled(slot.x_title()),
            yaxis: Axis::titled(slot.y_title()),
            margin: Margin {
                l: 50,
                r: 40,
                t: 20,
                b: 50,
            },
            showlegend: true,
            hovermode: "closest",
            paper_bgcolor: "rgba(0,0,0,0)",
            plot_bgcolor: "rgba(0,0,0,0)",
            barmode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Indices of traces whose points belong to subjects.
    pub fn subject_traces(&self) -> impl Iterator<Item = (usize, &Trace)> {
        self.data.iter().enumerate().filter(|(_, trace)| trace.is_subjects())
    }

    pub fn label_at(&self, trace: usize, point: usize) -> Option<&str> {
        self.data
            .get(trace)
            .filter(|trace| trace.is_subjects())
            .and_then(|trace| trace.customdata.get(point))
            .map(String::as_str)
    }
}

/// Marker re-encoding for one trace, as passed to `Plotly.restyle`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleUpdate {
    pub color: Paint,
    pub size: MarkerSize,
}

impl StyleUpdate {
    /// Restyle keys wrap each value in a one-element array so arrays apply per point.
    pub fn to_plotly(&self) -> Value {
        json!({
            "marker.color": [self.color],
            "marker.size": [self.size],
        })
    }

    pub fn apply(&self, marker: &mut Marker) {
        marker.color = self.color.clone();
        marker.size = Some(self.size.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutUpdate {
    Autorange,
}

impl LayoutUpdate {
    pub fn to_plotly(&self) -> Value {
        match self {
            LayoutUpdate::Autorange => json!({
                "xaxis.autorange": true,
                "yaxis.autorange": true,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub format: &'static str,
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_stays_out_of_plotly_json() {
        let mut trace = Trace::new(TraceKind::Scatter, "A");
        trace.role = TraceRole::Subjects {
            base_color: "#fff".into(),
        };
        trace.customdata = vec!["s1".into()];
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["type"], "scatter");
        assert!(value.get("role").is_none());
        assert!(value.get("y").is_none());
        assert_eq!(value["customdata"][0], "s1");
    }

    #[test]
    fn restyle_values_are_wrapped_per_trace() {
        let update = StyleUpdate {
            color: Paint::PerPoint(vec!["#a".into(), "#b".into()]),
            size: MarkerSize::Uniform(8.0),
        };
        let value = update.to_plotly();
        assert_eq!(value["marker.color"], json!([["#a", "#b"]]));
        assert_eq!(value["marker.size"], json!([8.0]));
    }

    #[test]
    fn slots_map_to_targets() {
        let targets: Vec<_> = ChartSlot::ALL.iter().map(|slot| slot.target_id()).collect();
        assert_eq!(targets, vec!["chart1", "chart2", "chart3", "chart4"]);
        assert_eq!(ChartSlot::Histogram.index(), 3);
    }
}
