//! Turn a [`ChartPayload`] into the four figures.

use crate::core::config::DashboardConfig;
use crate::data::payload::{ChartPayload, SiteDistribution, SiteSeries};

use super::figure::{
    ChartSlot, Figure, HistogramBins, Layout, LineStyle, Marker, Paint, Trace, TraceKind,
    TraceMode, TraceRole,
};

const CENTILE_COLOR: &str = "#94a3b8";
const HISTOGRAM_OPACITY: f64 = 0.55;

/// Dash pattern and width of the centile line at each position (5th → 95th).
pub const CENTILE_STYLES: [(&str, f64); 5] = [
    ("dot", 1.0),
    ("dash", 1.5),
    ("solid", 2.5),
    ("dash", 1.5),
    ("dot", 1.0),
];

pub fn build_figure(slot: ChartSlot, payload: &ChartPayload, config: &DashboardConfig) -> Figure {
    match slot {
        ChartSlot::Scatter => scatter_figure(payload, config),
        ChartSlot::Centile => centile_figure(payload, config),
        ChartSlot::Qq => qq_figure(payload, config),
        ChartSlot::Histogram => histogram_figure(payload, config),
    }
}

fn subject_trace(
    series: &SiteSeries,
    color: &str,
    config: &DashboardConfig,
    hover: &str,
) -> Trace {
    let mut trace = Trace::new(TraceKind::Scatter, series.site.clone());
    trace.mode = Some(TraceMode::Markers);
    trace.x = series.xs();
    trace.y = series.ys();
    trace.customdata = series.labels();
    trace.marker = Some(Marker::uniform(color, config.baseline_marker_size));
    trace.hovertemplate = Some(format!(
        "<b>Subject: %{{customdata}}</b><br>{hover}<extra>{}</extra>",
        series.site
    ));
    trace.role = TraceRole::Subjects {
        base_color: color.to_string(),
    };
    trace
}

fn scatter_figure(payload: &ChartPayload, config: &DashboardConfig) -> Figure {
    let data = payload
        .chart1
        .sites_data
        .iter()
        .enumerate()
        .map(|(i, series)| {
            subject_trace(series, config.site_color(i), config, "Age: %{x}<br>Score: %{y}")
        })
        .collect();
    Figure {
        data,
        layout: Layout::for_slot(ChartSlot::Scatter),
    }
}

fn centile_figure(payload: &ChartPayload, config: &DashboardConfig) -> Figure {
    let chart = &payload.chart2;
    let mut data: Vec<Trace> = chart
        .centile_columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let (dash, width) = CENTILE_STYLES[i % CENTILE_STYLES.len()];
            let (x, y) = chart
                .centiles
                .iter()
                .filter_map(|row| row.value(column).map(|value| (row.age, value)))
                .unzip();
            let mut trace = Trace::new(TraceKind::Scatter, format!("Centile {column}"));
            trace.mode = Some(TraceMode::Lines);
            trace.x = x;
            trace.y = y;
            trace.line = Some(LineStyle {
                color: CENTILE_COLOR.to_string(),
                width,
                dash: Some(dash),
            });
            trace.showlegend = false;
            trace.hoverinfo = Some("skip");
            trace
        })
        .collect();

    data.extend(chart.sites_data.iter().enumerate().map(|(i, series)| {
        subject_trace(
            series,
            config.site_color(i),
            config,
            "Age: %{x}<br>Harmonized: %{y}",
        )
    }));

    Figure {
        data,
        layout: Layout::for_slot(ChartSlot::Centile),
    }
}

fn qq_figure(payload: &ChartPayload, config: &DashboardConfig) -> Figure {
    let chart = &payload.chart3;
    let mut data: Vec<Trace> = chart
        .sites_data
        .iter()
        .enumerate()
        .map(|(i, series)| {
            subject_trace(
                series,
                config.site_color(i),
                config,
                "Theoretical: %{x}<br>Z: %{y}",
            )
        })
        .collect();

    for (i, series) in chart.sites_data.iter().enumerate() {
        let Some(line) = chart.identity_lines.get(&series.site) else {
            continue;
        };
        let mut trace = Trace::new(TraceKind::Scatter, format!("{} identity", series.site));
        trace.mode = Some(TraceMode::Lines);
        trace.x = line.x.to_vec();
        trace.y = line.y.to_vec();
        trace.line = Some(LineStyle {
            color: config.site_color(i).to_string(),
            width: 1.0,
            dash: Some("dash"),
        });
        trace.showlegend = false;
        trace.hoverinfo = Some("skip");
        data.push(trace);
    }

    Figure {
        data,
        layout: Layout::for_slot(ChartSlot::Qq),
    }
}

fn histogram_figure(payload: &ChartPayload, config: &DashboardConfig) -> Figure {
    let chart = &payload.chart4;
    let mut bars = Vec::new();
    let mut curves = Vec::new();
    let mut rugs = Vec::new();

    for (i, site) in chart.sites.iter().enumerate() {
        let color = config.site_color(i);
        bars.push(histogram_trace(site, chart.bins, color));
        if let Some(kde) = site.scaled_kde() {
            let mut trace = Trace::new(TraceKind::Scatter, format!("{} density", site.site));
            trace.mode = Some(TraceMode::Lines);
            trace.x = kde.x;
            trace.y = kde.y;
            trace.line = Some(LineStyle {
                color: color.to_string(),
                width: 2.0,
                dash: None,
            });
            trace.showlegend = false;
            trace.hoverinfo = Some("skip");
            curves.push(trace);
        }
        rugs.push(rug_trace(site, color, config));
    }

    let mut layout = Layout::for_slot(ChartSlot::Histogram);
    layout.barmode = Some("overlay");

    Figure {
        data: bars.into_iter().chain(curves).chain(rugs).collect(),
        layout,
    }
}

fn histogram_trace(site: &SiteDistribution, bins: usize, color: &str) -> Trace {
    let mut trace = Trace::new(TraceKind::Histogram, site.site.clone());
    trace.x = site.z_values.clone();
    trace.xbins = Some(HistogramBins {
        start: site.bin_start,
        end: site.bin_start + site.bin_width * bins.max(1) as f64,
        size: site.bin_width,
    });
    trace.marker = Some(Marker {
        color: Paint::Uniform(color.to_string()),
        size: None,
    });
    trace.opacity = Some(HISTOGRAM_OPACITY);
    trace
}

/// One marker per subject along the baseline so the histogram can be hovered per subject.
fn rug_trace(site: &SiteDistribution, color: &str, config: &DashboardConfig) -> Trace {
    let mut trace = Trace::new(TraceKind::Scatter, format!("{} subjects", site.site));
    trace.mode = Some(TraceMode::Markers);
    trace.x = site.z_values.clone();
    trace.y = vec![0.0; site.z_values.len()];
    trace.customdata = site.subjects.clone();
    trace.marker = Some(Marker::uniform(color, config.baseline_marker_size));
    trace.hovertemplate = Some(format!(
        "<b>Subject: %{{customdata}}</b><br>Z: %{{x}}<extra>{}</extra>",
        site.site
    ));
    trace.showlegend = false;
    trace.role = TraceRole::Subjects {
        base_color: color.to_string(),
    };
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FilterState, MeasureDataset};
    use crate::data::transform::build_payload;
    use serde_json::json;

    fn payload() -> ChartPayload {
        let rows: Vec<_> = (0..6)
            .map(|i| {
                let site = if i % 2 == 0 { "A" } else { "B" };
                json!({
                    "Age": 20 + i, "Sex_harmonized": 0, "Site_harmonized": "H",
                    "Site": site,
                    "Y": i, "Y_harmonized": i, "Z": i as f64 * 0.3 - 0.6,
                    "theoretical": i as f64 * 0.25 - 0.5, "offset": 0,
                    "subject_id": format!("s{i}")
                })
            })
            .collect();
        let centiles: Vec<_> = (0..3)
            .map(|i| {
                json!({
                    "Age": 20 + i * 5, "Sex_harmonized": 0, "Site_harmonized": "H",
                    "5": 1.0, "25": 2.0, "50": 3.0, "75": 4.0, "95": 5.0
                })
            })
            .collect();
        let doc = json!({
            "scale_name": "wm", "display_name": "WM",
            "available_sexes": [0], "available_sites": ["H"],
            "centiles": centiles, "harmonized": rows,
            "metadata": {"centile_columns": ["5", "25", "50", "75", "95"]}
        });
        let dataset = MeasureDataset::from_json("wm.json", &doc.to_string()).unwrap();
        build_payload("wm", &dataset, &FilterState::default(), &DashboardConfig::default())
            .unwrap()
    }

    #[test]
    fn scatter_has_one_colored_series_per_site() {
        let config = DashboardConfig::default();
        let figure = build_figure(ChartSlot::Scatter, &payload(), &config);
        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[1].base_color(), Some(config.site_color(1)));
        assert_eq!(figure.data[0].customdata, vec!["s0", "s2", "s4"]);
    }

    #[test]
    fn centile_lines_come_first_without_legend() {
        let figure = build_figure(ChartSlot::Centile, &payload(), &DashboardConfig::default());
        assert_eq!(figure.data.len(), 7);
        let widths: Vec<f64> = figure.data[..5]
            .iter()
            .map(|t| t.line.as_ref().unwrap().width)
            .collect();
        assert_eq!(widths, vec![1.0, 1.5, 2.5, 1.5, 1.0]);
        assert!(figure.data[..5].iter().all(|t| !t.showlegend && !t.is_subjects()));
        assert!(figure.data[5..].iter().all(Trace::is_subjects));
    }

    #[test]
    fn qq_adds_a_dashed_identity_line_per_site() {
        let figure = build_figure(ChartSlot::Qq, &payload(), &DashboardConfig::default());
        let lines: Vec<_> = figure.data.iter().filter(|t| !t.is_subjects()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .all(|t| t.line.as_ref().unwrap().dash == Some("dash")));
    }

    #[test]
    fn histogram_density_matches_count_units() {
        let payload = payload();
        let figure = build_figure(ChartSlot::Histogram, &payload, &DashboardConfig::default());
        assert_eq!(figure.layout.barmode, Some("overlay"));

        let site = &payload.chart4.sites[0];
        let raw = site.kde.as_ref().unwrap();
        let curve = figure
            .data
            .iter()
            .find(|t| t.name == "A density")
            .unwrap();
        let factor = site.z_values.len() as f64 * site.bin_width;
        assert!((curve.y[50] - raw.y[50] * factor).abs() < 1e-9);

        let bars = &figure.data[0];
        assert_eq!(bars.kind, TraceKind::Histogram);
        let bins = bars.xbins.as_ref().unwrap();
        assert!((bins.end - bins.start - site.bin_width * 20.0).abs() < 1e-9);
    }
}
