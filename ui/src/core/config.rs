//! Dashboard configuration. Every field has a default so a partial
//! `dashboard.json` only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::data::source::DataSource;

/// Name of the optional override document inside the data directory.
pub const CONFIG_DOCUMENT: &str = "dashboard.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory (or URL prefix) holding `measures.json` and `<measure>.json`.
    pub data_dir: String,
    /// Site colours, assigned by site index modulo length.
    pub palette: Vec<String>,
    pub highlight_color: String,
    pub baseline_marker_size: f64,
    pub highlight_marker_size: f64,
    pub histogram_bins: usize,
    pub kde_points: usize,
    /// Delay between consecutive image downloads.
    pub export_stagger_ms: u64,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            palette: [
                "#4f46e5", "#0ea5e9", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#14b8a6",
                "#64748b",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            highlight_color: "#ef4444".to_string(),
            baseline_marker_size: 8.0,
            highlight_marker_size: 12.0,
            histogram_bins: 20,
            kde_points: 100,
            export_stagger_ms: 500,
            image_width: 800,
            image_height: 600,
        }
    }
}

impl DashboardConfig {
    /// Colour for the site at `index` in first-occurrence order.
    pub fn site_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return "#4f46e5";
        }
        &self.palette[index % self.palette.len()]
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Load overrides from the source, falling back to defaults on any failure.
pub async fn load_config<S: DataSource>(source: &S) -> DashboardConfig {
    match source.fetch_text(CONFIG_DOCUMENT).await {
        Ok(raw) => match DashboardConfig::from_json(&raw) {
            Ok(config) => {
                tracing::info!("loaded dashboard overrides from {CONFIG_DOCUMENT}");
                config
            }
            Err(err) => {
                tracing::warn!("ignoring malformed {CONFIG_DOCUMENT}: {err}");
                DashboardConfig::default()
            }
        },
        Err(err) => {
            tracing::debug!("no dashboard overrides ({err}); using defaults");
            DashboardConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overrides_keep_defaults() {
        let config = DashboardConfig::from_json(r#"{"histogram_bins": 30}"#).unwrap();
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.baseline_marker_size, 8.0);
        assert_eq!(config.highlight_marker_size, 12.0);
        assert_eq!(config.export_stagger_ms, 500);
    }

    #[test]
    fn site_colors_wrap_around_palette() {
        let config = DashboardConfig {
            palette: vec!["#111111".into(), "#222222".into()],
            ..DashboardConfig::default()
        };
        assert_eq!(config.site_color(0), "#111111");
        assert_eq!(config.site_color(3), "#222222");
    }
}
