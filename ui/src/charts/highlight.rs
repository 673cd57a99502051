//! The shared highlighted subject and the marker encodings it implies.

use crate::core::config::DashboardConfig;

use super::figure::{MarkerSize, Paint, StyleUpdate, Trace};

/// At most one subject highlighted across all charts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    subject: Option<String>,
}

impl HighlightState {
    pub fn current(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn set(&mut self, subject: &str) {
        self.subject = Some(subject.to_string());
    }

    pub fn clear(&mut self) -> Option<String> {
        self.subject.take()
    }
}

/// Highlight colour and size on points labelled `subject`, site baseline elsewhere.
pub fn highlight_encoding(trace: &Trace, subject: &str, config: &DashboardConfig) -> StyleUpdate {
    let base = trace.base_color().unwrap_or(config.site_color(0));
    let (colors, sizes) = trace
        .customdata
        .iter()
        .map(|label| {
            if label == subject {
                (config.highlight_color.clone(), config.highlight_marker_size)
            } else {
                (base.to_string(), config.baseline_marker_size)
            }
        })
        .unzip();
    StyleUpdate {
        color: Paint::PerPoint(colors),
        size: MarkerSize::PerPoint(sizes),
    }
}

pub fn baseline_encoding(trace: &Trace, config: &DashboardConfig) -> StyleUpdate {
    StyleUpdate {
        color: Paint::Uniform(
            trace
                .base_color()
                .unwrap_or(config.site_color(0))
                .to_string(),
        ),
        size: MarkerSize::Uniform(config.baseline_marker_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::{TraceKind, TraceRole};

    fn trace() -> Trace {
        let mut trace = Trace::new(TraceKind::Scatter, "A");
        trace.customdata = vec!["s1".into(), "s2".into(), "s1".into()];
        trace.role = TraceRole::Subjects {
            base_color: "#123456".into(),
        };
        trace
    }

    #[test]
    fn only_matching_points_are_enlarged() {
        let config = DashboardConfig::default();
        let update = highlight_encoding(&trace(), "s1", &config);
        assert_eq!(
            update.color,
            Paint::PerPoint(vec!["#ef4444".into(), "#123456".into(), "#ef4444".into()])
        );
        assert_eq!(update.size, MarkerSize::PerPoint(vec![12.0, 8.0, 12.0]));
    }

    #[test]
    fn baseline_uses_site_color() {
        let update = baseline_encoding(&trace(), &DashboardConfig::default());
        assert_eq!(update.color, Paint::Uniform("#123456".into()));
        assert_eq!(update.size, MarkerSize::Uniform(8.0));
    }

    #[test]
    fn state_holds_one_subject() {
        let mut state = HighlightState::default();
        state.set("a");
        state.set("b");
        assert_eq!(state.current(), Some("b"));
        assert_eq!(state.clear(), Some("b".into()));
        assert_eq!(state.current(), None);
    }
}
