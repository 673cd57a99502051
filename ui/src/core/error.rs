//! Error taxonomy for loading, validating and charting measure data.

use thiserror::Error;

/// Fetching a document failed before any JSON was seen.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request for {url} failed with HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("request for {url} failed: {cause}")]
    Network { url: String, cause: String },
    #[error("unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The document arrived but does not have the shape the dashboard needs.
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("{document} is not valid JSON: {source}")]
    Json {
        document: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{document} is missing required field `{field}`")]
    MissingField {
        document: String,
        field: &'static str,
    },
    #[error("{document} lists no {what}")]
    Empty {
        document: String,
        what: &'static str,
    },
}

/// No finite theoretical quantiles or Z scores were available for a Q-Q plot.
#[derive(Debug, Error)]
#[error("cannot draw identity lines: {reason}")]
pub struct IdentityLineDataError {
    pub reason: String,
}

/// Failures raised by the chart backend or the coordinator.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("render target `{target}` is not mounted")]
    RenderTargetUnavailable { target: String },
    #[error("charting library unavailable: {0}")]
    BackendUnavailable(String),
    #[error("chart call `{call}` failed on `{target}`: {message}")]
    Call {
        call: &'static str,
        target: String,
        message: String,
    },
}

/// Top-level error surfaced to the views.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Format(#[from] DataFormatError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("response for `{measure}` was superseded by a newer request")]
    Superseded { measure: String },
}

impl DashboardError {
    /// Stale responses are dropped silently by the views.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_document() {
        let err = DashboardError::from(DataFormatError::MissingField {
            document: "memory.json".into(),
            field: "available_sites",
        });
        assert_eq!(
            err.to_string(),
            "memory.json is missing required field `available_sites`"
        );
        assert!(!err.is_superseded());
    }

    #[test]
    fn http_errors_carry_status() {
        let err = LoadError::Http {
            url: "data/x.json".into(),
            status: 404,
        };
        assert!(err.to_string().contains("404"));
    }
}
