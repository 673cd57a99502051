//! The per-measure dashboard page: filters, the four charts and exports.

mod charts;
mod context;
mod download;
mod export;
mod filters;
mod view;

pub use charts::{ChartsGrid, CoordinatorHandle};
pub use context::{DashboardContext, DashboardProvider};
pub use download::download_bytes;
pub use view::MeasurePage;
