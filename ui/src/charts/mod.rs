pub mod backend;
pub mod builders;
pub mod coordinator;
pub mod figure;
pub mod highlight;
pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod plotly;

pub use backend::{ChartBackend, ChartEvent, EventSink};
pub use coordinator::{export_images, ChartCoordinator, ChartState};
pub use figure::ChartSlot;
