//! Boundary to the charting library.

use futures_channel::mpsc::UnboundedSender;

use crate::core::error::ChartError;

use super::figure::{ChartSlot, Figure, ImageRequest, LayoutUpdate, StyleUpdate};

pub type SubscriptionId = u32;

/// Pointer events raised by a rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    Hover {
        slot: ChartSlot,
        trace_index: usize,
        point_index: usize,
        /// Label attached to the point, when the library reports it.
        label: Option<String>,
    },
    Unhover {
        slot: ChartSlot,
    },
}

/// Where backends deliver hover events; drained by the view's coroutine.
pub type EventSink = UnboundedSender<ChartEvent>;

/// The primitives the coordinator needs from a plotting library.
///
/// Every call names its render target by DOM id. Calls on a target that was
/// never plotted (or was purged) are errors for `restyle`/`relayout`/
/// `download_image` and no-ops for `purge`.
pub trait ChartBackend {
    /// The plotting library itself is loaded and callable.
    fn library_ready(&self) -> bool;

    fn target_ready(&self, target: &str) -> bool;

    fn new_plot(&mut self, target: &str, figure: &Figure) -> Result<(), ChartError>;

    fn restyle(&mut self, target: &str, update: &StyleUpdate, trace: usize)
        -> Result<(), ChartError>;

    fn relayout(&mut self, target: &str, update: &LayoutUpdate) -> Result<(), ChartError>;

    fn purge(&mut self, target: &str) -> Result<(), ChartError>;

    fn download_image(&mut self, target: &str, request: &ImageRequest) -> Result<(), ChartError>;

    /// Forward hover and unhover on `target` to `sink`, tagged with `slot`.
    fn subscribe(
        &mut self,
        target: &str,
        slot: ChartSlot,
        sink: EventSink,
    ) -> Result<SubscriptionId, ChartError>;

    fn unsubscribe(&mut self, id: SubscriptionId);
}
