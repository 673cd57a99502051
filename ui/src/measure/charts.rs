use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::charts::{ChartCoordinator, ChartSlot};
use crate::core::platform::PlatformBackend;
use crate::t;

/// Shared handle so the event loop, effects and export buttons reach one coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle(pub Rc<RefCell<ChartCoordinator<PlatformBackend>>>);

impl CoordinatorHandle {
    pub fn new(coordinator: ChartCoordinator<PlatformBackend>) -> Self {
        Self(Rc::new(RefCell::new(coordinator)))
    }
}

impl PartialEq for CoordinatorHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// The four chart containers. Plotting happens after mount.
#[component]
pub fn ChartsGrid() -> Element {
    let cards = [
        (ChartSlot::Scatter, t!("chart-scatter-title")),
        (ChartSlot::Centile, t!("chart-centile-title")),
        (ChartSlot::Qq, t!("chart-qq-title")),
        (ChartSlot::Histogram, t!("chart-histogram-title")),
    ];

    rsx! {
        div { class: "charts-grid",
            for (slot , title) in cards {
                div { key: "{slot.target_id()}", class: "chart-container",
                    div { class: "chart-title", "{title}" }
                    div { id: slot.target_id(), class: "chart" }
                }
            }
        }
    }
}
