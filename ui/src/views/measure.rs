use dioxus::prelude::*;

use crate::measure::MeasurePage;

/// Routed entry point; keyed so switching measures remounts the page.
#[component]
pub fn Measure(id: String) -> Element {
    rsx! {
        MeasurePage { key: "{id}", measure_id: id.clone() }
    }
}
