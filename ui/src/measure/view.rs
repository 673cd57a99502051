use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use futures_util::StreamExt;

use crate::charts::{ChartCoordinator, ChartEvent};
use crate::core::error::ChartError;
use crate::core::format::format_measure_name;
use crate::core::platform::{chart_library_ready, PlatformBackend};
use crate::data::model::SexCode;
use crate::t;

use super::charts::{ChartsGrid, CoordinatorHandle};
use super::context::DashboardContext;
use super::export::ExportPanel;
use super::filters::FilterBar;

/// One measure's dashboard. Mount with `key` set to the measure id so that a
/// different measure gets a fresh coordinator and the old one is cleaned up.
#[component]
pub fn MeasurePage(measure_id: String) -> Element {
    let context = use_context::<DashboardContext>();
    let access = context.access.clone();

    let events_rx: Rc<RefCell<Option<UnboundedReceiver<ChartEvent>>>> =
        use_hook(|| Rc::new(RefCell::new(None)));

    let coordinator = use_hook({
        let config = access.config().clone();
        let events_rx = events_rx.clone();
        move || {
            let (tx, rx) = unbounded();
            events_rx.borrow_mut().replace(rx);
            CoordinatorHandle::new(ChartCoordinator::new(PlatformBackend::new(), config, tx))
        }
    });

    // Hover/unhover events, applied one at a time.
    use_future({
        let coordinator = coordinator.clone();
        move || {
            let coordinator = coordinator.clone();
            let rx = events_rx.borrow_mut().take();
            async move {
                let Some(mut rx) = rx else {
                    return;
                };
                while let Some(event) = rx.next().await {
                    let outcome = coordinator.0.borrow_mut().handle_event(event);
                    if let Err(err) = outcome {
                        tracing::warn!("highlight update failed: {err}");
                    }
                }
            }
        }
    });

    let library = use_resource(chart_library_ready);
    let mut filter_rev = use_signal(|| 0u64);
    let mut chart_error = use_signal(|| Option::<String>::None);

    let payload = use_resource({
        let access = access.clone();
        let measure_id = measure_id.clone();
        move || {
            let access = access.clone();
            let measure_id = measure_id.clone();
            let _rev = filter_rev();
            async move { access.load_measure(&measure_id).await }
        }
    });

    let options = use_resource({
        let access = access.clone();
        let measure_id = measure_id.clone();
        move || {
            let access = access.clone();
            let measure_id = measure_id.clone();
            async move { access.filter_options(&measure_id).await }
        }
    });

    // Containers exist once the content below has been committed. Runs again
    // when the charting library finishes loading.
    use_effect({
        let coordinator = coordinator.clone();
        move || {
            match &*library.read() {
                Some(Ok(())) => {}
                Some(Err(err)) => {
                    tracing::error!("charting library failed to load: {err}");
                    chart_error.set(Some(err.to_string()));
                    return;
                }
                None => return,
            }
            let result = payload.read();
            let Some(Ok(current)) = &*result else {
                return;
            };
            let outcome = coordinator.0.borrow_mut().render_all(current);
            match outcome {
                Ok(()) => chart_error.set(None),
                Err(ChartError::BackendUnavailable(reason)) => {
                    tracing::debug!("charts deferred: {reason}");
                }
                Err(err) => {
                    tracing::error!("chart rendering failed: {err}");
                    chart_error.set(Some(err.to_string()));
                }
            }
        }
    });

    use_drop({
        let coordinator = coordinator.clone();
        move || {
            if let Ok(mut coordinator) = coordinator.0.try_borrow_mut() {
                coordinator.cleanup();
            }
        }
    });

    let fallback_title = format_measure_name(&measure_id);
    let loaded = payload
        .read()
        .as_ref()
        .map(|result| {
            result
                .as_ref()
                .map(Rc::clone)
                .map_err(|err| (err.is_superseded(), err.to_string()))
        });
    let filter_options = options
        .read()
        .as_ref()
        .and_then(|result| result.as_ref().ok().cloned());

    match loaded {
        None | Some(Err((true, _))) => rsx! {
            section { class: "page page-measure",
                h1 { "{fallback_title}" }
                div { class: "status-card status-card--loading",
                    span { class: "spinner", aria_hidden: "true" }
                    span { {t!("status-loading-charts")} }
                }
            }
        },
        Some(Err((false, message))) => rsx! {
            section { class: "page page-measure",
                h1 { "{fallback_title}" }
                div { class: "status-card status-card--error",
                    strong { {t!("status-error-title")} }
                    " {message}"
                }
            }
        },
        Some(Ok(current)) => {
            let title = if current.display_name.is_empty() {
                fallback_title
            } else {
                current.display_name.clone()
            };
            let on_apply = {
                let access = access.clone();
                move |(sex, site): (SexCode, String)| {
                    access.set_filters(Some(sex), Some(site));
                    filter_rev += 1;
                }
            };

            rsx! {
                section { class: "page page-measure",
                    header { class: "measure-header",
                        h1 { "{title}" }
                        if !current.scale_name.is_empty() {
                            p { class: "measure-header__scale", "{current.scale_name}" }
                        }
                    }

                    FilterBar {
                        options: filter_options,
                        current: current.filters.clone(),
                        on_apply,
                    }

                    if let Some(message) = chart_error() {
                        div { class: "status-card status-card--error",
                            strong { {t!("status-chart-error-title")} }
                            " {message}"
                        }
                    }

                    ChartsGrid {}

                    ExportPanel { payload: current.clone(), coordinator: coordinator.clone() }
                }
            }
        }
    }
}
