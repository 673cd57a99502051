use std::rc::Rc;

use dioxus::prelude::*;

use crate::core::config::load_config;
use crate::core::platform::{platform_source, PlatformSource};
use crate::data::access::DataAccess;
use crate::t;

/// Directory probed for `dashboard.json` before the configured one is known.
const BOOTSTRAP_DATA_DIR: &str = "data";

/// Session-wide data access, provided once above the router.
#[derive(Clone)]
pub struct DashboardContext {
    pub access: Rc<DataAccess<PlatformSource>>,
}

impl PartialEq for DashboardContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.access, &other.access)
    }
}

impl DashboardContext {
    pub async fn bootstrap() -> Self {
        let probe = platform_source(BOOTSTRAP_DATA_DIR);
        let config = load_config(&probe).await;
        let source = if config.data_dir == BOOTSTRAP_DATA_DIR {
            probe
        } else {
            platform_source(&config.data_dir)
        };
        tracing::info!(data_dir = %config.data_dir, "dashboard context ready");
        Self {
            access: Rc::new(DataAccess::new(source, config)),
        }
    }
}

/// Loads configuration, then provides [`DashboardContext`] to `children`.
#[component]
pub fn DashboardProvider(children: Element) -> Element {
    let context = use_resource(DashboardContext::bootstrap);

    let ready = context.read().clone();
    match ready {
        Some(context) => rsx! {
            ContextScope { context, {children} }
        },
        None => rsx! {
            div { class: "status-card status-card--loading",
                span { class: "spinner", aria_hidden: "true" }
                span { {t!("status-starting")} }
            }
        },
    }
}

#[component]
fn ContextScope(context: DashboardContext, children: Element) -> Element {
    use_context_provider(|| context);
    children
}
