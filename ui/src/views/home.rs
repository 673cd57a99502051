use dioxus::prelude::*;

use crate::measure::DashboardContext;
use crate::t;

#[component]
pub fn Home() -> Element {
    // Re-render when the platform's language signal changes.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_current = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    let context = try_use_context::<DashboardContext>();
    let measures = use_resource(move || {
        let access = context.as_ref().map(|c| c.access.clone());
        async move {
            match access {
                Some(access) => access.list_measures().await.unwrap_or_default(),
                None => Vec::new(),
            }
        }
    });
    let count = measures.read().as_ref().map(Vec::len).unwrap_or(0);

    rsx! {
        section { class: "page page-home",
            h1 { {t!("home-title")} }
            p { {t!("home-intro-1")} }
            p { {t!("home-intro-2")} }

            h2 { {t!("home-charts-heading")} }
            ul { class: "page-home__features",
                li { {t!("home-feature-scatter")} }
                li { {t!("home-feature-centile")} }
                li { {t!("home-feature-qq")} }
                li { {t!("home-feature-histogram")} }
            }
            p { {t!("home-highlight")} }
            p { class: "page-home__cta",
                {t!("home-cta", count = count)}
            }
        }
    }
}
