use dioxus::prelude::*;

use crate::t;

#[component]
pub fn Docs() -> Element {
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_current = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        section { class: "page page-docs",
            h1 { {t!("docs-title")} }
            p { {t!("docs-intro")} }

            h2 { {t!("docs-data-heading")} }
            p { {t!("docs-data-measures")} }
            p { {t!("docs-data-measure")} }
            p { {t!("docs-data-config")} }

            h2 { {t!("docs-filters-heading")} }
            p { {t!("docs-filters-body")} }

            h2 { {t!("docs-charts-heading")} }
            dl { class: "page-docs__charts",
                dt { {t!("chart-scatter-title")} }
                dd { {t!("docs-chart-scatter")} }
                dt { {t!("chart-centile-title")} }
                dd { {t!("docs-chart-centile")} }
                dt { {t!("chart-qq-title")} }
                dd { {t!("docs-chart-qq")} }
                dt { {t!("chart-histogram-title")} }
                dd { {t!("docs-chart-histogram")} }
            }

            h2 { {t!("docs-export-heading")} }
            p { {t!("docs-export-body")} }
        }
    }
}
