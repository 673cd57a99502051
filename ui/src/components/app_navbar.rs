use crate::core::format::format_measure_name;
use crate::i18n::{self};
use crate::measure::DashboardContext;
use crate::t;
use dioxus::prelude::*;
use once_cell::sync::OnceCell;

const NAVBAR_CSS: Asset = asset!("/assets/styling/navbar.css");

/// Platforms register link constructors so `ui` never needs their `Route` enum.
///
/// Each function receives the localized label and returns a `Link` whose child
/// is exactly that label.
///
/// ```ignore
/// register_nav(NavBuilder {
///     home: |label| rsx!( Link { class: "navbar__link", to: Route::Home {}, "{label}" } ),
///     docs: |label| rsx!( Link { class: "navbar__link", to: Route::Docs {}, "{label}" } ),
///     measure: |id, label| rsx!( Link { class: "navbar__link", to: Route::Measure { id: id.to_string() }, "{label}" } ),
/// });
/// ```
pub struct NavBuilder {
    pub home: fn(label: &str) -> Element,
    pub docs: fn(label: &str) -> Element,
    pub measure: fn(id: &str, label: &str) -> Element,
}

static NAV_BUILDER: OnceCell<NavBuilder> = OnceCell::new();

pub fn register_nav(builder: NavBuilder) {
    let _ = NAV_BUILDER.set(builder);
}

#[component]
pub fn AppNavbar() -> Element {
    i18n::init();

    let mut current_lang = use_signal(|| "en-US".to_string());
    let langs = use_signal(i18n::available_languages);
    let show_switcher = langs().len() > 1;
    let lang_code_ctx: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_marker = lang_code_ctx.as_ref().map(|c| c()).unwrap_or_default();

    let context = try_use_context::<DashboardContext>();
    let measures = use_resource(move || {
        let access = context.as_ref().map(|c| c.access.clone());
        async move {
            let Some(access) = access else {
                return Vec::new();
            };
            match access.list_measures().await {
                Ok(measures) => measures,
                Err(err) => {
                    tracing::warn!("measure list rejected: {err}");
                    Vec::new()
                }
            }
        }
    });

    let on_change = move |evt: dioxus::events::FormEvent| {
        let val = evt.value();
        if i18n::set_language(&val).is_ok() {
            current_lang.set(val.clone());
            if let Some(mut code) = lang_code_ctx {
                code.set(val);
            }
        }
    };

    let builder = NAV_BUILDER.get();
    let pages = builder.map(|b| ((b.home)(&t!("nav-home")), (b.docs)(&t!("nav-docs"))));
    let measure_links: Vec<Element> = match (builder, measures.read().as_ref()) {
        (Some(b), Some(list)) => list
            .iter()
            .map(|info| {
                let label = if info.name.is_empty() {
                    format_measure_name(&info.id)
                } else {
                    info.name.clone()
                };
                (b.measure)(&info.id, &label)
            })
            .collect(),
        _ => Vec::new(),
    };
    let measures_loaded = measures.read().is_some();

    let tagline = t!("tagline");

    rsx! {
        document::Link { rel: "stylesheet", href: NAVBAR_CSS }

        header { id: "navbar", class: "navbar",
            div { style: "display:none", "{_lang_marker}" }
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    span { class: "navbar__brand-link",
                        span { class: "navbar__brand-spark", aria_hidden: "true" }
                        span { class: "navbar__brand-mark", "Normscope" }
                    }
                    span { class: "navbar__brand-subtitle", "{tagline}" }
                }

                if let Some((home, docs)) = pages {
                    nav { class: "navbar__links",
                        {home}
                        {docs}
                    }
                }

                if show_switcher {
                    div { class: "navbar__locale",
                        label {
                            class: "visually-hidden",
                            r#for: "locale-select",
                            {t!("nav-language-label")}
                        }
                        select {
                            id: "locale-select",
                            value: "{current_lang()}",
                            oninput: on_change,
                            { langs().iter().map(|code| {
                                let c = code.clone();
                                rsx!{
                                    option { key: "{c}", value: "{c}", "{c}" }
                                }
                            })}
                        }
                    }
                }
            }

            div { class: "navbar__measures",
                span { class: "navbar__measures-label", {t!("nav-measures")} }
                if !measures_loaded {
                    span { class: "navbar__measures-empty", {t!("nav-measures-loading")} }
                } else if measure_links.is_empty() {
                    span { class: "navbar__measures-empty", {t!("nav-measures-empty")} }
                } else {
                    nav { class: "navbar__links navbar__links--measures",
                        for link in measure_links {
                            {link}
                        }
                    }
                }
            }
        }
    }
}
