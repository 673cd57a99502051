use dioxus::logger::tracing::Level;
use dioxus::prelude::*;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::measure::DashboardProvider;
use ui::views::{Docs, Home, Measure};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Home {},
    #[route("/docs")]
    Docs {},
    #[route("/measure/:id")]
    Measure { id: String },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn nav_home(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Home {},
        "{label}"
    })
}
fn nav_docs(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Docs {},
        "{label}"
    })
}
fn nav_measure(id: &str, label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Measure { id: id.to_string() },
        "{label}"
    })
}

fn main() {
    dioxus::logger::init(Level::INFO).expect("logger failed to init");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    {
        ui::i18n::init();
        register_nav(NavBuilder {
            home: nav_home,
            docs: nav_docs,
            measure: nav_measure,
        });
    }
    use_context_provider(|| Signal::new("en-US".to_string()));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        DashboardProvider {
            Router::<Route> {}
        }
    }
}

/// A web-specific layout around the shared `AppNavbar` component
/// which allows us to use the web-specific `Route` enum.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar { }
        main { class: "page-shell",
            Outlet::<Route> {}
        }
    }
}
