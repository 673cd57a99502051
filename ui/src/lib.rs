//! Shared UI crate for Normscope: data access, chart coordination and the
//! views each platform routes to.

pub mod charts;
pub mod core;
pub mod data;
pub mod i18n;
pub mod measure;
pub mod views;

pub mod components {
    // Localized application navbar (components/app_navbar.rs)
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;
}
