mod docs;
mod home;
mod measure;

pub use docs::Docs;
pub use home::Home;
pub use measure::Measure;
