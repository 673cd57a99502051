pub mod access;
pub mod cache;
pub mod export;
pub mod kde;
pub mod model;
pub mod payload;
pub mod qq;
pub mod source;
pub mod transform;

pub use access::DataAccess;
pub use model::{FilterOptions, FilterState, MeasureInfo, SexCode};
pub use payload::ChartPayload;
pub use source::DataSource;
