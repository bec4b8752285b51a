//! Data module - dataset loading, reshaping and caching

mod cache;
mod loader;
mod processor;
mod series;

pub use cache::DatasetCache;
pub use loader::{resolve_encoding, DataLoader, Datasets};
pub use processor::ParsePolicy;
pub use series::{TimePoint, TimeSeries};
