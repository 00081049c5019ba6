//! Core types, unit conversions, and derived metrics for WeatherFlow stations
//!
//! This crate provides the fundamental data structures and the pure
//! meteorological transforms (dewpoint, heat index, wind chill, apparent
//! temperature, sea-level pressure reduction, pressure trend) applied to
//! raw station observations.

pub mod derived;
pub mod pipeline;
pub mod trend;
pub mod types;
pub mod units;

pub use derived::*;
pub use pipeline::*;
pub use trend::*;
pub use types::*;
pub use units::*;
