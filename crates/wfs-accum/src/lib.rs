//! Rolling accumulation state machines
//!
//! Tracks rain totals across overlapping wall-clock windows and
//! aggregates daily min/max conditions for reference
//! evapotranspiration.

pub mod eto;
pub mod rain;

pub use eto::*;
pub use rain::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccumError {
    #[error("Invalid rain increment: {0}")]
    InvalidIncrement(f64),
}

pub type AccumResult<T> = Result<T, AccumError>;
