//! Observation dispatch
//!
//! The seam between the I/O layer and the core: decodes raw positional
//! field records into typed observations, routes them through the
//! derived-metric formulas and accumulators, and produces named metric
//! values in the station's display units.

pub mod decode;
pub mod dispatcher;

pub use decode::*;
pub use dispatcher::*;

use thiserror::Error;
use tokio::sync::mpsc;
use wfs_core::RawRecord;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Empty {family} record from {serial}")]
    EmptyRecord { serial: String, family: &'static str },

    #[error("{family} record from {serial} has {got} fields, expected {expected}")]
    FieldCount {
        serial: String,
        family: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{family} record from {serial} is missing required field {index}")]
    MissingField {
        serial: String,
        family: &'static str,
        index: usize,
    },

    #[error(transparent)]
    Accum(#[from] wfs_accum::AccumError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Channel-based record transport between the I/O layer and the dispatcher
pub type RecordReceiver = mpsc::Receiver<RawRecord>;
pub type RecordSender = mpsc::Sender<RawRecord>;

/// Create a new record channel with specified buffer size
pub fn create_record_channel(buffer_size: usize) -> (RecordSender, RecordReceiver) {
    mpsc::channel(buffer_size)
}
