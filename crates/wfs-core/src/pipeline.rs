use anyhow::Result;

use crate::types::{Metric, RawRecord};

/// Produces raw observation records; implemented by the I/O layer
/// (UDP listener, REST poller, simulator).
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn next_record(&mut self) -> Result<RawRecord>;
}

/// Consumes display-ready metric values; implemented by the
/// presentation layer.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    async fn emit(&mut self, metrics: &[Metric]) -> Result<()>;
}
