//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Seconds between simulated observation reports (default: 5)
    pub report_interval: u64,

    /// Seconds between poll ticks for day-boundary work (default: 30)
    pub poll_interval: u64,
}

impl DaemonConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let report_interval = env::var("WFS_REPORT_INTERVAL")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("Invalid WFS_REPORT_INTERVAL")?;

        let poll_interval = env::var("WFS_POLL_INTERVAL")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid WFS_POLL_INTERVAL")?;

        Ok(Self {
            report_interval,
            poll_interval,
        })
    }
}
