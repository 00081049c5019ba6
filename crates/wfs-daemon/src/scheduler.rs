//! Observation collection and poll scheduling

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use wfs_core::Source;
use wfs_dispatch::StationDispatcher;

/// Drives the dispatcher: the real-time path feeds records as they
/// arrive, the low-frequency poll path handles day-boundary work like
/// the evapotranspiration reset.
pub struct Scheduler {
    source: Box<dyn Source>,
    dispatcher: StationDispatcher,
    poll_interval: u64,
    running: bool,
}

impl Scheduler {
    pub fn new(source: Box<dyn Source>, dispatcher: StationDispatcher, poll_interval: u64) -> Self {
        Self {
            source,
            dispatcher,
            poll_interval,
            running: false,
        }
    }

    /// Run the collection loop until stopped
    pub async fn run(&mut self) -> Result<()> {
        self.running = true;
        let mut poll_tick = interval(Duration::from_secs(self.poll_interval));

        info!("Scheduler started");
        info!("Poll interval: {}s", self.poll_interval);

        while self.running {
            tokio::select! {
                record = self.source.next_record() => {
                    match record.context("Failed to read record from source") {
                        Ok(record) => self.process_record(&record),
                        Err(e) => {
                            warn!("Error reading from source: {:#}", e);
                        }
                    }
                }
                _ = poll_tick.tick() => {
                    self.poll();
                }
            }
        }

        info!("Scheduler stopped");
        Ok(())
    }

    /// Apply a single record; dispatch failures are logged and the loop
    /// keeps running
    fn process_record(&mut self, record: &wfs_core::RawRecord) {
        match self.dispatcher.ingest(record, Local::now()) {
            Ok(metrics) => {
                debug!(
                    serial = %record.serial,
                    count = metrics.len(),
                    "metrics updated"
                );
            }
            Err(e) => {
                warn!("Error processing record: {}", e);
            }
        }
    }

    /// Low-frequency poll work: publish and reset the ET aggregation
    /// when the day rolled over
    fn poll(&mut self) {
        let today = Local::now().ordinal();
        if today != self.dispatcher.eto_day() {
            let eto = self.dispatcher.compute_daily_eto();
            if self.dispatcher.eto_day() != 0 {
                info!(eto_mm_day = eto, day = self.dispatcher.eto_day(), "daily ET0");
            }
            self.dispatcher.reset_eto(today);
        }
    }

    /// Stop the scheduler
    pub fn stop(&mut self) {
        info!("Stopping scheduler...");
        self.running = false;
    }
}
