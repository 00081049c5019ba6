//! Rolling rain accumulation
//!
//! Six overlapping windows per device, reset on wall-clock boundary
//! crossings. The boundary is detected by comparing calendar components
//! of "now" against the snapshot taken at the previous update, so a
//! bucket is reset exactly once per crossing and always before the new
//! sample is added.

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::{AccumError, AccumResult};
use wfs_core::types::RainUnit;
use wfs_core::units::display_rain;

/// Rain totals in millimeters per rolling window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RainTotals {
    pub hourly: f64,
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
    pub yesterday: f64,
}

impl RainTotals {
    /// Convert every bucket to the display unit with bucket-appropriate
    /// rounding (2 decimals for inches, 3 for millimeters).
    pub fn in_unit(self, unit: RainUnit) -> (RainTotals, &'static str) {
        let (_, label) = display_rain(0.0, unit);
        let conv = |mm: f64| display_rain(mm, unit).0;
        (
            RainTotals {
                hourly: conv(self.hourly),
                daily: conv(self.daily),
                weekly: conv(self.weekly),
                monthly: conv(self.monthly),
                yearly: conv(self.yearly),
                yesterday: conv(self.yesterday),
            },
            label,
        )
    }
}

/// Per-device rain accumulation state machine.
///
/// Buckets never decrease except by boundary reset; "yesterday" is
/// written only by the day-boundary copy of the pre-reset daily total.
#[derive(Debug, Clone)]
pub struct RainAccumulator {
    totals: RainTotals,
    last_update: DateTime<Local>,
}

impl RainAccumulator {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            totals: RainTotals::default(),
            last_update: now,
        }
    }

    /// Seed buckets from externally recovered history (e.g. totals
    /// queried from the vendor's archive at startup).
    pub fn seed(&mut self, totals: RainTotals) {
        self.totals = totals;
    }

    pub fn totals(&self) -> RainTotals {
        self.totals
    }

    /// Apply one rain increment (millimeters over the report interval)
    /// at the given wall-clock instant.
    ///
    /// A non-finite increment abandons the update: state is left
    /// untouched and the error is returned for the caller to log.
    pub fn update(&mut self, rain_mm: f64, now: DateTime<Local>) -> AccumResult<RainTotals> {
        if !rain_mm.is_finite() {
            return Err(AccumError::InvalidIncrement(rain_mm));
        }

        if now.hour() != self.last_update.hour() {
            self.totals.hourly = 0.0;
        }
        if now.day() != self.last_update.day() {
            // capture the finished day before the reset
            self.totals.yesterday = self.totals.daily;
            self.totals.daily = 0.0;
            debug!(yesterday = self.totals.yesterday, "rain day boundary");
        }
        if now.iso_week().week() != self.last_update.iso_week().week() {
            self.totals.weekly = 0.0;
        }
        if now.month() != self.last_update.month() {
            self.totals.monthly = 0.0;
        }
        if now.year() != self.last_update.year() {
            self.totals.yearly = 0.0;
        }

        self.totals.hourly += rain_mm;
        self.totals.daily += rain_mm;
        self.totals.weekly += rain_mm;
        self.totals.monthly += rain_mm;
        self.totals.yearly += rain_mm;

        self.last_update = now;
        Ok(self.totals)
    }
}
