//! Pressure trend tracking
//!
//! A bounded, newest-first history of station pressure samples classifies
//! each new reading as rising, falling, or steady against the previous
//! sample.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum retained pressure samples
pub const TREND_HISTORY_CAPACITY: usize = 180;

/// Pressure trend classification. The numeric codes are part of the
/// presentation contract (0 falling, 1 steady, 2 rising).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureTrend {
    Falling,
    Steady,
    Rising,
}

impl PressureTrend {
    pub fn code(self) -> u8 {
        match self {
            PressureTrend::Falling => 0,
            PressureTrend::Steady => 1,
            PressureTrend::Rising => 2,
        }
    }
}

/// Bounded pressure history, newest sample at the front.
///
/// One per pressure-bearing device; created empty and kept for the life
/// of the device node.
#[derive(Debug, Clone, Default)]
pub struct TrendHistory {
    samples: VecDeque<f64>,
}

impl TrendHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(TREND_HISTORY_CAPACITY),
        }
    }

    /// Classify `current_mb` against the most recent sample, then record
    /// it. The oldest sample is evicted before insertion once the history
    /// is at capacity, so the length never exceeds it.
    ///
    /// An empty history compares against 0, so the very first reading can
    /// classify as rising or falling. That is intended behavior.
    pub fn update(&mut self, current_mb: f64) -> PressureTrend {
        let past = self.samples.front().copied().unwrap_or(0.0);

        let trend = if past - current_mb > 1.0 {
            PressureTrend::Falling
        } else if past - current_mb < -1.0 {
            PressureTrend::Rising
        } else {
            PressureTrend::Steady
        };

        if self.samples.len() == TREND_HISTORY_CAPACITY {
            self.samples.pop_back();
        }
        self.samples.push_front(current_mb);

        trend
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recently recorded sample, if any
    pub fn latest(&self) -> Option<f64> {
        self.samples.front().copied()
    }
}
