//! Simulated all-in-one station for local runs and testing
//!
//! Stands in for the excluded network I/O layer: produces tempest-family
//! records with slowly varying synthetic readings.

use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{sleep, Duration};
use wfs_core::{RawRecord, RecordType, Source};

pub const SIMULATOR_SERIAL: &str = "ST-00000001";

pub struct SimulatorSource {
    interval: u64,
    base_temp: f64,
    base_pressure: f64,
}

impl SimulatorSource {
    /// Create a new simulator with specified report interval (seconds)
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            base_temp: 20.0,
            base_pressure: 1013.25,
        }
    }

    fn generate_record(&self) -> RawRecord {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        // pseudo-random variation keyed off the clock
        let variation = ((now % 100) as f64 / 10.0) - 5.0;

        RawRecord {
            serial: SIMULATOR_SERIAL.to_string(),
            record_type: RecordType::ObsSt,
            obs: vec![vec![
                Some(now as f64),
                Some(0.5 + variation.abs() / 10.0),        // wind lull m/s
                Some(1.5 + variation.abs() / 5.0),         // wind avg m/s
                Some(3.0 + variation.abs() / 2.0),         // wind gust m/s
                Some((now % 360) as f64),                  // wind direction
                Some(6.0),                                 // wind sample interval
                Some(self.base_pressure + variation * 2.0),
                Some(self.base_temp + variation),
                Some(65.0 + variation),
                Some(9000.0),
                Some(2.0),
                Some(130.0 + variation * 10.0),
                Some(0.0),                                 // rain
                Some(0.0),
                Some(0.0),
                Some(0.0),
                Some(2.41),
                Some(1.0),
            ]],
        }
    }
}

#[async_trait::async_trait]
impl Source for SimulatorSource {
    async fn next_record(&mut self) -> Result<RawRecord> {
        sleep(Duration::from_secs(self.interval)).await;
        Ok(self.generate_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfs_core::SensorFamily;
    use wfs_dispatch::{decode_record, DecodedRecord};

    #[tokio::test]
    async fn test_simulator_record_decodes() {
        let mut source = SimulatorSource::new(0);
        let record = source.next_record().await.unwrap();

        assert_eq!(record.serial, SIMULATOR_SERIAL);
        match decode_record(&record).unwrap() {
            DecodedRecord::Observation(obs) => {
                assert_eq!(obs.family(), SensorFamily::Tempest);
            }
            other => panic!("wrong decode: {:?}", other),
        }
    }
}
