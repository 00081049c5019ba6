//! Station configuration
//!
//! Loads the per-station metadata (elevation, latitude, display units)
//! from a TOML file and turns it into the read-only `StationContext`
//! consumed by the core.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use wfs_core::types::{StationContext, UnitPreferences};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StationSection {
    pub name: Option<String>,
    /// Station elevation in meters
    pub elevation: Option<f64>,
    /// Station latitude in degrees
    pub latitude: Option<f64>,
    /// Device serials contributing to evapotranspiration
    pub eto_devices: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub station: Option<StationSection>,
    pub units: Option<UnitPreferences>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from the WFS_CONFIG path (TOML) if present,
    /// falling back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WFS_CONFIG").unwrap_or_else(|_| "station.toml".to_string());
        Self::from_path(path)
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Build the station context the core reads (missing values default
    /// to a sea-level, equator, all-metric station)
    pub fn station_context(&self) -> StationContext {
        let station = self.station.clone().unwrap_or_default();
        StationContext {
            elevation: station.elevation.unwrap_or(0.0),
            latitude: station.latitude.unwrap_or(0.0),
            units: self.units.unwrap_or_default(),
        }
    }

    /// Device serials registered for evapotranspiration reporting
    pub fn eto_devices(&self) -> Vec<String> {
        self.station
            .as_ref()
            .and_then(|s| s.eto_devices.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wfs_core::types::{PressureUnit, TemperatureUnit, WindUnit};

    #[test]
    fn default_context_is_metric_sea_level() {
        let cfg = AppConfig::default();
        let ctx = cfg.station_context();
        assert_eq!(ctx.elevation, 0.0);
        assert_eq!(ctx.latitude, 0.0);
        assert_eq!(ctx.units.temperature, TemperatureUnit::C);
    }

    #[test]
    fn parse_full_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [station]
            name = "backyard"
            elevation = 401.33
            latitude = 36.82
            eto_devices = ["ST-00012345"]

            [units]
            temperature = "f"
            wind = "mph"
            pressure = "inhg"
            rain = "in"
            distance = "mi"
            "#,
        )
        .unwrap();

        let ctx = cfg.station_context();
        assert_eq!(ctx.elevation, 401.33);
        assert_eq!(ctx.latitude, 36.82);
        assert_eq!(ctx.units.temperature, TemperatureUnit::F);
        assert_eq!(ctx.units.wind, WindUnit::Mph);
        assert_eq!(ctx.units.pressure, PressureUnit::Inhg);
        assert_eq!(cfg.eto_devices(), vec!["ST-00012345".to_string()]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::from_path("/nonexistent/station.toml").unwrap();
        let ctx = cfg.station_context();
        assert_eq!(ctx.elevation, 0.0);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[station]\nelevation = 120.5").unwrap();

        let cfg = AppConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.station_context().elevation, 120.5);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[station\nelevation = ").unwrap();

        assert!(matches!(
            AppConfig::from_path(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }
}
