//! Core data types for station observations

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix epoch seconds)
pub type Timestamp = i64;

/// The three known sensor hardware families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorFamily {
    /// Barometric/temperature/humidity unit
    Air,
    /// Anemometer/rain/light unit
    Sky,
    /// Combined all-in-one unit
    Tempest,
}

impl SensorFamily {
    /// Number of positional fields in one observation of this family
    pub fn field_count(self) -> usize {
        match self {
            SensorFamily::Air => 7,
            SensorFamily::Sky => 11,
            SensorFamily::Tempest => 18,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SensorFamily::Air => "air",
            SensorFamily::Sky => "sky",
            SensorFamily::Tempest => "tempest",
        }
    }
}

/// Record kinds on the station wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    ObsAir,
    ObsSky,
    ObsSt,
    RapidWind,
}

impl RecordType {
    /// Sensor family for full observation records, None for rapid wind
    pub fn family(self) -> Option<SensorFamily> {
        match self {
            RecordType::ObsAir => Some(SensorFamily::Air),
            RecordType::ObsSky => Some(SensorFamily::Sky),
            RecordType::ObsSt => Some(SensorFamily::Tempest),
            RecordType::RapidWind => None,
        }
    }
}

/// A raw observation record as handed over by the I/O layer: the device
/// serial, the record kind, and one or more positional field arrays.
/// Fields may be null when the sensor did not report them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(rename = "serial_number")]
    pub serial: String,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    pub obs: Vec<Vec<Option<f64>>>,
}

/// Barometric unit observation, decoded from its positional layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirObservation {
    pub time: Timestamp,
    /// Station pressure in millibars; None when the barometer did not report
    pub station_pressure: Option<f64>,
    /// Air temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub strike_count: f64,
    /// Lightning strike distance in kilometers
    pub strike_distance: f64,
    pub battery: f64,
}

/// Wind/rain/light unit observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyObservation {
    pub time: Timestamp,
    /// Illuminance in lux
    pub illuminance: f64,
    pub uv: f64,
    /// Rain over the report interval, millimeters
    pub rain: f64,
    /// Wind lull in m/s (0 when the sensor reported null)
    pub wind_lull: f64,
    /// Average wind in m/s (0 when the sensor reported null)
    pub wind_avg: f64,
    /// Wind gust in m/s (0 when the sensor reported null)
    pub wind_gust: f64,
    /// Wind direction in degrees
    pub wind_direction: f64,
    pub battery: f64,
    /// Report interval in minutes
    pub report_interval: f64,
    /// Solar radiation in W/m²
    pub solar_radiation: f64,
}

/// Combined all-in-one unit observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempestObservation {
    pub time: Timestamp,
    pub wind_lull: f64,
    pub wind_avg: f64,
    pub wind_gust: f64,
    pub wind_direction: f64,
    /// Wind sample interval in seconds
    pub wind_sample_interval: f64,
    pub station_pressure: Option<f64>,
    pub temperature: f64,
    pub humidity: f64,
    pub illuminance: f64,
    pub uv: f64,
    pub solar_radiation: f64,
    pub rain: f64,
    pub precip_type: f64,
    pub strike_count: f64,
    pub strike_distance: f64,
    pub battery: f64,
    pub report_interval: f64,
}

/// A decoded observation, tagged by sensor family. The dispatch layer
/// guarantees a record is never reinterpreted under the wrong layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    Air(AirObservation),
    Sky(SkyObservation),
    Tempest(TempestObservation),
}

impl Observation {
    pub fn family(&self) -> SensorFamily {
        match self {
            Observation::Air(_) => SensorFamily::Air,
            Observation::Sky(_) => SensorFamily::Sky,
            Observation::Tempest(_) => SensorFamily::Tempest,
        }
    }

    pub fn time(&self) -> Timestamp {
        match self {
            Observation::Air(o) => o.time,
            Observation::Sky(o) => o.time,
            Observation::Tempest(o) => o.time,
        }
    }
}

/// High-frequency wind sample (time, speed in m/s, direction in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RapidWind {
    pub time: Timestamp,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

/// Display unit for temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    C,
    F,
}

/// Display unit for wind speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindUnit {
    #[default]
    Kph,
    Mph,
    Mps,
}

/// Display unit for pressures (hPa equals mb numerically, label differs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Mb,
    Hpa,
    Inhg,
}

/// Display unit for rain amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainUnit {
    #[default]
    Mm,
    In,
}

/// Display unit for distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
}

/// Per-quantity display unit selection for a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPreferences {
    #[serde(default)]
    pub temperature: TemperatureUnit,
    #[serde(default)]
    pub wind: WindUnit,
    #[serde(default)]
    pub pressure: PressureUnit,
    #[serde(default)]
    pub rain: RainUnit,
    #[serde(default)]
    pub distance: DistanceUnit,
}

/// Per-station metadata, set at configuration time and read-only to the
/// core. Replaced wholesale on configuration change, never mutated
/// field-by-field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationContext {
    /// Station elevation in meters
    pub elevation: f64,
    /// Station latitude in degrees
    pub latitude: f64,
    pub units: UnitPreferences,
}

/// A named metric value in its display unit, ready for presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Metric {
    pub fn new(name: &'static str, value: f64, unit: &'static str) -> Self {
        Self { name, value, unit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_serde() {
        let json = r#"{
            "serial_number": "AR-00004049",
            "type": "obs_air",
            "obs": [[1493164835, 835.0, 10.0, 45, 0, 0, 3.46]]
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.serial, "AR-00004049");
        assert_eq!(record.record_type, RecordType::ObsAir);
        assert_eq!(record.obs[0].len(), 7);
        assert_eq!(record.obs[0][1], Some(835.0));
    }

    #[test]
    fn test_raw_record_null_fields() {
        let json = r#"{
            "serial_number": "SK-00008453",
            "type": "obs_sky",
            "obs": [[1493321340, 9000, 10, 0.0, null, null, null, 187, 3.12, 1, 130]]
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.record_type, RecordType::ObsSky);
        assert_eq!(record.obs[0][4], None);
        assert_eq!(record.obs[0][10], Some(130.0));
    }

    #[test]
    fn test_record_type_family() {
        assert_eq!(RecordType::ObsAir.family(), Some(SensorFamily::Air));
        assert_eq!(RecordType::ObsSt.family(), Some(SensorFamily::Tempest));
        assert_eq!(RecordType::RapidWind.family(), None);
    }

    #[test]
    fn test_default_units_are_metric() {
        let units = UnitPreferences::default();
        assert_eq!(units.temperature, TemperatureUnit::C);
        assert_eq!(units.wind, WindUnit::Kph);
        assert_eq!(units.pressure, PressureUnit::Mb);
        assert_eq!(units.rain, RainUnit::Mm);
        assert_eq!(units.distance, DistanceUnit::Km);
    }

    #[test]
    fn test_unit_preferences_deserialize() {
        let toml_like = r#"{"temperature":"f","wind":"mph","pressure":"inhg","rain":"in","distance":"mi"}"#;
        let units: UnitPreferences = serde_json::from_str(toml_like).unwrap();
        assert_eq!(units.temperature, TemperatureUnit::F);
        assert_eq!(units.wind, WindUnit::Mph);
        assert_eq!(units.pressure, PressureUnit::Inhg);
    }
}
