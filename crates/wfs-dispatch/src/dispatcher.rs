//! Station dispatcher: per-device state and metric production

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::decode::{decode_record, DecodedRecord};
use crate::DispatchResult;
use wfs_accum::{EtoAggregator, RainAccumulator, RainTotals};
use wfs_core::derived::{apparent_temp, dewpoint, heat_index, sea_level_pressure, wind_chill};
use wfs_core::trend::{PressureTrend, TrendHistory};
use wfs_core::types::{
    AirObservation, Metric, Observation, RapidWind, RawRecord, SkyObservation, StationContext,
    TempestObservation,
};
use wfs_core::units::{
    display_distance, display_pressure, display_rain_rate, display_temperature, display_wind,
    ms_to_kph,
};

/// The derived values for one pressure/temperature observation, in
/// canonical units (Celsius, millibars)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub temperature: f64,
    pub feels_like: f64,
    pub dewpoint: f64,
    pub heat_index: f64,
    pub wind_chill: f64,
    pub sea_level_pressure: f64,
    pub station_pressure: f64,
    pub pressure_trend: PressureTrend,
}

/// Mutable per-device accumulation state
#[derive(Debug)]
struct DeviceState {
    trend: TrendHistory,
    rain: RainAccumulator,
}

impl DeviceState {
    fn new(now: DateTime<Local>) -> Self {
        Self {
            trend: TrendHistory::new(),
            rain: RainAccumulator::new(now),
        }
    }
}

/// Routes decoded observations to the core transforms and accumulators
/// and assembles display-unit metric values.
///
/// One dispatcher per station. The caller serializes updates: at most
/// one in-flight `ingest` per dispatcher at a time.
pub struct StationDispatcher {
    context: StationContext,
    devices: HashMap<String, DeviceState>,
    eto: EtoAggregator,
    /// Last observed average wind in kph, fed into the feels-like and
    /// wind-chill formulas for devices without an anemometer
    last_wind_kph: f64,
}

impl StationDispatcher {
    pub fn new(context: StationContext) -> Self {
        Self {
            context,
            devices: HashMap::new(),
            eto: EtoAggregator::new(context.elevation, context.latitude),
            last_wind_kph: 0.0,
        }
    }

    pub fn context(&self) -> &StationContext {
        &self.context
    }

    /// Replace the station context wholesale on configuration change
    pub fn set_context(&mut self, context: StationContext) {
        self.context = context;
    }

    /// Register a device whose observations feed the ET aggregator
    pub fn register_eto_device(&mut self, serial: &str) {
        self.eto.add_device(serial);
    }

    /// Seed a device's rain buckets from recovered history
    pub fn seed_rain(&mut self, serial: &str, totals: RainTotals, now: DateTime<Local>) {
        self.device(serial, now).rain.seed(totals);
    }

    fn device(&mut self, serial: &str, now: DateTime<Local>) -> &mut DeviceState {
        self.devices
            .entry(serial.to_string())
            .or_insert_with(|| DeviceState::new(now))
    }

    /// Decode and apply one raw record, returning the display metrics it
    /// produced. A malformed record abandons the whole update: no
    /// accumulator is touched and the failure is logged with device and
    /// family context.
    pub fn ingest(&mut self, record: &RawRecord, now: DateTime<Local>) -> DispatchResult<Vec<Metric>> {
        let decoded = match decode_record(record) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(serial = %record.serial, error = %e, "observation rejected");
                return Err(e);
            }
        };

        match decoded {
            DecodedRecord::Observation(Observation::Air(air)) => {
                self.apply_air(&record.serial, &air, now)
            }
            DecodedRecord::Observation(Observation::Sky(sky)) => {
                self.apply_sky(&record.serial, &sky, now)
            }
            DecodedRecord::Observation(Observation::Tempest(st)) => {
                self.apply_tempest(&record.serial, &st, now)
            }
            DecodedRecord::RapidWind(rw) => Ok(self.apply_rapid_wind(&rw)),
        }
    }

    /// Run the derived-metric formulas for one pressure/temperature
    /// reading, updating the device's pressure-trend history.
    pub fn apply_derived_metrics(
        &mut self,
        serial: &str,
        station_pressure: Option<f64>,
        temperature: f64,
        humidity: f64,
        now: DateTime<Local>,
    ) -> DerivedMetrics {
        let elevation = self.context.elevation;
        let wind_kph = self.last_wind_kph;

        let slp = sea_level_pressure(station_pressure, elevation);
        let trend = self
            .device(serial, now)
            .trend
            .update(station_pressure.unwrap_or(0.0));

        DerivedMetrics {
            temperature,
            feels_like: apparent_temp(temperature, wind_kph / 3.6, humidity),
            dewpoint: dewpoint(temperature, humidity),
            heat_index: heat_index(temperature, humidity),
            wind_chill: wind_chill(temperature, wind_kph),
            sea_level_pressure: slp,
            station_pressure: station_pressure.unwrap_or(0.0),
            pressure_trend: trend,
        }
    }

    /// Apply one rain increment for a device, returning the six bucket
    /// totals converted to the station's display unit.
    pub fn update_rain(
        &mut self,
        serial: &str,
        rain_mm: f64,
        now: DateTime<Local>,
    ) -> DispatchResult<(RainTotals, &'static str)> {
        let rain_unit = self.context.units.rain;
        let totals = self.device(serial, now).rain.update(rain_mm, now)?;
        Ok(totals.in_unit(rain_unit))
    }

    /// Widen the ET aggregator with an observation from a registered device
    pub fn record_eto_observation(&mut self, serial: &str, obs: &Observation) {
        if self.eto.is_device(serial) {
            self.eto.record_observation(obs);
            debug!(serial, "ET0 trackers widened");
        }
    }

    /// Daily reference evapotranspiration in mm/day
    pub fn compute_daily_eto(&self) -> f64 {
        self.eto.compute_daily()
    }

    /// Day-of-year the ET aggregator is currently accumulating
    pub fn eto_day(&self) -> u32 {
        self.eto.day()
    }

    /// Day-boundary reset of the ET aggregator, invoked by the poll path
    pub fn reset_eto(&mut self, day_of_year: u32) {
        self.eto.reset(day_of_year);
    }

    fn apply_air(
        &mut self,
        serial: &str,
        air: &AirObservation,
        now: DateTime<Local>,
    ) -> DispatchResult<Vec<Metric>> {
        let derived = self.apply_derived_metrics(
            serial,
            air.station_pressure,
            air.temperature,
            air.humidity,
            now,
        );

        let mut metrics = self.derived_metric_set(&derived);
        metrics.push(Metric::new("humidity", air.humidity, "%"));
        metrics.push(Metric::new("lightning_strikes", air.strike_count, "count"));
        let (distance, unit) = display_distance(air.strike_distance, self.context.units.distance);
        metrics.push(Metric::new("lightning_distance", distance, unit));
        metrics.push(Metric::new("battery", air.battery, "V"));

        self.record_eto_observation(serial, &Observation::Air(air.clone()));
        Ok(metrics)
    }

    fn apply_sky(
        &mut self,
        serial: &str,
        sky: &SkyObservation,
        now: DateTime<Local>,
    ) -> DispatchResult<Vec<Metric>> {
        self.last_wind_kph = ms_to_kph(sky.wind_avg);

        let mut metrics = self.wind_metric_set(sky.wind_avg, sky.wind_lull, sky.wind_gust);
        metrics.push(Metric::new("wind_direction", sky.wind_direction, "°"));

        let (rate, rate_unit) = display_rain_rate(sky.rain, self.context.units.rain);
        metrics.push(Metric::new("rain_rate", rate, rate_unit));
        metrics.extend(self.rain_metric_set(serial, sky.rain, now)?);

        metrics.push(Metric::new("illuminance", sky.illuminance, "lux"));
        metrics.push(Metric::new("uv", sky.uv, "index"));
        metrics.push(Metric::new("solar_radiation", sky.solar_radiation, "W/m²"));
        metrics.push(Metric::new("battery", sky.battery, "V"));

        self.record_eto_observation(serial, &Observation::Sky(sky.clone()));
        Ok(metrics)
    }

    fn apply_tempest(
        &mut self,
        serial: &str,
        st: &TempestObservation,
        now: DateTime<Local>,
    ) -> DispatchResult<Vec<Metric>> {
        self.last_wind_kph = ms_to_kph(st.wind_avg);

        let derived = self.apply_derived_metrics(
            serial,
            st.station_pressure,
            st.temperature,
            st.humidity,
            now,
        );

        let mut metrics = self.derived_metric_set(&derived);
        metrics.push(Metric::new("humidity", st.humidity, "%"));
        metrics.push(Metric::new("lightning_strikes", st.strike_count, "count"));
        let (distance, unit) = display_distance(st.strike_distance, self.context.units.distance);
        metrics.push(Metric::new("lightning_distance", distance, unit));

        metrics.extend(self.wind_metric_set(st.wind_avg, st.wind_lull, st.wind_gust));
        metrics.push(Metric::new("wind_direction", st.wind_direction, "°"));

        let (rate, rate_unit) = display_rain_rate(st.rain, self.context.units.rain);
        metrics.push(Metric::new("rain_rate", rate, rate_unit));
        metrics.extend(self.rain_metric_set(serial, st.rain, now)?);

        metrics.push(Metric::new("illuminance", st.illuminance, "lux"));
        metrics.push(Metric::new("uv", st.uv, "index"));
        metrics.push(Metric::new("solar_radiation", st.solar_radiation, "W/m²"));
        metrics.push(Metric::new("battery", st.battery, "V"));

        self.record_eto_observation(serial, &Observation::Tempest(st.clone()));
        Ok(metrics)
    }

    fn apply_rapid_wind(&mut self, rw: &RapidWind) -> Vec<Metric> {
        let kph = ms_to_kph(rw.wind_speed);
        self.last_wind_kph = kph;

        let (speed, unit) = display_wind(kph, self.context.units.wind);
        vec![
            Metric::new("wind_speed", speed, unit),
            Metric::new("wind_direction", rw.wind_direction, "°"),
        ]
    }

    fn derived_metric_set(&self, derived: &DerivedMetrics) -> Vec<Metric> {
        let units = &self.context.units;

        let temp = |c: f64| display_temperature(c, units.temperature);
        let (temperature, temp_unit) = temp(derived.temperature);
        let (feels_like, _) = temp(derived.feels_like);
        let (dew, _) = temp(derived.dewpoint);
        let (heat, _) = temp(derived.heat_index);
        let (chill, _) = temp(derived.wind_chill);

        let (station, pressure_unit) = display_pressure(derived.station_pressure, units.pressure);
        let (sea_level, _) = display_pressure(derived.sea_level_pressure, units.pressure);

        vec![
            Metric::new("temperature", temperature, temp_unit),
            Metric::new("feels_like", feels_like, temp_unit),
            Metric::new("dewpoint", dew, temp_unit),
            Metric::new("heat_index", heat, temp_unit),
            Metric::new("wind_chill", chill, temp_unit),
            Metric::new("station_pressure", station, pressure_unit),
            Metric::new("sea_level_pressure", sea_level, pressure_unit),
            Metric::new(
                "pressure_trend",
                derived.pressure_trend.code() as f64,
                "index",
            ),
        ]
    }

    fn wind_metric_set(&self, avg_ms: f64, lull_ms: f64, gust_ms: f64) -> Vec<Metric> {
        let wind_unit = self.context.units.wind;
        let (speed, unit) = display_wind(ms_to_kph(avg_ms), wind_unit);
        let (lull, _) = display_wind(ms_to_kph(lull_ms), wind_unit);
        let (gust, _) = display_wind(ms_to_kph(gust_ms), wind_unit);

        vec![
            Metric::new("wind_speed", speed, unit),
            Metric::new("wind_lull", lull, unit),
            Metric::new("wind_gust", gust, unit),
        ]
    }

    fn rain_metric_set(
        &mut self,
        serial: &str,
        rain_mm: f64,
        now: DateTime<Local>,
    ) -> DispatchResult<Vec<Metric>> {
        let (totals, unit) = self.update_rain(serial, rain_mm, now)?;

        Ok(vec![
            Metric::new("rain_hourly", totals.hourly, unit),
            Metric::new("rain_daily", totals.daily, unit),
            Metric::new("rain_weekly", totals.weekly, unit),
            Metric::new("rain_monthly", totals.monthly, unit),
            Metric::new("rain_yearly", totals.yearly, unit),
            Metric::new("rain_yesterday", totals.yesterday, unit),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wfs_core::types::{RecordType, StationContext, UnitPreferences};

    fn at(h: u32, mi: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 6, 10, h, mi, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn metric(metrics: &[Metric], name: &str) -> Metric {
        *metrics
            .iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("metric {} missing", name))
    }

    fn air_record(pressure: f64, temperature: f64, humidity: f64) -> RawRecord {
        RawRecord {
            serial: "AR-00004049".to_string(),
            record_type: RecordType::ObsAir,
            obs: vec![vec![
                Some(1493164835.0),
                Some(pressure),
                Some(temperature),
                Some(humidity),
                Some(2.0),
                Some(10.0),
                Some(3.46),
            ]],
        }
    }

    fn tempest_record(rain: f64) -> RawRecord {
        RawRecord {
            serial: "ST-00012345".to_string(),
            record_type: RecordType::ObsSt,
            obs: vec![vec![
                Some(1588948614.0),
                Some(1.0),
                Some(2.0),
                Some(3.5),
                Some(144.0),
                Some(6.0),
                Some(1017.57),
                Some(22.37),
                Some(50.26),
                Some(328.0),
                Some(0.03),
                Some(3.0),
                Some(rain),
                Some(0.0),
                Some(0.0),
                Some(0.0),
                Some(2.41),
                Some(1.0),
            ]],
        }
    }

    #[test]
    fn test_air_metrics_metric_units() {
        let mut dispatcher = StationDispatcher::new(StationContext {
            elevation: 100.0,
            latitude: 45.0,
            units: UnitPreferences::default(),
        });

        let metrics = dispatcher.ingest(&air_record(1000.0, 20.0, 65.0), at(14, 0)).unwrap();

        assert_eq!(metric(&metrics, "temperature").value, 20.0);
        assert_eq!(metric(&metrics, "temperature").unit, "°C");
        assert_eq!(metric(&metrics, "dewpoint").value, 13.2);
        assert_eq!(metric(&metrics, "sea_level_pressure").value, 1011.943);
        assert_eq!(metric(&metrics, "station_pressure").value, 1000.0);
        // first-ever reading compares against an empty history
        assert_eq!(
            metric(&metrics, "pressure_trend").value,
            PressureTrend::Rising.code() as f64
        );
        assert_eq!(metric(&metrics, "humidity").value, 65.0);
        assert_eq!(metric(&metrics, "lightning_distance").unit, "km");
    }

    #[test]
    fn test_air_metrics_imperial_units() {
        let units: UnitPreferences = serde_json::from_str(
            r#"{"temperature":"f","wind":"mph","pressure":"inhg","rain":"in","distance":"mi"}"#,
        )
        .unwrap();
        let mut dispatcher = StationDispatcher::new(StationContext {
            elevation: 100.0,
            latitude: 45.0,
            units,
        });

        let metrics = dispatcher.ingest(&air_record(1000.0, 20.0, 65.0), at(14, 0)).unwrap();

        assert_eq!(metric(&metrics, "temperature").value, 68.0);
        assert_eq!(metric(&metrics, "temperature").unit, "°F");
        // 1000 mb in inHg at 3 decimals
        assert_eq!(metric(&metrics, "station_pressure").value, 29.53);
        assert_eq!(metric(&metrics, "station_pressure").unit, "inHg");
        // 10 km strike distance in miles at 1 decimal
        assert_eq!(metric(&metrics, "lightning_distance").value, 6.2);
    }

    #[test]
    fn test_steady_trend_on_repeat_pressure() {
        let mut dispatcher = StationDispatcher::new(StationContext::default());

        dispatcher.ingest(&air_record(1000.0, 20.0, 65.0), at(14, 0)).unwrap();
        let metrics = dispatcher.ingest(&air_record(1000.3, 20.0, 65.0), at(14, 5)).unwrap();

        assert_eq!(
            metric(&metrics, "pressure_trend").value,
            PressureTrend::Steady.code() as f64
        );
    }

    #[test]
    fn test_tempest_rain_accumulates() {
        let mut dispatcher = StationDispatcher::new(StationContext::default());

        dispatcher.ingest(&tempest_record(2.0), at(14, 0)).unwrap();
        dispatcher.ingest(&tempest_record(3.0), at(14, 10)).unwrap();
        let metrics = dispatcher.ingest(&tempest_record(1.0), at(14, 20)).unwrap();

        assert_eq!(metric(&metrics, "rain_daily").value, 6.0);
        assert_eq!(metric(&metrics, "rain_hourly").value, 6.0);
        assert_eq!(metric(&metrics, "rain_daily").unit, "mm");
    }

    #[test]
    fn test_tempest_wind_feeds_chill_inputs() {
        let mut dispatcher = StationDispatcher::new(StationContext::default());

        let metrics = dispatcher.ingest(&tempest_record(0.0), at(14, 0)).unwrap();
        // wind_avg 2 m/s is 7.2 kph
        assert_eq!(metric(&metrics, "wind_speed").value, 7.2);
        assert_eq!(dispatcher.last_wind_kph, 7.2);
    }

    #[test]
    fn test_malformed_record_leaves_rain_untouched() {
        let mut dispatcher = StationDispatcher::new(StationContext::default());
        dispatcher.ingest(&tempest_record(5.0), at(14, 0)).unwrap();

        let mut bad = tempest_record(1.0);
        bad.obs[0][12] = None; // rain dropped out
        assert!(dispatcher.ingest(&bad, at(14, 10)).is_err());

        let metrics = dispatcher.ingest(&tempest_record(0.0), at(14, 20)).unwrap();
        assert_eq!(metric(&metrics, "rain_daily").value, 5.0);
    }

    #[test]
    fn test_eto_only_widens_for_registered_devices() {
        let mut dispatcher = StationDispatcher::new(StationContext {
            elevation: 250.0,
            latitude: 45.0,
            units: UnitPreferences::default(),
        });

        dispatcher.ingest(&tempest_record(0.0), at(14, 0)).unwrap();
        assert_eq!(dispatcher.compute_daily_eto(), 0.0);

        dispatcher.register_eto_device("ST-00012345");
        dispatcher.ingest(&tempest_record(0.0), at(14, 10)).unwrap();
        assert!(dispatcher.compute_daily_eto() > 0.0);
    }

    #[test]
    fn test_rapid_wind_updates_speed() {
        let mut dispatcher = StationDispatcher::new(StationContext::default());
        let record = RawRecord {
            serial: "ST-00012345".to_string(),
            record_type: RecordType::RapidWind,
            obs: vec![vec![Some(1588948614.0), Some(5.0), Some(90.0)]],
        };

        let metrics = dispatcher.ingest(&record, at(14, 0)).unwrap();
        assert_eq!(metric(&metrics, "wind_speed").value, 18.0);
        assert_eq!(metric(&metrics, "wind_direction").value, 90.0);
    }
}
