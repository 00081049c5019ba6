//! Reference evapotranspiration (FAO-56 Penman-Monteith)
//!
//! Daily min/max conditions are widened across many observations, then at
//! the day boundary the combination equation produces ET₀ in mm/day for
//! the reference grass surface.
//!
//! Calculation follows "Step by Step Calculation of the Penman-Monteith
//! Evapotranspiration (FAO-56 Method)", http://edis.ifas.ufl.edu/pdffiles/ae/ae45900.pdf

use std::f64::consts::PI;

use tracing::error;

use wfs_core::types::Observation;
use wfs_core::units::watts_to_megajoules;

/// Canopy coefficient for the reference grass surface
pub const CANOPY_COEFFICIENT: f64 = 0.23;

const VAPOR_RATE: f64 = 237.3;
const ENTHALPY: f64 = 17.27;
const KELVIN: f64 = 273.15;
/// Solar constant, MJ·m⁻²·min⁻¹
const SOLAR_CONSTANT: f64 = 0.0820;

// Saturating seeds: min trackers start high, max trackers start low,
// so the first sample always wins both.
const TEMP_MIN_SEED: f64 = 100.0;
const TEMP_MAX_SEED: f64 = 0.0;
const HUMIDITY_MIN_SEED: f64 = 100.0;
const HUMIDITY_MAX_SEED: f64 = 0.0;
const WIND_MIN_SEED: f64 = 1000.0;
const WIND_MAX_SEED: f64 = 0.0;

fn deg_to_rad(deg: f64) -> f64 {
    PI / 180.0 * deg
}

/// Saturation vapor pressure at temperature, kPa
fn saturation_vapor(t: f64) -> f64 {
    0.6108 * ((ENTHALPY * t) / (t + VAPOR_RATE)).exp()
}

fn saturation_vapor_pressure_curve_slope(t: f64) -> f64 {
    4098.0 * saturation_vapor(t) / (t + VAPOR_RATE).powi(2)
}

/// Atmospheric pressure from elevation in meters, kPa
fn atmospheric_pressure(elevation: f64) -> f64 {
    101.3 * ((293.0 - 0.0065 * elevation) / 293.0).powf(5.26)
}

fn psychrometric_constant(atmo: f64) -> f64 {
    0.000665 * atmo
}

fn delta_term(vp_slope: f64, psychrometric: f64, avg_ws: f64) -> f64 {
    vp_slope / (vp_slope + psychrometric * (1.0 + 0.34 * avg_ws))
}

fn psi_term(vp_slope: f64, psychrometric: f64, avg_ws: f64) -> f64 {
    psychrometric / (vp_slope + psychrometric * (1.0 + 0.34 * avg_ws))
}

fn temperature_term(mean_t: f64, avg_ws: f64) -> f64 {
    900.0 / (mean_t + KELVIN) * avg_ws
}

/// Actual vapor pressure from humidity-weighted saturation pressures
fn actual_vapor_pressure(min_t: f64, max_t: f64, min_h: f64, max_h: f64) -> f64 {
    let rel1 = saturation_vapor(min_t) * (max_h / 100.0);
    let rel2 = saturation_vapor(max_t) * (min_h / 100.0);
    (rel1 + rel2) / 2.0
}

fn relative_earth_sun_distance(day: f64) -> f64 {
    1.0 + 0.033 * ((2.0 * PI / 365.0) * day).cos()
}

fn solar_declination(day: f64) -> f64 {
    0.409 * ((2.0 * PI / 365.0) * day - 1.39).sin()
}

fn sunset_hour_angle(latitude_rad: f64, declination: f64) -> f64 {
    (-latitude_rad.tan() * declination.tan()).clamp(-1.0, 1.0).acos()
}

/// Extraterrestrial radiation, MJ·m⁻²·day⁻¹
fn extraterrestrial_radiation(dist: f64, angle: f64, latitude_rad: f64, declination: f64) -> f64 {
    let rel1 = 24.0 * 60.0 / PI;
    let rel2 = SOLAR_CONSTANT * dist;
    let rel3 = angle * latitude_rad.sin() * declination.sin()
        + latitude_rad.cos() * declination.cos() * angle.sin();
    rel1 * rel2 * rel3
}

fn clear_sky_solar_radiation(elevation: f64, ex_radiation: f64) -> f64 {
    (0.75 + 2e-5 * elevation) * ex_radiation
}

/// Net outgoing longwave radiation (Stefan-Boltzmann term modulated by
/// vapor pressure and the cloudiness ratio Rs/Rso)
fn long_wave_radiation(min_t: f64, max_t: f64, vp: f64, rs: f64, clear_sky: f64) -> f64 {
    let rel1 = 4.903e-9;
    let rel2 = ((max_t + KELVIN).powi(4) + (min_t + KELVIN).powi(4)) / 2.0;
    let rel3 = 0.34 - 0.14 * vp.sqrt();
    let rel4 = 1.35 * rs / clear_sky - 0.35;
    rel1 * rel2 * rel3 * rel4
}

/// Hargreaves empirical shortwave radiation estimate for stations
/// without an irradiance sensor, MJ·m⁻²·day⁻¹
fn estimated_solar_radiation(min_t: f64, max_t: f64, latitude_rad: f64, declination: f64, day: f64) -> f64 {
    let dist = relative_earth_sun_distance(day);
    let omega = sunset_hour_angle(latitude_rad, declination);
    let ra = 24.0 / PI
        * 4.92
        * dist
        * (omega * latitude_rad.sin() * declination.sin()
            + latitude_rad.cos() * declination.cos() * omega.sin());
    0.17 * (max_t - min_t).sqrt() * ra
}

/// FAO-56 reference evapotranspiration in mm/day.
///
/// `solar_radiation` is the measured daily mean irradiance in W/m² when an
/// irradiance sensor contributed; None selects the Hargreaves estimate.
#[allow(clippy::too_many_arguments)]
pub fn reference_eto(
    max_t: f64,
    min_t: f64,
    solar_radiation: Option<f64>,
    avg_ws: f64,
    elevation: f64,
    max_h: f64,
    min_h: f64,
    latitude: f64,
    canopy_coefficient: f64,
    day: u32,
) -> f64 {
    let day = day as f64;

    // step 1, mean daily air temperature
    let mean_daily_temp = (max_t + min_t) / 2.0;

    // steps 4-6, vapor pressure curve slope, pressure, psychrometric constant
    let vp_slope = saturation_vapor_pressure_curve_slope(mean_daily_temp);
    let pressure = atmospheric_pressure(elevation);
    let psychrometric = psychrometric_constant(pressure);

    // steps 7-9, delta, psi and temperature terms
    let delta = delta_term(vp_slope, psychrometric, avg_ws);
    let psi = psi_term(vp_slope, psychrometric, avg_ws);
    let t_term = temperature_term(mean_daily_temp, avg_ws);

    // steps 10-11, mean and actual vapor pressure
    let vp_curve = (saturation_vapor(max_t) + saturation_vapor(min_t)) / 2.0;
    let vp_actual = actual_vapor_pressure(min_t, max_t, min_h, max_h);

    // steps 12-13, solar geometry
    let dist = relative_earth_sun_distance(day);
    let declination = solar_declination(day);
    let latitude_rad = deg_to_rad(latitude);

    let rs = match solar_radiation {
        Some(watts) => watts_to_megajoules(watts),
        None => estimated_solar_radiation(min_t, max_t, latitude_rad, declination, day),
    };

    // steps 14-16, sunset hour angle, extraterrestrial and clear-sky radiation
    let angle = sunset_hour_angle(latitude_rad, declination);
    let ra = extraterrestrial_radiation(dist, angle, latitude_rad, declination);
    let rso = clear_sky_solar_radiation(elevation, ra);

    // steps 17-19, net radiation in mm equivalent
    let rns = (1.0 - canopy_coefficient) * rs;
    let rnl = long_wave_radiation(min_t, max_t, vp_actual, rs, rso);
    let rn = rns - rnl;
    let rng = rn * 0.408;

    // final combination: radiation term plus wind/vapor-deficit term
    let radiation_term = delta * rng;
    let wind_term = psi * t_term * (vp_curve - vp_actual);

    radiation_term + wind_term
}

/// Day-scoped aggregation state for ET₀.
///
/// One per station configured for evapotranspiration reporting. Widens
/// min/max trackers across the day's observations and computes the daily
/// value when asked; the poll collaborator resets it at the day boundary.
#[derive(Debug, Clone)]
pub struct EtoAggregator {
    temp_max: f64,
    temp_min: f64,
    humidity_max: f64,
    humidity_min: f64,
    wind_max: f64,
    wind_min: f64,
    solar_sum: f64,
    solar_samples: u32,
    elevation: f64,
    latitude: f64,
    canopy: f64,
    day: u32,
    devices: Vec<String>,
    valid: bool,
}

impl EtoAggregator {
    pub fn new(elevation: f64, latitude: f64) -> Self {
        Self {
            temp_max: TEMP_MAX_SEED,
            temp_min: TEMP_MIN_SEED,
            humidity_max: HUMIDITY_MAX_SEED,
            humidity_min: HUMIDITY_MIN_SEED,
            wind_max: WIND_MAX_SEED,
            wind_min: WIND_MIN_SEED,
            solar_sum: 0.0,
            solar_samples: 0,
            elevation,
            latitude,
            canopy: CANOPY_COEFFICIENT,
            day: 0,
            devices: Vec::new(),
            valid: false,
        }
    }

    /// Register a contributing device serial
    pub fn add_device(&mut self, serial: &str) {
        self.devices.push(serial.to_string());
    }

    pub fn is_device(&self, serial: &str) -> bool {
        self.devices.iter().any(|s| s == serial)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Clear the min/max trackers back to their saturating seeds and
    /// store the new day-of-year. Invoked by the poll collaborator when
    /// the ordinal day changes.
    pub fn reset(&mut self, day_of_year: u32) {
        self.temp_max = TEMP_MAX_SEED;
        self.temp_min = TEMP_MIN_SEED;
        self.humidity_max = HUMIDITY_MAX_SEED;
        self.humidity_min = HUMIDITY_MIN_SEED;
        self.wind_max = WIND_MAX_SEED;
        self.wind_min = WIND_MIN_SEED;
        self.solar_sum = 0.0;
        self.solar_samples = 0;
        self.day = day_of_year;
    }

    /// Widen the trackers with the fields relevant to the observation's
    /// sensor family. Wind speeds are the raw m/s sensor values.
    pub fn record_observation(&mut self, obs: &Observation) {
        match obs {
            Observation::Air(air) => {
                self.track_temperature(air.temperature);
                self.track_humidity(air.humidity);
            }
            Observation::Sky(sky) => {
                self.track_wind(sky.wind_avg);
                self.track_solar(sky.solar_radiation);
            }
            Observation::Tempest(st) => {
                self.track_temperature(st.temperature);
                self.track_humidity(st.humidity);
                self.track_wind(st.wind_avg);
                self.track_solar(st.solar_radiation);
            }
        }
        self.valid = true;
    }

    fn track_temperature(&mut self, t: f64) {
        self.temp_max = self.temp_max.max(t);
        self.temp_min = self.temp_min.min(t);
    }

    fn track_humidity(&mut self, h: f64) {
        self.humidity_max = self.humidity_max.max(h);
        self.humidity_min = self.humidity_min.min(h);
    }

    fn track_wind(&mut self, ws: f64) {
        self.wind_max = self.wind_max.max(ws);
        self.wind_min = self.wind_min.min(ws);
    }

    fn track_solar(&mut self, watts: f64) {
        self.solar_sum += watts;
        self.solar_samples += 1;
    }

    /// Mean daily wind speed in m/s
    pub fn mean_wind_speed(&self) -> f64 {
        (self.wind_max + self.wind_min) / 2.0
    }

    fn mean_solar_radiation(&self) -> Option<f64> {
        if self.solar_samples == 0 {
            None
        } else {
            Some(self.solar_sum / self.solar_samples as f64)
        }
    }

    /// Daily ET₀ in mm/day. Returns 0 until a contributing device has
    /// reported, and 0 with a log line if the calculation goes
    /// non-finite.
    pub fn compute_daily(&self) -> f64 {
        if !self.valid {
            return 0.0;
        }

        let eto = reference_eto(
            self.temp_max,
            self.temp_min,
            self.mean_solar_radiation(),
            self.mean_wind_speed(),
            self.elevation,
            self.humidity_max,
            self.humidity_min,
            self.latitude,
            self.canopy,
            self.day,
        );

        if eto.is_finite() {
            eto
        } else {
            error!(day = self.day, "ET0 calculation failed");
            0.0
        }
    }
}
