//! Derived meteorological formulas
//!
//! Temperatures are Celsius and pressures millibars unless noted. Each
//! function degrades to a defined fallback on out-of-domain input rather
//! than returning an error (the presentation layer always gets a value).

use tracing::error;

use crate::units::{c_to_f, f_to_c, kph_to_mph, round_to};

/// Dewpoint via Magnus-formula inversion, 1 decimal. Humidity at or
/// below zero yields 0 by policy.
pub fn dewpoint(t: f64, h: f64) -> f64 {
    let b = (17.625 * t) / (243.04 + t);
    let rh = h / 100.0;

    if rh <= 0.0 {
        return 0.0;
    }

    let c = rh.ln();
    round_to((243.04 * (c + b)) / (17.625 - c - b), 1)
}

/// Australian apparent temperature ("feels like"), 1 decimal.
/// Wind speed must be in m/s; callers holding kph divide by 3.6 first.
pub fn apparent_temp(t: f64, wind_ms: f64, h: f64) -> f64 {
    let wv = h / 100.0 * 6.105 * (17.27 * t / (237.7 + t)).exp();
    round_to(t + 0.33 * wv - 0.70 * wind_ms - 4.0, 1)
}

/// NWS wind chill. The polynomial is only valid at or below 50°F with
/// wind at or above 5 mph; outside that envelope the input temperature
/// is returned unchanged. Wind speed in kph, result in Celsius, 1 decimal.
pub fn wind_chill(t: f64, wind_kph: f64) -> f64 {
    let tf = c_to_f(t);
    let mph = kph_to_mph(wind_kph);

    let wc = 35.74 + 0.6215 * tf - 35.75 * mph.powf(0.16) + 0.4275 * tf * mph.powf(0.16);

    if tf <= 50.0 && mph >= 5.0 {
        round_to(f_to_c(wc), 1)
    } else {
        t
    }
}

/// Rothfusz heat index regression. Applied only at or above 80°F with
/// humidity at or above 40%; otherwise the input temperature is returned
/// unchanged. Result in Celsius, 1 decimal.
pub fn heat_index(t: f64, h: f64) -> f64 {
    let tf = c_to_f(t);
    let c1 = -42.379;
    let c2 = 2.04901523;
    let c3 = 10.1433127;
    let c4 = -0.22475541;
    let c5 = -6.83783e-3;
    let c6 = -5.481717e-2;
    let c7 = 1.22874e-3;
    let c8 = 8.5282e-4;
    let c9 = -1.99e-6;

    let hi = c1
        + c2 * tf
        + c3 * h
        + c4 * tf * h
        + c5 * tf * tf
        + c6 * h * h
        + c7 * tf * tf * h
        + c8 * tf * h * h
        + c9 * tf * tf * h * h;

    if tf < 80.0 || h < 40.0 {
        t
    } else {
        round_to(f_to_c(hi), 1)
    }
}

/// Reduce station pressure to sea level using the barometric formula
/// with international standard atmosphere constants, 3 decimals.
///
/// A missing station pressure yields 0. A numeric domain failure (the
/// fractional power going non-finite) echoes the raw station pressure
/// back and logs the failure.
pub fn sea_level_pressure(station_mb: Option<f64>, elevation_m: f64) -> f64 {
    const GAS_CONSTANT: f64 = 287.05; // dry air
    const GRAVITY: f64 = 9.80665;
    const LAPSE_RATE: f64 = 0.0065;
    const SEA_LEVEL_PRESSURE: f64 = 1013.35;
    const SEA_LEVEL_TEMP: f64 = 288.15;

    let station = match station_mb {
        Some(p) => p,
        None => return 0.0,
    };

    let l = GRAVITY / (GAS_CONSTANT * LAPSE_RATE);
    let c = GAS_CONSTANT * LAPSE_RATE / GRAVITY;

    let u = (1.0 + (SEA_LEVEL_PRESSURE / station).powf(c) * (LAPSE_RATE * elevation_m / SEA_LEVEL_TEMP)).powf(l);
    let slp = station * u;

    if slp.is_finite() {
        round_to(slp, 3)
    } else {
        error!(
            station_mb = station,
            elevation_m, "pressure conversion failed, keeping station pressure"
        );
        station
    }
}
