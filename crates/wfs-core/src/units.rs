//! Unit conversion utilities
//!
//! Canonical internal units are metric: Celsius, kph, millibars,
//! millimeters, kilometers. Conversions here are pure total functions;
//! display helpers apply the per-quantity rounding the presentation
//! layer expects.

use crate::types::{DistanceUnit, PressureUnit, RainUnit, TemperatureUnit, WindUnit};

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn c_to_f(c: f64) -> f64 {
    c * 1.8 + 32.0
}

pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) / 1.8
}

pub fn kph_to_mph(kph: f64) -> f64 {
    kph / 1.609344
}

pub fn kph_to_ms(kph: f64) -> f64 {
    kph * 5.0 / 18.0
}

pub fn ms_to_kph(ms: f64) -> f64 {
    ms * 18.0 / 5.0
}

pub fn mb_to_inhg(mb: f64) -> f64 {
    mb * 0.02952998751
}

pub fn mm_to_in(mm: f64) -> f64 {
    mm * 0.03937
}

pub fn km_to_mi(km: f64) -> f64 {
    km / 1.609344
}

/// Mean irradiance in W/m² over a day to MJ/m²/day
pub fn watts_to_megajoules(watts: f64) -> f64 {
    watts * 0.0864
}

/// Temperature in the display unit, rounded to 2 decimals
pub fn display_temperature(celsius: f64, unit: TemperatureUnit) -> (f64, &'static str) {
    match unit {
        TemperatureUnit::C => (round_to(celsius, 2), "°C"),
        TemperatureUnit::F => (round_to(c_to_f(celsius), 2), "°F"),
    }
}

/// Wind speed (canonical kph) in the display unit, rounded to 2 decimals
pub fn display_wind(kph: f64, unit: WindUnit) -> (f64, &'static str) {
    match unit {
        WindUnit::Kph => (round_to(kph, 2), "kph"),
        WindUnit::Mph => (round_to(kph_to_mph(kph), 2), "mph"),
        WindUnit::Mps => (round_to(kph_to_ms(kph), 2), "m/s"),
    }
}

/// Pressure (canonical mb) in the display unit; inHg rounded to 3
/// decimals, mb and hPa are numerically identical
pub fn display_pressure(mb: f64, unit: PressureUnit) -> (f64, &'static str) {
    match unit {
        PressureUnit::Mb => (mb, "mb"),
        PressureUnit::Hpa => (mb, "hPa"),
        PressureUnit::Inhg => (round_to(mb_to_inhg(mb), 3), "inHg"),
    }
}

/// Rain amount (canonical mm) in the display unit; 2 decimals for
/// inches, 3 for millimeters
pub fn display_rain(mm: f64, unit: RainUnit) -> (f64, &'static str) {
    match unit {
        RainUnit::Mm => (round_to(mm, 3), "mm"),
        RainUnit::In => (round_to(mm_to_in(mm), 2), "in"),
    }
}

/// Rain rate from mm-per-minute to the display unit per hour, 3 decimals
pub fn display_rain_rate(mm_per_minute: f64, unit: RainUnit) -> (f64, &'static str) {
    match unit {
        RainUnit::Mm => (round_to(mm_per_minute * 60.0, 3), "mm/h"),
        RainUnit::In => (round_to(mm_to_in(mm_per_minute) * 60.0, 3), "in/h"),
    }
}

/// Distance (canonical km) in the display unit, miles rounded to 1 decimal
pub fn display_distance(km: f64, unit: DistanceUnit) -> (f64, &'static str) {
    match unit {
        DistanceUnit::Km => (km, "km"),
        DistanceUnit::Mi => (round_to(km_to_mi(km), 1), "mi"),
    }
}
