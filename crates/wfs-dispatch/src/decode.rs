//! Positional record decoding
//!
//! Each sensor family publishes its measurements as an ordered array of
//! numeric fields. Decoding maps those positions onto named fields and
//! never reinterprets a record under another family's layout.
//!
//! A record with too few fields, or a null in a required position
//! (time, temperature, humidity, rain), is rejected whole; optional
//! sensor fields fall back to 0 and the station pressure keeps its
//! missing state for the sea-level reduction.

use crate::{DispatchError, DispatchResult};
use wfs_core::types::{
    AirObservation, Observation, RapidWind, RawRecord, RecordType, SensorFamily, SkyObservation,
    TempestObservation,
};

/// A decoded wire record
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    Observation(Observation),
    RapidWind(RapidWind),
}

/// Number of positional fields in a rapid wind sample
const RAPID_WIND_FIELDS: usize = 3;

fn required(
    fields: &[Option<f64>],
    index: usize,
    serial: &str,
    family: &'static str,
) -> DispatchResult<f64> {
    fields
        .get(index)
        .copied()
        .flatten()
        .ok_or_else(|| DispatchError::MissingField {
            serial: serial.to_string(),
            family,
            index,
        })
}

fn optional(fields: &[Option<f64>], index: usize) -> f64 {
    fields.get(index).copied().flatten().unwrap_or(0.0)
}

fn check_len(
    fields: &[Option<f64>],
    expected: usize,
    serial: &str,
    family: &'static str,
) -> DispatchResult<()> {
    // newer firmware appends fields; fewer than the base layout is malformed
    if fields.len() < expected {
        return Err(DispatchError::FieldCount {
            serial: serial.to_string(),
            family,
            expected,
            got: fields.len(),
        });
    }
    Ok(())
}

/// Decode a raw record into a typed observation or rapid wind sample
pub fn decode_record(record: &RawRecord) -> DispatchResult<DecodedRecord> {
    match record.record_type {
        RecordType::ObsAir => Ok(DecodedRecord::Observation(decode_air(record)?)),
        RecordType::ObsSky => Ok(DecodedRecord::Observation(decode_sky(record)?)),
        RecordType::ObsSt => Ok(DecodedRecord::Observation(decode_tempest(record)?)),
        RecordType::RapidWind => Ok(DecodedRecord::RapidWind(decode_rapid_wind(record)?)),
    }
}

fn first_obs<'a>(
    record: &'a RawRecord,
    family: &'static str,
) -> DispatchResult<&'a Vec<Option<f64>>> {
    record.obs.first().ok_or_else(|| DispatchError::EmptyRecord {
        serial: record.serial.clone(),
        family,
    })
}

fn decode_air(record: &RawRecord) -> DispatchResult<Observation> {
    let family = SensorFamily::Air.as_str();
    let fields = first_obs(record, family)?;
    check_len(fields, SensorFamily::Air.field_count(), &record.serial, family)?;

    Ok(Observation::Air(AirObservation {
        time: required(fields, 0, &record.serial, family)? as i64,
        station_pressure: fields.get(1).copied().flatten(),
        temperature: required(fields, 2, &record.serial, family)?,
        humidity: required(fields, 3, &record.serial, family)?,
        strike_count: optional(fields, 4),
        strike_distance: optional(fields, 5),
        battery: optional(fields, 6),
    }))
}

fn decode_sky(record: &RawRecord) -> DispatchResult<Observation> {
    let family = SensorFamily::Sky.as_str();
    let fields = first_obs(record, family)?;
    check_len(fields, SensorFamily::Sky.field_count(), &record.serial, family)?;

    Ok(Observation::Sky(SkyObservation {
        time: required(fields, 0, &record.serial, family)? as i64,
        illuminance: optional(fields, 1),
        uv: optional(fields, 2),
        rain: required(fields, 3, &record.serial, family)?,
        wind_lull: optional(fields, 4),
        wind_avg: optional(fields, 5),
        wind_gust: optional(fields, 6),
        wind_direction: optional(fields, 7),
        battery: optional(fields, 8),
        report_interval: optional(fields, 9),
        solar_radiation: optional(fields, 10),
    }))
}

fn decode_tempest(record: &RawRecord) -> DispatchResult<Observation> {
    let family = SensorFamily::Tempest.as_str();
    let fields = first_obs(record, family)?;
    check_len(
        fields,
        SensorFamily::Tempest.field_count(),
        &record.serial,
        family,
    )?;

    Ok(Observation::Tempest(TempestObservation {
        time: required(fields, 0, &record.serial, family)? as i64,
        wind_lull: optional(fields, 1),
        wind_avg: optional(fields, 2),
        wind_gust: optional(fields, 3),
        wind_direction: optional(fields, 4),
        wind_sample_interval: optional(fields, 5),
        station_pressure: fields.get(6).copied().flatten(),
        temperature: required(fields, 7, &record.serial, family)?,
        humidity: required(fields, 8, &record.serial, family)?,
        illuminance: optional(fields, 9),
        uv: optional(fields, 10),
        solar_radiation: optional(fields, 11),
        rain: required(fields, 12, &record.serial, family)?,
        precip_type: optional(fields, 13),
        strike_count: optional(fields, 14),
        strike_distance: optional(fields, 15),
        battery: optional(fields, 16),
        report_interval: optional(fields, 17),
    }))
}

fn decode_rapid_wind(record: &RawRecord) -> DispatchResult<RapidWind> {
    let family = "rapid_wind";
    let fields = first_obs(record, family)?;
    check_len(fields, RAPID_WIND_FIELDS, &record.serial, family)?;

    Ok(RapidWind {
        time: required(fields, 0, &record.serial, family)? as i64,
        wind_speed: optional(fields, 1),
        wind_direction: optional(fields, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(serial: &str, record_type: RecordType, fields: Vec<Option<f64>>) -> RawRecord {
        RawRecord {
            serial: serial.to_string(),
            record_type,
            obs: vec![fields],
        }
    }

    #[test]
    fn test_decode_air() {
        let raw = record(
            "AR-00004049",
            RecordType::ObsAir,
            vec![
                Some(1493164835.0),
                Some(835.0),
                Some(10.0),
                Some(45.0),
                Some(0.0),
                Some(0.0),
                Some(3.46),
            ],
        );

        let decoded = decode_record(&raw).unwrap();
        match decoded {
            DecodedRecord::Observation(Observation::Air(air)) => {
                assert_eq!(air.time, 1493164835);
                assert_eq!(air.station_pressure, Some(835.0));
                assert_eq!(air.temperature, 10.0);
                assert_eq!(air.humidity, 45.0);
            }
            other => panic!("wrong decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_air_missing_pressure_is_kept_missing() {
        let raw = record(
            "AR-00004049",
            RecordType::ObsAir,
            vec![
                Some(1493164835.0),
                None,
                Some(10.0),
                Some(45.0),
                Some(0.0),
                Some(0.0),
                Some(3.46),
            ],
        );

        match decode_record(&raw).unwrap() {
            DecodedRecord::Observation(Observation::Air(air)) => {
                assert_eq!(air.station_pressure, None);
            }
            other => panic!("wrong decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_sky_null_wind_defaults_to_zero() {
        let raw = record(
            "SK-00008453",
            RecordType::ObsSky,
            vec![
                Some(1493321340.0),
                Some(9000.0),
                Some(10.0),
                Some(0.0),
                None,
                None,
                None,
                Some(187.0),
                Some(3.12),
                Some(1.0),
                Some(130.0),
            ],
        );

        match decode_record(&raw).unwrap() {
            DecodedRecord::Observation(Observation::Sky(sky)) => {
                assert_eq!(sky.wind_lull, 0.0);
                assert_eq!(sky.wind_avg, 0.0);
                assert_eq!(sky.wind_gust, 0.0);
                assert_eq!(sky.solar_radiation, 130.0);
            }
            other => panic!("wrong decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_sky_missing_rain_is_rejected() {
        let raw = record(
            "SK-00008453",
            RecordType::ObsSky,
            vec![
                Some(1493321340.0),
                Some(9000.0),
                Some(10.0),
                None,
                Some(1.0),
                Some(2.0),
                Some(3.0),
                Some(187.0),
                Some(3.12),
                Some(1.0),
                Some(130.0),
            ],
        );

        let err = decode_record(&raw).unwrap_err();
        assert!(matches!(err, DispatchError::MissingField { index: 3, .. }));
    }

    #[test]
    fn test_decode_short_record_is_rejected() {
        let raw = record(
            "ST-00012345",
            RecordType::ObsSt,
            vec![Some(1493164835.0), Some(1.0), Some(2.0)],
        );

        let err = decode_record(&raw).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::FieldCount {
                expected: 18,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_tempest() {
        let raw = record(
            "ST-00012345",
            RecordType::ObsSt,
            vec![
                Some(1588948614.0),
                Some(0.18),
                Some(0.22),
                Some(0.27),
                Some(144.0),
                Some(6.0),
                Some(1017.57),
                Some(22.37),
                Some(50.26),
                Some(328.0),
                Some(0.03),
                Some(3.0),
                Some(0.000000),
                Some(0.0),
                Some(0.0),
                Some(0.0),
                Some(2.410),
                Some(1.0),
            ],
        );

        match decode_record(&raw).unwrap() {
            DecodedRecord::Observation(Observation::Tempest(st)) => {
                assert_eq!(st.station_pressure, Some(1017.57));
                assert_eq!(st.temperature, 22.37);
                assert_eq!(st.humidity, 50.26);
                assert_eq!(st.rain, 0.0);
                assert_eq!(st.wind_avg, 0.22);
            }
            other => panic!("wrong decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_record() {
        let raw = RawRecord {
            serial: "AR-00004049".to_string(),
            record_type: RecordType::ObsAir,
            obs: vec![],
        };

        let err = decode_record(&raw).unwrap_err();
        assert!(matches!(err, DispatchError::EmptyRecord { .. }));
    }

    #[test]
    fn test_decode_rapid_wind() {
        let raw = record(
            "ST-00012345",
            RecordType::RapidWind,
            vec![Some(1588948614.0), Some(2.3), Some(128.0)],
        );

        match decode_record(&raw).unwrap() {
            DecodedRecord::RapidWind(rw) => {
                assert_eq!(rw.wind_speed, 2.3);
                assert_eq!(rw.wind_direction, 128.0);
            }
            other => panic!("wrong decode: {:?}", other),
        }
    }
}
