//! Parser for position reports from SIM7600-based GPS trackers.
//!
//! Devices in the field emit one of two shapes:
//! - a clean decimal pair, `"25.695340,88.658184"`, produced by newer
//!   firmware that does the NMEA conversion on the device
//! - the raw `+CGPSINFO` payload, `"2541.7204,N,8839.4910,E,date,utc,alt,speed,..."`,
//!   with degree-minute coordinates and speed in knots
//!
//! Either way an unacquired fix is reported as `None`, never as an error:
//! modules routinely send `",,,,,,,,"` or `SEARCHING` while cold-starting.

/// A decoded position report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in km/h. `None` for the clean-pair format, which does
    /// not carry speed; the ingestion envelope supplies it instead.
    pub speed_kmh: Option<f64>,
}

/// Convert a SIM7600 degree-minute value (`DDMM.MMMM` / `DDDMM.MMMM`) to
/// decimal degrees. Returns 0.0 for empty or unparseable input, which the
/// caller rejects as an unacquired fix.
fn nmea_to_decimal(raw_value: &str, hemisphere: &str) -> f64 {
    if raw_value.is_empty() {
        return 0.0;
    }
    let val: f64 = match raw_value.trim().parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };
    let degrees = (val / 100.0).trunc();
    let minutes = val - degrees * 100.0;
    let mut decimal = degrees + minutes / 60.0;
    if hemisphere == "S" || hemisphere == "W" {
        decimal = -decimal;
    }
    (decimal * 1_000_000.0).round() / 1_000_000.0
}

/// Parse a raw telemetry string into a [`GpsFix`].
///
/// Returns `None` when the device has no fix yet: empty input, the vendor
/// `SEARCHING`/`ERROR` markers, too few fields, unparseable numbers, or a
/// coordinate that resolved to exactly 0.0 (the modules report the null
/// island while acquiring, never a real position for this fleet).
pub fn parse_sim7600(raw: &str) -> Option<GpsFix> {
    if raw.is_empty() {
        return None;
    }

    let parts: Vec<&str> = raw.split(',').collect();

    // Clean decimal pair from newer firmware
    if parts.len() == 2 {
        let latitude: f64 = parts[0].trim().parse().ok()?;
        let longitude: f64 = parts[1].trim().parse().ok()?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude == 0.0 || longitude == 0.0 {
            return None;
        }
        return Some(GpsFix {
            latitude,
            longitude,
            speed_kmh: None,
        });
    }

    // Raw +CGPSINFO payload
    if raw.contains("SEARCHING") || raw.contains("ERROR") {
        return None;
    }
    if parts.len() < 8 {
        return None;
    }

    let latitude = nmea_to_decimal(parts[0], parts[1]);
    let longitude = nmea_to_decimal(parts[2], parts[3]);
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }

    let speed_knots: f64 = if parts[7].is_empty() {
        0.0
    } else {
        parts[7].trim().parse().ok()?
    };
    let speed_kmh = (speed_knots * 1.852 * 100.0).round() / 100.0;

    Some(GpsFix {
        latitude,
        longitude,
        speed_kmh: Some(speed_kmh),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_pair() {
        let fix = parse_sim7600("25.695340,88.658184").unwrap();
        assert_eq!(fix.latitude, 25.695340);
        assert_eq!(fix.longitude, 88.658184);
        assert_eq!(fix.speed_kmh, None);
    }

    #[test]
    fn test_clean_pair_with_whitespace() {
        let fix = parse_sim7600("25.695340, 88.658184").unwrap();
        assert_eq!(fix.longitude, 88.658184);
    }

    #[test]
    fn test_clean_pair_zero_coordinate_is_no_fix() {
        assert_eq!(parse_sim7600("0.0,88.658184"), None);
        assert_eq!(parse_sim7600("25.695340,0.0"), None);
        assert_eq!(parse_sim7600("0,0"), None);
    }

    #[test]
    fn test_clean_pair_garbage_is_no_fix() {
        assert_eq!(parse_sim7600("hello,world"), None);
    }

    #[test]
    fn test_legacy_composite() {
        // 2541.7204 N -> 25 deg 41.7204 min -> 25.695340
        let fix = parse_sim7600("2541.7204,N,8839.4910,E,010124,120000.0,45.2,10.0,0.0").unwrap();
        assert!((fix.latitude - 25.695340).abs() < 1e-6);
        assert!((fix.longitude - 88.658183).abs() < 1e-5);
        // 10 knots = 18.52 km/h
        assert_eq!(fix.speed_kmh, Some(18.52));
    }

    #[test]
    fn test_legacy_composite_southern_western_hemispheres() {
        let fix = parse_sim7600("2541.7204,S,8839.4910,W,010124,120000.0,45.2,0.0,0.0").unwrap();
        assert!(fix.latitude < 0.0);
        assert!(fix.longitude < 0.0);
    }

    #[test]
    fn test_legacy_composite_empty_speed_field() {
        let fix = parse_sim7600("2541.7204,N,8839.4910,E,010124,120000.0,45.2,,0.0").unwrap();
        assert_eq!(fix.speed_kmh, Some(0.0));
    }

    #[test]
    fn test_searching_marker_is_no_fix() {
        assert_eq!(parse_sim7600("+CGPSINFO: SEARCHING,,,,,,,,"), None);
        assert_eq!(parse_sim7600("ERROR,,,,,,,,"), None);
    }

    #[test]
    fn test_empty_and_short_inputs_are_no_fix() {
        assert_eq!(parse_sim7600(""), None);
        assert_eq!(parse_sim7600(",,,"), None);
        assert_eq!(parse_sim7600("2541.7204,N,8839.4910,E"), None);
    }

    #[test]
    fn test_legacy_empty_coordinates_are_no_fix() {
        assert_eq!(parse_sim7600(",,,,,,,,"), None);
    }

    #[test]
    fn test_degree_minute_conversion() {
        assert!((nmea_to_decimal("2541.7204", "N") - 25.695340).abs() < 1e-6);
        assert!((nmea_to_decimal("2541.7204", "S") + 25.695340).abs() < 1e-6);
        assert_eq!(nmea_to_decimal("", "N"), 0.0);
        assert_eq!(nmea_to_decimal("junk", "E"), 0.0);
    }
}
