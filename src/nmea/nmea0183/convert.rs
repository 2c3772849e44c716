//! Conversions from raw NMEA-0183 field text.
//!
//! All functions return `None` for empty or unparseable input, so that a bad
//! field never stops the rest of a sentence from being read.
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Meters per second in one knot
pub const KNOTS_TO_MPS: f64 = 0.514444;

/// Kilometers per hour in one meter per second
pub const MPS_TO_KMH: f64 = 3.6;

/// Two digit years below this are in the 2000s
const CENTURY_PIVOT: i32 = 80;

pub fn float(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

/// Parses a non-negative integer made of ASCII digits only.
pub fn uint(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

pub fn knots_to_mps(s: &str) -> Option<f64> {
    float(s).map(|kn| kn * KNOTS_TO_MPS)
}

/// Converts `ddmm.mmmm` / `dddmm.mmmm` plus a hemisphere letter to decimal
/// degrees. `S` and `W` give negative values.
pub fn dm_to_degrees(dm: &str, hemisphere: &str) -> Option<f64> {
    let value = float(dm)?;
    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;
    match hemisphere {
        "S" | "W" => Some(-decimal),
        _ => Some(decimal),
    }
}

/// Builds a UTC instant from `hhmmss[.sss]` and an optional `ddmmyy` date.
///
/// Fractional seconds are truncated. A date that is not exactly six
/// characters is ignored and `today` is used instead.
pub fn timestamp(hms: &str, ddmmyy: Option<&str>, today: NaiveDate) -> Option<DateTime<Utc>> {
    if hms.len() < 5 || !hms.is_ascii() {
        return None;
    }
    let hour = uint(&hms[0..2])?;
    let minute = uint(&hms[2..4])?;
    let seconds = float(&hms[4..])?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let second = seconds as u32;

    let date = match ddmmyy {
        Some(d) if d.len() == 6 && d.is_ascii() => {
            let day = uint(&d[0..2])?;
            let month = uint(&d[2..4])?;
            let yy = uint(&d[4..6])? as i32;
            let year = if yy < CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };
            NaiveDate::from_ymd_opt(year, month, day)?
        }
        _ => today,
    };
    let naive = date.and_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::types::iso8601;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn degrees_minutes() {
        assert!(close(dm_to_degrees("4807.038", "N").unwrap(), 48.1173));
        assert!(close(dm_to_degrees("01131.000", "E").unwrap(), 11.0 + 31.0 / 60.0));
        assert!(close(dm_to_degrees("4807.038", "S").unwrap(), -48.1173));
        assert!(close(dm_to_degrees("01131.000", "W").unwrap(), -(11.0 + 31.0 / 60.0)));
    }

    #[test]
    fn empty_coordinate_is_unknown() {
        assert_eq!(dm_to_degrees("", "N"), None);
        assert_eq!(dm_to_degrees("48x7", "N"), None);
    }

    #[test]
    fn knots() {
        assert!(close(knots_to_mps("10.0").unwrap(), 5.14444));
        assert_eq!(knots_to_mps(""), None);
        assert_eq!(knots_to_mps("fast"), None);
    }

    #[test]
    fn numbers() {
        assert_eq!(float("0.9"), Some(0.9));
        assert_eq!(float(""), None);
        assert_eq!(uint("08"), Some(8));
        assert_eq!(uint("-1"), None);
        assert_eq!(uint("1.0"), None);
        assert_eq!(uint(""), None);
    }

    #[test]
    fn time_and_date() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let t = timestamp("123519", Some("230394"), today).unwrap();
        assert_eq!(iso8601(&t), "1994-03-23T12:35:19Z");
        let t = timestamp("123519.87", Some("230305"), today).unwrap();
        assert_eq!(iso8601(&t), "2005-03-23T12:35:19Z");
        let t = timestamp("000000", Some("010180"), today).unwrap();
        assert_eq!(iso8601(&t), "1980-01-01T00:00:00Z");
        let t = timestamp("000000", Some("311279"), today).unwrap();
        assert_eq!(iso8601(&t), "2079-12-31T00:00:00Z");
    }

    #[test]
    fn time_without_date_uses_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let t = timestamp("014035.00", None, today).unwrap();
        assert_eq!(iso8601(&t), "2026-10-18T01:40:35Z");
        let t = timestamp("014035.00", Some(""), today).unwrap();
        assert_eq!(iso8601(&t), "2026-10-18T01:40:35Z");
    }

    #[test]
    fn bad_time_is_unknown() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(timestamp("", None, today), None);
        assert_eq!(timestamp("1235", None, today), None);
        assert_eq!(timestamp("25aa19", None, today), None);
        assert_eq!(timestamp("123519", Some("320394"), today), None);
    }
}
