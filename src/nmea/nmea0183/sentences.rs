//! Field extraction for each interpreted sentence type.
//!
//! The callers guarantee the minimum field count of the sentence type, so
//! the mandatory positions are indexed directly and only the trailing
//! optional ones go through `get`.
use chrono::NaiveDate;

use super::convert::{self, MPS_TO_KMH};
use super::Update;
use crate::nmea::types::{Fields, Reading};

fn non_empty<'a>(f: &[&'a str], i: usize) -> Option<&'a str> {
    f.get(i).copied().filter(|s| !s.is_empty())
}

fn set_position(u: &mut Fields, lat: (&str, &str), lon: (&str, &str)) {
    u.lat = Reading::or_absent(convert::dm_to_degrees(lat.0, lat.1));
    u.lon = Reading::or_absent(convert::dm_to_degrees(lon.0, lon.1));
}

fn set_speed_mps(u: &mut Fields, mps: f64) {
    u.speed_mps = Reading::Known(mps);
    u.speed_kmh = Reading::Known(mps * MPS_TO_KMH);
}

/// Recommended minimum data:
/// 0 time, 1 status, 2-3 lat, 4-5 lon, 6 speed (knots), 7 course, 8 date,
/// 9-10 magnetic variation, 11 mode
pub fn rmc(f: &[&str], today: NaiveDate) -> Update {
    let mut u = Fields::default();
    u.utc_time = Reading::or_absent(convert::timestamp(f[0], Some(f[8]), today));
    u.fix_ok = Reading::Known(f[1] == "A");
    set_position(&mut u, (f[2], f[3]), (f[4], f[5]));
    if let Some(mps) = convert::knots_to_mps(f[6]) {
        set_speed_mps(&mut u, mps);
    }
    u.course_deg = Reading::or_unknown(convert::float(f[7]));
    if let Some(mode) = non_empty(f, 11) {
        u.mode = Reading::Known(mode.to_string());
    }
    Update { fields: u, in_view: None }
}

/// Fix data:
/// 0 time, 1-2 lat, 3-4 lon, 5 quality, 6 satellites, 7 hdop, 8 altitude,
/// 9 unit, 10 geoid separation, 11 unit, 12 correction age, 13 station id
pub fn gga(f: &[&str], today: NaiveDate) -> Update {
    let mut u = Fields::default();
    u.utc_time = Reading::or_absent(convert::timestamp(f[0], None, today));
    set_position(&mut u, (f[1], f[2]), (f[3], f[4]));
    u.fix_quality = Reading::or_unknown(convert::uint(f[5]));
    u.num_sats = Reading::or_unknown(convert::uint(f[6]));
    u.hdop = Reading::or_unknown(convert::float(f[7]));
    u.alt_m = Reading::or_unknown(convert::float(f[8]));
    u.geoid_sep_m = Reading::or_unknown(convert::float(f[10]));
    u.age_corrections_s = Reading::or_unknown(f.get(12).and_then(|s| convert::float(s)));
    if let Some(id) = f.get(13) {
        u.dgps_id = Reading::Known(id.to_string());
    }
    Update { fields: u, in_view: None }
}

/// GNSS fix data:
/// 0 time, 1-2 lat, 3-4 lon, 5 mode per constellation, 6 satellites, 7 hdop,
/// 8 altitude, 9 geoid separation, 10 correction age, 11 station id
pub fn gns(f: &[&str], today: NaiveDate) -> Update {
    let mut u = Fields::default();
    u.utc_time = Reading::or_absent(convert::timestamp(f[0], None, today));
    set_position(&mut u, (f[1], f[2]), (f[3], f[4]));
    u.mode = Reading::Known(f[5].to_string());
    u.num_sats = Reading::or_unknown(convert::uint(f[6]));
    u.hdop = Reading::or_unknown(convert::float(f[7]));
    u.alt_m = Reading::or_unknown(convert::float(f[8]));
    if let Some(sep) = f.get(9) {
        u.geoid_sep_m = Reading::or_unknown(convert::float(sep));
    }
    Update { fields: u, in_view: None }
}

/// DOP and active satellites:
/// 0 selection mode, 1 fix type, 2-13 satellite ids, 14 pdop, 15 hdop, 16 vdop
pub fn gsa(f: &[&str]) -> Update {
    let mut u = Fields::default();
    u.fix_type = Reading::or_unknown(convert::uint(f[1]));
    u.pdop = Reading::or_unknown(convert::float(f[14]));
    u.hdop = Reading::or_unknown(convert::float(f[15]));
    u.vdop = Reading::or_unknown(convert::float(f[16]));
    Update { fields: u, in_view: None }
}

/// Satellites in view:
/// 0 number of messages, 1 message number, 2 satellites in view, then
/// id/elevation/azimuth/snr per satellite
pub fn gsv(talker: &str, f: &[&str]) -> Update {
    Update {
        fields: Fields::default(),
        in_view: convert::uint(f[2]).map(|n| (talker.to_string(), n)),
    }
}

/// Course and speed over ground:
/// 0 course true, 1 T, 2 course magnetic, 3 M, 4 speed knots, 5 N,
/// 6 speed km/h, 7 K, 8 mode
pub fn vtg(f: &[&str]) -> Update {
    let mut u = Fields::default();
    u.course_deg = Reading::or_unknown(convert::float(f[0]));
    if !f[4].is_empty() {
        if let Some(mps) = convert::knots_to_mps(f[4]) {
            set_speed_mps(&mut u, mps);
        }
    } else if !f[6].is_empty() {
        if let Some(kmh) = convert::float(f[6]) {
            u.speed_kmh = Reading::Known(kmh);
            u.speed_mps = Reading::Known(kmh / MPS_TO_KMH);
        }
    }
    if let Some(mode) = non_empty(f, 8) {
        u.mode = Reading::Known(mode.to_string());
    }
    Update { fields: u, in_view: None }
}

/// Pseudorange noise statistics:
/// 0 time, 1 rms, 2 sd lat, 3 sd lon, 4 sd alt, 5-7 error ellipse
pub fn gst(f: &[&str], today: NaiveDate) -> Update {
    let mut u = Fields::default();
    if !f[0].is_empty() {
        u.utc_time = Reading::or_absent(convert::timestamp(f[0], None, today));
    }
    u.rms_range_err_m = Reading::or_unknown(convert::float(f[1]));
    u.sd_lat_m = Reading::or_unknown(convert::float(f[2]));
    u.sd_lon_m = Reading::or_unknown(convert::float(f[3]));
    u.sd_alt_m = Reading::or_unknown(convert::float(f[4]));
    Update { fields: u, in_view: None }
}
