//! State of the current fix.
use chrono::{DateTime, Utc};
use std::fmt;

use crate::nmea::nmea0183::Update;
use crate::nmea::types::{iso8601, Fields, InView, Key, Reading, Value};

/// Keeps the latest values of every field seen so far.
///
/// Fields are only replaced by a newer sentence that carries them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub fields: Fields,
    /// Satellites in view per constellation
    pub in_view: InView,
    /// Local time of the latest merge
    pub last_update: Option<DateTime<Utc>>,
}

impl State {
    /// Create new empty State
    pub fn new() -> State {
        State { ..Default::default() }
    }

    /// Folds one sentence's update into the state.
    pub fn merge(&mut self, update: Update) {
        self.merge_at(update, Utc::now());
    }

    pub fn merge_at(&mut self, update: Update, now: DateTime<Utc>) {
        self.fields.overlay(update.fields);
        if let Some((system, count)) = update.in_view {
            self.in_view.insert(system, count);
        }
        self.last_update = Some(now);
    }

    /// Latitude, longitude and time are all known.
    pub fn is_complete(&self) -> bool {
        self.fields.lat.known().is_some()
            && self.fields.lon.known().is_some()
            && self.fields.utc_time.known().is_some()
    }

    pub fn get(&self, key: Key) -> Reading<Value> {
        match key {
            Key::Gsv if self.in_view.is_empty() => Reading::Absent,
            Key::Gsv => Reading::Known(Value::InView(self.in_view.clone())),
            Key::LastUpdate => Reading::or_absent(
                self.last_update
                    .map(|t| Value::Float(t.timestamp_millis() as f64 / 1000.0)),
            ),
            _ => self.fields.get(key),
        }
    }
}

fn quality_name(q: u32) -> Option<&'static str> {
    match q {
        0 => Some("no-fix"),
        1 => Some("GPS"),
        2 => Some("DGPS"),
        4 => Some("RTK-fix"),
        5 => Some("RTK-float"),
        6 => Some("est"),
        _ => None,
    }
}

fn fix_type_name(t: u32) -> Option<&'static str> {
    match t {
        1 => Some("no-fix"),
        2 => Some("2D"),
        3 => Some("3D"),
        _ => None,
    }
}

/// One line status summary, fields separated by ` | `. Unknown fields are left out.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = &self.fields;
        let mut parts: Vec<String> = Vec::new();

        if let Some(t) = s.utc_time.known() {
            parts.push(format!("UTC {}", iso8601(t)));
        }
        if let Some(&q) = s.fix_quality.known() {
            parts.push(match quality_name(q) {
                Some(name) => format!("fix {}", name),
                None => format!("fix {}", q),
            });
        } else if let Some(&t) = s.fix_type.known() {
            parts.push(match fix_type_name(t) {
                Some(name) => format!("fix {}", name),
                None => format!("fix {}", t),
            });
        }
        if let (Some(lat), Some(lon)) = (s.lat.known(), s.lon.known()) {
            parts.push(format!("lat {:.6} lon {:.6}", lat, lon));
        }
        if let Some(alt) = s.alt_m.known() {
            parts.push(format!("alt {:.1} m", alt));
        }
        if let Some(n) = s.num_sats.known() {
            parts.push(format!("sats {}", n));
        }
        for (label, dop) in [("HDOP", &s.hdop), ("PDOP", &s.pdop), ("VDOP", &s.vdop)] {
            if let Some(v) = dop.known() {
                parts.push(format!("{} {:.1}", label, v));
            }
        }
        if let Some(kmh) = s.speed_kmh.known() {
            parts.push(format!("spd {:.1} kmh", kmh));
        }
        if let Some(cog) = s.course_deg.known() {
            parts.push(format!("cog {:.1} deg", cog));
        }
        if !self.in_view.is_empty() {
            let systems: Vec<String> = self
                .in_view
                .iter()
                .map(|(sys, n)| format!("{}:{}", sys, n))
                .collect();
            parts.push(format!("in_view[{}]", systems.join(",")));
        }

        write!(f, "{}", parts.join(" | "))
    }
}
