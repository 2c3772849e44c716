//! Types definitions
use chrono::{DateTime, Utc};

use std::collections::BTreeMap;
use std::fmt;

/// Satellites in view per constellation, keyed by talker id (`GP`, `GL`, `GA`, ...)
pub type InView = BTreeMap<String, u32>;

/// A single field as carried by a sentence or held in the state.
///
/// `Absent` means nobody supplied the field, `Unknown` means it was supplied
/// but could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Absent,
    Unknown,
    Known(T),
}

impl<T> Default for Reading<T> {
    fn default() -> Self {
        Reading::Absent
    }
}

impl<T> Reading<T> {
    /// A supplied field: `None` becomes `Unknown`.
    pub fn or_unknown(value: Option<T>) -> Self {
        match value {
            Some(v) => Reading::Known(v),
            None => Reading::Unknown,
        }
    }

    /// An optional field: `None` becomes `Absent`.
    pub fn or_absent(value: Option<T>) -> Self {
        match value {
            Some(v) => Reading::Known(v),
            None => Reading::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Reading::Absent)
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Reading::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reading<U> {
        match self {
            Reading::Absent => Reading::Absent,
            Reading::Unknown => Reading::Unknown,
            Reading::Known(v) => Reading::Known(f(v)),
        }
    }

    /// Writes `self` over `target` unless `self` is absent.
    pub fn merge_into(self, target: &mut Reading<T>) {
        if !self.is_absent() {
            *target = self;
        }
    }
}

/// Value of a state field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Time(DateTime<Utc>),
    Bool(bool),
    Float(f64),
    Int(u32),
    Text(String),
    InView(InView),
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Formats a timestamp as ISO-8601 with a literal `Z`, e.g. `1994-03-23T12:35:19Z`
pub fn iso8601(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Time(t) => write!(f, "{}", iso8601(t)),
            Value::Bool(b) => write!(f, "{}", b),
            // keeps the fraction of whole numbers, `1.0` not `1`
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::InView(m) => {
                write!(f, "{{")?;
                for (i, (sys, n)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "\"{}\":{}", sys, n)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Creates the scalar field record shared by sentence updates and the state,
/// together with the `Key` enumeration naming every state field.
///
/// Each entry is `field: Type => KeyVariant, "example placeholder", "help text";`
macro_rules! state_fields {
    ($( $(#[$doc:meta])* $field:ident : $ty:ty => $key:ident, $example:expr, $help:expr; )*) => {
        /// Scalar fields of a fix. Every field is tracked independently.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Fields {
            $( $(#[$doc])* pub $field: Reading<$ty>, )*
        }

        impl Fields {
            /// Overwrites every field that `other` does not leave absent.
            pub fn overlay(&mut self, other: Fields) {
                $( other.$field.merge_into(&mut self.$field); )*
            }

            /// True if no field is supplied at all
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_absent() )*
            }

            pub fn get(&self, key: Key) -> Reading<Value> {
                match key {
                    $( Key::$key => self.$field.clone().map(Value::from), )*
                    Key::Gsv | Key::LastUpdate => Reading::Absent,
                }
            }
        }

        /// Names of the state fields, in output order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $( $key, )*
            Gsv,
            LastUpdate,
        }

        impl Key {
            pub const ALL: &'static [Key] = &[ $( Key::$key, )* Key::Gsv, Key::LastUpdate ];

            /// Name used in JSON output and format placeholders
            pub fn name(&self) -> &'static str {
                match self {
                    $( Key::$key => stringify!($field), )*
                    Key::Gsv => "gsv",
                    Key::LastUpdate => "last_update",
                }
            }

            pub fn example(&self) -> &'static str {
                match self {
                    $( Key::$key => $example, )*
                    Key::Gsv => "%(gsv)s",
                    Key::LastUpdate => "%(last_update).3f",
                }
            }

            pub fn help(&self) -> &'static str {
                match self {
                    $( Key::$key => $help, )*
                    Key::Gsv => "Satellites in view per constellation",
                    Key::LastUpdate => "Local time of the last update, Unix seconds",
                }
            }

            pub fn from_name(name: &str) -> Option<Key> {
                Key::ALL.iter().copied().find(|k| k.name() == name)
            }
        }
    };
}

state_fields! {
    /// UTC time of the fix
    utc_time: DateTime<Utc> => UtcTime, "%(utc_time)s", "ISO-8601 UTC timestamp (e.g. '2025-10-29T12:34:56Z')";
    /// RMC status `A`
    fix_ok: bool => FixOk, "%(fix_ok)s", "Whether the receiver reports a valid position fix";
    /// Latitude in decimal degrees, negative south
    lat: f64 => Lat, "%(lat).6f", "Latitude in decimal degrees";
    /// Longitude in decimal degrees, negative west
    lon: f64 => Lon, "%(lon).6f", "Longitude in decimal degrees";
    /// Altitude above mean sea level in meters
    alt_m: f64 => AltM, "%(alt_m).1f", "Altitude in meters above MSL";
    speed_mps: f64 => SpeedMps, "%(speed_mps).2f", "Ground speed in meters per second";
    speed_kmh: f64 => SpeedKmh, "%(speed_kmh).2f", "Ground speed in kilometers per hour";
    /// Course over ground in degrees
    course_deg: f64 => CourseDeg, "%(course_deg).1f", "Course over ground in degrees (0-360)";
    /// Positioning mode indicator (N/A/D/E/R/F), several characters for GNS
    mode: String => Mode, "%(mode)s", "NMEA positioning mode (N/A/D/E/R/F)";
    /// GGA quality indicator
    fix_quality: u32 => FixQuality, "%(fix_quality)d", "GGA fix quality (0=no fix, 1=GPS, 2=DGPS, 4=RTK-fix, 5=RTK-float)";
    /// GSA fix dimension
    fix_type: u32 => FixType, "%(fix_type)d", "GSA fix dimension (1=no fix, 2=2D, 3=3D)";
    /// Satellites used in the solution
    num_sats: u32 => NumSats, "%(num_sats)d", "Number of satellites used in solution";
    hdop: f64 => Hdop, "%(hdop).2f", "Horizontal dilution of precision";
    pdop: f64 => Pdop, "%(pdop).2f", "Position dilution of precision";
    vdop: f64 => Vdop, "%(vdop).2f", "Vertical dilution of precision";
    geoid_sep_m: f64 => GeoidSepM, "%(geoid_sep_m).1f", "Geoid separation in meters";
    age_corrections_s: f64 => AgeCorrectionsS, "%(age_corrections_s)s", "Age of differential corrections in seconds";
    dgps_id: String => DgpsId, "%(dgps_id)s", "Differential reference station ID";
    /// GST pseudorange residuals
    rms_range_err_m: f64 => RmsRangeErrM, "%(rms_range_err_m).2f", "RMS of pseudorange residuals in meters";
    sd_lat_m: f64 => SdLatM, "%(sd_lat_m).2f", "Standard deviation of latitude error in meters";
    sd_lon_m: f64 => SdLonM, "%(sd_lon_m).2f", "Standard deviation of longitude error in meters";
    sd_alt_m: f64 => SdAltM, "%(sd_alt_m).2f", "Standard deviation of altitude error in meters";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_never_overwrites() {
        let mut target = Reading::Known(1.5);
        Reading::<f64>::Absent.merge_into(&mut target);
        assert_eq!(target, Reading::Known(1.5));
        Reading::<f64>::Unknown.merge_into(&mut target);
        assert_eq!(target, Reading::Unknown);
    }

    #[test]
    fn overlay_keeps_untouched_fields() {
        let mut state = Fields::default();
        state.course_deg = Reading::Known(84.4);
        let mut update = Fields::default();
        update.hdop = Reading::Known(0.9);
        assert!(!update.is_empty());
        state.overlay(update);
        assert_eq!(state.course_deg, Reading::Known(84.4));
        assert_eq!(state.hdop, Reading::Known(0.9));
    }

    #[test]
    fn key_names_round_trip() {
        for key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(*key));
        }
        assert_eq!(Key::from_name("altitude"), None);
        assert_eq!(Key::Lat.name(), "lat");
        assert_eq!(Key::AgeCorrectionsS.name(), "age_corrections_s");
    }

    #[test]
    fn floats_display_with_fraction() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(0.9).to_string(), "0.9");
        assert_eq!(Value::Float(-11.5).to_string(), "-11.5");
        assert_eq!(Value::Int(8).to_string(), "8");
    }

    #[test]
    fn in_view_displays_flat() {
        let mut m = InView::new();
        m.insert("GP".to_string(), 7);
        m.insert("GL".to_string(), 5);
        assert_eq!(Value::InView(m).to_string(), r#"{"GL":5,"GP":7}"#);
    }
}
