//! Output representations of the state.
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::nmea::types::{iso8601, Key, Reading, Value};
use crate::state::State;
use crate::template::{FormatError, Template};

/// How an emitted record looks
#[derive(Debug, Clone)]
pub enum Render {
    /// One line summary, see `State`'s `Display`
    Human,
    /// Compact JSON object
    Json,
    /// User supplied template
    Template(Template),
}

impl Render {
    pub fn render(&self, state: &State) -> Result<String, FormatError> {
        match self {
            Render::Human => Ok(state.to_string()),
            Render::Json => Ok(to_json(state)),
            Render::Template(t) => t.render(state),
        }
    }
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A JSON view on the state. Absent fields are left out, unknown ones are `null`.
struct JsonState<'a>(&'a State);

/// One JSON value, floats rounded to 6 decimals for coordinates and 3 otherwise
struct JsonValue(Key, Value);

impl Serialize for JsonState<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for key in Key::ALL {
            match self.0.get(*key) {
                Reading::Absent => {}
                Reading::Unknown => map.serialize_entry(key.name(), &None::<()>)?,
                Reading::Known(v) => map.serialize_entry(key.name(), &JsonValue(*key, v))?,
            }
        }
        map.end()
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.1 {
            Value::Time(t) => serializer.serialize_str(&iso8601(t)),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Float(x) => {
                let decimals = match self.0 {
                    Key::Lat | Key::Lon => 6,
                    _ => 3,
                };
                serializer.serialize_f64(round(*x, decimals))
            }
            Value::Int(n) => serializer.serialize_u32(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::InView(m) => m.serialize(serializer),
        }
    }
}

/// Renders the state as a single line JSON object.
pub fn to_json(state: &State) -> String {
    // Serializing a map of plain values into a String cannot fail
    serde_json::to_string(&JsonState(state)).unwrap_or_default()
}
