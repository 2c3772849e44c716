pub mod nmea0183;
pub mod types;
