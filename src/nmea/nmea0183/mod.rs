//! NMEA-0183 sentence framing and decoding.
//!
//! A sentence looks like
//!
//!  `$TTSSS,field,field,...*HH<CR><LF>`
//!
//!  where:
//!
//!  • TT: talker id, two or three characters (`GP`, `GN`, `GL`, ...)
//!
//!  • SSS: sentence type (`RMC`, `GGA`, ...)
//!
//!  • HH: XOR of every byte between `$` and `*`, two hex digits
use chrono::NaiveDate;
use thiserror::Error;

use crate::nmea::types::Fields;

pub mod convert;
mod sentences;

/// A line that passed the shape and checksum checks.
#[derive(Debug, PartialEq)]
pub struct Frame<'a> {
    /// Talker id followed by sentence type, e.g. `GNRMC`
    pub code: &'a str,
    /// Comma separated fields after the code, possibly empty
    pub fields: Vec<&'a str>,
}

/// Reasons a line is not accepted as a sentence
#[derive(Error, Debug, PartialEq)]
pub enum FrameError {
    #[error("line does not start with '$'")]
    NotASentence,
    #[error("malformed sentence: {0}")]
    Malformed(&'static str),
    #[error("expected checksum {expected:02X}, found {actual:02X}")]
    Checksum { expected: u8, actual: u8 },
}

/// XOR of all bytes
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |c, b| c ^ b)
}

fn is_code(code: &str) -> bool {
    let b = code.as_bytes();
    if !(5..=6).contains(&b.len()) {
        return false;
    }
    let (talker, kind) = b.split_at(b.len() - 3);
    talker
        .iter()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && kind.iter().all(|c| c.is_ascii_uppercase())
}

impl<'a> Frame<'a> {
    /// Validates `line` and splits it into code and fields.
    ///
    /// Surrounding whitespace, including the trailing `<CR><LF>`, is ignored.
    /// The checksum digits are compared case-insensitively.
    pub fn parse(line: &'a str) -> Result<Frame<'a>, FrameError> {
        let line = line.trim();
        let rest = line.strip_prefix('$').ok_or(FrameError::NotASentence)?;
        if !rest.is_ascii() {
            return Err(FrameError::Malformed("non-ASCII characters"));
        }

        let star = rest.rfind('*').ok_or(FrameError::Malformed("missing checksum"))?;
        let (body, sum) = (&rest[..star], &rest[star + 1..]);
        if sum.len() != 2 || !sum.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FrameError::Malformed("checksum is not two hex digits"));
        }
        let actual =
            u8::from_str_radix(sum, 16).map_err(|_| FrameError::Malformed("invalid checksum"))?;

        let (code, data) = body
            .split_once(',')
            .ok_or(FrameError::Malformed("missing fields"))?;
        if !is_code(code) {
            return Err(FrameError::Malformed("invalid talker or sentence type"));
        }

        let expected = checksum(body.as_bytes());
        if expected != actual {
            return Err(FrameError::Checksum { expected, actual });
        }

        Ok(Frame {
            code,
            fields: data.split(',').collect(),
        })
    }

    /// Talker id, i.e. everything before the sentence type
    pub fn talker(&self) -> &'a str {
        &self.code[..self.code.len() - 3]
    }

    pub fn sentence_type(&self) -> SentenceType {
        SentenceType::from_code(self.code)
    }
}

/// Sentence types that are interpreted. Anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceType {
    Rmc,
    Gga,
    Gns,
    Gsa,
    Gsv,
    Vtg,
    Gst,
    Other,
}

impl SentenceType {
    /// Looks at the last three letters of a talker+sentence code.
    pub fn from_code(code: &str) -> Self {
        let kind = code.get(code.len().saturating_sub(3)..).unwrap_or("");
        match kind {
            "RMC" => SentenceType::Rmc,
            "GGA" => SentenceType::Gga,
            "GNS" => SentenceType::Gns,
            "GSA" => SentenceType::Gsa,
            "GSV" => SentenceType::Gsv,
            "VTG" => SentenceType::Vtg,
            "GST" => SentenceType::Gst,
            _ => SentenceType::Other,
        }
    }

    /// Fewer fields than this and the sentence is not read at all.
    pub fn min_fields(&self) -> usize {
        match self {
            SentenceType::Rmc => 11,
            SentenceType::Gga => 12,
            SentenceType::Gns => 9,
            SentenceType::Gsa => 17,
            SentenceType::Gsv => 3,
            SentenceType::Vtg => 7,
            SentenceType::Gst => 5,
            SentenceType::Other => 0,
        }
    }
}

/// Everything one sentence contributes to the state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub fields: Fields,
    /// Satellites in view for one constellation (GSV)
    pub in_view: Option<(String, u32)>,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.in_view.is_none()
    }
}

/// Decodes a validated frame into an update.
///
/// `today` supplies the date for sentences that only carry a time of day.
/// Unknown sentence types and short field lists give an empty update.
pub fn decode(frame: &Frame, today: NaiveDate) -> Update {
    let kind = frame.sentence_type();
    if frame.fields.len() < kind.min_fields() {
        return Update::default();
    }
    let f = &frame.fields;
    match kind {
        SentenceType::Rmc => sentences::rmc(f, today),
        SentenceType::Gga => sentences::gga(f, today),
        SentenceType::Gns => sentences::gns(f, today),
        SentenceType::Gsa => sentences::gsa(f),
        SentenceType::Gsv => sentences::gsv(frame.talker(), f),
        SentenceType::Vtg => sentences::vtg(f),
        SentenceType::Gst => sentences::gst(f, today),
        SentenceType::Other => Update::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::types::Reading;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[test]
    fn accepts_valid_sentence() {
        let frame = Frame::parse(GGA).unwrap();
        assert_eq!(frame.code, "GPGGA");
        assert_eq!(frame.talker(), "GP");
        assert_eq!(frame.sentence_type(), SentenceType::Gga);
        assert_eq!(frame.fields.len(), 14);
        assert_eq!(frame.fields[0], "123519");
        assert_eq!(frame.fields[13], "");
    }

    #[test]
    fn accepts_line_endings_and_lowercase_checksum() {
        let line = "$GNRMC,123520,A,4807.038,N,01131.000,E,,,230305,,,A*6c\r\n";
        let frame = Frame::parse(line).unwrap();
        assert_eq!(frame.code, "GNRMC");
        assert_eq!(frame.fields.len(), 12);
    }

    #[test]
    fn rejects_bad_checksum() {
        let line = GGA.replace("*47", "*48");
        assert_eq!(
            Frame::parse(&line),
            Err(FrameError::Checksum { expected: 0x47, actual: 0x48 })
        );
    }

    #[test]
    fn single_character_mutation_flips_outcome() {
        let star = GGA.rfind('*').unwrap();
        for i in 1..star {
            let mut bytes = GGA.as_bytes().to_vec();
            if !bytes[i].is_ascii_digit() {
                continue;
            }
            bytes[i] = if bytes[i] == b'9' { b'8' } else { bytes[i] + 1 };
            let line = String::from_utf8(bytes).unwrap();
            assert!(
                matches!(Frame::parse(&line), Err(FrameError::Checksum { .. })),
                "mutation at {} accepted: {}",
                i,
                line
            );
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(Frame::parse(""), Err(FrameError::NotASentence));
        assert_eq!(Frame::parse("GPGGA,1*00"), Err(FrameError::NotASentence));
        assert!(Frame::parse("$GPGGA,123519").is_err());
        assert!(Frame::parse("$GPGGA,123519*4").is_err());
        assert!(Frame::parse("$GPGGA,123519*4G").is_err());
        assert!(Frame::parse("$GPGGA*56").is_err());
        assert!(Frame::parse("$gpgga,123519*47").is_err());
        assert!(Frame::parse("$GPGGAA1,1*00").is_err());
        assert!(Frame::parse("$GPGGA,123519,4807.03").is_err());
    }

    #[test]
    fn unknown_sentence_is_accepted_but_ignored() {
        let frame = Frame::parse("$GPTXT,01,01,02,ANTSTATUS=OK*3B").unwrap();
        assert_eq!(frame.sentence_type(), SentenceType::Other);
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(decode(&frame, today).is_empty());
    }

    #[test]
    fn short_sentence_gives_no_update() {
        let body = "GPGSA,A,3,04,05";
        let line = format!("${}*{:02X}", body, checksum(body.as_bytes()));
        let frame = Frame::parse(&line).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(decode(&frame, today).is_empty());
    }

    #[test]
    fn decodes_by_type() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let update = decode(&Frame::parse(GGA).unwrap(), today);
        assert_eq!(update.fields.fix_quality, Reading::Known(1));
        assert_eq!(update.in_view, None);
    }
}
