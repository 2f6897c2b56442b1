//! Input record parsing
//!
//! One line of an input file describes the apps installed on one device.
//! `parse_line` validates every field and either returns a `Record` or the
//! first `ParseError` found. It never logs; callers decide what to report.

use crate::error::ParseError;

/// Minimum number of tab-separated fields in a valid line
pub const FIELD_COUNT: usize = 5;

/// A validated app-install event
///
/// # Invariants
///
/// - `device_type` and `device_id` are non-empty
/// - `lat` and `lon` are finite
/// - every app id fits in `u32`
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Identifier scheme of the device (e.g. "idfa", "gaid")
    pub device_type: String,

    /// Device identifier under its scheme
    pub device_id: String,

    /// Latitude
    pub lat: f64,

    /// Longitude
    pub lon: f64,

    /// Installed app ids, in input order
    pub apps: Vec<u32>,
}

impl Record {
    /// Store key for this record: `<device_type>:<device_id>`
    #[inline]
    pub fn key(&self) -> String {
        format!("{}:{}", self.device_type, self.device_id)
    }
}

/// Parse one input line into a `Record`
///
/// The line must already be stripped of its terminator. Fields past the
/// fifth are ignored.
///
/// # Errors
///
/// - `MalformedLine` if there are fewer than 5 tab-separated fields
/// - `MissingIdentity` if the device type or id is empty
/// - `InvalidCoordinate` if lat/lon is not a finite decimal number
/// - `InvalidAppId` if any comma-separated app token is not a `u32`
///
/// # Example
///
/// ```
/// use memload_protocol::parse_line;
///
/// let record = parse_line("gaid\t7rfw452y52g2gq4g\t55.55\t42.42\t7423,424").unwrap();
/// assert_eq!(record.apps, vec![7423, 424]);
/// ```
pub fn parse_line(line: &str) -> Result<Record, ParseError> {
    let mut fields = line.split('\t');
    let mut parts: [&str; FIELD_COUNT] = [""; FIELD_COUNT];

    for (i, slot) in parts.iter_mut().enumerate() {
        *slot = fields.next().ok_or(ParseError::malformed(i))?;
    }

    let [device_type, device_id, raw_lat, raw_lon, raw_apps] = parts;

    if device_type.is_empty() {
        return Err(ParseError::missing_identity("device_type"));
    }
    if device_id.is_empty() {
        return Err(ParseError::missing_identity("device_id"));
    }

    let lat = parse_coordinate("lat", raw_lat)?;
    let lon = parse_coordinate("lon", raw_lon)?;
    let apps = parse_apps(raw_apps)?;

    Ok(Record {
        device_type: device_type.to_string(),
        device_id: device_id.to_string(),
        lat,
        lon,
        apps,
    })
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::invalid_coordinate(field, raw)),
    }
}

/// Parse the comma-separated app list. An empty field is an empty list.
fn parse_apps(raw: &str) -> Result<Vec<u32>, ParseError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|token| {
            token
                .trim()
                .parse::<u32>()
                .map_err(|_| ParseError::invalid_app_id(token))
        })
        .collect()
}
