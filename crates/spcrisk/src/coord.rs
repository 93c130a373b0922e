//! SPC coordinate tokens
//!
//! SPC text products encode polygon vertices as eight-digit tokens
//! of the form `DDDDLLLL`:
//!
//! - `DDDD`: latitude, in hundredths of a degree north
//! - `LLLL`: longitude, in hundredths of a degree west
//!
//! The longitude field is only four digits wide, so longitudes at or
//! beyond 100°W lose their leading `1`. A token like `46441136` is
//! 46.44°N, **111.36**°W, not 11.36°W. Any longitude field which
//! decodes to less than 60° is assumed to have lost its leading digit.
//!
//! This rule is one-way. [`encode_magnitude()`] reproduces the digits
//! of a token, but the sign and the dropped hundreds digit cannot be
//! recovered from a token alone.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a coordinate token, in ASCII digits
pub const TOKEN_LEN: usize = 8;

// longitude fields below this many degrees had their leading `1` dropped
const LONGITUDE_WRAP_THRESHOLD: f64 = 60.0;

/// A point on the Earth, in signed decimal degrees
///
/// Latitudes are positive north of the equator. Longitudes are
/// positive east of the prime meridian, so everything SPC issues
/// has a negative longitude.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude (°N)
    pub latitude: f64,

    /// Longitude (°E)
    pub longitude: f64,
}

impl Coordinate {
    /// Create from latitude and longitude
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True if both components are finite and within range
    ///
    /// Latitudes must lie within ±90° and longitudes within ±180°.
    /// Out-of-range points are rejected by [`Ring`](crate::Ring)
    /// construction. They are never clamped.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// True for the `(0, 0)` point which separates sub-polygons
    pub fn is_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub(crate) fn to_geo_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.latitude, self.longitude)
    }
}

/// Decode an eight-digit coordinate token
///
/// Returns `None` if the `token` is not exactly eight ASCII digits.
/// Callers are expected to drop such tokens rather than fail the
/// entire product.
///
/// ```
/// use spcrisk::decode_token;
///
/// let pt = decode_token("35309873").unwrap();
/// assert_eq!(pt.latitude, 35.30);
/// assert_eq!(pt.longitude, -98.73);
///
/// // the leading `1` of 111.36°W was dropped
/// let pt = decode_token("46441136").unwrap();
/// assert!((pt.longitude - -111.36).abs() < 1e-9);
///
/// assert_eq!(None, decode_token("4644113"));
/// assert_eq!(None, decode_token("4644113x"));
/// ```
pub fn decode_token(token: &str) -> Option<Coordinate> {
    if token.len() != TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let lat_hundredths: u16 = token[0..4].parse().ok()?;
    let lon_hundredths: u16 = token[4..8].parse().ok()?;

    let latitude = f64::from(lat_hundredths) / 100.0;
    let magnitude = f64::from(lon_hundredths) / 100.0;
    let longitude = if magnitude < LONGITUDE_WRAP_THRESHOLD {
        -(100.0 + magnitude)
    } else {
        -magnitude
    };

    Some(Coordinate {
        latitude,
        longitude,
    })
}

/// Re-encode the magnitude digits of a coordinate
///
/// Produces the eight-digit token which would decode to `coord`,
/// at hundredths-of-a-degree precision. The hemisphere signs and
/// the hundreds digit of the longitude are discarded, exactly as
/// SPC does.
pub fn encode_magnitude(coord: &Coordinate) -> String {
    let lat = (coord.latitude.abs() * 100.0).round() as u32;
    let lon = (coord.longitude.abs() * 100.0).round() as u32 % 10_000;
    format!("{:04}{:04}", lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_decode_token() {
        let pt = decode_token("34419914").unwrap();
        assert_approx_eq!(34.41, pt.latitude);
        assert_approx_eq!(-99.14, pt.longitude);

        // exactly at the threshold: no wrap
        let pt = decode_token("40006000").unwrap();
        assert_approx_eq!(-60.0, pt.longitude);

        // just under it: wrap
        let pt = decode_token("40005999").unwrap();
        assert_approx_eq!(-159.99, pt.longitude);

        let pt = decode_token("46440000").unwrap();
        assert_approx_eq!(-100.0, pt.longitude);

        assert_eq!(None, decode_token(""));
        assert_eq!(None, decode_token("123456789"));
        assert_eq!(None, decode_token("+1234567"));
        assert_eq!(None, decode_token("3441 991"));
    }

    #[test]
    fn test_magnitude_roundtrip() {
        for lat in (0..=9000).step_by(97) {
            for lon in (0..=9999).step_by(37) {
                let token = format!("{:04}{:04}", lat, lon);
                let pt = decode_token(&token).expect("valid token");
                assert_eq!(token, encode_magnitude(&pt));
            }
        }
    }

    #[test]
    fn test_validity() {
        assert!(Coordinate::new(35.0, -97.0).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.01, -97.0).is_valid());
        assert!(!Coordinate::new(35.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, -97.0).is_valid());

        assert!(Coordinate::new(0.0, 0.0).is_sentinel());
        assert!(!Coordinate::new(0.0, -97.0).is_sentinel());
    }
}
