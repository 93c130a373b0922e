//! US time zone abbreviations
//!
//! SPC and NWS products state their issuance time in the local time
//! of the issuing office, like "`1130 PM CDT`." Each abbreviation
//! carries a fixed UTC offset; daylight time has its own
//! abbreviation, so no calendar rules are needed.

use chrono::FixedOffset;
use phf::phf_map;

/// UTC offsets, in hours, for each recognized abbreviation
static US_ZONES: phf::Map<&'static str, i32> = phf_map! {
    "UTC" => 0,
    "GMT" => 0,
    "AST" => -4,
    "EST" => -5,
    "EDT" => -4,
    "CST" => -6,
    "CDT" => -5,
    "MST" => -7,
    "MDT" => -6,
    "PST" => -8,
    "PDT" => -7,
    "AKST" => -9,
    "AKDT" => -8,
    "HST" => -10,
};

/// Lookup the fixed UTC offset of a zone abbreviation
///
/// Matching is case-insensitive but exact: "`ACST`" is not
/// "`CST`."
///
/// ```
/// use spcrisk::utc_offset;
///
/// assert_eq!(-5 * 3600, utc_offset("CDT").unwrap().local_minus_utc());
/// assert_eq!(-6 * 3600, utc_offset("cst").unwrap().local_minus_utc());
/// assert_eq!(None, utc_offset("ACST"));
/// ```
pub fn utc_offset(abbrev: &str) -> Option<FixedOffset> {
    let hours = US_ZONES.get(abbrev.trim().to_ascii_uppercase().as_str())?;
    FixedOffset::east_opt(hours * 3600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_offset() {
        assert_eq!(0, utc_offset("UTC").unwrap().local_minus_utc());
        assert_eq!(-4 * 3600, utc_offset("EDT").unwrap().local_minus_utc());
        assert_eq!(-9 * 3600, utc_offset("AKST").unwrap().local_minus_utc());
        assert_eq!(-10 * 3600, utc_offset("HST").unwrap().local_minus_utc());
        assert_eq!(None, utc_offset(""));
        assert_eq!(None, utc_offset("CEST"));
    }
}
