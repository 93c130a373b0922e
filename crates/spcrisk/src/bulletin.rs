//! Bulletin assembly
//!
//! An SPC RSS feed item is a [`RawBulletin`]. The assembler checks
//! that the item belongs to the feed it came from, runs every
//! [field rule](crate::fields) over its body, and builds an
//! immutable [`HazardRecord`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize, Serializer};
use strum::EnumMessage;
use thiserror::Error;

use crate::category::{HazardKind, RiskCategory};
use crate::extract::{extract_rings, find_block};
use crate::fields::{
    capture_between, capture_until_blank, is_particularly_dangerous, is_valid_link,
    normalize_body, parse_effective_window, parse_identity, parse_issuance, parse_peak_hail,
    parse_peak_tornado, parse_peak_wind, parse_risk_category, parse_valid_window,
    parse_watch_status, parse_watch_type, squash_whitespace, ValidWindow,
};
use crate::record::{HazardRecord, HazardThreat};
use crate::ring::Ring;

/// Validity assumed for a product which states none
pub const DEFAULT_VALIDITY_HOURS: i64 = 2;

/// One item from an SPC RSS feed
///
/// Feed items may be read from JSON. The `published_at` time is
/// optional:
///
/// ```
/// use spcrisk::RawBulletin;
///
/// let raw: RawBulletin = serde_json::from_str(r#"{
///     "title": "SPC MD 456",
///     "link": "https://www.spc.noaa.gov/products/md/md0456.html",
///     "body": "..."
/// }"#).unwrap();
/// assert_eq!(None, raw.published_at);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawBulletin {
    /// Item title
    pub title: String,

    /// Item link
    pub link: String,

    /// Feed publish time, used if the body has no issuance line
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Item description: the product text, possibly wrapped in HTML
    pub body: String,
}

/// SPC bulletin feed
///
/// Each feed carries one kind of text product. A feed item whose
/// title lacks the feed's marker phrase is some other product and
/// is excluded.
///
/// ```
/// use spcrisk::BulletinKind;
///
/// assert_eq!(BulletinKind::Watch, "watch".parse().unwrap());
/// assert!(BulletinKind::Watch.accepts_title("SPC Severe Thunderstorm Watch 210"));
/// assert!(!BulletinKind::Watch.accepts_title("SPC MD 456"));
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
)]
pub enum BulletinKind {
    /// Mesoscale Discussion
    #[strum(serialize = "md", detailed_message = "Mesoscale Discussion")]
    MesoscaleDiscussion,

    /// Tornado or Severe Thunderstorm Watch
    #[strum(serialize = "watch", detailed_message = "Watch")]
    Watch,

    /// Convective Outlook
    #[strum(serialize = "outlook", detailed_message = "Convective Outlook")]
    ConvectiveOutlook,
}

impl BulletinKind {
    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Short code
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Phrases which identify this kind of product in a title
    pub fn title_markers(&self) -> &'static [&'static str] {
        match self {
            BulletinKind::MesoscaleDiscussion => &["SPC MD", "Mesoscale Discussion"],
            BulletinKind::Watch => &["Tornado Watch", "Severe Thunderstorm Watch"],
            BulletinKind::ConvectiveOutlook => &["Convective Outlook"],
        }
    }

    /// True if the `title` contains any marker phrase
    ///
    /// Matching is case-insensitive.
    pub fn accepts_title(&self, title: &str) -> bool {
        let title = title.to_ascii_lowercase();
        self.title_markers()
            .iter()
            .any(|marker| title.contains(&marker.to_ascii_lowercase()))
    }
}

impl fmt::Display for BulletinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

impl Serialize for BulletinKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_code_str())
    }
}

/// Error assembling a bulletin
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BulletinDecodeErr {
    /// A mandatory field is missing or unparseable
    #[error("bulletin field \"{0}\" is missing or malformed")]
    MalformedInput(&'static str),

    /// The item is not a product of the feed's kind
    #[error("bulletin title does not match the feed's product type")]
    UnsupportedProduct,

    /// A `LAT...LON` block is present but yields no usable polygon
    #[error("bulletin polygon has too few usable points")]
    GeometryIncomplete,
}

/// Assemble one feed item into a record
///
/// The `title`, `link`, and issuance time are mandatory. The
/// issuance time is read from the body, falling back to the feed's
/// publish time. A missing mandatory field fails the item.
///
/// Every other field is optional and defaults when absent:
///
/// * validity is `[issued, issued + 2h]`; watches without a `Valid`
///   line use their effective time instead
/// * areas affected and summary are empty
/// * an unusable polygon leaves the record with no geometry
///
/// Items whose title does not match the `kind` are
/// [`UnsupportedProduct`](BulletinDecodeErr::UnsupportedProduct).
pub fn assemble(kind: BulletinKind, raw: &RawBulletin) -> Result<HazardRecord, BulletinDecodeErr> {
    let title = raw.title.trim();
    if title.is_empty() {
        return Err(BulletinDecodeErr::MalformedInput("title"));
    }
    if !kind.accepts_title(title) {
        return Err(BulletinDecodeErr::UnsupportedProduct);
    }

    let link = raw.link.trim();
    if !is_valid_link(link) {
        return Err(BulletinDecodeErr::MalformedInput("link"));
    }

    let body = normalize_body(&raw.body);
    let issued_at = parse_issuance(&body)
        .or(raw.published_at)
        .ok_or(BulletinDecodeErr::MalformedInput("issuance"))?;

    let window = parse_valid_window(&body, &issued_at)
        .or_else(|| match kind {
            BulletinKind::Watch => parse_effective_window(&body, &issued_at),
            _ => None,
        })
        .unwrap_or(ValidWindow {
            start: issued_at,
            end: issued_at + Duration::hours(DEFAULT_VALIDITY_HOURS),
        });

    let geometry = decode_geometry(&body).unwrap_or_else(|err| {
        debug!("{}: {}", title, err);
        vec![]
    });

    let particularly_dangerous = kind == BulletinKind::Watch && is_particularly_dangerous(&body);
    let category = match kind {
        BulletinKind::MesoscaleDiscussion => {
            RiskCategory::lookup(HazardKind::MesoscaleDiscussion, "MCD")
        }
        BulletinKind::Watch => parse_watch_type(title)
            .or_else(|| parse_watch_type(&body))
            .and_then(|wt| {
                let hazard = wt.hazard_kind();
                let label = if particularly_dangerous {
                    "PDS"
                } else {
                    hazard.as_code_str()
                };
                RiskCategory::lookup(hazard, label)
            }),
        BulletinKind::ConvectiveOutlook => parse_risk_category(&body),
    };

    let status = parse_watch_status(&body);

    Ok(HazardRecord {
        kind,
        identity: parse_identity(link, title),
        title: title.to_owned(),
        link: link.to_owned(),
        issued_at,
        valid_start: window.start,
        valid_end: window.end,
        area_description: section(&body, "Areas affected...", "Concerning..."),
        summary: section(&body, "SUMMARY...", "DISCUSSION..."),
        concerning: status.concerning,
        watch_probability: status.probability,
        threats: HazardThreat {
            wind_mph: parse_peak_wind(&body),
            hail_inches: parse_peak_hail(&body),
            tornado: parse_peak_tornado(&body),
        },
        particularly_dangerous,
        category,
        geometry,
    })
}

/// Assemble every item of one feed
///
/// Items are independent: a failed item is logged and skipped,
/// and never affects the others. Items of the wrong product type
/// are dropped quietly.
pub fn assemble_batch(kind: BulletinKind, items: &[RawBulletin]) -> Vec<HazardRecord> {
    items
        .iter()
        .filter_map(|raw| match assemble(kind, raw) {
            Ok(rec) => Some(rec),
            Err(BulletinDecodeErr::UnsupportedProduct) => {
                debug!("{:#} feed: skipping \"{}\": not a {}", kind, raw.title, kind);
                None
            }
            Err(err) => {
                warn!("{:#} feed: dropping \"{}\": {}", kind, raw.title, err);
                None
            }
        })
        .collect()
}

// Polygon rings, if the body has a LAT...LON block
//
// No block at all is not an error: the record just has no
// spatial constraint.
fn decode_geometry(body: &str) -> Result<Vec<Ring>, BulletinDecodeErr> {
    if find_block(body).is_none() {
        return Ok(vec![]);
    }

    let rings = extract_rings(body);
    if rings.is_empty() {
        Err(BulletinDecodeErr::GeometryIncomplete)
    } else {
        Ok(rings)
    }
}

// Text from `start` to `end`, or to the next blank line
fn section(body: &str, start: &str, end: &str) -> String {
    capture_between(body, start, end)
        .or_else(|| capture_until_blank(body, start))
        .map(|txt| squash_whitespace(&txt))
        .unwrap_or_default()
}
