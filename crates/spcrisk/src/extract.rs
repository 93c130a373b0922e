//! `LAT...LON` polygon extraction
//!
//! Most SPC text products end with a polygon block:
//!
//! ```txt
//! LAT...LON   34419914 35309873 36129790 35869714 34869745 34259835
//!             34419914
//! ```
//!
//! The block is a run of eight-digit [coordinate tokens](crate::decode_token)
//! separated by whitespace. A token of all nines (`99999999`) is a
//! break marker. It separates disjoint sub-polygons declared in the
//! same block; each sub-polygon becomes its own [`Ring`].

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::coord::decode_token;
use crate::ring::{GeometryErr, Ring, MIN_RING_POINTS};

// fewer tokens than this cannot form a polygon, closed or not
const MIN_RING_TOKENS: usize = 3;

/// Extract every polygon ring from the text of a product
///
/// Only the first `LAT...LON` block is considered. Sub-polygons
/// which cannot be decoded are dropped individually; a product
/// with no usable polygon returns an empty list.
///
/// ```
/// use spcrisk::extract_rings;
///
/// let text = "LAT...LON   34419914 35309873 36129790 35869714 34869745\n\n";
/// let rings = extract_rings(text);
/// assert_eq!(1, rings.len());
/// assert_eq!(6, rings[0].len());
/// ```
pub fn extract_rings(text: &str) -> Vec<Ring> {
    let block = match find_block(text) {
        Some(block) => block,
        None => return vec![],
    };

    split_tokens(block)
        .iter()
        .filter_map(|tokens| match ring_from_tokens(tokens) {
            Ok(ring) => Some(ring),
            Err(err) => {
                debug!("dropping LAT...LON sub-polygon: {}", err);
                None
            }
        })
        .collect()
}

/// Locate the first `LAT...LON` block and return its digits
pub(crate) fn find_block(text: &str) -> Option<&str> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"(?i)LAT\.\.\.LON\s+([0-9\s]+)").expect("bad LAT...LON regexp");
    }

    RE.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|mtc| mtc.as_str())
}

/// Tokenize a block into sub-polygons
///
/// Break markers end the current sub-polygon and are not
/// themselves returned. Empty sub-polygons are omitted.
pub(crate) fn split_tokens(block: &str) -> Vec<Vec<&str>> {
    lazy_static! {
        static ref TOKEN: Regex = Regex::new(r"[0-9]{8}").expect("bad token regexp");
        static ref BREAK_MARKER: Regex = Regex::new(r"^9{5,8}$").expect("bad marker regexp");
    }

    let mut out = vec![];
    let mut current = vec![];
    for word in block.split_whitespace() {
        if BREAK_MARKER.is_match(word) {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.extend(TOKEN.find_iter(word).map(|mtc| mtc.as_str()));
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

// Build one ring from its tokens
//
// The ring is closed at the token level: if the last token
// differs from the first, the first is repeated exactly once.
fn ring_from_tokens(tokens: &[&str]) -> Result<Ring, GeometryErr> {
    if tokens.len() < MIN_RING_TOKENS {
        return Err(GeometryErr::TooFewPoints(tokens.len()));
    }

    let mut closed = tokens.to_vec();
    if tokens.first() != tokens.last() {
        closed.push(tokens[0]);
    }

    let points: Vec<_> = closed.iter().filter_map(|tok| decode_token(tok)).collect();
    if points.len() < MIN_RING_POINTS {
        return Err(GeometryErr::TooFewPoints(points.len()));
    }

    Ring::new(points)
}
