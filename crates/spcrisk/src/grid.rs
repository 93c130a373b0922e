//! Gridded outlook ingest
//!
//! SPC publishes each day's outlooks as GeoJSON FeatureCollections:
//! one collection per outlook (categorical, tornado, wind, hail,
//! fire weather) and one feature per risk level. Each feature carries
//! its level in the `LABEL` and `DN` properties and its times in
//! `ISSUE`, `VALID`, and `EXPIRE`:
//!
//! ```json
//! { "type": "Feature",
//!   "geometry": { "type": "MultiPolygon", "coordinates": [ ... ] },
//!   "properties": {
//!     "DN": 4, "LABEL": "SLGT", "LABEL2": "Slight Risk",
//!     "VALID": "202504291630", "EXPIRE": "202504301200",
//!     "ISSUE": "202504291625",
//!     "VALID_ISO": "2025-04-29T16:30:00+00:00", ... } }
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use geojson::{Feature, GeoJson, JsonValue};
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::category::{HazardKind, RiskCategory};
use crate::coord::Coordinate;
use crate::record::Hazard;
use crate::ring::Ring;

/// Error decoding a GeoJSON feature
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FeatureDecodeErr {
    /// The document is not a GeoJSON FeatureCollection
    #[error("invalid GeoJSON document: {0}")]
    Document(String),

    /// A required property is missing
    #[error("feature has no \"{0}\" property")]
    MissingProperty(&'static str),

    /// A time property could not be parsed
    #[error("feature property \"{0}\" is not a valid time")]
    InvalidTime(&'static str),

    /// The feature's level is not a level of the outlook
    #[error("feature level is not a known {0} level")]
    UnknownCategory(HazardKind),

    /// The feature's geometry is not polygonal
    #[error("feature geometry is not a Polygon or MultiPolygon")]
    UnsupportedGeometry,
}

/// One risk level of a gridded outlook
///
/// The record is in effect from `valid_start` until, but not
/// including, `expires_at`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutlookRecord {
    category: RiskCategory,
    label: String,
    issued_at: DateTime<Utc>,
    valid_start: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    geometry: Vec<Ring>,
}

impl OutlookRecord {
    /// Outlook risk level
    pub fn risk_category(&self) -> RiskCategory {
        self.category
    }

    /// Gridded `DN` value of the level, if it has one
    pub fn dn(&self) -> Option<u8> {
        self.category.dn()
    }

    /// Human-readable level name, as published
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Hazard for OutlookRecord {
    fn record_key(&self) -> String {
        format!(
            "{:#}/{}",
            self.category,
            self.valid_start.format("%Y%m%d%H%M")
        )
    }

    fn category(&self) -> Option<RiskCategory> {
        Some(self.category)
    }

    fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn valid_start(&self) -> DateTime<Utc> {
        self.valid_start
    }

    fn valid_end(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        Some(self.expires_at)
    }

    fn geometry(&self) -> &[Ring] {
        &self.geometry
    }
}

/// Parse a gridded outlook of the given `kind`
///
/// Features which cannot be decoded are logged and skipped; they
/// never abort the rest of the collection. Only a document which
/// is not GeoJSON at all is an error.
pub fn parse_outlook(kind: HazardKind, document: &str) -> Result<Vec<OutlookRecord>, FeatureDecodeErr> {
    let features = parse_features(document)?;
    Ok(features
        .iter()
        .enumerate()
        .filter_map(|(i, feature)| match outlook_from_feature(kind, feature) {
            Ok(rec) => Some(rec),
            Err(err) => {
                warn!("{:#} outlook: skipping feature {}: {}", kind, i, err);
                None
            }
        })
        .collect())
}

/// Decode one gridded outlook feature
///
/// The level is looked up by its `LABEL`. If the label is missing
/// or unknown, the `DN` value is tried instead.
pub fn outlook_from_feature(
    kind: HazardKind,
    feature: &Feature,
) -> Result<OutlookRecord, FeatureDecodeErr> {
    let by_label = string_property(feature, "LABEL").and_then(|lbl| RiskCategory::lookup(kind, lbl));
    let category = match by_label {
        Some(cat) => cat,
        None => {
            let dn = feature
                .property("DN")
                .and_then(json_u8)
                .ok_or(FeatureDecodeErr::MissingProperty("DN"))?;
            RiskCategory::from_dn(kind, dn).ok_or(FeatureDecodeErr::UnknownCategory(kind))?
        }
    };

    let issued_at = feature_time(feature, "ISSUE")?;
    let valid_start = feature_time(feature, "VALID")?;
    let expires_at = feature_time(feature, "EXPIRE")?;

    let label = string_property(feature, "LABEL2")
        .map(str::to_owned)
        .unwrap_or_else(|| category.as_display_str().to_owned());

    Ok(OutlookRecord {
        category,
        label,
        issued_at,
        valid_start,
        expires_at,
        geometry: rings_from_geometry(feature.geometry.as_ref())?,
    })
}

/// Split a GeoJSON document into its features
pub(crate) fn parse_features(document: &str) -> Result<Vec<Feature>, FeatureDecodeErr> {
    let geojson: GeoJson = document
        .parse()
        .map_err(|err: geojson::Error| FeatureDecodeErr::Document(err.to_string()))?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => Err(FeatureDecodeErr::Document(
            "expected a Feature or FeatureCollection".to_owned(),
        )),
    }
}

/// Polygon rings of a feature's geometry
///
/// Each exterior boundary becomes one or more [`Ring`]s, with the
/// polygon's interior boundaries cut out as holes. Boundaries which
/// use a `(0, 0)` point to join several sub-polygons are split on
/// it. A feature with no geometry has no
/// rings.
pub(crate) fn rings_from_geometry(
    geometry: Option<&geojson::Geometry>,
) -> Result<Vec<Ring>, FeatureDecodeErr> {
    let geometry = match geometry {
        Some(geometry) => geometry.clone(),
        None => return Ok(vec![]),
    };

    let geometry: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|_| FeatureDecodeErr::UnsupportedGeometry)?;

    let polygons = match geometry {
        geo::Geometry::Polygon(poly) => vec![poly],
        geo::Geometry::MultiPolygon(multi) => multi.0,
        _ => return Err(FeatureDecodeErr::UnsupportedGeometry),
    };

    let rings: Vec<Ring> = polygons
        .iter()
        .flat_map(|poly| {
            let holes: Vec<Ring> = poly
                .interiors()
                .iter()
                .flat_map(|interior| Ring::split_sentinel(&boundary_points(interior)))
                .collect();
            Ring::split_sentinel(&boundary_points(poly.exterior()))
                .into_iter()
                .map(|ring| ring.with_holes(holes.clone()))
                .collect::<Vec<_>>()
        })
        .collect();

    if rings.is_empty() && !polygons.is_empty() {
        debug!("no usable rings in {} polygon(s)", polygons.len());
    }

    Ok(rings)
}

fn boundary_points(line: &geo::LineString<f64>) -> Vec<Coordinate> {
    line.coords().map(|c| Coordinate::new(c.y, c.x)).collect()
}

/// Non-empty string property
pub(crate) fn string_property<'f>(feature: &'f Feature, key: &str) -> Option<&'f str> {
    feature
        .property(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a time property
///
/// The RFC 3339 `<key>_ISO` form is preferred. Otherwise the
/// compact `YYYYmmddHHMM` form, in UTC, is used.
fn feature_time(feature: &Feature, key: &'static str) -> Result<DateTime<Utc>, FeatureDecodeErr> {
    let iso = string_property(feature, &format!("{}_ISO", key))
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok());
    if let Some(time) = iso {
        return Ok(time.with_timezone(&Utc));
    }

    let compact = string_property(feature, key).ok_or(FeatureDecodeErr::MissingProperty(key))?;
    NaiveDateTime::parse_from_str(compact, "%Y%m%d%H%M")
        .map(|time| Utc.from_utc_datetime(&time))
        .map_err(|_| FeatureDecodeErr::InvalidTime(key))
}

// DN may be a number or a numeric string
fn json_u8(value: &JsonValue) -> Option<u8> {
    match value {
        JsonValue::Number(num) => num.as_u64().and_then(|n| u8::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
