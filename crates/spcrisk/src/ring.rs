//! Closed polygon rings and point containment

use std::collections::HashSet;

use geo::{BoundingRect, Contains, LineString, Polygon};
use log::debug;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::coord::Coordinate;

/// Minimum number of points in a closed ring
///
/// Three distinct vertices plus the closing repeat of the first.
pub const MIN_RING_POINTS: usize = 4;

/// Error constructing a [`Ring`]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum GeometryErr {
    /// Not enough points survived decoding to form a polygon
    #[error("ring has {0} points after closure, but at least 4 are required")]
    TooFewPoints(usize),

    /// A vertex lies outside the valid latitude/longitude range
    #[error("ring vertex {0} is outside the valid latitude/longitude range")]
    OutOfRange(Coordinate),
}

/// Latitude/longitude bounding box
///
/// Used as a cheap rejection test before the full containment
/// test. Bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// True if the `point` lies within or on the box
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lon
            && point.longitude <= self.max_lon
    }
}

/// A single closed polygon boundary
///
/// A `Ring` is an ordered sequence of [`Coordinate`] whose first
/// point equals its last. Rings are validated on construction:
///
/// * every vertex must be in range; out-of-range vertices are an
///   error, not clamped
/// * an open sequence is closed by repeating its first point
/// * at least [`MIN_RING_POINTS`] points must remain after closure
///
/// The bounding box is computed once, at construction.
///
/// ```
/// use spcrisk::{Coordinate, Ring};
///
/// let ring = Ring::new(vec![
///     Coordinate::new(35.0, -98.0),
///     Coordinate::new(36.0, -98.0),
///     Coordinate::new(36.0, -97.0),
///     Coordinate::new(35.0, -97.0),
/// ]).expect("valid ring");
///
/// // closed automatically
/// assert_eq!(5, ring.len());
/// assert!(ring.contains(&Coordinate::new(35.5, -97.5)));
/// assert!(!ring.contains(&Coordinate::new(37.0, -97.5)));
/// ```
#[derive(Clone, Debug)]
pub struct Ring {
    points: Vec<Coordinate>,
    bbox: BoundingBox,
    distinct_vertices: usize,
    holes: Vec<Ring>,
    polygon: Polygon<f64>,
}

impl Ring {
    /// Construct a ring from its vertices
    ///
    /// The `points` are closed if they are not already closed.
    /// An already-closed sequence is never closed twice.
    pub fn new(mut points: Vec<Coordinate>) -> Result<Self, GeometryErr> {
        if let Some(bad) = points.iter().find(|pt| !pt.is_valid()) {
            return Err(GeometryErr::OutOfRange(*bad));
        }

        match (points.first(), points.last()) {
            (Some(first), Some(last)) if first != last => points.push(*first),
            _ => {}
        }

        if points.len() < MIN_RING_POINTS {
            return Err(GeometryErr::TooFewPoints(points.len()));
        }

        let distinct_vertices = count_distinct(&points[..points.len() - 1]);
        let exterior: LineString<f64> = points
            .iter()
            .map(|pt| (pt.longitude, pt.latitude))
            .collect();
        let bbox = exterior
            .bounding_rect()
            .map(|rect| BoundingBox {
                min_lat: rect.min().y,
                max_lat: rect.max().y,
                min_lon: rect.min().x,
                max_lon: rect.max().x,
            })
            .ok_or(GeometryErr::TooFewPoints(0))?;

        Ok(Self {
            points,
            bbox,
            distinct_vertices,
            holes: vec![],
            polygon: Polygon::new(exterior, vec![]),
        })
    }

    /// Split a sentinel-delimited sequence into rings
    ///
    /// Some feeds flatten several disjoint sub-polygons into one
    /// coordinate sequence, joined by a `(0, 0)` point. This
    /// splits the sequence on every sentinel and builds one ring
    /// per part. Parts which cannot form a valid ring are dropped.
    pub fn split_sentinel(points: &[Coordinate]) -> Vec<Ring> {
        points
            .split(|pt| pt.is_sentinel())
            .filter(|part| !part.is_empty())
            .filter_map(|part| match Ring::new(part.to_vec()) {
                Ok(ring) => Some(ring),
                Err(err) => {
                    debug!("dropping sub-polygon: {}", err);
                    None
                }
            })
            .collect()
    }

    /// Cut `holes` out of this ring
    ///
    /// A point inside any hole is not contained by the ring. Holes
    /// which lie outside the ring have no effect.
    pub fn with_holes(mut self, holes: Vec<Ring>) -> Self {
        let interiors = holes
            .iter()
            .map(|hole| hole.polygon.exterior().clone())
            .collect();
        self.polygon = Polygon::new(self.polygon.exterior().clone(), interiors);
        self.holes = holes;
        self
    }

    /// Holes cut out of this ring
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Vertices, including the closing point
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of points, including the closing point
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the ring has no points
    ///
    /// [`Ring::new()`] never builds such a ring.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Precomputed bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// True if the ring has fewer than three distinct vertices
    ///
    /// A degenerate ring encloses no area and contains no point.
    pub fn is_degenerate(&self) -> bool {
        self.distinct_vertices < 3
    }

    /// Test if the `point` lies within this ring
    ///
    /// Points outside the bounding box are rejected without
    /// further work. Points exactly on the boundary, or inside a
    /// [hole](Ring::with_holes), are not contained.
    pub fn contains(&self, point: &Coordinate) -> bool {
        if self.is_degenerate() || !self.bbox.contains(point) {
            return false;
        }

        self.polygon.contains(&point.to_geo_point())
    }
}

impl PartialEq for Ring {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points && self.holes == other.holes
    }
}

impl Serialize for Ring {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.points.serialize(serializer)
    }
}

/// Test `point` against every ring in turn
///
/// Returns true on the first ring which contains the point. An
/// empty slice contains nothing: callers which must treat "no
/// geometry" as "no spatial constraint" need to check for that
/// themselves.
pub fn contains_any(rings: &[Ring], point: &Coordinate) -> bool {
    rings.iter().any(|ring| ring.contains(point))
}

fn count_distinct(points: &[Coordinate]) -> usize {
    points
        .iter()
        .map(|pt| (pt.latitude.to_bits(), pt.longitude.to_bits()))
        .collect::<HashSet<_>>()
        .len()
}
