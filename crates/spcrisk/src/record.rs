//! Hazard records

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bulletin::BulletinKind;
use crate::category::{RiskCategory, Severity};
use crate::coord::Coordinate;
use crate::fields::WatchProbability;
use crate::ring::{contains_any, Ring};

/// Common interface of every hazard record
///
/// Text bulletins, gridded outlook polygons, and point alerts all
/// answer the same questions: what category they carry, when they
/// are valid, and where. The [`RiskResolver`](crate::RiskResolver)
/// only needs this trait.
///
/// A record is **active** at time `at` when
///
/// * `valid_start() <= at`; and
/// * `at < expires_at()`, if the record carries an expiry, or
///   `at <= valid_end()` if it does not.
///
/// An expiry is an exclusive cutoff: a product is no longer in
/// effect at the instant it expires.
pub trait Hazard {
    /// Unique key within a store
    fn record_key(&self) -> String;

    /// Risk category, used for ranking and grouping
    fn category(&self) -> Option<RiskCategory>;

    /// Severity rank
    ///
    /// Records without a category have [`Severity::NONE`].
    fn severity(&self) -> Severity {
        self.category()
            .map(|cat| cat.severity())
            .unwrap_or(Severity::NONE)
    }

    /// Issuance time
    fn issued_at(&self) -> DateTime<Utc>;

    /// Start of validity
    fn valid_start(&self) -> DateTime<Utc>;

    /// End of validity, inclusive
    fn valid_end(&self) -> DateTime<Utc>;

    /// Authoritative expiry, exclusive, if distinct from `valid_end()`
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Polygon rings; empty for no spatial constraint
    fn geometry(&self) -> &[Ring];

    /// True if the record is in effect at time `at`
    fn is_active_at(&self, at: &DateTime<Utc>) -> bool {
        if *at < self.valid_start() {
            return false;
        }

        match self.expires_at() {
            Some(expires) => *at < expires,
            None => *at <= self.valid_end(),
        }
    }

    /// True if the record will never be active again at or after `at`
    fn is_expired_at(&self, at: &DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires) => *at >= expires,
            None => *at > self.valid_end(),
        }
    }

    /// True if any ring of the record's geometry contains `point`
    ///
    /// Records with no geometry contain nothing.
    fn contains(&self, point: &Coordinate) -> bool {
        contains_any(self.geometry(), point)
    }
}

/// Threat magnitudes stated by a bulletin
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HazardThreat {
    /// Peak wind gust, in MPH
    pub wind_mph: Option<u16>,

    /// Peak hail size, in inches
    pub hail_inches: Option<RangeInclusive<f64>>,

    /// Peak tornado intensity, verbatim
    pub tornado: Option<String>,
}

impl HazardThreat {
    /// True if no magnitude is stated
    pub fn is_empty(&self) -> bool {
        self.wind_mph.is_none() && self.hail_inches.is_none() && self.tornado.is_none()
    }
}

/// A hazard record assembled from a text bulletin
///
/// Constructed by [`assemble()`](crate::assemble). Records are
/// immutable; a newer bulletin replaces an older one with the
/// same [key](Hazard::record_key) in the store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HazardRecord {
    pub(crate) kind: BulletinKind,
    pub(crate) identity: i32,
    pub(crate) title: String,
    pub(crate) link: String,
    pub(crate) issued_at: DateTime<Utc>,
    pub(crate) valid_start: DateTime<Utc>,
    pub(crate) valid_end: DateTime<Utc>,
    pub(crate) area_description: String,
    pub(crate) summary: String,
    pub(crate) concerning: Option<String>,
    pub(crate) watch_probability: Option<WatchProbability>,
    pub(crate) threats: HazardThreat,
    pub(crate) particularly_dangerous: bool,
    pub(crate) category: Option<RiskCategory>,
    pub(crate) geometry: Vec<Ring>,
}

impl HazardRecord {
    /// Bulletin feed this record came from
    pub fn kind(&self) -> BulletinKind {
        self.kind
    }

    /// Product number, or `-1` if none could be found
    pub fn identity(&self) -> i32 {
        self.identity
    }

    /// Product title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Product link
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Areas affected, whitespace collapsed
    pub fn area_description(&self) -> &str {
        &self.area_description
    }

    /// Summary paragraph, whitespace collapsed
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The `Concerning...` line
    pub fn concerning(&self) -> Option<&str> {
        self.concerning.as_deref()
    }

    /// Likelihood of a follow-up watch
    pub fn watch_probability(&self) -> Option<WatchProbability> {
        self.watch_probability
    }

    /// Stated threat magnitudes
    pub fn threats(&self) -> &HazardThreat {
        &self.threats
    }

    /// True if the product uses PDS wording
    pub fn is_particularly_dangerous(&self) -> bool {
        self.particularly_dangerous
    }
}

impl Hazard for HazardRecord {
    fn record_key(&self) -> String {
        if self.identity >= 0 {
            format!("{:#}/{}", self.kind, self.identity)
        } else {
            format!("{:#}/{}", self.kind, self.link)
        }
    }

    fn category(&self) -> Option<RiskCategory> {
        self.category
    }

    fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn valid_start(&self) -> DateTime<Utc> {
        self.valid_start
    }

    fn valid_end(&self) -> DateTime<Utc> {
        self.valid_end
    }

    fn geometry(&self) -> &[Ring] {
        &self.geometry
    }
}
