//! Active risk resolution

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::trace;

use crate::category::{RiskCategory, Severity};
use crate::coord::Coordinate;
use crate::record::Hazard;
use crate::store::HazardStore;

/// Answers "what is in effect here, now?"
///
/// The resolver reads one consistent snapshot of its
/// [`HazardStore`] per query. It holds no state of its own and may
/// be shared freely.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use spcrisk::{
///     assemble_batch, BulletinKind, Coordinate, HazardStore, MemoryStore, RawBulletin,
///     RiskResolver, Severity,
/// };
///
/// let store = MemoryStore::new();
/// store.upsert(assemble_batch(BulletinKind::MesoscaleDiscussion, &[RawBulletin {
///     title: "SPC MD 456".to_owned(),
///     link: "https://www.spc.noaa.gov/products/md/md0456.html".to_owned(),
///     published_at: None,
///     body: "0253 PM CDT Tue Apr 29 2025\n\nValid 291953Z - 292130Z\n\n\
///            LAT...LON 34419914 35309873 36129790 35869714 34869745 34259835\n\n"
///         .to_owned(),
/// }]));
///
/// let resolver = RiskResolver::new(&store);
/// let at = Utc.with_ymd_and_hms(2025, 4, 29, 20, 30, 0).unwrap();
/// assert!(resolver.active_risk(&Coordinate::new(35.2, -98.2), &at) > Severity::NONE);
/// assert_eq!(Severity::NONE, resolver.active_risk(&Coordinate::new(39.0, -94.6), &at));
/// ```
#[derive(Debug)]
pub struct RiskResolver<'s, S> {
    store: &'s S,
}

impl<'s, S> RiskResolver<'s, S>
where
    S: HazardStore,
{
    /// Create a resolver over `store`
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Most severe record in effect at `point`
    ///
    /// Records active at time `at` are tested in order of
    /// descending severity. The first one whose geometry contains
    /// the `point` wins, so no less-severe record is ever tested
    /// once a match is found. Among records of equal severity,
    /// store order decides.
    ///
    /// Records with no geometry never match.
    pub fn active_record(&self, point: &Coordinate, at: &DateTime<Utc>) -> Option<S::Record> {
        let mut candidates = self.store.fetch(&|rec| rec.is_active_at(at));
        candidates.sort_by(|a, b| b.severity().cmp(&a.severity()));

        trace!("testing {} active record(s) at {}", candidates.len(), point);
        candidates
            .into_iter()
            .find(|rec| !rec.geometry().is_empty() && rec.contains(point))
    }

    /// Severity of the most severe record in effect at `point`
    ///
    /// Returns [`Severity::NONE`] if nothing active covers the point.
    pub fn active_risk(&self, point: &Coordinate, at: &DateTime<Utc>) -> Severity {
        self.active_record(point, at)
            .map(|rec| rec.severity())
            .unwrap_or(Severity::NONE)
    }

    /// True if any record active at `at` matches `predicate`
    ///
    /// This is not a spatial query. Records with no geometry take
    /// part, so this can answer questions like "is any tornado watch
    /// in effect?"
    pub fn any_active<P>(&self, at: &DateTime<Utc>, predicate: P) -> bool
    where
        P: Fn(&S::Record) -> bool,
    {
        !self
            .store
            .fetch(&|rec| rec.is_active_at(at) && predicate(rec))
            .is_empty()
    }

    /// The newest active record of each risk category
    ///
    /// Within each category, the record with the latest
    /// `valid_start` supersedes the others, even if they are still
    /// nominally valid. Ties go to the later `issued_at`, and then
    /// to the record later in store order.
    ///
    /// The result is ordered by descending severity, then by
    /// category. Records without a category are omitted.
    pub fn latest_map_snapshot(&self, at: &DateTime<Utc>) -> Vec<S::Record> {
        let active = self
            .store
            .fetch(&|rec| rec.is_active_at(at) && rec.category().is_some());

        let mut latest: HashMap<RiskCategory, S::Record> = HashMap::new();
        for rec in active {
            let cat = match rec.category() {
                Some(cat) => cat,
                None => continue,
            };

            let superseded = match latest.get(&cat) {
                Some(existing) => {
                    (rec.valid_start(), rec.issued_at())
                        >= (existing.valid_start(), existing.issued_at())
                }
                None => true,
            };
            if superseded {
                latest.insert(cat, rec);
            }
        }

        let mut out: Vec<_> = latest.into_values().collect();
        out.sort_by(|a, b| {
            b.severity()
                .cmp(&a.severity())
                .then_with(|| a.category().cmp(&b.category()))
        });
        out
    }
}
