//! # spcrisk: Storm Prediction Center hazard engine
//!
//! This crate parses the text and gridded products of the NWS
//! [Storm Prediction Center](https://www.spc.noaa.gov/) (SPC) and
//! answers one question about them: *which hazard is in effect at
//! this point, right now?*
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! This crate has not been certified for any purpose. The author
//! **strongly discourages** its use in any safety-critical
//! applications. Always have at least two methods available for
//! receiving weather alerts.
//!
//! ## Example
//!
//! SPC text products arrive as RSS feed items. Obtaining the feed
//! is beyond the scope of this crate. Each item becomes a
//! [`RawBulletin`], and each feed has a [`BulletinKind`].
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use spcrisk::{
//!     assemble, BulletinKind, Coordinate, Hazard, HazardStore, MemoryStore, RawBulletin,
//!     RiskResolver, WatchProbability,
//! };
//!
//! let raw = RawBulletin {
//!     title: "SPC MD 456".to_owned(),
//!     link: "https://www.spc.noaa.gov/products/md/md0456.html".to_owned(),
//!     published_at: None,
//!     body: "
//!    Mesoscale Discussion 0456
//!    NWS Storm Prediction Center Norman OK
//!    0253 PM CDT Tue Apr 29 2025
//!
//!    Areas affected...Western and central Oklahoma
//!
//!    Concerning...Severe potential...Watch likely
//!
//!    Valid 291953Z - 292130Z
//!
//!    Probability of Watch Issuance...80 percent
//!
//!    LAT...LON   34419914 35309873 36129790 35869714 34869745 34259835
//!                34419914
//! ".to_owned(),
//! };
//!
//! // in actual implementations, handle this error gracefully!
//! let md = assemble(BulletinKind::MesoscaleDiscussion, &raw).expect("bad bulletin");
//! assert_eq!(456, md.identity());
//! assert_eq!("Western and central Oklahoma", md.area_description());
//! assert_eq!(Some(WatchProbability::Percent(80)), md.watch_probability());
//! assert_eq!(Utc.with_ymd_and_hms(2025, 4, 29, 19, 53, 0).unwrap(), md.issued_at());
//! assert_eq!(Utc.with_ymd_and_hms(2025, 4, 29, 21, 30, 0).unwrap(), md.valid_end());
//!
//! // records live in a store, which the resolver queries
//! let store = MemoryStore::new();
//! store.upsert(vec![md]);
//!
//! let resolver = RiskResolver::new(&store);
//! let at = Utc.with_ymd_and_hms(2025, 4, 29, 20, 0, 0).unwrap();
//! let okc = Coordinate::new(35.2, -98.2);
//! let kc = Coordinate::new(39.0, -94.6);
//!
//! assert!(!resolver.active_risk(&okc, &at).is_none());
//! assert!(resolver.active_risk(&kc, &at).is_none());
//! ```
//!
//! ## Products
//!
//! * **Mesoscale Discussions**, **Watches**, and **Convective
//!   Outlooks** are free text. The [field rules](fields) extract what
//!   they can from each one, and [`assemble()`] builds a
//!   [`HazardRecord`].
//!
//! * **Gridded outlooks**, like the categorical and probabilistic
//!   convective outlooks, are GeoJSON. [`parse_outlook()`] builds one
//!   [`OutlookRecord`] per risk level.
//!
//! * **NWS alerts** are GeoJSON CAP messages. [`parse_alerts()`]
//!   builds one [`AlertRecord`] per alert.
//!
//! All three implement [`Hazard`]. Each has a [`RiskCategory`]
//! whose [`Severity`] orders it against its peers.
//!
//! ## Polygons
//!
//! Text products describe their area with a `LAT...LON` block of
//! [eight-digit tokens](decode_token). These become one or more
//! closed [`Ring`]s. A record with no rings has no spatial
//! extent, and is never found by a point query.

mod alert;
mod bulletin;
mod category;
mod coord;
mod extract;
pub mod fields;
mod grid;
mod record;
mod resolver;
mod ring;
mod store;
mod zones;

pub use alert::{alert_from_feature, parse_alerts, AlertRecord};
pub use bulletin::{
    assemble, assemble_batch, BulletinDecodeErr, BulletinKind, RawBulletin,
    DEFAULT_VALIDITY_HOURS,
};
pub use category::{HazardKind, RiskCategory, Severity};
pub use coord::{decode_token, encode_magnitude, Coordinate, TOKEN_LEN};
pub use extract::extract_rings;
pub use fields::{
    capture_between, parse_issuance, parse_valid_window, ValidWindow, WatchProbability, WatchType,
};
pub use grid::{outlook_from_feature, parse_outlook, FeatureDecodeErr, OutlookRecord};
pub use record::{Hazard, HazardRecord, HazardThreat};
pub use resolver::RiskResolver;
pub use ring::{contains_any, BoundingBox, GeometryErr, Ring, MIN_RING_POINTS};
pub use store::{HazardStore, MemoryStore};
pub use zones::utc_offset;
