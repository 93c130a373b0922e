//! NWS point alerts
//!
//! The NWS alerts API returns active alerts as a GeoJSON
//! FeatureCollection of CAP messages. Only the fields needed to
//! rank and locate an alert are kept.

use chrono::{DateTime, Utc};
use geojson::Feature;
use log::{debug, warn};
use serde::Serialize;

use crate::category::{HazardKind, RiskCategory};
use crate::grid::{parse_features, rings_from_geometry, string_property, FeatureDecodeErr};
use crate::record::Hazard;
use crate::ring::Ring;

/// One NWS alert
///
/// Severity follows the CAP severity scale, from `Unknown` through
/// `Extreme`. Alerts are in effect from onset (or the effective
/// time) until, but not including, the `expires` time.
///
/// Most alerts are issued by forecast zone and carry no polygon
/// of their own. These have no geometry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlertRecord {
    id: String,
    event: String,
    headline: Option<String>,
    area_description: String,
    category: RiskCategory,
    issued_at: DateTime<Utc>,
    valid_start: DateTime<Utc>,
    valid_end: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    geometry: Vec<Ring>,
}

impl AlertRecord {
    /// Alert identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Event name, like "`Tornado Warning`"
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Headline
    pub fn headline(&self) -> Option<&str> {
        self.headline.as_deref()
    }

    /// Areas affected
    pub fn area_description(&self) -> &str {
        &self.area_description
    }
}

impl Hazard for AlertRecord {
    fn record_key(&self) -> String {
        format!("{:#}/{}", HazardKind::PointAlert, self.id)
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
        self.valid_end
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        Some(self.expires_at)
    }

    fn geometry(&self) -> &[Ring] {
        &self.geometry
    }
}

/// Parse an NWS alerts document
///
/// Alerts whose `status` is not `Actual`, like exercises and
/// tests, are skipped. Alerts which cannot be decoded are logged
/// and skipped.
pub fn parse_alerts(document: &str) -> Result<Vec<AlertRecord>, FeatureDecodeErr> {
    let features = parse_features(document)?;
    Ok(features
        .iter()
        .enumerate()
        .filter_map(|(i, feature)| {
            if let Some(status) = string_property(feature, "status") {
                if !status.eq_ignore_ascii_case("Actual") {
                    debug!("alerts: skipping feature {}: status is {}", i, status);
                    return None;
                }
            }

            match alert_from_feature(feature) {
                Ok(rec) => Some(rec),
                Err(err) => {
                    warn!("alerts: skipping feature {}: {}", i, err);
                    None
                }
            }
        })
        .collect())
}

/// Decode one alert feature
///
/// * `valid_start` is `onset`, else `effective`, else `sent`
/// * `valid_end` is `ends`, else `expires`
///
/// Unrecognized CAP severities are treated as `Unknown`.
pub fn alert_from_feature(feature: &Feature) -> Result<AlertRecord, FeatureDecodeErr> {
    let id = string_property(feature, "id")
        .map(str::to_owned)
        .or_else(|| feature.id.as_ref().map(feature_id))
        .ok_or(FeatureDecodeErr::MissingProperty("id"))?;
    let event = string_property(feature, "event").ok_or(FeatureDecodeErr::MissingProperty("event"))?;

    let kind = HazardKind::PointAlert;
    let category = string_property(feature, "severity")
        .and_then(|sev| RiskCategory::lookup(kind, sev))
        .or_else(|| RiskCategory::lookup(kind, "UNKNOWN"))
        .ok_or(FeatureDecodeErr::UnknownCategory(kind))?;

    let issued_at = alert_time(feature, "sent")?.ok_or(FeatureDecodeErr::MissingProperty("sent"))?;
    let expires_at =
        alert_time(feature, "expires")?.ok_or(FeatureDecodeErr::MissingProperty("expires"))?;
    let valid_start = match alert_time(feature, "onset")? {
        Some(onset) => onset,
        None => alert_time(feature, "effective")?.unwrap_or(issued_at),
    };
    let valid_end = alert_time(feature, "ends")?.unwrap_or(expires_at);

    Ok(AlertRecord {
        id,
        event: event.to_owned(),
        headline: string_property(feature, "headline").map(str::to_owned),
        area_description: string_property(feature, "areaDesc")
            .unwrap_or_default()
            .to_owned(),
        category,
        issued_at,
        valid_start,
        valid_end,
        expires_at,
        geometry: rings_from_geometry(feature.geometry.as_ref())?,
    })
}

// optional RFC 3339 time; present-but-malformed is an error
fn alert_time(
    feature: &Feature,
    key: &'static str,
) -> Result<Option<DateTime<Utc>>, FeatureDecodeErr> {
    match string_property(feature, key) {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|time| Some(time.with_timezone(&Utc)))
            .map_err(|_| FeatureDecodeErr::InvalidTime(key)),
        None => Ok(None),
    }
}

fn feature_id(id: &geojson::feature::Id) -> String {
    match id {
        geojson::feature::Id::String(s) => s.clone(),
        geojson::feature::Id::Number(n) => n.to_string(),
    }
}
