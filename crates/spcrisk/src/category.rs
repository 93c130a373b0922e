//! Hazard kinds, risk categories, and severity ranking

use std::cmp::Ordering;
use std::fmt;

use phf::phf_map;
use serde::{Serialize, Serializer};
use strum::EnumMessage;

/// Kind of hazard product
///
/// Every [`RiskCategory`] belongs to exactly one kind. The kind
/// selects the table of levels which are valid for it.
///
/// Kinds have a short code, which SPC uses in product identifiers
/// and file names, and a human-readable name.
///
/// ```
/// use spcrisk::HazardKind;
///
/// assert_eq!(HazardKind::TornadoWatch, "TOA".parse().unwrap());
/// assert_eq!("TOA", HazardKind::TornadoWatch.as_code_str());
/// assert_eq!("Tornado Watch", HazardKind::TornadoWatch.as_display_str());
/// assert_eq!("Tornado Watch", format!("{}", HazardKind::TornadoWatch));
/// assert_eq!("TOA", format!("{:#}", HazardKind::TornadoWatch));
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
pub enum HazardKind {
    /// Mesoscale Discussion
    #[strum(serialize = "MCD", detailed_message = "Mesoscale Discussion")]
    MesoscaleDiscussion,

    /// Severe Thunderstorm Watch
    #[strum(serialize = "SVA", detailed_message = "Severe Thunderstorm Watch")]
    SevereThunderstormWatch,

    /// Tornado Watch
    #[strum(serialize = "TOA", detailed_message = "Tornado Watch")]
    TornadoWatch,

    /// Convective Outlook, text product
    ///
    /// Uses the same levels as [`HazardKind::Categorical`].
    #[strum(serialize = "SWO", detailed_message = "Convective Outlook")]
    ConvectiveOutlook,

    /// Categorical convective outlook, gridded
    #[strum(serialize = "CAT", detailed_message = "Categorical Outlook")]
    Categorical,

    /// Probabilistic tornado outlook
    #[strum(serialize = "TORN", detailed_message = "Tornado Outlook")]
    Tornado,

    /// Probabilistic damaging wind outlook
    #[strum(serialize = "WIND", detailed_message = "Wind Outlook")]
    Wind,

    /// Probabilistic large hail outlook
    #[strum(serialize = "HAIL", detailed_message = "Hail Outlook")]
    Hail,

    /// Fire weather outlook
    #[strum(serialize = "FIRE", detailed_message = "Fire Weather Outlook")]
    FireWeather,

    /// NWS point alert
    #[strum(serialize = "ALERT", detailed_message = "NWS Alert")]
    PointAlert,
}

impl HazardKind {
    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Short code
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    fn levels(&self) -> &'static phf::Map<&'static str, LevelEntry> {
        match self {
            HazardKind::MesoscaleDiscussion => &MCD_LEVELS,
            HazardKind::SevereThunderstormWatch => &SVA_LEVELS,
            HazardKind::TornadoWatch => &TOA_LEVELS,
            HazardKind::ConvectiveOutlook | HazardKind::Categorical => &CATEGORICAL_LEVELS,
            HazardKind::Tornado | HazardKind::Wind | HazardKind::Hail => &PROBABILISTIC_LEVELS,
            HazardKind::FireWeather => &FIRE_LEVELS,
            HazardKind::PointAlert => &ALERT_LEVELS,
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

impl Serialize for HazardKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_code_str())
    }
}

/// Ordered severity rank
///
/// Higher is more severe. Ranks are only meaningful between
/// categories which are compared for the same purpose, like all the
/// levels of a categorical outlook.
///
/// [`Severity::NONE`] is the "no hazard" value returned when no
/// active product covers a point.
///
/// ```
/// use spcrisk::Severity;
///
/// assert!(Severity::NONE.is_none());
/// assert!(Severity::new(5) > Severity::new(3));
/// assert_eq!(Severity::NONE, Severity::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Severity(u8);

impl Severity {
    /// No hazard
    pub const NONE: Severity = Severity(0);

    /// Severity with the given rank
    pub const fn new(rank: u8) -> Self {
        Self(rank)
    }

    /// Numeric rank
    pub fn rank(&self) -> u8 {
        self.0
    }

    /// True if this is [`Severity::NONE`]
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A risk category: one level of one hazard kind
///
/// Categories are looked up by their level label, which SPC uses
/// in both text products and gridded outlooks:
///
/// ```
/// use spcrisk::{HazardKind, RiskCategory};
///
/// let slight = RiskCategory::lookup(HazardKind::Categorical, "slgt").unwrap();
/// let enhanced = RiskCategory::lookup(HazardKind::Categorical, "ENH").unwrap();
/// assert_eq!("SLGT", slight.label());
/// assert_eq!("Slight Risk", slight.as_display_str());
/// assert!(enhanced.severity() > slight.severity());
///
/// // the gridded DN value identifies the level, too
/// assert_eq!(Some(enhanced), RiskCategory::from_dn(HazardKind::Categorical, 5));
///
/// assert_eq!(None, RiskCategory::lookup(HazardKind::Categorical, "BOGUS"));
/// ```
///
/// Categories are ordered by kind, then by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RiskCategory {
    kind: HazardKind,
    label: &'static str,
}

impl RiskCategory {
    /// Lookup a level of the given `kind` by its label
    ///
    /// Labels are matched case-insensitively.
    pub fn lookup(kind: HazardKind, label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        kind.levels()
            .get_entry(upper.as_str())
            .map(|(label, _)| Self {
                kind,
                label: *label,
            })
    }

    /// Lookup a level of the given `kind` by its gridded `DN` value
    ///
    /// Levels which have no `DN` of their own, like significant
    /// severe hatching, cannot be found this way.
    pub fn from_dn(kind: HazardKind, dn: u8) -> Option<Self> {
        kind.levels()
            .entries()
            .find(|(_, entry)| entry.1 != 0 && entry.1 == dn)
            .map(|(label, _)| Self {
                kind,
                label: *label,
            })
    }

    /// Hazard kind
    pub fn kind(&self) -> HazardKind {
        self.kind
    }

    /// Level label, in upper case, like "`SLGT`"
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Severity rank within the kind
    pub fn severity(&self) -> Severity {
        Severity(self.entry().0)
    }

    /// Gridded `DN` value, if the level has one
    pub fn dn(&self) -> Option<u8> {
        match self.entry().1 {
            0 => None,
            dn => Some(dn),
        }
    }

    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        self.entry().2
    }

    fn entry(&self) -> &'static LevelEntry {
        self.kind
            .levels()
            .get(self.label)
            .expect("missing definition")
    }
}

impl PartialOrd for RiskCategory {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskCategory {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.severity().cmp(&other.severity()))
            .then_with(|| self.label.cmp(other.label))
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}/{}", self.kind, self.label)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

impl Serialize for RiskCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:#}", self))
    }
}

// (severity rank, gridded DN or 0 for none, display name)
type LevelEntry = (u8, u8, &'static str);

static MCD_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "MCD" => (1, 0, "Mesoscale Discussion"),
};

// watches outrank discussions, and PDS wording outranks the plain watch
static SVA_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "SVA" => (3, 0, "Severe Thunderstorm Watch"),
    "PDS" => (4, 0, "PDS Severe Thunderstorm Watch"),
};

static TOA_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "TOA" => (5, 0, "Tornado Watch"),
    "PDS" => (6, 0, "PDS Tornado Watch"),
};

static CATEGORICAL_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "NONE" => (0, 0, "No Severe Thunderstorms"),
    "TSTM" => (1, 2, "General Thunderstorms"),
    "MRGL" => (2, 3, "Marginal Risk"),
    "SLGT" => (3, 4, "Slight Risk"),
    "ENH" => (4, 5, "Enhanced Risk"),
    "MDT" => (5, 6, "Moderate Risk"),
    "HIGH" => (6, 8, "High Risk"),
};

static PROBABILISTIC_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "0.02" => (1, 2, "2% Probability"),
    "0.05" => (2, 5, "5% Probability"),
    "0.10" => (3, 10, "10% Probability"),
    "0.15" => (4, 15, "15% Probability"),
    "0.30" => (5, 30, "30% Probability"),
    "0.45" => (6, 45, "45% Probability"),
    "0.60" => (7, 60, "60% Probability"),
    "SIGN" => (8, 0, "Significant Severe"),
    "CIG1" => (8, 0, "Conditional Intensity Level 1"),
    "CIG2" => (9, 0, "Conditional Intensity Level 2"),
    "CIG3" => (10, 0, "Conditional Intensity Level 3"),
};

static FIRE_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "IDRT" => (1, 0, "Isolated Dry Thunderstorms"),
    "ELEV" => (1, 5, "Elevated"),
    "SDRT" => (2, 0, "Scattered Dry Thunderstorms"),
    "CRIT" => (2, 8, "Critical"),
    "EXTM" => (3, 10, "Extremely Critical"),
};

static ALERT_LEVELS: phf::Map<&'static str, LevelEntry> = phf_map! {
    "UNKNOWN" => (1, 0, "Unknown"),
    "MINOR" => (2, 0, "Minor"),
    "MODERATE" => (3, 0, "Moderate"),
    "SEVERE" => (4, 0, "Severe"),
    "EXTREME" => (5, 0, "Extreme"),
};

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    const ALL_KINDS: &[HazardKind] = &[
        HazardKind::MesoscaleDiscussion,
        HazardKind::SevereThunderstormWatch,
        HazardKind::TornadoWatch,
        HazardKind::ConvectiveOutlook,
        HazardKind::Categorical,
        HazardKind::Tornado,
        HazardKind::Wind,
        HazardKind::Hail,
        HazardKind::FireWeather,
        HazardKind::PointAlert,
    ];

    #[test]
    fn test_kind_codes() {
        for kind in ALL_KINDS {
            assert_eq!(*kind, HazardKind::from_str(kind.as_code_str()).unwrap());
            assert!(!kind.as_display_str().is_empty());
        }
        assert!(HazardKind::from_str("XYZ").is_err());
    }

    #[test]
    fn test_level_tables() {
        // every entry is reachable by label, and DNs are unique per kind
        for kind in ALL_KINDS {
            for label in kind.levels().keys() {
                let cat = RiskCategory::lookup(*kind, label).unwrap();
                assert_eq!(*label, cat.label());
                if let Some(dn) = cat.dn() {
                    assert_eq!(Some(cat), RiskCategory::from_dn(*kind, dn));
                }
            }
        }
    }

    #[test]
    fn test_categorical_order() {
        let order = ["NONE", "TSTM", "MRGL", "SLGT", "ENH", "MDT", "HIGH"];
        let cats: Vec<_> = order
            .iter()
            .map(|lbl| RiskCategory::lookup(HazardKind::Categorical, lbl).unwrap())
            .collect();
        for pair in cats.windows(2) {
            assert!(pair[0].severity() < pair[1].severity());
            assert!(pair[0] < pair[1]);
        }
        assert!(cats[0].severity().is_none());
        assert_eq!(None, cats[0].dn());
    }

    #[test]
    fn test_probabilistic() {
        let sig = RiskCategory::lookup(HazardKind::Tornado, "sign").unwrap();
        let p30 = RiskCategory::lookup(HazardKind::Tornado, "0.30").unwrap();
        assert!(sig.severity() > p30.severity());
        assert_eq!(None, sig.dn());
        assert_eq!(Some(p30), RiskCategory::from_dn(HazardKind::Tornado, 30));
        assert_eq!(None, RiskCategory::from_dn(HazardKind::Tornado, 0));
        assert_eq!(None, RiskCategory::from_dn(HazardKind::Tornado, 99));
    }

    #[test]
    fn test_watch_rank() {
        let md = RiskCategory::lookup(HazardKind::MesoscaleDiscussion, "MCD").unwrap();
        let sva = RiskCategory::lookup(HazardKind::SevereThunderstormWatch, "SVA").unwrap();
        let toa = RiskCategory::lookup(HazardKind::TornadoWatch, "TOA").unwrap();
        let pds = RiskCategory::lookup(HazardKind::TornadoWatch, "PDS").unwrap();
        assert!(md.severity() < sva.severity());
        assert!(sva.severity() < toa.severity());
        assert!(toa.severity() < pds.severity());
    }

    #[test]
    fn test_display() {
        let cat = RiskCategory::lookup(HazardKind::FireWeather, "CRIT").unwrap();
        assert_eq!("Critical", format!("{}", cat));
        assert_eq!("FIRE/CRIT", format!("{:#}", cat));
        assert_eq!("\"FIRE/CRIT\"", serde_json::to_string(&cat).unwrap());
        assert_eq!("\"FIRE\"", serde_json::to_string(&HazardKind::FireWeather).unwrap());
    }
}
