//! Bulletin field extraction
//!
//! Each function in this module extracts one field from the free
//! text of an SPC product. The rules are independent: each one scans
//! the whole text, and the failure of one rule has no effect on any
//! other. A rule which cannot find or parse its field returns `None`
//! and leaves defaulting to the [assembler](crate::assemble).
//!
//! All patterns are compiled once, on first use, into immutable
//! statics. The functions are safe to call from many threads at once.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Month, Months, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use scraper::Html;
use serde::Serialize;
use url::Url;

use crate::category::{HazardKind, RiskCategory};
use crate::zones::utc_offset;

/// A product's validity window, in UTC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ValidWindow {
    /// Start of validity
    pub start: DateTime<Utc>,

    /// End of validity; never before `start`
    pub end: DateTime<Utc>,
}

/// Type of convective watch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WatchType {
    SevereThunderstorm,
    Tornado,
}

impl WatchType {
    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        match self {
            WatchType::SevereThunderstorm => "Severe Thunderstorm",
            WatchType::Tornado => "Tornado",
        }
    }

    /// The hazard kind under which watches of this type are ranked
    pub fn hazard_kind(&self) -> HazardKind {
        match self {
            WatchType::SevereThunderstorm => HazardKind::SevereThunderstormWatch,
            WatchType::Tornado => HazardKind::TornadoWatch,
        }
    }

    fn from_phrase(phrase: &str) -> Self {
        if phrase.to_ascii_lowercase().starts_with("tornado") {
            WatchType::Tornado
        } else {
            WatchType::SevereThunderstorm
        }
    }
}

impl fmt::Display for WatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

/// Likelihood that a mesoscale discussion leads to a watch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WatchProbability {
    /// Stated probability, in percent (0–100)
    Percent(u8),

    /// No watch is pending because one is already in effect
    Unlikely,
}

/// A watch cited on a `Concerning...` line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CitedWatch {
    pub watch_type: WatchType,
    pub number: u32,
}

/// Watch-issuance probability and the concerning line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchStatus {
    pub probability: Option<WatchProbability>,
    pub concerning: Option<String>,
}

/// Parse the `Valid DDHHmmZ - DDHHmmZ` window
///
/// Both times are UTC, with only a day of month. They are anchored
/// on the `issued` date:
///
/// * the start day is taken from whichever of the previous, current,
///   or next month lands closest to the issuance date
/// * the end day is the first matching day on or after the start; an
///   end day smaller than the start day rolls into the next month
///
/// All rollovers use calendar arithmetic, so December 31 rolls to
/// January 1 of the following year.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use spcrisk::parse_valid_window;
///
/// let issued = Utc.with_ymd_and_hms(2024, 12, 31, 22, 50, 0).unwrap();
/// let window = parse_valid_window("Valid 312300Z - 010100Z", &issued).unwrap();
/// assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap());
/// assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap());
/// ```
pub fn parse_valid_window(text: &str, issued: &DateTime<Utc>) -> Option<ValidWindow> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)\bValid\s+(\d{2})(\d{2})(\d{2})\s*Z\s*-\s*(\d{2})(\d{2})(\d{2})\s*Z"
        )
        .expect("bad valid window regexp");
    }

    let caps = RE.captures(text)?;
    let field = |i: usize| -> Option<u32> { caps.get(i)?.as_str().parse().ok() };

    let start_date = nearest_day(issued.date_naive(), field(1)?)?;
    let end_date = next_day_on_or_after(start_date, field(4)?)?;

    let start = Utc.from_utc_datetime(&start_date.and_hms_opt(field(2)?, field(3)?, 0)?);
    let end = Utc.from_utc_datetime(&end_date.and_hms_opt(field(5)?, field(6)?, 0)?);
    if end < start {
        return None;
    }

    Some(ValidWindow { start, end })
}

/// Parse the issuance time line
///
/// Matches a line like `1130 PM CDT Mon Jun 30 2025` and converts
/// it to UTC with the fixed offset of the named
/// [zone](crate::utc_offset). Hours must be 1–12 and minutes 0–59;
/// out-of-range values are rejected, not wrapped. Unknown zones
/// are rejected.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use spcrisk::parse_issuance;
///
/// assert_eq!(
///     Some(Utc.with_ymd_and_hms(2025, 7, 1, 4, 30, 0).unwrap()),
///     parse_issuance("1130 PM CDT Mon Jun 30 2025")
/// );
/// assert_eq!(None, parse_issuance("1160 PM CDT Mon Jun 30 2025"));
/// ```
pub fn parse_issuance(text: &str) -> Option<DateTime<Utc>> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)\b(\d{3,4})\s+(AM|PM)\s+([A-Z]{2,4})\s+(?:SUN|MON|TUE|WED|THU|FRI|SAT)[A-Z]*\s+([A-Z]{3,9})\s+(\d{1,2})\s+(\d{4})\b"
        )
        .expect("bad issuance regexp");
    }

    RE.captures_iter(text)
        .find_map(|caps| issuance_from_captures(&caps))
}

fn issuance_from_captures(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let (hour, minute) = clock_time(&caps[1], &caps[2])?;
    let offset = utc_offset(&caps[3])?;
    let month = Month::from_str(&caps[4]).ok()?.number_from_month();
    let day: u32 = caps[5].parse().ok()?;
    let year: i32 = caps[6].parse().ok()?;

    let local = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    Some(
        offset
            .from_local_datetime(&local)
            .single()?
            .with_timezone(&Utc),
    )
}

/// Parse a watch's `from HHMM AM until HHMM PM ZZZ` effective time
///
/// Both times are local to the named zone, on the local date of
/// issuance. An end time at or before the start time belongs to the
/// next local day.
pub fn parse_effective_window(text: &str, issued: &DateTime<Utc>) -> Option<ValidWindow> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)\bfrom\s+(\d{3,4})\s+(AM|PM)\s+until\s+(\d{3,4})\s+(AM|PM)\s+([A-Z]{2,4})\b"
        )
        .expect("bad effective time regexp");
    }

    let caps = RE.captures(text)?;
    let (start_hour, start_min) = clock_time(&caps[1], &caps[2])?;
    let (end_hour, end_min) = clock_time(&caps[3], &caps[4])?;
    let offset = utc_offset(&caps[5])?;

    let local_date = issued.with_timezone(&offset).date_naive();
    let start_local = local_date.and_hms_opt(start_hour, start_min, 0)?;
    let mut end_local = local_date.and_hms_opt(end_hour, end_min, 0)?;
    if end_local <= start_local {
        end_local += Duration::days(1);
    }

    let start = offset.from_local_datetime(&start_local).single()?;
    let end = offset.from_local_datetime(&end_local).single()?;
    Some(ValidWindow {
        start: start.with_timezone(&Utc),
        end: end.with_timezone(&Utc),
    })
}

/// Peak wind gust, in MPH
///
/// Reads `MOST PROBABLE PEAK WIND GUST...55-70 MPH`. For a range,
/// the upper bound is returned.
pub fn parse_peak_wind(text: &str) -> Option<u16> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)MOST PROBABLE PEAK WIND GUST\.{3}\s*(?:UP TO\s+)?(\d{1,3})(?:\s*-\s*(\d{1,3}))?\s*MPH"
        )
        .expect("bad peak wind regexp");
    }

    let caps = RE.captures(text)?;
    caps.get(2).or_else(|| caps.get(1))?.as_str().parse().ok()
}

/// Peak hail size, in inches, as a closed interval
///
/// * `1.50-2.50 IN` is `1.5..=2.5`
/// * `1.50 IN` is `1.5..=1.5`
/// * `UP TO 1.50 IN` is `0.0..=1.5`
///
/// A range whose lower bound exceeds its upper bound is rejected.
pub fn parse_peak_hail(text: &str) -> Option<RangeInclusive<f64>> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)MOST PROBABLE PEAK HAIL SIZE\.{3}\s*(UP TO\s+)?(\d+(?:\.\d+)?)(?:\s*-\s*(\d+(?:\.\d+)?))?\s*IN\b"
        )
        .expect("bad peak hail regexp");
    }

    let caps = RE.captures(text)?;
    let first: f64 = caps.get(2)?.as_str().parse().ok()?;
    let (lower, upper) = if caps.get(1).is_some() {
        (0.0, first)
    } else if let Some(upper) = caps.get(3) {
        (first, upper.as_str().parse().ok()?)
    } else {
        (first, first)
    };

    if lower > upper {
        return None;
    }

    Some(lower..=upper)
}

/// Peak tornado intensity, verbatim
///
/// SPC does not standardize this field. It may be a wind speed
/// range, an EF rating, or prose.
pub fn parse_peak_tornado(text: &str) -> Option<String> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?i)MOST PROBABLE PEAK TORNADO INTENSITY\.{3}[ \t]*([^\r\n]*\S)")
            .expect("bad peak tornado regexp");
    }

    RE.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|mtc| mtc.as_str().to_owned())
}

/// Stated watch-issuance probability, clamped to 0–100
pub fn parse_watch_probability(text: &str) -> Option<u8> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?i)Probability of Watch Issuance\.{3}\s*(\d{1,3})\s*percent")
            .expect("bad watch probability regexp");
    }

    let pct: u32 = RE.captures(text)?.get(1)?.as_str().parse().ok()?;
    Some(pct.min(100) as u8)
}

/// The `Concerning...` line, with whitespace collapsed
pub fn parse_concerning(text: &str) -> Option<String> {
    capture_until_blank(text, "Concerning...").map(|s| squash_whitespace(&s))
}

/// Watches cited by number in `text`, in order of appearance
pub fn parse_cited_watches(text: &str) -> Vec<CitedWatch> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)\b(Tornado|Severe\s+Thunderstorm)\s+Watch(?:es)?\s+(\d{1,4}(?:\s*(?:,|\.\.\.|and|&)\s*\d{1,4})*)"
        )
        .expect("bad cited watch regexp");
        static ref NUMBER: Regex = Regex::new(r"\d{1,4}").expect("bad number regexp");
    }

    let mut out = vec![];
    for caps in RE.captures_iter(text) {
        let watch_type = WatchType::from_phrase(&caps[1]);
        for num in NUMBER.find_iter(&caps[2]) {
            if let Ok(number) = num.as_str().parse() {
                out.push(CitedWatch { watch_type, number });
            }
        }
    }
    out
}

/// Watch-issuance probability and concerning line
///
/// If the product states a probability, it is used as-is with the
/// product's own concerning line. If it does not, but the concerning
/// line cites one or more watches by number, a watch is already in
/// effect: the probability is [`WatchProbability::Unlikely`] and the
/// concerning line is rewritten to list the cited watches.
pub fn parse_watch_status(text: &str) -> WatchStatus {
    let concerning = parse_concerning(text);
    if let Some(pct) = parse_watch_probability(text) {
        return WatchStatus {
            probability: Some(WatchProbability::Percent(pct)),
            concerning,
        };
    }

    let cited = concerning
        .as_deref()
        .map(parse_cited_watches)
        .unwrap_or_default();
    if cited.is_empty() {
        return WatchStatus {
            probability: None,
            concerning,
        };
    }

    WatchStatus {
        probability: Some(WatchProbability::Unlikely),
        concerning: Some(describe_cited(&cited)),
    }
}

// "Tornado Watches 123, 124 and Severe Thunderstorm Watch 125 already in effect"
fn describe_cited(cited: &[CitedWatch]) -> String {
    let mut groups: Vec<(WatchType, Vec<u32>)> = vec![];
    for watch in cited {
        match groups.iter_mut().find(|(wt, _)| *wt == watch.watch_type) {
            Some((_, numbers)) => {
                if !numbers.contains(&watch.number) {
                    numbers.push(watch.number)
                }
            }
            None => groups.push((watch.watch_type, vec![watch.number])),
        }
    }

    let phrases: Vec<String> = groups
        .iter()
        .map(|(wt, numbers)| {
            let noun = if numbers.len() > 1 { "Watches" } else { "Watch" };
            let list: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
            format!("{} {} {}", wt, noun, list.join(", "))
        })
        .collect();

    format!("{} already in effect", phrases.join(" and "))
}

/// Type of watch named in `text`
pub fn parse_watch_type(text: &str) -> Option<WatchType> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?i)\b(Tornado|Severe\s+Thunderstorm)\s+Watch\b")
            .expect("bad watch type regexp");
    }

    RE.captures(text)
        .map(|caps| WatchType::from_phrase(&caps[1]))
}

/// True if the product uses "particularly dangerous situation" wording
pub fn is_particularly_dangerous(text: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?i)PARTICULARLY\s+DANGEROUS\s+SITUATION")
            .expect("bad PDS regexp");
    }

    RE.is_match(text)
}

/// Highest categorical risk named in convective outlook prose
///
/// Recognizes `MARGINAL`, `SLIGHT`, `ENHANCED`, `MODERATE`, and
/// `HIGH RISK`, as well as `GENERAL THUNDERSTORMS`. If several are
/// named, the most severe wins. An outlook which states
/// `NO SEVERE THUNDERSTORM AREAS FORECAST` and names no risk has
/// the `NONE` level.
pub fn parse_risk_category(text: &str) -> Option<RiskCategory> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?i)\b(MARGINAL|SLIGHT|ENHANCED|MODERATE|HIGH)\s+RISK\b|\bGENERAL\s+THUNDERSTORMS\b"
        )
        .expect("bad risk regexp");
        static ref NO_SEVERE: Regex = Regex::new(r"(?i)NO\s+SEVERE\s+THUNDERSTORM\s+AREAS\s+FORECAST")
            .expect("bad no-severe regexp");
    }

    let kind = HazardKind::ConvectiveOutlook;
    RE.captures_iter(text)
        .filter_map(|caps| {
            let label = match caps.get(1) {
                Some(word) => match word.as_str().to_ascii_uppercase().as_str() {
                    "MARGINAL" => "MRGL",
                    "SLIGHT" => "SLGT",
                    "ENHANCED" => "ENH",
                    "MODERATE" => "MDT",
                    _ => "HIGH",
                },
                None => "TSTM",
            };
            RiskCategory::lookup(kind, label)
        })
        .max_by_key(|cat| cat.severity())
        .or_else(|| {
            if NO_SEVERE.is_match(text) {
                RiskCategory::lookup(kind, "NONE")
            } else {
                None
            }
        })
}

/// Product number from its link, or failing that, its title
///
/// The last run of digits in the final path segment of the `link`
/// is preferred: `.../md/md0456.html` is `456`. Otherwise the last
/// number in the `title` is used. If neither works, returns `-1`.
pub fn parse_identity(link: &str, title: &str) -> i32 {
    let segment = Url::parse(link.trim()).ok().and_then(|url| {
        url.path_segments()?
            .filter(|seg| !seg.is_empty())
            .last()
            .map(str::to_owned)
    });

    segment
        .as_deref()
        .and_then(last_number)
        .or_else(|| last_number(title))
        .unwrap_or(-1)
}

fn last_number(text: &str) -> Option<i32> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"\d+").expect("bad digits regexp");
    }

    RE.find_iter(text).last()?.as_str().parse().ok()
}

/// True if `link` is an absolute `http` or `https` URI with a host
pub fn is_valid_link(link: &str) -> bool {
    match Url::parse(link.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Text strictly between two headers, trimmed
///
/// Headers are matched case-insensitively. Returns `None` if either
/// header is missing or nothing but whitespace lies between them.
///
/// ```
/// use spcrisk::capture_between;
///
/// let text = "Areas affected...central Kansas\n\nConcerning...Severe potential";
/// assert_eq!(
///     Some("central Kansas".to_owned()),
///     capture_between(text, "Areas affected...", "Concerning...")
/// );
/// ```
pub fn capture_between(text: &str, start: &str, end: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let begin = lower.find(&start.to_ascii_lowercase())? + start.len();
    let stop = begin + lower[begin..].find(&end.to_ascii_lowercase())?;
    non_empty(&text[begin..stop])
}

/// Text from a header to the next blank line (or end of text), trimmed
pub fn capture_until_blank(text: &str, start: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let begin = lower.find(&start.to_ascii_lowercase())? + start.len();
    let stop = lower[begin..]
        .find("\n\n")
        .map_or(text.len(), |offset| begin + offset);
    non_empty(&text[begin..stop])
}

/// Collapse every run of whitespace into a single space
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup from an RSS product body
///
/// The body is parsed as an HTML fragment and only its text is
/// kept, so every character reference is decoded. Non-breaking
/// spaces become plain spaces, and line endings become `\n`.
pub fn normalize_body(body: &str) -> String {
    Html::parse_fragment(body)
        .root_element()
        .text()
        .collect::<String>()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ")
}

// Convert a 12-hour clock reading to (hour, minute), 24-hour
pub(crate) fn clock_time(hhmm: &str, meridiem: &str) -> Option<(u32, u32)> {
    if !(3..=4).contains(&hhmm.len()) || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let split = hhmm.len() - 2;
    let hour: u32 = hhmm[..split].parse().ok()?;
    let minute: u32 = hhmm[split..].parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let pm = meridiem.eq_ignore_ascii_case("PM");
    Some((hour % 12 + if pm { 12 } else { 0 }, minute))
}

// Day of month `day` in whichever neighboring month is closest to `anchor`
fn nearest_day(anchor: NaiveDate, day: u32) -> Option<NaiveDate> {
    let this_month = anchor.with_day(1)?;
    [
        this_month.checked_sub_months(Months::new(1)),
        Some(this_month),
        this_month.checked_add_months(Months::new(1)),
    ]
    .into_iter()
    .flatten()
    .filter_map(|month| month.with_day(day))
    .min_by_key(|date| (*date - anchor).num_days().abs())
}

// First day of month `day` on or after `start`
fn next_day_on_or_after(start: NaiveDate, day: u32) -> Option<NaiveDate> {
    let this_month = start.with_day(1)?;
    [Some(this_month), this_month.checked_add_months(Months::new(1))]
        .into_iter()
        .flatten()
        .filter_map(|month| month.with_day(day))
        .find(|date| *date >= start)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_valid_window() {
        let issued = utc(2025, 4, 29, 19, 53);
        let window = parse_valid_window("Valid 291953Z - 292130Z", &issued).unwrap();
        assert_eq!(utc(2025, 4, 29, 19, 53), window.start);
        assert_eq!(utc(2025, 4, 29, 21, 30), window.end);

        // space before Z, lowercase
        let window = parse_valid_window("valid 292300 Z - 300100 Z", &issued).unwrap();
        assert_eq!(utc(2025, 4, 30, 1, 0), window.end);

        // end day rolls into the next month
        let issued = utc(2025, 4, 30, 22, 0);
        let window = parse_valid_window("Valid 302200Z - 010000Z", &issued).unwrap();
        assert_eq!(utc(2025, 4, 30, 22, 0), window.start);
        assert_eq!(utc(2025, 5, 1, 0, 0), window.end);

        // start day rolls into the next month too
        let issued = utc(2025, 1, 31, 23, 55);
        let window = parse_valid_window("Valid 010000Z - 010200Z", &issued).unwrap();
        assert_eq!(utc(2025, 2, 1, 0, 0), window.start);

        // issued shortly after a valid start late on the previous day
        let issued = utc(2025, 7, 1, 0, 5);
        let window = parse_valid_window("Valid 302355Z - 010100Z", &issued).unwrap();
        assert_eq!(utc(2025, 6, 30, 23, 55), window.start);
        assert_eq!(utc(2025, 7, 1, 1, 0), window.end);
    }

    #[test]
    fn test_valid_window_year_rollover() {
        let issued = utc(2024, 12, 31, 22, 50);
        let window = parse_valid_window("Valid 312300Z - 010100Z", &issued).unwrap();
        assert_eq!(utc(2024, 12, 31, 23, 0), window.start);
        assert_eq!(utc(2025, 1, 1, 1, 0), window.end);
    }

    #[test]
    fn test_valid_window_rejects() {
        let issued = utc(2025, 4, 29, 19, 53);
        assert_eq!(None, parse_valid_window("no window", &issued));
        assert_eq!(None, parse_valid_window("Valid 292500Z - 292600Z", &issued));
        assert_eq!(None, parse_valid_window("Valid 291960Z - 292100Z", &issued));
        // end precedes start on the same day
        assert_eq!(None, parse_valid_window("Valid 292100Z - 292000Z", &issued));
        // no such day in any neighboring month
        assert_eq!(None, parse_valid_window("Valid 322100Z - 012000Z", &issued));
    }

    #[test]
    fn test_issuance() {
        assert_eq!(
            Some(utc(2025, 7, 1, 4, 30)),
            parse_issuance("1130 PM CDT Mon Jun 30 2025")
        );
        assert_eq!(
            Some(utc(2025, 4, 29, 19, 53)),
            parse_issuance("Norman OK\n0253 PM CDT Tue Apr 29 2025\n")
        );
        assert_eq!(
            Some(utc(2025, 1, 15, 6, 5)),
            parse_issuance("1205 AM CST Wed Jan 15 2025")
        );
        assert_eq!(
            Some(utc(2025, 1, 15, 18, 0)),
            parse_issuance("1200 PM CST Wednesday January 15 2025")
        );
        assert_eq!(
            Some(utc(2025, 3, 9, 19, 0)),
            parse_issuance("1200 PM PDT sun mar 9 2025")
        );
    }

    #[test]
    fn test_issuance_rejects() {
        assert_eq!(None, parse_issuance("1160 PM CDT Mon Jun 30 2025"));
        assert_eq!(None, parse_issuance("1330 PM CDT Mon Jun 30 2025"));
        assert_eq!(None, parse_issuance("0030 AM CDT Mon Jun 30 2025"));
        assert_eq!(None, parse_issuance("1130 PM ACST Mon Jun 30 2025"));
        assert_eq!(None, parse_issuance("1130 PM CDT Mon Jun 31 2025"));
        assert_eq!(None, parse_issuance("1130 PM CDT Mon Foo 30 2025"));
    }

    #[test]
    fn test_clock_time() {
        assert_eq!(Some((0, 5)), clock_time("1205", "AM"));
        assert_eq!(Some((12, 5)), clock_time("1205", "pm"));
        assert_eq!(Some((21, 30)), clock_time("930", "PM"));
        assert_eq!(None, clock_time("2400", "PM"));
        assert_eq!(None, clock_time("060", "PM"));
        assert_eq!(None, clock_time("12345", "PM"));
    }

    #[test]
    fn test_effective_window() {
        let issued = utc(2025, 5, 5, 17, 45);
        let text = "* Effective this Monday afternoon and evening from 1245 PM until 800 PM CDT.";
        let window = parse_effective_window(text, &issued).unwrap();
        assert_eq!(utc(2025, 5, 5, 17, 45), window.start);
        assert_eq!(utc(2025, 5, 6, 1, 0), window.end);

        // overnight watch
        let issued = utc(2025, 5, 6, 3, 50);
        let text = "from 1050 PM until 600 AM CDT";
        let window = parse_effective_window(text, &issued).unwrap();
        assert_eq!(utc(2025, 5, 6, 3, 50), window.start);
        assert_eq!(utc(2025, 5, 6, 11, 0), window.end);
    }

    #[test]
    fn test_magnitudes() {
        assert_eq!(Some(70), parse_peak_wind("MOST PROBABLE PEAK WIND GUST...55-70 MPH"));
        assert_eq!(Some(65), parse_peak_wind("MOST PROBABLE PEAK WIND GUST...65 MPH"));
        assert_eq!(Some(60), parse_peak_wind("MOST PROBABLE PEAK WIND GUST...UP TO 60 MPH"));
        assert_eq!(None, parse_peak_wind("MOST PROBABLE PEAK TORNADO INTENSITY...85-115 MPH"));

        let hail = parse_peak_hail("MOST PROBABLE PEAK HAIL SIZE...1.50-2.50 IN").unwrap();
        assert_approx_eq!(1.5, *hail.start());
        assert_approx_eq!(2.5, *hail.end());

        let hail = parse_peak_hail("MOST PROBABLE PEAK HAIL SIZE...UP TO 1.50 IN").unwrap();
        assert_approx_eq!(0.0, *hail.start());
        assert_approx_eq!(1.5, *hail.end());

        let hail = parse_peak_hail("MOST PROBABLE PEAK HAIL SIZE...1.00 IN").unwrap();
        assert_approx_eq!(1.0, *hail.start());
        assert_approx_eq!(1.0, *hail.end());

        assert_eq!(None, parse_peak_hail("MOST PROBABLE PEAK HAIL SIZE...2.50-1.50 IN"));

        assert_eq!(
            Some("85-115 MPH".to_owned()),
            parse_peak_tornado("MOST PROBABLE PEAK TORNADO INTENSITY...85-115 MPH  \nnext")
        );
        assert_eq!(None, parse_peak_tornado("MOST PROBABLE PEAK TORNADO INTENSITY...\n"));
    }

    #[test]
    fn test_watch_status() {
        let status = parse_watch_status(
            "Concerning...Severe potential...Watch likely\n\nProbability of Watch Issuance...80 percent",
        );
        assert_eq!(Some(WatchProbability::Percent(80)), status.probability);
        assert_eq!(Some("Severe potential...Watch likely".to_owned()), status.concerning);

        let status = parse_watch_status("Probability of Watch Issuance...150 percent");
        assert_eq!(Some(WatchProbability::Percent(100)), status.probability);

        let status = parse_watch_status(
            "Concerning...Tornado Watch 123...124...\n\nSUMMARY...storms continue",
        );
        assert_eq!(Some(WatchProbability::Unlikely), status.probability);
        assert_eq!(
            Some("Tornado Watches 123, 124 already in effect".to_owned()),
            status.concerning
        );

        let status = parse_watch_status(
            "Concerning...Severe Thunderstorm Watch 456...Tornado Watch 457\n\n",
        );
        assert_eq!(
            Some(
                "Severe Thunderstorm Watch 456 and Tornado Watch 457 already in effect".to_owned()
            ),
            status.concerning
        );

        let status = parse_watch_status("Concerning...Heavy snow\n\n");
        assert_eq!(None, status.probability);
        assert_eq!(Some("Heavy snow".to_owned()), status.concerning);

        assert_eq!(WatchStatus::default(), parse_watch_status("nothing"));
    }

    #[test]
    fn test_watch_type() {
        assert_eq!(Some(WatchType::Tornado), parse_watch_type("SPC Tornado Watch 123"));
        assert_eq!(
            Some(WatchType::SevereThunderstorm),
            parse_watch_type("severe thunderstorm watch number 45")
        );
        assert_eq!(None, parse_watch_type("Tornado Warning"));

        assert!(is_particularly_dangerous(
            "THIS IS A PARTICULARLY DANGEROUS\nSITUATION"
        ));
        assert!(!is_particularly_dangerous("dangerous"));
    }

    #[test]
    fn test_risk_category() {
        let cat = parse_risk_category("...THERE IS A SLIGHT RISK OF SEVERE THUNDERSTORMS...").unwrap();
        assert_eq!("SLGT", cat.label());

        let cat = parse_risk_category(
            "...THERE IS A MODERATE RISK...\n...ENHANCED RISK SURROUNDS...\nGENERAL THUNDERSTORMS",
        )
        .unwrap();
        assert_eq!("MDT", cat.label());

        let cat = parse_risk_category("...NO SEVERE THUNDERSTORM AREAS FORECAST...").unwrap();
        assert_eq!("NONE", cat.label());

        assert_eq!(None, parse_risk_category("quiet"));
    }

    #[test]
    fn test_identity() {
        assert_eq!(
            456,
            parse_identity("https://www.spc.noaa.gov/products/md/md0456.html", "SPC MD 0456")
        );
        assert_eq!(
            123,
            parse_identity("https://www.spc.noaa.gov/products/watch/ww0123.html?x=9", "")
        );
        assert_eq!(77, parse_identity("https://www.spc.noaa.gov/products/md/", "SPC MD 77"));
        assert_eq!(-1, parse_identity("https://www.spc.noaa.gov/products/", "no number"));

        assert!(is_valid_link("https://www.spc.noaa.gov/products/md/md0456.html"));
        assert!(is_valid_link("http://localhost:8080"));
        assert!(!is_valid_link("www.spc.noaa.gov/products"));
        assert!(!is_valid_link("https://"));
        assert!(!is_valid_link("ftp://www.spc.noaa.gov"));
        assert!(!is_valid_link("mailto:spc@noaa.gov"));

        // query without a path, userinfo, and IPv6 hosts are all absolute
        assert!(is_valid_link("https://www.spc.noaa.gov?md=0456"));
        assert!(is_valid_link("https://user@www.spc.noaa.gov/products/md/md0456.html"));
        assert!(is_valid_link("https://[2001:db8::1]/products/md/md0456.html"));
        assert_eq!(
            456,
            parse_identity("https://[2001:db8::1]/products/md/md0456.html", "")
        );
        assert_eq!(456, parse_identity("https://www.spc.noaa.gov?md=0456", "SPC MD 456"));
    }

    #[test]
    fn test_sections() {
        let text = "Areas affected...portions of western\nand central Oklahoma\n\nConcerning...Severe potential\n\nSUMMARY...Storms will\ndevelop.\n\nDISCUSSION...More text";
        assert_eq!(
            Some("portions of western\nand central Oklahoma".to_owned()),
            capture_between(text, "Areas affected...", "Concerning...")
        );
        assert_eq!(
            Some("Storms will\ndevelop.".to_owned()),
            capture_between(text, "summary...", "discussion...")
        );
        assert_eq!(
            Some("More text".to_owned()),
            capture_until_blank(text, "DISCUSSION...")
        );
        assert_eq!(None, capture_between(text, "Missing...", "Concerning..."));
        assert_eq!(None, capture_between("A...  B...", "A...", "B..."));
        assert_eq!("a b c", squash_whitespace("  a\n b\t\tc "));
    }

    #[test]
    fn test_normalize_body() {
        assert_eq!(
            "Areas affected...Kansas & Nebraska\nnext",
            normalize_body("<pre>Areas affected...Kansas &amp; Nebraska\r\nnext</pre>")
        );
        assert_eq!(
            "Oklahoma's panhandle \"No Man's Land\"",
            normalize_body("Oklahoma&#39;s panhandle &quot;No Man&apos;s Land&quot;")
        );
        assert_eq!("a b <c> \u{2013}", normalize_body("a&nbsp;b &lt;c&gt; &#x2013;"));
        assert_eq!("Valid 291953Z - 292130Z", normalize_body("Valid 291953Z - 292130Z"));
    }
}
