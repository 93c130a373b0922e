//! Decode and query logic
//!
//! Every product feed is decoded into records, which are loaded
//! into an in-memory store. The program then does one of three
//! things:
//!
//! 1. **list**: print every decoded record
//! 2. **point query** (`--lat`, `--lon`): print the most severe
//!    record in effect at the point
//! 3. **snapshot** (`--snapshot`): print the newest active record
//!    of each risk level
//!
//! All output is JSON lines.

use std::io::{BufRead, Read, Write};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use spcrisk::{
    assemble_batch, parse_alerts, parse_outlook, Hazard, HazardStore, MemoryStore, RawBulletin,
    RiskResolver, Severity,
};

use crate::cli::{Args, Source};

/// Result of a point query
#[derive(Debug, Serialize)]
struct PointReport<'r, R> {
    latitude: f64,
    longitude: f64,
    at: DateTime<Utc>,
    severity: Severity,
    record: Option<&'r R>,
}

/// Run the application
///
/// Decodes the product feed from `input`, according to the
/// command-line `args`, and writes the result to `out`. Queries
/// are evaluated at time `now`, unless `args` say otherwise.
///
/// Returns the number of records written.
pub fn run<R, W>(args: &Args, mut input: R, now: DateTime<Utc>, out: &mut W) -> anyhow::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let at = args.at.unwrap_or(now);

    match args.product.source() {
        Source::Bulletin(kind) => {
            let items = read_bulletins(input)?;
            let records = assemble_batch(kind, &items);
            info!(
                "decoded {} of {} {} feed item(s)",
                records.len(),
                items.len(),
                kind.as_code_str()
            );
            report(args, records, &at, out)
        }
        Source::Outlook(kind) => {
            let document = read_document(&mut input)?;
            let records = parse_outlook(kind, &document)
                .with_context(|| format!("unable to decode {} outlook", kind))?;
            info!("decoded {} {} outlook feature(s)", records.len(), kind.as_code_str());
            report(args, records, &at, out)
        }
        Source::Alerts => {
            let document = read_document(&mut input)?;
            let records = parse_alerts(&document).context("unable to decode NWS alerts")?;
            info!("decoded {} NWS alert(s)", records.len());
            report(args, records, &at, out)
        }
    }
}

// Load records into a store and answer the query
fn report<R, W>(args: &Args, records: Vec<R>, at: &DateTime<Utc>, out: &mut W) -> anyhow::Result<usize>
where
    R: Hazard + Clone + Send + Sync + Serialize,
    W: Write,
{
    let store = MemoryStore::new();
    store.upsert(records);

    if args.point().is_none() && !args.snapshot {
        return write_records(&store.fetch(&|_| true), out);
    }

    let purged = store.delete_expired(at);
    if purged > 0 {
        info!("ignoring {} record(s) expired as of {}", purged, at);
    }

    let resolver = RiskResolver::new(&store);
    match args.point() {
        Some(point) => {
            if !point.is_valid() {
                return Err(anyhow!("query point {} is out of range", point));
            }

            let record = resolver.active_record(&point, at);
            let report = PointReport {
                latitude: point.latitude,
                longitude: point.longitude,
                at: *at,
                severity: record
                    .as_ref()
                    .map(|rec| rec.severity())
                    .unwrap_or(Severity::NONE),
                record: record.as_ref(),
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
            Ok(1)
        }
        None => write_records(&resolver.latest_map_snapshot(at), out),
    }
}

fn write_records<R, W>(records: &[R], out: &mut W) -> anyhow::Result<usize>
where
    R: Serialize,
    W: Write,
{
    for rec in records {
        writeln!(out, "{}", serde_json::to_string(rec)?)?;
    }
    Ok(records.len())
}

// One RSS item per line; lines which are not items are skipped
fn read_bulletins<R: BufRead>(input: R) -> anyhow::Result<Vec<RawBulletin>> {
    let mut out = vec![];
    for (i, line) in input.lines().enumerate() {
        let line = line.context("unable to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(item) => out.push(item),
            Err(err) => warn!("input line {}: not a feed item: {}", i + 1, err),
        }
    }
    Ok(out)
}

fn read_document<R: Read>(input: &mut R) -> anyhow::Result<String> {
    let mut document = String::new();
    input
        .read_to_string(&mut document)
        .context("unable to read input")?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use clap::Parser;

    const MD_FEED: &str = r#"{"title": "SPC MD 456", "link": "https://www.spc.noaa.gov/products/md/md0456.html", "body": "0253 PM CDT Tue Apr 29 2025\n\nValid 291953Z - 292130Z\n\nLAT...LON 34419914 35309873 36129790 35869714 34869745 34259835\n\n"}

not json
{"title": "SPC MD 457", "link": "https://www.spc.noaa.gov/products/md/md0457.html", "body": "0300 PM CDT Tue Apr 29 2025\n\nValid 292000Z - 292200Z\n\nLAT...LON 40009000 41009000 41008900 40008900\n\n"}
{"title": "SPC Tornado Watch 5", "link": "https://www.spc.noaa.gov/products/watch/ww0005.html", "body": "1245 PM CDT Mon May 5 2025"}
"#;

    const HAIL: &str = r#"{"type": "FeatureCollection", "features": [
  {"type": "Feature",
   "geometry": {"type": "Polygon", "coordinates": [[[-99.0, 34.0], [-97.0, 34.0], [-97.0, 36.0], [-99.0, 36.0], [-99.0, 34.0]]]},
   "properties": {"DN": 15, "LABEL": "0.15", "LABEL2": "15% Hail Risk",
                  "VALID": "202504291630", "EXPIRE": "202504301200", "ISSUE": "202504291625"}},
  {"type": "Feature",
   "geometry": {"type": "Polygon", "coordinates": [[[-98.5, 34.5], [-97.5, 34.5], [-97.5, 35.5], [-98.5, 35.5], [-98.5, 34.5]]]},
   "properties": {"DN": 30, "LABEL": "0.30", "LABEL2": "30% Hail Risk",
                  "VALID": "202504291630", "EXPIRE": "202504301200", "ISSUE": "202504291625"}}
]}"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 29, 20, 30, 0).unwrap()
    }

    fn run_with(argv: &[&str], input: &str) -> (usize, String) {
        let mut full = vec!["spcdec"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).unwrap();

        let mut out = vec![];
        let count = run(&args, input.as_bytes(), now(), &mut out).unwrap();
        (count, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_list() {
        let (count, out) = run_with(&["-p", "md"], MD_FEED);
        assert_eq!(2, count);

        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(2, lines.len());
        assert_eq!(456, lines[0]["identity"]);
        assert_eq!("md", lines[0]["kind"]);
        assert_eq!("MCD/MCD", lines[0]["category"]);
        assert_eq!(457, lines[1]["identity"]);
    }

    #[test]
    fn test_point_query() {
        let (count, out) = run_with(&["-p", "md", "--lat", "35.2", "--lon", "-98.2"], MD_FEED);
        assert_eq!(1, count);

        let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(1, report["severity"]);
        assert_eq!(456, report["record"]["identity"]);

        // later: MD 456 has expired
        let (_, out) = run_with(
            &[
                "-p",
                "md",
                "--lat",
                "35.2",
                "--lon",
                "-98.2",
                "--at",
                "2025-04-29T21:31:00Z",
            ],
            MD_FEED,
        );
        let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(0, report["severity"]);
        assert!(report["record"].is_null());
    }

    #[test]
    fn test_outlook_query() {
        let (_, out) = run_with(&["-p", "hail", "--lat", "35.0", "--lon", "-98.0"], HAIL);
        let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(5, report["severity"]);
        assert_eq!("30% Hail Risk", report["record"]["label"]);

        let (_, out) = run_with(&["-p", "hail", "--lat", "35.8", "--lon", "-98.0"], HAIL);
        let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(4, report["severity"]);
    }

    #[test]
    fn test_snapshot() {
        let (count, out) = run_with(&["-p", "hail", "--snapshot"], HAIL);
        assert_eq!(2, count);
        let first: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!("HAIL/0.30", first["category"]);
    }

    #[test]
    fn test_errors() {
        let args = Args::try_parse_from(["spcdec", "-p", "alerts"]).unwrap();
        assert!(run(&args, "not geojson".as_bytes(), now(), &mut Vec::<u8>::new()).is_err());

        let args = Args::try_parse_from(["spcdec", "-p", "md", "--lat", "95", "--lon", "0"]).unwrap();
        assert!(run(&args, MD_FEED.as_bytes(), now(), &mut Vec::<u8>::new()).is_err());
    }
}
