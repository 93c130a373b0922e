use std::fmt::Display;

use chrono::{DateTime, Utc};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};

use spcrisk::{BulletinKind, Coordinate, HazardKind};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program reads one SPC product feed, decodes every product in it, and prints the decoded records as JSON lines. Give a --lat and --lon to print the most severe product in effect at that point instead.

See --help for more details.

NOT FOR SAFETY-CRITICAL USE.
"#;

const USAGE_LONG: &str = r#"
This program reads one SPC product feed, decodes every product in it, and prints the decoded records as JSON lines. Give a --lat and --lon to print the most severe product in effect at that point instead.

Text products (md, watch, outlook) are read as JSON lines, one RSS item per line:

    {"title": "SPC MD 456", "link": "https://...", "body": "..."}

An optional "published_at" RFC 3339 time is used when the product text has no issuance line.

Gridded outlooks (categorical, tornado, wind, hail, fire) and NWS alerts (alerts) are read as one GeoJSON FeatureCollection:

    curl -s https://api.weather.gov/alerts/active?area=OK \
        | spcdec --product alerts --lat 35.47 --lon -97.52

Queries are evaluated at the current time, or at the given --at time.

NOT FOR SAFETY-CRITICAL USE.
"#;

const QUERY: &str = "Query Options";

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(author)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable all logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Product type of the input
    #[arg(short, long, value_enum)]
    pub product: Product,

    /// Query latitude (°N)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    #[arg(help_heading = QUERY)]
    pub lat: Option<f64>,

    /// Query longitude (°E; west is negative)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    #[arg(help_heading = QUERY)]
    pub lon: Option<f64>,

    /// Query time, RFC 3339 (default: now)
    #[arg(long, value_parser = parse_time)]
    #[arg(help_heading = QUERY)]
    pub at: Option<DateTime<Utc>>,

    /// Print the newest active record of each risk level
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    #[arg(help_heading = QUERY)]
    pub snapshot: bool,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }

    /// Query point, if one was given
    pub fn point(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lon?))
    }
}

/// Product feeds understood by this program
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Product {
    /// Mesoscale Discussions (JSON lines)
    Md,
    /// Tornado and Severe Thunderstorm Watches (JSON lines)
    Watch,
    /// Convective Outlook text (JSON lines)
    Outlook,
    /// Categorical outlook (GeoJSON)
    Categorical,
    /// Probabilistic tornado outlook (GeoJSON)
    Tornado,
    /// Probabilistic wind outlook (GeoJSON)
    Wind,
    /// Probabilistic hail outlook (GeoJSON)
    Hail,
    /// Fire weather outlook (GeoJSON)
    Fire,
    /// NWS alerts (GeoJSON)
    Alerts,
}

/// How a product feed is decoded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// JSON lines of RSS items
    Bulletin(BulletinKind),
    /// GeoJSON gridded outlook
    Outlook(HazardKind),
    /// GeoJSON NWS alerts
    Alerts,
}

impl Product {
    /// Decoder for this product
    pub fn source(&self) -> Source {
        match self {
            Product::Md => Source::Bulletin(BulletinKind::MesoscaleDiscussion),
            Product::Watch => Source::Bulletin(BulletinKind::Watch),
            Product::Outlook => Source::Bulletin(BulletinKind::ConvectiveOutlook),
            Product::Categorical => Source::Outlook(HazardKind::Categorical),
            Product::Tornado => Source::Outlook(HazardKind::Tornado),
            Product::Wind => Source::Outlook(HazardKind::Wind),
            Product::Hail => Source::Outlook(HazardKind::Hail),
            Product::Fire => Source::Outlook(HazardKind::FireWeather),
            Product::Alerts => Source::Alerts,
        }
    }
}

fn parse_time(inp: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(inp)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|err| format!("not an RFC 3339 time: {}", err))
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn test_clap() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_query_args() {
        let args = Args::try_parse_from([
            "spcdec",
            "--product",
            "md",
            "--lat",
            "35.2",
            "--lon",
            "-98.2",
            "--at",
            "2025-04-29T15:00:00-05:00",
        ])
        .unwrap();

        assert_eq!(Product::Md, args.product);
        assert_eq!(Some(Coordinate::new(35.2, -98.2)), args.point());
        assert_eq!(
            Some(Utc.with_ymd_and_hms(2025, 4, 29, 20, 0, 0).unwrap()),
            args.at
        );
        assert!(args.input_is_stdin());
    }

    #[test]
    fn test_bad_args() {
        // lat without lon
        assert!(Args::try_parse_from(["spcdec", "-p", "md", "--lat", "35.0"]).is_err());
        // snapshot is not a point query
        assert!(Args::try_parse_from([
            "spcdec", "-p", "hail", "--snapshot", "--lat", "35.0", "--lon", "-97.0"
        ])
        .is_err());
        assert!(Args::try_parse_from(["spcdec", "-p", "md", "--at", "yesterday"]).is_err());
        assert!(Args::try_parse_from(["spcdec", "-p", "bogus"]).is_err());

        let err: CliError = Args::try_parse_from(["spcdec", "--help"]).unwrap_err().into();
        assert_eq!(0, err.exit_code);
    }

    #[test]
    fn test_sources() {
        assert_eq!(
            Source::Bulletin(BulletinKind::Watch),
            Product::Watch.source()
        );
        assert_eq!(
            Source::Outlook(HazardKind::FireWeather),
            Product::Fire.source()
        );
    }
}
