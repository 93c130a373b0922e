use std::io;

use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::Parser;
use log::{info, LevelFilter};

mod app;
mod cli;

use cli::{Args, CliError};

fn main() {
    match spcdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn spcdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let inbuf = file_setup(&args, stdin_handle)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let count = app::run(&args, inbuf, Utc::now(), &mut out)?;
    info!("wrote {} record(s)", count);

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("spcrisk", log_filter)
            .filter_module("spcdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("reading {:?} feed from standard input", args.product);
        if !is_terminal(&std::io::stdin()) {
            Ok(Box::new(stdin))
        } else {
            Err(anyhow!(
                "cowardly refusing to read a product feed from a terminal.

Pipe a feed from curl, or a saved file, into this program. Or
name a file with --file."
            ))
        }
    } else {
        info!("reading {:?} feed from file: \"{}\"", args.product, &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("Unable to open --file \"{}\"", args.file))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
