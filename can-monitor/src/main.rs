mod cli;
mod config;
mod error;

use crate::cli::{Args, Commands};
use crate::config::Config;
use crate::error::MonitorError;
use can_source::{CanFrame, MessageSource, SourceError};
use clap::Parser;
use log::{error, info, warn};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), MonitorError> {
    let config = Config::load(args.config.as_deref())?;

    // Subcommands take precedence over the configuration file.
    let source_config = args
        .command
        .as_ref()
        .map(Commands::to_source_config)
        .or(config.source)
        .ok_or(MonitorError::NoSource)?;
    let skip_invalid = args.skip_invalid || config.skip_invalid;
    let limit = args.limit.or(config.limit);

    let mut source = source_config.build();
    source.open()?;
    info!("reading frames from {}", source_config);

    let result = monitor(&mut source, &mut io::stdout().lock(), skip_invalid, limit);
    source.close();

    let count = result?;
    info!("{} frames received", count);
    Ok(())
}

/// Pulls frames until the source ends or `limit` frames were printed.
///
/// Returns the number of frames printed.
fn monitor(
    source: &mut impl MessageSource,
    out: &mut impl Write,
    skip_invalid: bool,
    limit: Option<u64>,
) -> Result<u64, MonitorError> {
    let mut count = 0;

    while limit.is_none_or(|max| count < max) {
        match source.next_frame() {
            Ok(Some(frame)) => {
                writeln!(out, "{}", format_frame(&frame))?;
                count += 1;
            }
            Ok(None) => break,
            Err(SourceError::Decode(err)) if skip_invalid => warn!("skipping {}", err),
            Err(err) => return Err(err.into()),
        }
    }

    out.flush()?;
    Ok(count)
}

/// `     123  [3]  DE AD BE`
fn format_frame(frame: &CanFrame) -> String {
    let bytes = frame
        .payload
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<String>>()
        .join(" ");

    format!("{:>8X}  [{}]  {}", frame.id, frame.len(), bytes)
        .trim_end()
        .to_string()
}
