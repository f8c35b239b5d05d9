use can_source::SourceError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("no source configured, use the `serial` or `replay` subcommand or a [source] table")]
    NoSource,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
