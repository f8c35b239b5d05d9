use std::{fmt, io};
use thiserror::Error;

/// Why a raw line was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeErrorReason {
    /// A token of the serial protocol is absent or lacks its `KEY=` prefix.
    MissingField(&'static str),
    InvalidId,
    InvalidLength,
    InvalidHex(hex::FromHexError),
    /// The payload does not hold as many bytes as the line declared.
    LengthMismatch { declared: usize, actual: usize },
    /// The line does not look like a capture record at all.
    NoMatch,
    InvalidTimestamp,
    InvalidUtf8,
    /// No line terminator arrived before the buffer limit.
    LineTooLong,
}

impl fmt::Display for DecodeErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorReason::MissingField(field) => write!(f, "missing {} field", field),
            DecodeErrorReason::InvalidId => write!(f, "invalid frame id"),
            DecodeErrorReason::InvalidLength => write!(f, "invalid frame length"),
            DecodeErrorReason::InvalidHex(err) => write!(f, "invalid hex data: {}", err),
            DecodeErrorReason::LengthMismatch { declared, actual } => write!(
                f,
                "wrong frame length: declared {} bytes, got {}",
                declared, actual
            ),
            DecodeErrorReason::NoMatch => write!(f, "wrong format"),
            DecodeErrorReason::InvalidTimestamp => write!(f, "invalid timestamp"),
            DecodeErrorReason::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
            DecodeErrorReason::LineTooLong => write!(f, "line exceeds buffer limit"),
        }
    }
}

/// A line that could not be turned into a [`CanFrame`](crate::CanFrame).
///
/// Always carries the offending line so the caller can log or inspect it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid frame ({reason}): '{line}'")]
pub struct FrameDecodeError {
    pub line: String,
    pub reason: DecodeErrorReason,
}

impl FrameDecodeError {
    pub fn new(line: impl Into<String>, reason: DecodeErrorReason) -> Self {
        Self {
            line: line.into(),
            reason,
        }
    }
}

/// Everything a [`MessageSource`](crate::MessageSource) can fail with.
///
/// End of stream is not an error: `next_frame` returns `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("source is not open")]
    NotOpen,

    #[error("device disconnected")]
    Disconnected,

    #[error(transparent)]
    Decode(#[from] FrameDecodeError),
}

impl SourceError {
    /// `true` for malformed input, after which reading the next line is fine.
    pub fn is_decode(&self) -> bool {
        matches!(self, SourceError::Decode(_))
    }
}
