use crate::error::{DecodeErrorReason, FrameDecodeError};
use crate::frame::CanFrame;
use regex::Regex;
use std::sync::LazyLock;

/// `(<timestamp>) <interface> <HEX_ID>#<HEX_DATA>`, as written by `candump -l`.
/// Remote frames are written as `<HEX_ID>#R`, optionally followed by a DLC digit.
static CANDUMP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(([.0-9]+)\).* ([0-9A-F]+)#(?:R[0-9]?|([0-9A-F]*))\s*$")
        .expect("candump line pattern is valid")
});

/// One decoded line of a capture file.
#[derive(Debug, Clone, PartialEq)]
pub struct CandumpRecord {
    /// Seconds, as recorded by the capture tool.
    pub timestamp: f64,
    pub frame: CanFrame,
}

/// Parses one line of a `candump` log.
///
/// The interface name between the timestamp and the frame is not interpreted
/// and may contain any characters. An empty data field and a remote frame
/// request both decode to a zero-length frame.
pub fn parse_candump_line(raw: &str) -> Result<CandumpRecord, FrameDecodeError> {
    let line = raw.trim_end_matches(['\r', '\n']);
    let invalid = |reason| FrameDecodeError::new(line, reason);

    let captures = CANDUMP_LINE
        .captures(line)
        .ok_or_else(|| invalid(DecodeErrorReason::NoMatch))?;

    let timestamp = captures[1]
        .parse::<f64>()
        .map_err(|_| invalid(DecodeErrorReason::InvalidTimestamp))?;

    let id = u32::from_str_radix(&captures[2], 16)
        .map_err(|_| invalid(DecodeErrorReason::InvalidId))?;

    let data = captures.get(3).map_or("", |data| data.as_str());
    let payload = hex::decode(data).map_err(|err| invalid(DecodeErrorReason::InvalidHex(err)))?;

    Ok(CandumpRecord {
        timestamp,
        frame: CanFrame::new(id, payload),
    })
}
