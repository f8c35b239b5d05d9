use crate::error::{DecodeErrorReason, FrameDecodeError};
use crate::frame::CanFrame;

const ID_PREFIX: &str = "ID=";
const LEN_PREFIX: &str = "LEN=";
const SEPARATOR: char = ':';

/// Parses one line of the serial protocol.
///
/// Sample line from the device: `FRAME:ID=246:LEN=8:8E:62:1C:F6:1E:63:63:20`.
///
/// The line is split into at most four tokens (`FRAME`, `ID=246`, `LEN=8` and
/// the colon separated data bytes). The leading tag is not checked.
pub fn parse_serial_line(raw: &str) -> Result<CanFrame, FrameDecodeError> {
    let line = raw.trim();
    let invalid = |reason| FrameDecodeError::new(line, reason);

    let mut tokens = line.splitn(4, SEPARATOR);
    let _tag = tokens.next();

    let id = tokens
        .next()
        .and_then(|token| token.strip_prefix(ID_PREFIX))
        .ok_or_else(|| invalid(DecodeErrorReason::MissingField("ID")))?
        .parse::<u32>()
        .map_err(|_| invalid(DecodeErrorReason::InvalidId))?;

    let declared = tokens
        .next()
        .and_then(|token| token.strip_prefix(LEN_PREFIX))
        .ok_or_else(|| invalid(DecodeErrorReason::MissingField("LEN")))?
        .parse::<usize>()
        .map_err(|_| invalid(DecodeErrorReason::InvalidLength))?;

    let hex_data: String = tokens
        .next()
        .ok_or_else(|| invalid(DecodeErrorReason::MissingField("data")))?
        .chars()
        .filter(|&c| c != SEPARATOR)
        .collect();

    let payload =
        hex::decode(&hex_data).map_err(|err| invalid(DecodeErrorReason::InvalidHex(err)))?;

    if payload.len() != declared {
        return Err(invalid(DecodeErrorReason::LengthMismatch {
            declared,
            actual: payload.len(),
        }));
    }

    Ok(CanFrame::new(id, payload))
}
