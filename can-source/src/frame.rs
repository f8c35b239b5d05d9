use std::fmt;

/// Largest identifier of a standard (11-bit) CAN frame.
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// A single CAN bus message.
///
/// ## Fields
/// - `id`: The frame identifier. Usually 11 or 29 bits wide; the decoders only
///   require it to fit a `u32`.
/// - `payload`: The data bytes, exactly as many as the source declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    pub id: u32,
    pub payload: Vec<u8>,
}

impl CanFrame {
    pub fn new(id: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Whether the identifier needs the 29-bit extended format.
    pub fn is_extended(&self) -> bool {
        self.id > MAX_STANDARD_ID
    }

    /// Splits the frame into its `(id, payload)` pair.
    pub fn into_parts(self) -> (u32, Vec<u8>) {
        (self.id, self.payload)
    }
}

/// Formats the frame in `candump` notation, e.g. `123#DEADBEEF`.
impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extended() {
            write!(f, "{:08X}", self.id)?;
        } else {
            write!(f, "{:03X}", self.id)?;
        }

        write!(f, "#{}", hex::encode_upper(&self.payload))
    }
}
