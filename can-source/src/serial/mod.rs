mod line_buffer;
mod parse;

pub use line_buffer::{Line, LineBuffer, MAX_LINE_LEN};
pub use parse::parse_serial_line;

use crate::error::{DecodeErrorReason, FrameDecodeError, SourceError};
use crate::frame::CanFrame;
use crate::source::MessageSource;
use log::{debug, trace, warn};
use std::io::{self, Read};
use std::thread;
use std::time::Duration;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

const READ_CHUNK_LEN: usize = 256;

/// Port parameters for a [`SerialFrameSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    /// How long a single read may wait for data. Zero polls without blocking.
    pub read_timeout: Duration,
    /// Longest accepted line, terminator excluded.
    pub max_line_len: usize,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::ZERO,
            max_line_len: MAX_LINE_LEN,
        }
    }
}

/// Reads frames pushed by a device over a serial line.
///
/// The device sends one frame per line, see [`parse_serial_line`]. Reads are
/// non-blocking, so [`next_frame`](MessageSource::next_frame) keeps polling the
/// port until a whole line has been assembled. Callers that need to stay
/// responsive should drive this source from a dedicated thread.
pub struct SerialFrameSource {
    device_path: String,
    settings: SerialSettings,
    port: Option<Box<dyn Read + Send>>,
    lines: LineBuffer,
}

impl SerialFrameSource {
    /// Creates a source for the device at `device_path`. Nothing is opened yet.
    pub fn new(device_path: impl Into<String>, baud_rate: u32) -> Self {
        Self::with_settings(
            device_path,
            SerialSettings {
                baud_rate,
                ..SerialSettings::default()
            },
        )
    }

    pub fn with_settings(device_path: impl Into<String>, settings: SerialSettings) -> Self {
        let lines = LineBuffer::with_max_len(settings.max_line_len);

        Self {
            device_path: device_path.into(),
            settings,
            port: None,
            lines,
        }
    }

    /// Wraps a byte stream that is already open, such as a port configured by
    /// the caller. The returned source is open.
    pub fn from_stream(stream: impl Read + Send + 'static) -> Self {
        let mut source = Self::with_settings(String::new(), SerialSettings::default());
        source.port = Some(Box::new(stream));
        source
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    /// Polls the port until the line buffer yields something.
    fn read_line(&mut self) -> Result<Line, SourceError> {
        let mut chunk = [0u8; READ_CHUNK_LEN];

        loop {
            if let Some(line) = self.lines.next_line() {
                return Ok(line);
            }

            let port = self.port.as_mut().ok_or(SourceError::NotOpen)?;

            match port.read(&mut chunk) {
                Ok(0) => return Err(SourceError::Disconnected),
                Ok(n) => self.lines.extend(&chunk[..n]),
                Err(err) if is_idle(&err) => thread::yield_now(),
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Errors a non-blocking read reports when there is simply nothing to read.
fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

impl MessageSource for SerialFrameSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if self.port.is_some() {
            debug!("serial source {} is already open", self.device_path);
            return Ok(());
        }

        let port = serialport::new(&self.device_path, self.settings.baud_rate)
            .timeout(self.settings.read_timeout)
            .open()?;

        debug!(
            "opened {} at {} baud",
            self.device_path, self.settings.baud_rate
        );

        self.lines.clear();
        self.port = Some(Box::new(port));
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("closed {}", self.device_path);
        }
        self.lines.clear();
    }

    fn next_frame(&mut self) -> Result<Option<CanFrame>, SourceError> {
        if self.port.is_none() {
            return Err(SourceError::NotOpen);
        }

        match self.read_line()? {
            Line::Complete(bytes) => {
                let line = String::from_utf8_lossy(&bytes);
                let frame = parse_serial_line(&line)
                    .inspect_err(|err| warn!("rejected serial line: {}", err))?;

                trace!("serial frame {}", frame);
                Ok(Some(frame))
            }
            Line::Overflow(bytes) => {
                let err = FrameDecodeError::new(
                    String::from_utf8_lossy(&bytes),
                    DecodeErrorReason::LineTooLong,
                );
                warn!("dropped {} bytes of an overlong line", bytes.len());
                Err(err.into())
            }
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}
