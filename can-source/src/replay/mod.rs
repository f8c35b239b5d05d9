mod pacing;
mod parse;

pub use pacing::{Pacer, Sleeper, ThreadSleeper, normalize_speed_scale};
pub use parse::{CandumpRecord, parse_candump_line};

use crate::error::{DecodeErrorReason, FrameDecodeError, SourceError};
use crate::frame::CanFrame;
use crate::source::MessageSource;
use log::{debug, trace, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const DEFAULT_SPEED_SCALE: f64 = 1.0;

/// Replays a `candump` capture file.
///
/// Frames are returned with the delays between them reproduced from the
/// recorded timestamps, divided by the speed scale. Reaching the end of the
/// file ends the stream.
pub struct ReplayFrameSource {
    path: PathBuf,
    reader: Option<Box<dyn BufRead + Send>>,
    pacer: Pacer,
    sleeper: Box<dyn Sleeper>,
    line: Vec<u8>,
    line_number: u64,
}

impl ReplayFrameSource {
    /// Creates a source for the capture at `path`. Nothing is opened yet.
    ///
    /// A `speed_scale` that is not strictly positive replays in real time.
    pub fn new(path: impl Into<PathBuf>, speed_scale: f64) -> Self {
        Self {
            path: path.into(),
            reader: None,
            pacer: Pacer::new(speed_scale),
            sleeper: Box::new(ThreadSleeper),
            line: Vec::new(),
            line_number: 0,
        }
    }

    /// Replays from a reader that is already open. The returned source is open.
    pub fn from_reader(reader: impl BufRead + Send + 'static, speed_scale: f64) -> Self {
        let mut source = Self::new(PathBuf::new(), speed_scale);
        source.reader = Some(Box::new(reader));
        source
    }

    /// Replaces the thread sleep used for pacing.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn speed_scale(&self) -> f64 {
        self.pacer.speed_scale()
    }

    /// Timestamp of the last frame returned, zero before the first one.
    pub fn clock(&self) -> f64 {
        self.pacer.clock()
    }
}

impl MessageSource for ReplayFrameSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if self.reader.is_some() {
            debug!("capture {} is already open", self.path.display());
            return Ok(());
        }

        let file = File::open(&self.path)?;
        debug!(
            "replaying {} at {}x",
            self.path.display(),
            self.pacer.speed_scale()
        );

        self.reader = Some(Box::new(BufReader::new(file)));
        self.line_number = 0;
        Ok(())
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(
                "closed {} after {} lines",
                self.path.display(),
                self.line_number
            );
        }
    }

    fn next_frame(&mut self) -> Result<Option<CanFrame>, SourceError> {
        let reader = self.reader.as_mut().ok_or(SourceError::NotOpen)?;

        self.line.clear();
        if reader.read_until(b'\n', &mut self.line)? == 0 {
            debug!("end of capture after {} lines", self.line_number);
            return Ok(None);
        }
        self.line_number += 1;
        let line_number = self.line_number;

        let text = std::str::from_utf8(&self.line).map_err(|_| {
            FrameDecodeError::new(
                String::from_utf8_lossy(&self.line).trim_end(),
                DecodeErrorReason::InvalidUtf8,
            )
        })?;

        let record = parse_candump_line(text)
            .inspect_err(|err| warn!("line {}: {}", line_number, err))?;

        let delay = self.pacer.advance(record.timestamp);
        self.sleeper.sleep(delay);

        trace!("replayed {} after {:?}", record.frame, delay);
        Ok(Some(record.frame))
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn recording(
        capture: &'static str,
        speed_scale: f64,
    ) -> (ReplayFrameSource, Arc<Mutex<Vec<Duration>>>) {
        let waits = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&waits);

        let source = ReplayFrameSource::from_reader(Cursor::new(capture), speed_scale)
            .with_sleeper(move |duration: Duration| log.lock().unwrap().push(duration));

        (source, waits)
    }

    #[test]
    fn speed_scale_is_coerced() {
        assert_eq!(ReplayFrameSource::new("a.log", 0.0).speed_scale(), 1.0);
        assert_eq!(ReplayFrameSource::new("a.log", -1.0).speed_scale(), 1.0);
        assert_eq!(ReplayFrameSource::new("a.log", 3.0).speed_scale(), 3.0);
    }

    #[test]
    fn next_frame_before_open_fails_fast() {
        let mut source = ReplayFrameSource::new("capture.log", DEFAULT_SPEED_SCALE);
        assert!(matches!(source.next_frame(), Err(SourceError::NotOpen)));
    }

    #[test]
    fn opening_a_missing_file_fails() {
        let mut source = ReplayFrameSource::new("/nonexistent/capture.log", DEFAULT_SPEED_SCALE);

        assert!(matches!(source.open(), Err(SourceError::Io(_))));
        assert!(!source.is_open());
    }

    #[test]
    fn paces_by_scaled_timestamp_gaps() {
        let (mut source, waits) = recording("(0.0) can0 001#01\n(1.0) can0 002#02\n", 2.0);

        assert_eq!(source.next_frame().unwrap(), Some(CanFrame::new(1, [0x01])));
        assert_eq!(source.next_frame().unwrap(), Some(CanFrame::new(2, [0x02])));
        assert_eq!(source.next_frame().unwrap(), None);

        assert_eq!(
            *waits.lock().unwrap(),
            vec![Duration::ZERO, Duration::from_millis(500)]
        );
        assert_eq!(source.clock(), 1.0);
    }

    #[test]
    fn earlier_timestamp_waits_zero() {
        let (mut source, waits) = recording("(2.0) can0 001#\n(1.0) can0 002#\n", 1.0);

        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());

        assert_eq!(
            *waits.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::ZERO]
        );
        assert_eq!(source.clock(), 1.0);
    }

    #[test]
    fn rejected_lines_do_not_move_the_clock() {
        let (mut source, waits) = recording("(5.0) can0 123#A\n(1.0) can0 001#\n", 1.0);

        assert!(matches!(source.next_frame(), Err(SourceError::Decode(_))));
        assert_eq!(source.clock(), 0.0);

        assert!(source.next_frame().unwrap().is_some());
        assert_eq!(*waits.lock().unwrap(), vec![Duration::from_secs(1)]);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let capture: &'static [u8] = b"(0.0) can\xFF0 001#\n(0.0) can0 002#\n";
        let mut source = ReplayFrameSource::from_reader(Cursor::new(capture), 1.0)
            .with_sleeper(|_: Duration| {});

        match source.next_frame() {
            Err(SourceError::Decode(err)) => {
                assert_eq!(err.reason, DecodeErrorReason::InvalidUtf8)
            }
            other => panic!("expected decode error, got {:?}", other),
        }
        assert_eq!(source.next_frame().unwrap(), Some(CanFrame::new(2, Vec::new())));
    }

    #[test]
    fn last_line_without_terminator() {
        let (mut source, _) = recording("(0.0) can0 0AB#CAFE", 1.0);

        assert_eq!(
            source.next_frame().unwrap(),
            Some(CanFrame::new(0xAB, [0xCA, 0xFE]))
        );
        assert_eq!(source.next_frame().unwrap(), None);
    }

    #[test]
    fn end_of_stream_repeats() {
        let (mut source, _) = recording("", 1.0);

        assert_eq!(source.next_frame().unwrap(), None);
        assert_eq!(source.next_frame().unwrap(), None);
    }

    #[test]
    fn real_sleep_is_applied() {
        let mut source =
            ReplayFrameSource::from_reader(Cursor::new("(0.0) can0 001#\n(0.2) can0 002#\n"), 2.0);

        source.next_frame().unwrap();
        let started = Instant::now();
        source.next_frame().unwrap();

        assert!(started.elapsed() >= Duration::from_millis(90));
    }
}
