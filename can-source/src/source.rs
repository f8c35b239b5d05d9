use crate::{CanFrame, ReplayFrameSource, SerialFrameSource, SourceError};

/// Common interface of everything that produces CAN frames.
///
/// A source owns exactly one I/O resource, acquired by [`open`](Self::open)
/// and released by [`close`](Self::close). A source is meant to be driven by a
/// single caller; use one instance per thread if frames are consumed
/// concurrently.
pub trait MessageSource {
    /// Acquires the underlying device or file.
    fn open(&mut self) -> Result<(), SourceError>;

    /// Releases the underlying resource. Does nothing if it was never opened.
    fn close(&mut self);

    /// Blocks until the next frame is available.
    ///
    /// Returns `Ok(None)` once a finite source is exhausted, and
    /// [`SourceError::NotOpen`] when called without an open resource.
    fn next_frame(&mut self) -> Result<Option<CanFrame>, SourceError>;

    fn is_open(&self) -> bool;

    /// Iterates over the remaining frames.
    ///
    /// Decode errors are yielded and iteration continues with the next line;
    /// any other error is yielded once and ends the iteration.
    fn frames(&mut self) -> Frames<'_, Self>
    where
        Self: Sized,
    {
        Frames {
            source: self,
            finished: false,
        }
    }
}

/// Iterator returned by [`MessageSource::frames`].
pub struct Frames<'a, S: ?Sized> {
    source: &'a mut S,
    finished: bool,
}

impl<S> Iterator for Frames<'_, S>
where
    S: MessageSource + ?Sized,
{
    type Item = Result<CanFrame, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.source.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = !err.is_decode();
                Some(Err(err))
            }
        }
    }
}

/// One of the two concrete sources, picked when the source is built.
pub enum AnySource {
    Serial(SerialFrameSource),
    Replay(ReplayFrameSource),
}

impl MessageSource for AnySource {
    fn open(&mut self) -> Result<(), SourceError> {
        match self {
            AnySource::Serial(source) => source.open(),
            AnySource::Replay(source) => source.open(),
        }
    }

    fn close(&mut self) {
        match self {
            AnySource::Serial(source) => source.close(),
            AnySource::Replay(source) => source.close(),
        }
    }

    fn next_frame(&mut self) -> Result<Option<CanFrame>, SourceError> {
        match self {
            AnySource::Serial(source) => source.next_frame(),
            AnySource::Replay(source) => source.next_frame(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            AnySource::Serial(source) => source.is_open(),
            AnySource::Replay(source) => source.is_open(),
        }
    }
}

impl From<SerialFrameSource> for AnySource {
    fn from(source: SerialFrameSource) -> Self {
        AnySource::Serial(source)
    }
}

impl From<ReplayFrameSource> for AnySource {
    fn from(source: ReplayFrameSource) -> Self {
        AnySource::Replay(source)
    }
}
