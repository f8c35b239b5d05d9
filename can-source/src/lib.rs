//! Pull-based CAN frame sources.
//!
//! Two interchangeable implementations of [`MessageSource`] turn a textual
//! representation of CAN traffic into [`CanFrame`]s:
//!
//! - [`SerialFrameSource`] reads the `FRAME:ID=<n>:LEN=<k>:<hh>:...` protocol
//!   pushed by a device over a serial line.
//! - [`ReplayFrameSource`] replays a `candump` log, reproducing the recorded
//!   inter-frame delays scaled by a speed factor.
//!
//! Callers drive progress by calling [`MessageSource::next_frame`]; nothing
//! runs in the background.

pub mod config;
pub mod error;
pub mod frame;
pub mod replay;
pub mod serial;
pub mod source;

pub use config::SourceConfig;
pub use error::{DecodeErrorReason, FrameDecodeError, SourceError};
pub use frame::CanFrame;
pub use replay::{Pacer, ReplayFrameSource, Sleeper, ThreadSleeper};
pub use serial::{SerialFrameSource, SerialSettings};
pub use source::{AnySource, Frames, MessageSource};
