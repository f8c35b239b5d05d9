use std::thread;
use std::time::Duration;

/// The single place where replay waits.
///
/// [`ThreadSleeper`] blocks the current thread; tests substitute a closure that
/// records the requested durations instead.
pub trait Sleeper: Send {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

impl<F> Sleeper for F
where
    F: FnMut(Duration) + Send,
{
    fn sleep(&mut self, duration: Duration) {
        self(duration)
    }
}

/// Turns capture timestamps into waits.
///
/// Keeps the timestamp of the last emitted frame (the replay clock, starting at
/// zero) and scales gaps by `speed_scale`: `2.0` replays twice as fast as the
/// capture, `0.5` half as fast.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacer {
    speed_scale: f64,
    clock: f64,
}

impl Pacer {
    /// Non-positive or non-finite scales fall back to real time.
    pub fn new(speed_scale: f64) -> Self {
        Self {
            speed_scale: normalize_speed_scale(speed_scale),
            clock: 0.0,
        }
    }

    pub fn speed_scale(&self) -> f64 {
        self.speed_scale
    }

    /// Timestamp, in seconds, of the last frame passed to [`advance`](Self::advance).
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Returns how long to wait before emitting a frame recorded at
    /// `timestamp`, and moves the clock to it.
    ///
    /// A timestamp behind the clock yields a zero wait. Captures are not
    /// required to be monotonic and no anomaly is reported. Gaps too long for
    /// a `Duration` saturate.
    pub fn advance(&mut self, timestamp: f64) -> Duration {
        let delay = (timestamp - self.clock) / self.speed_scale;
        self.clock = timestamp;

        if delay.is_nan() || delay <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(delay).unwrap_or(Duration::MAX)
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

pub fn normalize_speed_scale(speed_scale: f64) -> f64 {
    if speed_scale.is_finite() && speed_scale > 0.0 {
        speed_scale
    } else {
        1.0
    }
}
