use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};

/// Default display refresh rate, in hertz.
pub const DEFAULT_REFRESH_HZ: f64 = 90.0;

/// A periodic refresh signal standing in for the platform display link.
///
/// Ticks are produced by a crossbeam ticker channel at a steady interval. Missed ticks are not
/// queued up; a slow consumer simply sees fewer of them.
pub struct DisplayLink {
    rate_hz: f64,
    interval: Duration,
    ticker: Receiver<Instant>,
}

impl DisplayLink {
    /// Create a link ticking at `rate_hz`. A non-positive or non-finite rate uses the default.
    pub fn new(rate_hz: f64) -> Self {
        let rate_hz = if rate_hz.is_finite() && rate_hz > 0.0 {
            rate_hz
        } else {
            DEFAULT_REFRESH_HZ
        };
        let interval = Duration::from_secs_f64(1.0 / rate_hz);
        Self {
            rate_hz,
            interval,
            ticker: channel::tick(interval),
        }
    }

    #[inline]
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until the next refresh and return its instant.
    pub fn next(&self) -> Option<Instant> {
        self.ticker.recv().ok()
    }

    /// Wait at most `timeout` for the next refresh.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Instant> {
        self.ticker.recv_timeout(timeout).ok()
    }

    /// Return a refresh that is already due, without blocking.
    pub fn try_next(&self) -> Option<Instant> {
        self.ticker.try_recv().ok()
    }
}

impl Default for DisplayLink {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_HZ)
    }
}
