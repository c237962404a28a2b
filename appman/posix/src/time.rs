//! Tick thread for POSIX
//!
//! Generates the periodic tick on a dedicated thread. Sleeps until absolute
//! deadlines on the monotonic clock so the tick does not drift.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use appman_core::TickCounter;

/// Default tick period in microseconds
const DEFAULT_PERIOD_US: u64 = 1_000;

/// Tick thread configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerConfig {
    period_us: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            period_us: DEFAULT_PERIOD_US,
        }
    }
}

impl TickerConfig {
    /// Tick every `period_us` microseconds (at least one)
    pub fn with_period_us(mut self, period_us: u64) -> Self {
        self.period_us = period_us.max(1);
        self
    }

    /// Get the tick period as a Duration
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us)
    }
}

/// A running tick thread.
///
/// Stops and joins the thread when dropped.
pub struct Ticker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the tick thread, calling `on_tick` once per period.
    pub fn start<F>(config: TickerConfig, on_tick: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = config.period();

        let handle = thread::Builder::new()
            .name("appman-tick".into())
            .spawn(move || ticker_thread(period, &flag, on_tick))?;
        log::debug!("Ticker started, period {:?}", period);

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Spawn a tick thread standing in for SysTick: every period it advances
    /// `clock` by one, then calls `on_tick` (typically the strict-timer
    /// `tick`).
    pub fn systick<F>(
        config: TickerConfig,
        clock: &'static TickCounter,
        mut on_tick: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::start(config, move || {
            clock.increment();
            on_tick();
        })
    }

    /// Check if the thread is still ticking
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the tick thread and wait for it to finish
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Tick thread panicked");
            }
            log::debug!("Ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("running", &self.is_running())
            .finish()
    }
}

/// Sleeps until the next absolute deadline rather than for a relative
/// duration, so time spent in `on_tick` does not accumulate.
fn ticker_thread<F: FnMut()>(period: Duration, running: &AtomicBool, mut on_tick: F) {
    let mut next_tick = Instant::now();

    while running.load(Ordering::Relaxed) {
        next_tick += period;

        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        }

        on_tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_period() {
        assert_eq!(TickerConfig::default().period(), Duration::from_millis(1));
        let config = TickerConfig::default().with_period_us(10_000);
        assert_eq!(config.period(), Duration::from_millis(10));
        assert_eq!(
            TickerConfig::default().with_period_us(0).period(),
            Duration::from_micros(1)
        );
    }
}
