//! Tick thread tests for appman-posix

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use appman_posix::{TickCounter, Ticker, TickerConfig};

#[test]
fn test_ticker_thread() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);

    // 100 Hz = 10ms period
    let config = TickerConfig::default().with_period_us(10_000);
    let mut ticker = Ticker::start(config, move || {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    assert!(ticker.is_running());

    thread::sleep(Duration::from_millis(100));
    ticker.stop();
    assert!(!ticker.is_running());

    let ticks = count.load(Ordering::SeqCst);
    // Roughly 10 ticks, with room for scheduling jitter
    assert!((5..=15).contains(&ticks), "Expected ~10 ticks, got {}", ticks);

    // No tick after stop
    thread::sleep(Duration::from_millis(30));
    assert_eq!(count.load(Ordering::SeqCst), ticks);
}

static CLOCK: TickCounter = TickCounter::new();

#[test]
fn test_systick_advances_clock_before_callback() {
    let mismatches = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (bad, seen) = (Arc::clone(&mismatches), Arc::clone(&calls));

    let config = TickerConfig::default().with_period_us(2_000);
    let ticker = Ticker::systick(config, &CLOCK, move || {
        let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
        if CLOCK.get() as usize != n {
            bad.fetch_add(1, Ordering::SeqCst);
        }
    })
    .unwrap();

    thread::sleep(Duration::from_millis(40));
    drop(ticker);

    assert!(calls.load(Ordering::SeqCst) > 0);
    assert_eq!(mismatches.load(Ordering::SeqCst), 0);
    assert_eq!(CLOCK.get() as usize, calls.load(Ordering::SeqCst));
}
