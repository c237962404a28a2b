//! Timer table shared between the tick interrupt and the main loop

use core::cell::RefCell;

use appman_core::{AmError, AmResult, TickSource};
use critical_section::Mutex;
use heapless::Vec;

use crate::{TimerConfig, TimerHandler, TimerId, TimerMode, TimerState};

struct TimerSlot<'a> {
    handler: &'a dyn TimerHandler,
    mode: TimerMode,
    state: TimerState,
    interval_ms: u32,
    /// Ticks left (strict) or absolute deadline in ms (sequential)
    remaining: u32,
}

impl<'a> TimerSlot<'a> {
    fn arm(&mut self, now: u32) {
        self.remaining = match self.mode {
            TimerMode::Strict => self.interval_ms,
            // Not wraparound-safe: a deadline past u32::MAX wraps to a small
            // value and is considered reached immediately.
            TimerMode::Sequential => now.wrapping_add(self.interval_ms),
        };
    }
}

enum Sweep<'a> {
    End,
    Skip,
    Fire(&'a dyn TimerHandler),
}

/// Fixed-capacity set of software timers.
///
/// Timers are never removed, only started and stopped. The service is meant
/// to live in a `static` so that the tick interrupt can reach it:
///
/// ```ignore
/// static CLOCK: TickCounter = TickCounter::new();
/// static TIMERS: TimerService<'static, 8> = TimerService::new(&CLOCK);
///
/// #[exception]
/// fn SysTick() {
///     CLOCK.increment();
///     TIMERS.tick();
/// }
/// ```
pub struct TimerService<'a, const N: usize> {
    clock: &'a dyn TickSource,
    slots: Mutex<RefCell<Vec<TimerSlot<'a>, N>>>,
}

impl<'a, const N: usize> TimerService<'a, N> {
    /// Create an empty service reading time from `clock`
    pub const fn new(clock: &'a dyn TickSource) -> Self {
        Self {
            clock,
            slots: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a timer.
    ///
    /// A timer created with [`TimerState::Running`] is armed immediately;
    /// any other requested state leaves it [`TimerState::Idle`].
    pub fn create(&self, config: TimerConfig<'a>) -> AmResult<TimerId> {
        let Some(handler) = config.handler else {
            log::error!("Invalid argument in timer create: no handler");
            return Err(AmError::InvalidParam);
        };
        if config.interval_ms == 0 {
            log::error!("Invalid argument in timer create: zero interval");
            return Err(AmError::InvalidParam);
        }

        let now = self.clock.now_ms();
        let created = critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let Ok(raw) = u16::try_from(slots.len()) else {
                return Err(AmError::RegistryFull);
            };
            let id = TimerId(raw);
            let mut slot = TimerSlot {
                handler,
                mode: config.mode,
                state: TimerState::Idle,
                interval_ms: config.interval_ms,
                remaining: 0,
            };
            if config.state == TimerState::Running {
                slot.arm(now);
                slot.state = TimerState::Running;
            }
            slots.push(slot).map(|_| id).map_err(|_| AmError::RegistryFull)
        });

        match created {
            Ok(id) => {
                log::info!(
                    "Timer created; id:{}, mode:{}, interval:{}",
                    id.0,
                    config.mode,
                    config.interval_ms
                );
                if config.state == TimerState::Running {
                    log::info!("Timer started; id:{}", id.0);
                }
            }
            Err(_) => log::error!("Timer table full ({} timers)", N),
        }
        created
    }

    /// Arm a timer and mark it running.
    ///
    /// Starting a timer that is already running leaves its countdown
    /// untouched.
    pub fn start(&self, id: TimerId) -> AmResult<()> {
        let now = self.clock.now_ms();
        let started = self.with_slot(id, |slot| {
            if slot.state == TimerState::Running {
                return false;
            }
            slot.arm(now);
            slot.state = TimerState::Running;
            true
        })?;
        if started {
            log::debug!("Timer started; id:{}", id.0);
        }
        Ok(())
    }

    /// Mark a timer stopped, keeping its countdown.
    pub fn stop(&self, id: TimerId) -> AmResult<()> {
        self.with_slot(id, |slot| slot.state = TimerState::Stopped)?;
        log::debug!("Timer stopped; id:{}", id.0);
        Ok(())
    }

    /// Current state of a timer
    pub fn state(&self, id: TimerId) -> AmResult<TimerState> {
        self.with_slot(id, |slot| slot.state)
    }

    /// Ticks left (strict) or absolute deadline (sequential)
    pub fn remaining(&self, id: TimerId) -> AmResult<u32> {
        self.with_slot(id, |slot| slot.remaining)
    }

    /// Mode a timer was created with
    pub fn mode(&self, id: TimerId) -> AmResult<TimerMode> {
        self.with_slot(id, |slot| slot.mode)
    }

    /// Number of created timers
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.slots.borrow_ref(cs).len())
    }

    /// Check if no timer was created
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tick-interrupt entry point, to be called once per millisecond.
    ///
    /// Each running strict timer loses one tick; a timer reaching zero is
    /// reloaded with its interval and its handler runs right here, in
    /// interrupt context.
    pub fn tick(&self) {
        let mut index = 0;
        loop {
            let step = critical_section::with(|cs| {
                let mut slots = self.slots.borrow_ref_mut(cs);
                let Some(slot) = slots.get_mut(index) else {
                    return Sweep::End;
                };
                if slot.mode != TimerMode::Strict || slot.state != TimerState::Running {
                    return Sweep::Skip;
                }
                slot.remaining = slot.remaining.saturating_sub(1);
                if slot.remaining != 0 {
                    return Sweep::Skip;
                }
                slot.remaining = slot.interval_ms;
                Sweep::Fire(slot.handler)
            });

            match step {
                Sweep::End => break,
                Sweep::Skip => {}
                Sweep::Fire(handler) => {
                    log::trace!("Timeout occurred; id:{}", index);
                    // create() never hands out an index past u16::MAX
                    handler.on_timeout(TimerId(index as u16));
                }
            }
            index += 1;
        }
    }

    /// Main-loop sweep over sequential timers.
    ///
    /// A running timer whose deadline is at or before the current tick runs
    /// its handler and is re-armed at "now + interval", now being read after
    /// the handler returns.
    pub fn poll(&self) {
        let mut index = 0;
        loop {
            let now = self.clock.now_ms();
            let step = critical_section::with(|cs| {
                let slots = self.slots.borrow_ref(cs);
                let Some(slot) = slots.get(index) else {
                    return Sweep::End;
                };
                if slot.mode == TimerMode::Sequential
                    && slot.state == TimerState::Running
                    && slot.remaining <= now
                {
                    Sweep::Fire(slot.handler)
                } else {
                    Sweep::Skip
                }
            });

            match step {
                Sweep::End => break,
                Sweep::Skip => {}
                Sweep::Fire(handler) => {
                    log::trace!("Timeout occurred; id:{}", index);
                    // create() never hands out an index past u16::MAX
                    let id = TimerId(index as u16);
                    handler.on_timeout(id);
                    let now = self.clock.now_ms();
                    let _ = self.with_slot(id, |slot| slot.arm(now));
                }
            }
            index += 1;
        }
    }

    fn with_slot<R>(&self, id: TimerId, f: impl FnOnce(&mut TimerSlot<'a>) -> R) -> AmResult<R> {
        let result = critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            slots.get_mut(id.index()).map(f)
        });
        result.ok_or_else(|| {
            log::error!("Unknown timer; id:{}", id.0);
            AmError::TimerNotCreated
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appman_core::TickCounter;
    use core::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_create_rejects_missing_handler() {
        let clock = TickCounter::new();
        let timers: TimerService<'_, 2> = TimerService::new(&clock);
        assert_eq!(
            timers.create(TimerConfig::strict(5)),
            Err(AmError::InvalidParam)
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn test_create_rejects_zero_interval() {
        static FIRED: AtomicU32 = AtomicU32::new(0);
        let handler = |_id: TimerId| {
            FIRED.fetch_add(1, Ordering::SeqCst);
        };
        let clock = TickCounter::new();
        let timers: TimerService<'_, 2> = TimerService::new(&clock);
        assert_eq!(
            timers.create(TimerConfig::sequential(0).handler(&handler)),
            Err(AmError::InvalidParam)
        );
    }

    #[test]
    fn test_table_full() {
        let handler = |_id: TimerId| {};
        let clock = TickCounter::new();
        let timers: TimerService<'_, 1> = TimerService::new(&clock);
        assert!(timers.create(TimerConfig::strict(1).handler(&handler)).is_ok());
        assert_eq!(
            timers.create(TimerConfig::strict(1).handler(&handler)),
            Err(AmError::RegistryFull)
        );
    }

    #[test]
    fn test_unknown_timer() {
        let clock = TickCounter::new();
        let timers: TimerService<'_, 1> = TimerService::new(&clock);
        assert_eq!(timers.start(TimerId(0)), Err(AmError::TimerNotCreated));
        assert_eq!(timers.stop(TimerId(3)), Err(AmError::TimerNotCreated));
    }
}
