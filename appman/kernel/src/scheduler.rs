//! Two-phase round-robin scheduler

use core::fmt;

use appman_core::{AmError, AmResult, AppId, Message};
use appman_mem::PoolStats;
use appman_timer::TimerPoll;

use crate::{post, AppDescriptor, ManagerConfig, Registry, DEFAULT_MAX_APPS};

/// Global scheduling phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First rotation: every application's `init` runs once
    Bringup,
    /// Every later rotation: every application's `run` runs once
    Run,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Bringup => write!(f, "BRINGUP"),
            Phase::Run => write!(f, "RUN"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Phase {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Phase::Bringup => defmt::write!(fmt, "BRINGUP"),
            Phase::Run => defmt::write!(fmt, "RUN"),
        }
    }
}

/// Position of the scheduler: the application the next step runs, and the
/// phase it runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub phase: Phase,
}

impl Cursor {
    const START: Self = Self {
        index: 0,
        phase: Phase::Bringup,
    };

    /// Move to the next application. Returns `true` when the cursor wrapped
    /// back to the first one; the first wrap ends bring-up.
    fn advance(&mut self, len: usize) -> bool {
        self.index += 1;
        if self.index < len {
            return false;
        }
        self.index = 0;
        self.phase = Phase::Run;
        true
    }
}

/// The application manager.
///
/// Owns the registry and the scheduler state; everything runs from the
/// caller's main loop through [`Manager::process`].
pub struct Manager<'a, const APPS: usize = DEFAULT_MAX_APPS> {
    config: ManagerConfig,
    registry: Registry<'a, APPS>,
    cursor: Cursor,
    timers: Option<&'a dyn TimerPoll>,
}

impl<'a, const APPS: usize> Manager<'a, APPS> {
    /// Create a manager with no applications, in bring-up
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            cursor: Cursor::START,
            timers: None,
        }
    }

    /// Sweep `timers` at the end of every driving call
    pub fn with_timers(mut self, timers: &'a dyn TimerPoll) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Register an application. See [`Registry::register`].
    pub fn register(&mut self, desc: AppDescriptor<'a>) -> AmResult<()> {
        self.registry.register(desc)
    }

    /// Send a message from outside any application callback
    pub fn send(&mut self, msg: Message<'a>) -> AmResult<()> {
        self.registry.send(msg)
    }

    /// One scheduling step.
    ///
    /// Runs the application under the cursor and advances it, delivers every
    /// queued message of the application the cursor then points to, and
    /// finally evaluates the sequential timers.
    pub fn process(&mut self) {
        if !self.registry.is_empty() {
            self.step();
            self.registry.drain(self.cursor.index);
        }
        if let Some(timers) = self.timers {
            timers.poll();
        }
    }

    /// Call `deinit` on every application, in registration order
    pub fn shutdown(&mut self) {
        log::info!("{} shutting down", self.config.name);
        for index in 0..self.registry.len() {
            self.registry.with_app(index, |app, ctx| app.deinit(ctx));
        }
    }

    fn step(&mut self) {
        let Cursor { index, phase } = self.cursor;
        let name = self
            .registry
            .slots()
            .get(index)
            .map(|slot| slot.name())
            .unwrap_or("?");

        self.registry.with_app(index, |app, ctx| match phase {
            Phase::Bringup => {
                log::info!("{} init", name);
                app.init(ctx);
            }
            Phase::Run => {
                log::trace!("{} run", name);
                app.run(ctx);
            }
        });

        if self.cursor.advance(self.registry.len()) {
            if phase == Phase::Bringup {
                log::info!("{} bring-up complete", self.config.name);
            }
            if let Some(hook) = self.config.rotation_hook {
                hook(self.cursor.phase);
            }
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.cursor.phase
    }

    /// Current scheduler position
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of registered applications
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no application is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Messages waiting in an application's inbox
    pub fn pending(&self, id: AppId) -> AmResult<usize> {
        self.mailbox_query(id, |mailbox| mailbox.pending())
    }

    /// Free blocks in an application's pool
    pub fn free_blocks(&self, id: AppId) -> AmResult<usize> {
        self.mailbox_query(id, |mailbox| mailbox.free_len())
    }

    /// Statistics of an application's pool
    pub fn pool_stats(&self, id: AppId) -> AmResult<PoolStats> {
        self.mailbox_query(id, |mailbox| mailbox.stats())
    }

    /// Timer service swept by [`Manager::process`]
    pub fn timers(&self) -> Option<&'a dyn TimerPoll> {
        self.timers
    }

    /// Manager configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Registration table
    pub fn registry(&self) -> &Registry<'a, APPS> {
        &self.registry
    }

    fn mailbox_query<R>(
        &self,
        id: AppId,
        f: impl FnOnce(&appman_mem::Mailbox<'a>) -> R,
    ) -> AmResult<R> {
        post::find(self.registry.slots(), id)?
            .mailbox()
            .map(f)
            .ok_or(AmError::PoolNotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_wraps_into_run() {
        let mut cursor = Cursor::START;
        assert!(!cursor.advance(2));
        assert_eq!(cursor.phase, Phase::Bringup);
        assert!(cursor.advance(2));
        assert_eq!(cursor, Cursor { index: 0, phase: Phase::Run });
        assert!(cursor.advance(1));
        assert_eq!(cursor.phase, Phase::Run);
    }

    #[test]
    fn test_empty_manager_only_sweeps_timers() {
        let mut manager: Manager<'_, 2> = Manager::new(ManagerConfig::default());
        manager.process();
        assert_eq!(manager.cursor(), Cursor::START);
        assert!(manager.is_empty());
        assert_eq!(manager.pending(AppId(1)), Err(AmError::AppNotFound));
    }
}
