//! appman host demo
//!
//! Runs a supervisor and a speed-alert application on the cooperative
//! manager. A tick thread stands in for SysTick; the main thread is the
//! firmware main loop. Press Ctrl-C to shut the applications down.
//!
//! Set `RUST_LOG=debug` to follow message traffic.

use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use appman_kernel::{
    AppDescriptor, Manager, ManagerConfig, MessageBlock, Phase, TickCounter, TimerService,
    VERSION,
};
use appman_posix::{Ticker, TickerConfig};

mod apps;

use apps::{SpeedAlert, Supervisor, SPEED_ALERT, SUPERVISOR};

const MAX_APPS: usize = 4;
const MAX_TIMERS: usize = 4;
const POOL_BLOCKS: usize = 4;

static CLOCK: TickCounter = TickCounter::new();
static TIMERS: TimerService<'static, MAX_TIMERS> = TimerService::new(&CLOCK);

static ROTATIONS: AtomicU32 = AtomicU32::new(0);
static RUNNING: AtomicBool = AtomicBool::new(true);

/// Runs once per scheduler rotation, where firmware would kick its watchdog
fn count_rotation(_phase: Phase) {
    ROTATIONS.fetch_add(1, Ordering::Relaxed);
}

fn main() -> Result<(), Box<dyn Error>> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    ctrlc::set_handler(|| RUNNING.store(false, Ordering::SeqCst))?;
    let mut ticker = Ticker::systick(TickerConfig::default(), &CLOCK, || TIMERS.tick())?;

    let mut supervisor = Supervisor::new();
    let mut alert = SpeedAlert::new();
    let mut supervisor_pool = [MessageBlock::EMPTY; POOL_BLOCKS];
    let mut alert_pool = [MessageBlock::EMPTY; POOL_BLOCKS];

    let config = ManagerConfig::builder()
        .name("DEMO")
        .rotation_hook(count_rotation)
        .build();
    let mut manager: Manager<'_, MAX_APPS> = Manager::new(config).with_timers(&TIMERS);

    manager.register(
        AppDescriptor::new(SUPERVISOR)
            .name("SUPERVISOR")
            .app(&mut supervisor)
            .pool(&mut supervisor_pool),
    )?;
    manager.register(
        AppDescriptor::new(SPEED_ALERT)
            .name("SPEED_ALERT")
            .app(&mut alert)
            .pool(&mut alert_pool),
    )?;

    log::info!("appman {} running, Ctrl-C to stop", VERSION);
    while RUNNING.load(Ordering::SeqCst) {
        manager.process();
        thread::sleep(Duration::from_millis(1));
    }

    manager.shutdown();
    ticker.stop();
    log::info!("Stopped at {} ms", CLOCK.get());
    Ok(())
}
