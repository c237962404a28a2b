//! Demo applications: a supervisor publishing system status and simulated
//! vehicle speed, and an alert application muting audio while the vehicle is
//! over the speed limit.

use std::sync::atomic::{AtomicBool, Ordering};

use appman_kernel::{
    AppId, Application, Context, Message, MsgKind, TimerConfig, TimerHandler, TimerId,
};

use crate::{ROTATIONS, TIMERS};

pub const SUPERVISOR: AppId = AppId(1);
pub const SPEED_ALERT: AppId = AppId(2);

/// Firmware message catalogue
pub const SYSTEM_STATUS: MsgKind = MsgKind(0);
pub const VEHICLE_SPEED: MsgKind = MsgKind(1);
pub const AUDIO_MUTE_STATUS: MsgKind = MsgKind(5);

const STATUS_PERIOD_MS: u32 = 500;
const ALERT_HOLD_MS: u32 = 2_000;
const SPEED_LIMIT_KMH: u8 = 120;

static STATUS_OK: [u8; 1] = [1];
static MUTED: [u8; 1] = [1];
static UNMUTED: [u8; 1] = [0];

/// Simulated speed readings in km/h, one per status period
static SPEED_PROFILE: [[u8; 1]; 8] = [[40], [80], [125], [130], [90], [60], [140], [50]];

/// Timeout flag raised by a timer and consumed by an application's run step
pub struct Flag(AtomicBool);

impl Flag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Read and clear the flag
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

impl TimerHandler for Flag {
    fn on_timeout(&self, timer: TimerId) {
        log::trace!("{} expired", timer);
        self.0.store(true, Ordering::SeqCst);
    }
}

static STATUS_DUE: Flag = Flag::new();
static ALERT_EXPIRED: Flag = Flag::new();

/// Publishes a heartbeat status to everyone and feeds the alert application
/// with speed readings, both paced by a sequential timer.
#[derive(Debug, Default)]
pub struct Supervisor {
    status_timer: Option<TimerId>,
    heartbeat: u32,
    sample: usize,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Application<'a> for Supervisor {
    fn init(&mut self, _ctx: &mut Context<'_, 'a>) {
        let config = TimerConfig::sequential(STATUS_PERIOD_MS)
            .handler(&STATUS_DUE)
            .running();
        match TIMERS.create(config) {
            Ok(id) => self.status_timer = Some(id),
            Err(err) => log::error!("Status timer not created: {}", err),
        }
    }

    fn run(&mut self, ctx: &mut Context<'_, 'a>) {
        if !STATUS_DUE.take() {
            return;
        }

        self.heartbeat += 1;
        log::info!(
            "Heartbeat {} ({} rotations)",
            self.heartbeat,
            ROTATIONS.load(Ordering::Relaxed)
        );
        if let Err(err) = ctx.send(Message::new(AppId::ALL, SYSTEM_STATUS, &STATUS_OK)) {
            log::warn!("Status broadcast incomplete: {}", err);
        }

        let speed = &SPEED_PROFILE[self.sample % SPEED_PROFILE.len()];
        self.sample += 1;
        if let Err(err) = ctx.send(Message::new(SPEED_ALERT, VEHICLE_SPEED, speed)) {
            log::warn!("Speed sample dropped: {}", err);
        }
    }

    fn deinit(&mut self, _ctx: &mut Context<'_, 'a>) {
        if let Some(id) = self.status_timer.take() {
            let _ = TIMERS.stop(id);
        }
        log::info!("Supervisor stopped after {} heartbeats", self.heartbeat);
    }

    fn on_message(&mut self, msg: &Message<'a>, _ctx: &mut Context<'_, 'a>) {
        match msg.kind {
            AUDIO_MUTE_STATUS => {
                let muted = msg.payload.first() == Some(&1);
                log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
            }
            SYSTEM_STATUS => log::debug!("Supervisor status seen"),
            other => log::debug!("Supervisor ignores {}", other),
        }
    }
}

/// Mutes audio for a fixed hold time, measured by a strict timer, whenever a
/// speed reading goes over the limit.
#[derive(Debug, Default)]
pub struct SpeedAlert {
    hold_timer: Option<TimerId>,
    alerting: bool,
}

impl SpeedAlert {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify<'a>(&self, ctx: &mut Context<'_, 'a>, muted: bool) {
        let payload: &'static [u8] = if muted { &MUTED } else { &UNMUTED };
        if let Err(err) = ctx.send(Message::new(SUPERVISOR, AUDIO_MUTE_STATUS, payload)) {
            log::warn!("Mute status dropped: {}", err);
        }
    }
}

impl<'a> Application<'a> for SpeedAlert {
    fn init(&mut self, _ctx: &mut Context<'_, 'a>) {
        match TIMERS.create(TimerConfig::strict(ALERT_HOLD_MS).handler(&ALERT_EXPIRED)) {
            Ok(id) => self.hold_timer = Some(id),
            Err(err) => log::error!("Hold timer not created: {}", err),
        }
    }

    fn run(&mut self, ctx: &mut Context<'_, 'a>) {
        if !ALERT_EXPIRED.take() {
            return;
        }
        if let Some(id) = self.hold_timer {
            let _ = TIMERS.stop(id);
        }
        self.alerting = false;
        log::info!("Speed alert cleared");
        self.notify(ctx, false);
    }

    fn deinit(&mut self, _ctx: &mut Context<'_, 'a>) {
        if let Some(id) = self.hold_timer.take() {
            let _ = TIMERS.stop(id);
        }
    }

    fn on_message(&mut self, msg: &Message<'a>, ctx: &mut Context<'_, 'a>) {
        match msg.kind {
            VEHICLE_SPEED => {
                let Some(&speed) = msg.payload.first() else {
                    return;
                };
                log::debug!("Vehicle speed {} km/h", speed);
                if speed <= SPEED_LIMIT_KMH || self.alerting {
                    return;
                }
                let Some(id) = self.hold_timer else {
                    return;
                };
                if TIMERS.start(id).is_ok() {
                    self.alerting = true;
                    log::warn!("Over speed limit: {} km/h", speed);
                    self.notify(ctx, true);
                }
            }
            SYSTEM_STATUS => log::debug!("Alert status seen"),
            other => log::debug!("Alert ignores {}", other),
        }
    }
}
