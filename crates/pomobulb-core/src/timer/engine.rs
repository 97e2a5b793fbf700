//! Phase-cycle engine.
//!
//! Runs Work, ShortBreak and LongBreak phases in a loop until the shutdown
//! future resolves.
//!
//! ## State Transitions
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> Work -> LongBreak -> Work
//!   \______________________ any ______________________/ -> Stopped
//! ```
//!
//! On entering a phase the engine applies the bulb payload, then shows the
//! desktop popup, then counts down one second at a time. Channel failures are
//! logged and never interrupt the cycle.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseEngine::new(pomodoro, channels, WallClockTicker::default());
//! let summary = engine.run(async { let _ = tokio::signal::ctrl_c().await; }).await;
//! ```

use chrono::Utc;
use std::future::Future;
use tracing::{debug, info, warn};

use super::countdown::{Countdown, Ticker};
use super::phase::{CyclePosition, Phase};
use crate::channels::{Channels, NOTIFICATION_TITLE};
use crate::events::Event;
use crate::storage::PomodoroConfig;

type Observer = Box<dyn FnMut(&Event) + Send>;

/// Where the engine was when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub phase: Phase,
    pub position: CyclePosition,
}

pub struct PhaseEngine<T: Ticker> {
    pomodoro: PomodoroConfig,
    channels: Channels,
    ticker: T,
    phase: Phase,
    position: CyclePosition,
    stopped: bool,
    observer: Option<Observer>,
}

impl<T: Ticker> PhaseEngine<T> {
    /// Starts at Work with an empty cycle position.
    pub fn new(pomodoro: PomodoroConfig, channels: Channels, ticker: T) -> Self {
        Self {
            pomodoro,
            channels,
            ticker,
            phase: Phase::Work,
            position: CyclePosition::default(),
            stopped: false,
            observer: None,
        }
    }

    /// Receive every [`Event`] the engine emits.
    pub fn with_observer(mut self, observer: impl FnMut(&Event) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> CyclePosition {
        self.position
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Cycle through phases until `shutdown` resolves.
    ///
    /// The phase in progress is abandoned at its current tick: no completion
    /// event is emitted and the cycle position is left as it was. The bulb is
    /// turned off exactly once; running a stopped engine again is a no-op.
    pub async fn run<S>(&mut self, shutdown: S) -> RunSummary
    where
        S: Future<Output = ()>,
    {
        if self.stopped {
            return self.summary();
        }

        tokio::pin!(shutdown);
        loop {
            let completed = tokio::select! {
                biased;
                _ = &mut shutdown => false,
                _ = self.run_phase() => true,
            };
            if !completed {
                return self.stop();
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn run_phase(&mut self) {
        let phase = self.phase;
        let minutes = phase.minutes(&self.pomodoro);
        self.enter(phase, minutes).await;

        self.ticker.start();
        for remaining in Countdown::new(minutes) {
            self.emit(Event::Tick { phase, remaining });
            self.ticker.wait().await;
        }

        self.complete(phase);
    }

    /// Channel calls block, so the engine yields after each one to let a
    /// pending shutdown win before the next signal goes out.
    async fn enter(&mut self, phase: Phase, minutes: u32) {
        info!(
            %phase,
            minutes,
            cycle = self.position.cycle_index,
            pomodoro = self.position.pomodoro_index,
            "phase started"
        );

        if let Some(payloads) = &self.channels.payloads {
            let payload = payloads.for_phase(phase);
            debug!(bulb = self.channels.bulb.name(), ?payload, "applying bulb payload");
            if let Err(e) = self.channels.bulb.apply(payload) {
                warn!(bulb = self.channels.bulb.name(), error = %e, "bulb update failed");
            }
            tokio::task::yield_now().await;
        }

        if let Err(e) = self
            .channels
            .desktop
            .notify(NOTIFICATION_TITLE, phase.start_message())
        {
            warn!(error = %e, "desktop notification failed");
        }
        tokio::task::yield_now().await;

        self.emit(Event::PhaseStarted {
            phase,
            cycle_index: self.position.cycle_index,
            pomodoro_index: self.position.pomodoro_index,
            duration_secs: u64::from(minutes) * 60,
            at: Utc::now(),
        });
    }

    fn complete(&mut self, phase: Phase) {
        let next = self
            .position
            .complete(phase, self.pomodoro.cycles_before_long_break);
        debug!(%phase, %next, position = ?self.position, "phase completed");
        self.emit(Event::PhaseCompleted {
            phase,
            next,
            cycle_index: self.position.cycle_index,
            pomodoro_index: self.position.pomodoro_index,
            at: Utc::now(),
        });
        self.phase = next;
    }

    fn stop(&mut self) -> RunSummary {
        self.stopped = true;
        info!(phase = %self.phase, "stopping");
        if let Err(e) = self.channels.bulb.turn_off() {
            warn!(bulb = self.channels.bulb.name(), error = %e, "failed to turn bulb off");
        }
        self.emit(Event::Stopped {
            phase: self.phase,
            cycle_index: self.position.cycle_index,
            pomodoro_index: self.position.pomodoro_index,
            at: Utc::now(),
        });
        self.summary()
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            phase: self.phase,
            position: self.position,
        }
    }

    fn emit(&mut self, event: Event) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}

impl<T: Ticker> std::fmt::Debug for PhaseEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseEngine")
            .field("pomodoro", &self.pomodoro)
            .field("channels", &self.channels)
            .field("phase", &self.phase)
            .field("position", &self.position)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}
