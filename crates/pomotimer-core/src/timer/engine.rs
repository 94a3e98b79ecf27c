//! Timer engine implementation.
//!
//! The engine is a caller-driven state machine. It does not spawn threads or
//! sleep: it records which tick stream is allowed to run (see [`Ticker`]) and
//! applies the tick rule when [`TimerEngine::tick`] is called with that
//! stream's handle. The async [`driver`](super::driver) is the usual caller.
//!
//! ## Phase transitions
//!
//! ```text
//! Work(i) -> ShortBreak         (i < last)
//! Work(last) -> LongBreak
//! ShortBreak -> Work(i + 1)
//! LongBreak -> reset -> Work(0)  (auto mode restarts the round)
//! ```
//!
//! Every mutation builds a new [`TimerState`], commits it, persists it and
//! then publishes it to subscribers, in that order.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::open(persistence, Box::new(NoopNotifier), Settings::default());
//! engine.toggle();
//! while let Some(handle) = engine.active_ticker() {
//!     // once per second:
//!     engine.tick(handle);
//! }
//! ```

use tracing::debug;

use super::indicator::Indicator;
use super::settings::Settings;
use super::state::{PhaseKind, TimerState};
use super::ticker::{TickHandle, Ticker};
use crate::events::{Subscribers, Subscription};
use crate::notify::NotificationPort;
use crate::storage::Persistence;

/// Host-issued operations, for hosts that queue them (see the driver).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle,
    Reset,
    Skip,
    UpdateSettings(Settings),
}

/// The single authoritative timer for a session.
pub struct TimerEngine {
    state: TimerState,
    ticker: Ticker,
    persistence: Persistence,
    notifier: Box<dyn NotificationPort>,
    subscribers: Subscribers,
}

impl TimerEngine {
    /// Build the engine from whatever `persistence` holds.
    ///
    /// Stored settings win over `default_settings`; a stored snapshot is
    /// merged over a fresh state after elapsed-time compensation. If the
    /// restored snapshot is still running, the tick stream is armed again.
    pub fn open(
        persistence: Persistence,
        notifier: Box<dyn NotificationPort>,
        default_settings: Settings,
    ) -> Self {
        let now = persistence.now_ms();
        let saved_settings = persistence.load_settings();
        let settings = saved_settings.unwrap_or(default_settings);

        let mut state = TimerState::fresh(settings, now);
        if let Some(stored) = persistence.load() {
            state = stored.apply_to(state);
            if let Some(saved) = saved_settings {
                state.settings = saved;
            }
            if state.indicators.len() != state.settings.cycles() {
                state.indicators = state.indicators.resized(state.settings.cycles());
            }
        }
        state.last_updated_at = now;

        let mut ticker = Ticker::default();
        if state.is_running {
            ticker.start();
        }
        debug!(
            phase = state.phase().as_str(),
            time_left = state.time_left,
            running = state.is_running,
            "timer engine opened"
        );

        Self {
            state,
            ticker,
            persistence,
            notifier,
            subscribers: Subscribers::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Copy of the current snapshot.
    pub fn get_state(&self) -> TimerState {
        self.state.clone()
    }

    /// Borrow the current snapshot without copying.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Handle of the tick stream that is currently allowed to run.
    pub fn active_ticker(&self) -> Option<TickHandle> {
        self.ticker.active()
    }

    /// Register a listener called with every committed snapshot.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TimerState) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start when stopped, stop when running.
    ///
    /// Starting a round that has not begun marks the first cycle in
    /// progress and loads a full work phase.
    pub fn toggle(&mut self) {
        let mut next = self.state.clone();
        if next.is_running {
            next.is_running = false;
            self.ticker.stop();
        } else {
            if next.indicators.all_not_started() {
                next.current_cycle = 0;
                next.indicators.set(0, Indicator::InProgress);
                next.is_work_cycle = true;
                next.time_left = next.settings.work_secs();
            }
            next.is_running = true;
            self.ticker.start();
        }
        debug!(running = next.is_running, "toggled");
        self.commit(next);
    }

    /// Stop and return to the start of a round.
    pub fn reset_all(&mut self) {
        self.ticker.stop();
        let next = TimerState::fresh(self.state.settings, self.state.last_updated_at);
        debug!("reset");
        self.commit(next);
    }

    /// End the current phase now, as if its time had run out.
    pub fn skip_step(&mut self) {
        self.ticker.stop();
        let mut next = self.state.clone();
        next.is_running = false;
        next.time_left = 0;
        let upcoming = self.end_phase(&mut next);
        self.commit(next);
        self.notifier.notify_phase(upcoming);
    }

    /// Replace the settings, reload the current phase's full duration and
    /// resize the indicators. Phase, cycle and running flag are untouched.
    pub fn update_settings(&mut self, settings: Settings) {
        let mut next = self.state.clone();
        next.settings = settings;
        next.time_left = settings.duration_secs(next.phase());
        if next.indicators.len() != settings.cycles() {
            next.indicators = next.indicators.resized(settings.cycles());
        }
        self.persistence.save_settings(&settings);
        debug!(?settings, "settings updated");
        self.commit(next);
    }

    /// Apply a queued [`Command`].
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Toggle => self.toggle(),
            Command::Reset => self.reset_all(),
            Command::Skip => self.skip_step(),
            Command::UpdateSettings(settings) => self.update_settings(settings),
        }
    }

    /// One firing of the 1 Hz stream identified by `handle`.
    ///
    /// Ticks from a stream that has since been stopped or replaced are
    /// ignored. Returns whether the tick was applied.
    pub fn tick(&mut self, handle: TickHandle) -> bool {
        if !self.ticker.accepts(handle) || !self.state.is_running {
            return false;
        }

        let mut next = self.state.clone();
        if next.time_left <= 1 {
            self.ticker.stop();
            next.is_running = false;
            next.time_left = 0;
            let upcoming = self.end_phase(&mut next);
            self.commit(next);
            self.notifier.notify_phase(upcoming);
        } else {
            next.time_left -= 1;
            self.commit(next);
        }
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Move `next` from the phase that just ended into the following one and
    /// re-arm the ticker unless in manual mode. Returns the new phase.
    fn end_phase(&mut self, next: &mut TimerState) -> PhaseKind {
        let settings = next.settings;
        let ended = next.phase();

        if next.is_work_cycle {
            next.indicators.set(next.current_cycle, Indicator::Completed);
            if next.current_cycle + 1 >= settings.cycles() {
                next.needs_long_break = true;
                next.time_left = settings.long_break_secs();
            } else {
                next.time_left = settings.short_break_secs();
            }
            next.is_work_cycle = false;
        } else if next.needs_long_break {
            *next = TimerState::fresh(settings, next.last_updated_at);
            if !settings.manual_mode {
                next.indicators.set(0, Indicator::InProgress);
                next.time_left = settings.work_secs();
            }
        } else {
            next.current_cycle += 1;
            if next.current_cycle < settings.cycles() {
                next.indicators.set(next.current_cycle, Indicator::InProgress);
            }
            next.time_left = settings.work_secs();
            next.is_work_cycle = true;
        }

        if settings.manual_mode {
            next.is_running = false;
        } else {
            next.is_running = true;
            self.ticker.start();
        }

        let upcoming = next.phase();
        debug!(
            ended = ended.as_str(),
            upcoming = upcoming.as_str(),
            cycle = next.current_cycle,
            auto = !settings.manual_mode,
            "phase ended"
        );
        upcoming
    }

    /// Install `next`, persist it, then tell subscribers.
    fn commit(&mut self, mut next: TimerState) {
        next.last_updated_at = self.persistence.save(&next);
        self.state = next;
        self.subscribers.publish(&self.state);
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("ticker", &self.ticker)
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}
