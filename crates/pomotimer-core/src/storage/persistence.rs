//! Snapshot persistence and rehydration.
//!
//! Two records live in the key-value store:
//!
//! - `pomodoroSettings`: the [`Settings`] JSON, no expiry.
//! - `timerState`: the [`TimerState`] JSON with `lastUpdatedAt`, on a
//!   rolling expiry refreshed by every save.
//!
//! Failures never reach the engine. Writes that fail are logged and the
//! in-memory state stays authoritative; unreadable records load as absent.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::KeyValueStore;
use crate::clock::Clock;
use crate::timer::{Indicator, IndicatorSequence, Settings, TimerState};

pub const SETTINGS_KEY: &str = "pomodoroSettings";
pub const STATE_KEY: &str = "timerState";

/// Default lifetime of the `timerState` record.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A `timerState` record as read back from storage. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredTimer {
    pub time_left: Option<u64>,
    pub is_running: Option<bool>,
    pub is_work_cycle: Option<bool>,
    pub current_cycle: Option<usize>,
    pub needs_long_break: Option<bool>,
    pub indicators: Option<Vec<Indicator>>,
    pub settings: Option<Settings>,
    pub last_updated_at: Option<i64>,
}

impl StoredTimer {
    /// Subtract the seconds that passed since `lastUpdatedAt` from a record
    /// that was saved while running.
    ///
    /// When the phase would have run out, the record is parked one second
    /// before its end and marked not running, so the next start fires the
    /// phase-end transition exactly once.
    pub fn compensate(&mut self, now_ms: i64) {
        if self.is_running != Some(true) {
            return;
        }
        let Some(time_left) = self.time_left.filter(|t| *t > 0) else {
            return;
        };

        let last = self.last_updated_at.unwrap_or(now_ms);
        let elapsed_secs = u64::try_from(now_ms.saturating_sub(last).max(0) / 1000).unwrap_or(0);
        let remaining = time_left.saturating_sub(elapsed_secs);

        if remaining == 0 {
            self.is_running = Some(false);
            self.time_left = Some(1);
        } else {
            self.time_left = Some(remaining);
        }
    }

    /// Overlay the stored fields on `base`, keeping `base` where a field is absent.
    pub fn apply_to(self, base: TimerState) -> TimerState {
        TimerState {
            time_left: self.time_left.unwrap_or(base.time_left),
            is_running: self.is_running.unwrap_or(base.is_running),
            is_work_cycle: self.is_work_cycle.unwrap_or(base.is_work_cycle),
            current_cycle: self.current_cycle.unwrap_or(base.current_cycle),
            needs_long_break: self.needs_long_break.unwrap_or(base.needs_long_break),
            indicators: self
                .indicators
                .map(IndicatorSequence::from)
                .unwrap_or(base.indicators),
            settings: self.settings.unwrap_or(base.settings),
            last_updated_at: base.last_updated_at,
        }
    }
}

/// Reads and writes engine state through a [`KeyValueStore`].
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state_ttl: Duration,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            state_ttl: DEFAULT_STATE_TTL,
        }
    }

    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Write `state` stamped with the current time. Returns the stamp.
    pub fn save(&self, state: &TimerState) -> i64 {
        let now = self.now_ms();
        let stamped = TimerState {
            last_updated_at: now,
            ..state.clone()
        };
        let ttl_ms = i64::try_from(self.state_ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);

        match serde_json::to_string(&stamped) {
            Ok(json) => {
                if let Err(e) = self.store.set(STATE_KEY, &json, Some(expires_at)) {
                    warn!(error = %e, "failed to save timer state; keeping it in memory");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize timer state"),
        }
        now
    }

    pub fn save_settings(&self, settings: &Settings) {
        match serde_json::to_string(settings) {
            Ok(json) => {
                if let Err(e) = self.store.set(SETTINGS_KEY, &json, None) {
                    warn!(error = %e, "failed to save settings; keeping them in memory");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize settings"),
        }
    }

    pub fn load_settings(&self) -> Option<Settings> {
        let raw = self.read(SETTINGS_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(error = %e, "ignoring malformed stored settings");
                None
            }
        }
    }

    /// Last saved snapshot, already compensated for time spent not ticking.
    pub fn load(&self) -> Option<StoredTimer> {
        let raw = self.read(STATE_KEY)?;
        let mut stored: StoredTimer = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "ignoring malformed stored timer state");
                return None;
            }
        };

        let was_running = stored.is_running == Some(true);
        stored.compensate(self.now_ms());
        if was_running {
            if stored.is_running == Some(true) {
                info!(time_left = ?stored.time_left, "resuming running phase");
            } else {
                info!("phase ran out while inactive; parked for one transition");
            }
        }
        Some(stored)
    }

    /// Remove both records.
    pub fn clear(&self) {
        for key in [STATE_KEY, SETTINGS_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(error = %e, key, "failed to remove stored record");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key, self.now_ms()) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, key, "failed to read stored record");
                None
            }
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("state_ttl", &self.state_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{CoreError, StorageError};
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    const NOW: i64 = 1_700_000_000_000;

    fn fixture() -> (Rc<MemoryStore>, Arc<ManualClock>, Persistence) {
        let store = Rc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        let persistence = Persistence::new(Box::new(Rc::clone(&store)), clock.clone());
        (store, clock, persistence)
    }

    fn running(time_left: u64, last_updated_at: i64) -> StoredTimer {
        StoredTimer {
            time_left: Some(time_left),
            is_running: Some(true),
            last_updated_at: Some(last_updated_at),
            ..StoredTimer::default()
        }
    }

    #[test]
    fn overdue_running_phase_is_parked_at_one_second() {
        let mut stored = running(10, NOW - 15_000);
        stored.compensate(NOW);
        assert_eq!(stored.is_running, Some(false));
        assert_eq!(stored.time_left, Some(1));
    }

    #[test]
    fn running_phase_loses_elapsed_whole_seconds() {
        let mut stored = running(100, NOW - 30_900);
        stored.compensate(NOW);
        assert_eq!(stored.is_running, Some(true));
        assert_eq!(stored.time_left, Some(70));
    }

    #[test]
    fn paused_record_is_left_alone() {
        let mut stored = StoredTimer {
            is_running: Some(false),
            ..running(100, NOW - 60_000)
        };
        stored.compensate(NOW);
        assert_eq!(stored.time_left, Some(100));
    }

    #[test]
    fn clock_moving_backwards_counts_as_no_time() {
        let mut stored = running(100, NOW + 60_000);
        stored.compensate(NOW);
        assert_eq!(stored.time_left, Some(100));
        assert_eq!(stored.is_running, Some(true));
    }

    #[test]
    fn apply_keeps_base_for_missing_fields() {
        let base = TimerState::fresh(Settings::default(), NOW);
        let merged = StoredTimer {
            time_left: Some(42),
            is_work_cycle: Some(false),
            ..StoredTimer::default()
        }
        .apply_to(base.clone());
        assert_eq!(merged.time_left, 42);
        assert!(!merged.is_work_cycle);
        assert_eq!(merged.indicators, base.indicators);
        assert_eq!(merged.settings, base.settings);
    }

    #[test]
    fn save_stamps_time_and_sets_rolling_expiry() {
        let (store, clock, persistence) = fixture();
        let state = TimerState::fresh(Settings::default(), 0);

        assert_eq!(persistence.save(&state), NOW);
        let raw: serde_json::Value = serde_json::from_str(&store.raw(STATE_KEY).unwrap()).unwrap();
        assert_eq!(raw["lastUpdatedAt"], NOW);
        assert_eq!(store.expires_at(STATE_KEY), Some(NOW + 86_400_000));

        clock.advance_secs(60);
        persistence.save(&state);
        assert_eq!(store.expires_at(STATE_KEY), Some(NOW + 60_000 + 86_400_000));
    }

    #[test]
    fn stale_state_expires() {
        let (_store, clock, persistence) = fixture();
        persistence.save(&TimerState::fresh(Settings::default(), 0));
        clock.advance_secs(24 * 60 * 60);
        assert!(persistence.load().is_none());
    }

    #[test]
    fn settings_have_no_expiry() {
        let (store, clock, persistence) = fixture();
        let settings = Settings {
            work_duration: 50,
            ..Settings::default()
        };
        persistence.save_settings(&settings);
        assert_eq!(store.expires_at(SETTINGS_KEY), None);
        clock.advance_secs(365 * 24 * 60 * 60);
        assert_eq!(persistence.load_settings(), Some(settings));
    }

    #[test]
    fn malformed_records_load_as_absent() {
        let (store, _clock, persistence) = fixture();
        store.set(STATE_KEY, "{not json", None).unwrap();
        store.set(SETTINGS_KEY, "[]", None).unwrap();
        assert!(persistence.load().is_none());
        assert!(persistence.load_settings().is_none());
    }

    #[test]
    fn load_compensates_with_clock() {
        let (_store, clock, persistence) = fixture();
        let mut state = TimerState::fresh(Settings::default(), 0);
        state.is_running = true;
        state.time_left = 10;
        persistence.save(&state);

        clock.advance_secs(15);
        let stored = persistence.load().unwrap();
        assert_eq!(stored.is_running, Some(false));
        assert_eq!(stored.time_left, Some(1));
    }

    #[test]
    fn clear_removes_both_records() {
        let (_store, _clock, persistence) = fixture();
        persistence.save(&TimerState::fresh(Settings::default(), 0));
        persistence.save_settings(&Settings::default());
        persistence.clear();
        assert!(persistence.load().is_none());
        assert!(persistence.load_settings().is_none());
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str, _now_ms: i64) -> crate::error::Result<Option<String>> {
            Err(CoreError::Storage(StorageError::Locked))
        }

        fn set(&self, _key: &str, _value: &str, _exp: Option<i64>) -> crate::error::Result<()> {
            Err(CoreError::Storage(StorageError::Locked))
        }

        fn remove(&self, _key: &str) -> crate::error::Result<()> {
            Err(CoreError::Storage(StorageError::Locked))
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let persistence = Persistence::new(Box::new(FailingStore), Arc::new(ManualClock::new(NOW)));
        assert_eq!(persistence.save(&TimerState::fresh(Settings::default(), 0)), NOW);
        persistence.save_settings(&Settings::default());
        persistence.clear();
        assert!(persistence.load().is_none());
        assert!(persistence.load_settings().is_none());
    }
}
