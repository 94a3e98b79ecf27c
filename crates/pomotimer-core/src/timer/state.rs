use serde::{Deserialize, Serialize};

use super::indicator::{Indicator, IndicatorSequence};
use super::settings::Settings;

/// The three kinds of phase a round is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Work => "work",
            PhaseKind::ShortBreak => "shortBreak",
            PhaseKind::LongBreak => "longBreak",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::Work => "Work",
            PhaseKind::ShortBreak => "Short Break",
            PhaseKind::LongBreak => "Long Break",
        }
    }
}

/// Canonical snapshot owned by the engine.
///
/// Callers only ever see clones; the engine replaces it wholesale on
/// every mutation. Serialized as the `timerState` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Seconds remaining in the current phase.
    pub time_left: u64,
    pub is_running: bool,
    pub is_work_cycle: bool,
    pub current_cycle: usize,
    /// The break in progress (or about to start) is the long one.
    pub needs_long_break: bool,
    pub indicators: IndicatorSequence,
    pub settings: Settings,
    /// Epoch milliseconds of the last mutation.
    pub last_updated_at: i64,
}

impl TimerState {
    /// Start-of-round snapshot for `settings`.
    pub fn fresh(settings: Settings, now_ms: i64) -> Self {
        Self {
            time_left: settings.work_secs(),
            is_running: false,
            is_work_cycle: true,
            current_cycle: 0,
            needs_long_break: false,
            indicators: IndicatorSequence::fresh(settings.cycles()),
            settings,
            last_updated_at: now_ms,
        }
    }

    pub fn phase(&self) -> PhaseKind {
        if self.is_work_cycle {
            PhaseKind::Work
        } else if self.needs_long_break {
            PhaseKind::LongBreak
        } else {
            PhaseKind::ShortBreak
        }
    }

    /// Full length of the current phase under the current settings.
    pub fn phase_total_secs(&self) -> u64 {
        self.settings.duration_secs(self.phase())
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.phase_total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.time_left as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// `MM:SS`; minutes are not wrapped into hours.
    pub fn formatted_time_left(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }

    pub fn current_indicator(&self) -> Option<Indicator> {
        self.indicators.get(self.current_cycle)
    }
}
