use serde::{Deserialize, Serialize};

use super::state::PhaseKind;
use crate::error::ValidationError;

/// Accepted range for the work phase, in minutes.
pub const WORK_RANGE: (u32, u32) = (1, 60);
/// Accepted range for the short break, in minutes.
pub const SHORT_BREAK_RANGE: (u32, u32) = (1, 30);
/// Accepted range for the long break, in minutes.
pub const LONG_BREAK_RANGE: (u32, u32) = (1, 60);
/// Accepted range for the number of work cycles per round.
pub const CYCLES_RANGE: (u32, u32) = (1, 10);

/// User-tunable durations (minutes) and cycle count.
///
/// Persisted under the `pomodoroSettings` key with camelCase field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub cycles_before_long_break: u32,
    /// Stop at every phase boundary instead of auto-advancing.
    #[serde(default)]
    pub manual_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            cycles_before_long_break: 4,
            manual_mode: false,
        }
    }
}

impl Settings {
    pub fn work_secs(&self) -> u64 {
        minutes_to_secs(self.work_duration)
    }

    pub fn short_break_secs(&self) -> u64 {
        minutes_to_secs(self.short_break_duration)
    }

    pub fn long_break_secs(&self) -> u64 {
        minutes_to_secs(self.long_break_duration)
    }

    pub fn duration_secs(&self, kind: PhaseKind) -> u64 {
        match kind {
            PhaseKind::Work => self.work_secs(),
            PhaseKind::ShortBreak => self.short_break_secs(),
            PhaseKind::LongBreak => self.long_break_secs(),
        }
    }

    /// Number of indicator slots a round has.
    pub fn cycles(&self) -> usize {
        self.cycles_before_long_break as usize
    }

    /// Check every field against the ranges the settings form accepts.
    ///
    /// The engine never calls this; hosts validate before `update_settings`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("workDuration", self.work_duration, WORK_RANGE)?;
        check("shortBreakDuration", self.short_break_duration, SHORT_BREAK_RANGE)?;
        check("longBreakDuration", self.long_break_duration, LONG_BREAK_RANGE)?;
        check("cyclesBeforeLongBreak", self.cycles_before_long_break, CYCLES_RANGE)?;
        Ok(())
    }
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(60)
}

fn check(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let s = Settings::default();
        assert_eq!(s.work_secs(), 1500);
        assert_eq!(s.short_break_secs(), 300);
        assert_eq!(s.long_break_secs(), 900);
        assert_eq!(s.cycles(), 4);
        assert!(!s.manual_mode);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["workDuration"], 25);
        assert_eq!(json["shortBreakDuration"], 5);
        assert_eq!(json["longBreakDuration"], 15);
        assert_eq!(json["cyclesBeforeLongBreak"], 4);
        assert_eq!(json["manualMode"], false);
    }

    #[test]
    fn manual_mode_defaults_when_missing() {
        let s: Settings = serde_json::from_str(concat!(
            r#"{"workDuration":30,"shortBreakDuration":5,"#,
            r#""longBreakDuration":20,"cyclesBeforeLongBreak":3}"#,
        ))
        .unwrap();
        assert_eq!(s.work_duration, 30);
        assert!(!s.manual_mode);
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let s = Settings {
            short_break_duration: 31,
            ..Settings::default()
        };
        assert_eq!(
            s.validate(),
            Err(ValidationError::OutOfRange {
                field: "shortBreakDuration",
                value: 31,
                min: 1,
                max: 30
            })
        );

        let s = Settings {
            cycles_before_long_break: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn duration_secs_by_phase() {
        let s = Settings::default();
        assert_eq!(s.duration_secs(PhaseKind::Work), 1500);
        assert_eq!(s.duration_secs(PhaseKind::ShortBreak), 300);
        assert_eq!(s.duration_secs(PhaseKind::LongBreak), 900);
    }
}
