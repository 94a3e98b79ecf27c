//! Property tests for engine invariants.

use std::sync::Arc;

use proptest::prelude::*;

use pomotimer_core::{
    Command, Indicator, IndicatorSequence, ManualClock, MemoryStore, NoopNotifier, Persistence,
    Settings, TimerEngine,
};

fn settings_strategy() -> impl Strategy<Value = Settings> {
    (1u32..=60, 1u32..=30, 1u32..=60, 1u32..=10, any::<bool>()).prop_map(
        |(work, short, long, cycles, manual_mode)| Settings {
            work_duration: work,
            short_break_duration: short,
            long_break_duration: long,
            cycles_before_long_break: cycles,
            manual_mode,
        },
    )
}

#[derive(Debug, Clone)]
enum Op {
    Command(Command),
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Tick),
        2 => Just(Op::Command(Command::Toggle)),
        2 => Just(Op::Command(Command::Skip)),
        1 => Just(Op::Command(Command::Reset)),
        1 => settings_strategy().prop_map(|s| Op::Command(Command::UpdateSettings(s))),
    ]
}

fn engine(settings: Settings) -> TimerEngine {
    let persistence =
        Persistence::new(Box::new(MemoryStore::new()), Arc::new(ManualClock::new(0)));
    TimerEngine::open(persistence, Box::new(NoopNotifier), settings)
}

proptest! {
    #[test]
    fn reset_restores_round_start(
        settings in settings_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut engine = engine(settings);
        for op in ops {
            match op {
                Op::Tick => {
                    if let Some(h) = engine.active_ticker() {
                        engine.tick(h);
                    }
                }
                Op::Command(c) => engine.apply(c),
            }
        }
        engine.reset_all();
        let s = engine.get_state();
        prop_assert_eq!(s.time_left, s.settings.work_secs());
        prop_assert!(s.is_work_cycle);
        prop_assert!(!s.is_running);
        prop_assert!(s.indicators.all_not_started());
        prop_assert_eq!(s.indicators.len(), s.settings.cycles());
    }

    #[test]
    fn invariants_hold_under_random_operations(
        settings in settings_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut engine = engine(settings);
        for op in ops {
            let before = engine.get_state();
            match op {
                Op::Tick => {
                    if let Some(h) = engine.active_ticker() {
                        engine.tick(h);
                        let after = engine.state();
                        // Exactly one decrement, unless the phase ended.
                        if before.time_left > 1 {
                            prop_assert_eq!(after.time_left, before.time_left - 1);
                        }
                    }
                }
                Op::Command(c) => engine.apply(c),
            }
            let s = engine.state();
            prop_assert_eq!(s.indicators.len(), s.settings.cycles());
            prop_assert!(s.indicators.in_progress_count() <= 1);
            prop_assert_eq!(s.is_running, engine.active_ticker().is_some());
            if s.is_work_cycle && s.indicators.in_progress_count() == 1 {
                prop_assert_eq!(s.current_indicator(), Some(Indicator::InProgress));
            }
        }
    }

    #[test]
    fn resize_keeps_common_prefix(
        slots in prop::collection::vec(0u8..3, 0..12),
        len in 0usize..12,
    ) {
        let seq = IndicatorSequence::from(
            slots
                .iter()
                .map(|v| match v {
                    0 => Indicator::NotStarted,
                    1 => Indicator::InProgress,
                    _ => Indicator::Completed,
                })
                .collect::<Vec<_>>(),
        );
        let resized = seq.resized(len);
        prop_assert_eq!(resized.len(), len);
        for i in 0..len {
            let expected = seq.get(i).unwrap_or(Indicator::NotStarted);
            prop_assert_eq!(resized.get(i), Some(expected));
        }
    }
}
