use std::cell::Cell;
use std::io::Write;

use clap::Subcommand;
use chrono::{Local, TimeZone};
use pomotimer_core::timer::driver;
use pomotimer_core::{Command, Config, Indicator, PhaseKind, TimerEngine, TimerState};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::open_engine;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or pause the current phase
    Toggle,
    /// Stop and return to the start of a round
    Reset,
    /// End the current phase now
    Skip,
    /// Print current timer state
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the timer in the foreground (space/enter: toggle, r: reset, s: skip, q: quit)
    Run,
}

fn indicator_glyphs(state: &TimerState) -> String {
    state
        .indicators
        .iter()
        .map(|i| match i {
            Indicator::NotStarted => '○',
            Indicator::InProgress => '◐',
            Indicator::Completed => '●',
        })
        .collect()
}

/// One-line human summary of `state`.
pub fn status_line(state: &TimerState) -> String {
    let run_state = if state.is_running { "running" } else { "paused" };
    format!(
        "{:<11} {} [{}] {} {:>3.0}%",
        state.phase().label(),
        state.formatted_time_left(),
        indicator_glyphs(state),
        run_state,
        state.progress() * 100.0
    )
}

fn print_json(state: &TimerState) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config)?;

    match action {
        TimerAction::Toggle => {
            engine.toggle();
            if finish_parked_phase(&mut engine) {
                info!(phase = engine.state().phase().as_str(), "overdue phase ended on resume");
            }
            print_json(engine.state())?;
        }
        TimerAction::Reset => {
            engine.reset_all();
            print_json(engine.state())?;
        }
        TimerAction::Skip => {
            engine.skip_step();
            print_json(engine.state())?;
        }
        TimerAction::Status { json } => {
            let state = engine.get_state();
            if json {
                print_json(&state)?;
            } else {
                println!("{}", status_line(&state));
                if let Some(at) = Local.timestamp_millis_opt(state.last_updated_at).single() {
                    println!("updated {}", at.format("%Y-%m-%d %H:%M:%S"));
                }
            }
        }
        TimerAction::Run => run_foreground(&mut engine)?,
    }
    Ok(())
}

/// End a phase that ran out while no process was ticking.
///
/// Rehydration parks such a phase at its last second. One-shot commands never
/// tick, so resuming it has to apply that final tick here or the phase would
/// stay parked forever.
fn finish_parked_phase(engine: &mut TimerEngine) -> bool {
    match engine.active_ticker() {
        Some(handle) if engine.state().time_left <= 1 => engine.tick(handle),
        _ => false,
    }
}

/// Maps one line of keyboard input to a command. `None` means quit.
pub fn parse_key(line: &str) -> Option<Option<Command>> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "space" | "t" => Some(Some(Command::Toggle)),
        "r" => Some(Some(Command::Reset)),
        "s" => Some(Some(Command::Skip)),
        "q" | "quit" | "exit" => None,
        _ => Some(None),
    }
}

fn run_foreground(engine: &mut TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let last_phase = Cell::new(engine.state().phase());
    let subscription = engine.subscribe(move |state| {
        let mut out = std::io::stdout().lock();
        let phase: PhaseKind = state.phase();
        if phase != last_phase.replace(phase) {
            let _ = writeln!(out);
        }
        let _ = write!(out, "\r{}", status_line(state));
        let _ = out.flush();
    });

    println!("{}", status_line(engine.state()));
    info!("running in foreground");

    let reason = runtime.block_on(async {
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_key(&line) {
                        Some(Some(command)) => {
                            if tx.send(command).is_err() {
                                return;
                            }
                        }
                        Some(None) => debug!(input = %line, "ignored input"),
                        None => return,
                    },
                    // No more input: keep the sender alive so only Ctrl-C stops the run.
                    Ok(None) | Err(_) => std::future::pending::<()>().await,
                }
            }
        });

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        driver::run(&mut *engine, &mut rx, shutdown).await
    });

    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();
    subscription.unsubscribe();
    println!();
    debug!(?reason, "foreground run finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomotimer_core::storage::STATE_KEY;
    use pomotimer_core::{
        KeyValueStore, ManualClock, MemoryStore, NoopNotifier, Persistence, Settings,
    };
    use std::rc::Rc;
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000_000;

    fn engine_over(store: Rc<MemoryStore>) -> TimerEngine {
        let persistence = Persistence::new(Box::new(store), Arc::new(ManualClock::new(NOW)));
        TimerEngine::open(persistence, Box::new(NoopNotifier), Settings::default())
    }

    #[test]
    fn resuming_overdue_phase_moves_to_break() {
        let store = Rc::new(MemoryStore::new());
        let overdue = serde_json::json!({
            "timeLeft": 10,
            "isRunning": true,
            "isWorkCycle": true,
            "currentCycle": 0,
            "indicators": ["inProgress", "notStarted", "notStarted", "notStarted"],
            "lastUpdatedAt": NOW - 15_000,
        });
        store.set(STATE_KEY, &overdue.to_string(), None).unwrap();

        let mut engine = engine_over(store);
        assert!(!engine.state().is_running);
        assert_eq!(engine.state().time_left, 1);

        engine.toggle();
        assert!(finish_parked_phase(&mut engine));

        let s = engine.get_state();
        assert_eq!(s.phase(), PhaseKind::ShortBreak);
        assert_eq!(s.time_left, 300);
        assert!(s.is_running);
        assert_eq!(s.indicators.get(0), Some(Indicator::Completed));
    }

    #[test]
    fn resuming_normal_phase_does_not_tick() {
        let mut engine = engine_over(Rc::new(MemoryStore::new()));
        engine.toggle();
        assert!(!finish_parked_phase(&mut engine));
        assert_eq!(engine.state().time_left, 1500);
        assert!(engine.state().is_work_cycle);
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_key(""), Some(Some(Command::Toggle)));
        assert_eq!(parse_key(" R "), Some(Some(Command::Reset)));
        assert_eq!(parse_key("s"), Some(Some(Command::Skip)));
        assert_eq!(parse_key("x"), Some(None));
        assert_eq!(parse_key("q"), None);
    }

    #[test]
    fn status_line_shows_phase_time_and_cycles() {
        let mut state = TimerState::fresh(Settings::default(), 0);
        state.indicators.set(0, Indicator::Completed);
        state.indicators.set(1, Indicator::InProgress);
        state.time_left = 750;
        let line = status_line(&state);
        assert!(line.starts_with("Work"));
        assert!(line.contains("12:30"));
        assert!(line.contains("[●◐○○]"));
        assert!(line.contains("paused"));
        assert!(line.contains("50%"));
    }
}
