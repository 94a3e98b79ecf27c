//! Cooperative 1 Hz driver for a [`TimerEngine`].
//!
//! Runs on the caller's task; the engine is borrowed mutably for the whole
//! run, so there is never more than one writer and never more than one tick
//! stream. Use a current-thread runtime or a `LocalSet`: the engine is not
//! `Send`.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::engine::{Command, TimerEngine};
use super::ticker::TICK_PERIOD;

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    CommandsClosed,
}

/// Drive `engine` until `shutdown` resolves or `commands` closes.
///
/// The interval is re-armed whenever the engine's active tick handle
/// changes, so the first tick after any start arrives one full period later.
pub async fn run<S>(
    engine: &mut TimerEngine,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    shutdown: S,
) -> StopReason
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut interval = time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut armed = engine.active_ticker();
    interval.reset();

    let reason = loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break StopReason::Shutdown,

            command = commands.recv() => match command {
                Some(command) => {
                    debug!(?command, "command received");
                    engine.apply(command);
                }
                None => break StopReason::CommandsClosed,
            },

            _ = interval.tick(), if armed.is_some() => {
                if let Some(handle) = armed {
                    engine.tick(handle);
                }
            }
        }

        let current = engine.active_ticker();
        if current != armed {
            armed = current;
            interval.reset();
        }
    };

    debug!(?reason, "driver stopped");
    reason
}
