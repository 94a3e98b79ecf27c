pub mod config;
pub mod settings;
pub mod timer;

use std::sync::Arc;

use pomotimer_core::{Clock, Config, Database, Persistence, SystemClock, TimerEngine};
use tracing::{debug, warn};

use crate::notifier::TerminalNotifier;

/// Build the one engine this process uses, from the on-disk store.
pub fn open_engine(config: &Config) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match db.purge_expired(SystemClock.now_ms()) {
        Ok(0) => {}
        Ok(removed) => debug!(removed, "purged expired records"),
        Err(e) => warn!(error = %e, "failed to purge expired records"),
    }
    let persistence =
        Persistence::new(Box::new(db), Arc::new(SystemClock)).with_state_ttl(config.state_ttl());
    Ok(TimerEngine::open(
        persistence,
        Box::new(TerminalNotifier::new(&config.notifications)),
        config.default_settings(),
    ))
}
