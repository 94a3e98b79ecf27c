//! Handle bookkeeping for the 1 Hz tick source.
//!
//! The ticker never sleeps or spawns anything itself. It only records which
//! tick stream is currently authorised; whoever produces ticks (the async
//! [`driver`](super::driver) or a test) presents the handle back to the engine.

use std::time::Duration;

/// Period of the tick stream.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one tick stream. A new handle is minted on every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

#[derive(Debug, Default)]
pub struct Ticker {
    active: Option<TickHandle>,
    generation: u64,
}

impl Ticker {
    /// Cancel any existing stream, then authorise a new one.
    pub fn start(&mut self) -> TickHandle {
        self.stop();
        self.generation += 1;
        let handle = TickHandle(self.generation);
        self.active = Some(handle);
        handle
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<TickHandle> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn accepts(&self, handle: TickHandle) -> bool {
        self.active == Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_invalidates_previous_handle() {
        let mut ticker = Ticker::default();
        let first = ticker.start();
        let second = ticker.start();
        assert_ne!(first, second);
        assert!(!ticker.accepts(first));
        assert!(ticker.accepts(second));
    }

    #[test]
    fn stop_clears_handle() {
        let mut ticker = Ticker::default();
        let handle = ticker.start();
        ticker.stop();
        assert!(!ticker.is_active());
        assert!(!ticker.accepts(handle));
        assert_eq!(ticker.active(), None);
    }
}
