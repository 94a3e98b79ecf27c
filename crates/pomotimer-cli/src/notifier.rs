use std::io::Write;

use pomotimer_core::notify::NotificationPort;
use pomotimer_core::storage::NotificationsConfig;
use pomotimer_core::PhaseKind;
use tracing::info;

/// Announces phase changes on the terminal.
#[derive(Debug, Clone)]
pub struct TerminalNotifier {
    enabled: bool,
    bell: bool,
}

impl TerminalNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
            bell: config.bell,
        }
    }
}

pub fn message(kind: PhaseKind) -> &'static str {
    match kind {
        PhaseKind::Work => "Time to focus!",
        PhaseKind::ShortBreak => "Take a short break.",
        PhaseKind::LongBreak => "Round complete, take a long break.",
    }
}

impl NotificationPort for TerminalNotifier {
    fn notify_phase(&self, kind: PhaseKind) {
        if !self.enabled {
            return;
        }
        info!(phase = kind.as_str(), "phase notification");
        let mut err = std::io::stderr().lock();
        let bell = if self.bell { "\x07" } else { "" };
        let _ = writeln!(err, "{bell}{}", message(kind));
    }
}
