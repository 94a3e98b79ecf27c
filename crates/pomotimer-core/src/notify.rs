//! Outbound phase notifications.

use crate::timer::PhaseKind;

/// Told once per phase-end transition which phase comes next.
///
/// Implementations own permission checks, message text and delivery.
pub trait NotificationPort {
    fn notify_phase(&self, kind: PhaseKind);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationPort for NoopNotifier {
    fn notify_phase(&self, _kind: PhaseKind) {}
}

/// Keeps every notification it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: std::cell::RefCell<Vec<PhaseKind>>,
}

impl RecordingNotifier {
    pub fn seen(&self) -> Vec<PhaseKind> {
        self.seen.borrow().clone()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify_phase(&self, kind: PhaseKind) {
        self.seen.borrow_mut().push(kind);
    }
}

impl<T: NotificationPort + ?Sized> NotificationPort for std::rc::Rc<T> {
    fn notify_phase(&self, kind: PhaseKind) {
        (**self).notify_phase(kind)
    }
}
