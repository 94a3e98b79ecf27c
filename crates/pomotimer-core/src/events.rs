//! Synchronous publish/subscribe channel for state changes.
//!
//! Every engine mutation ends with a broadcast of the committed snapshot.
//! Delivery happens on the caller's stack, in registration order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::timer::TimerState;

type Listener = Rc<dyn Fn(&TimerState)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Ordered set of state listeners.
#[derive(Default, Clone)]
pub struct Subscribers {
    inner: Rc<RefCell<Registry>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it stays registered until the returned
    /// [`Subscription`] is unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TimerState) + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver `state` to every listener registered at call time.
    ///
    /// The registry is not borrowed while listeners run, so a listener may
    /// unsubscribe during delivery.
    pub fn publish(&self, state: &TimerState) {
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Removes its listener when [`unsubscribe`](Subscription::unsubscribe)d.
///
/// Dropping a subscription without unsubscribing leaves the listener in place.
#[must_use = "keep the subscription to be able to unsubscribe"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}
