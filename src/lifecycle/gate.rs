use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::host::Subscription;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one asset-load task.
///
/// Tickets are unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Wrap a raw ticket id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocate a fresh ticket.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw ticket id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One-shot latch in front of the asset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadGate {
    /// Not fired yet, holding the visibility registration when loading is
    /// deferred.
    Waiting(Option<Subscription>),
    /// Fired; the load has been requested.
    Triggered,
}

impl LoadGate {
    /// Fire the gate. Returns the registration to release on the first
    /// call, `None` once already triggered.
    pub fn trigger(&mut self) -> Option<Option<Subscription>> {
        match std::mem::replace(self, Self::Triggered) {
            Self::Waiting(subscription) => Some(subscription),
            Self::Triggered => None,
        }
    }

    /// Whether the gate has fired.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered)
    }

    /// Take the pending registration without firing, leaving the gate
    /// closed for good.
    pub fn close(&mut self) -> Option<Subscription> {
        match std::mem::replace(self, Self::Triggered) {
            Self::Waiting(subscription) => subscription,
            Self::Triggered => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::SubscriptionKind;

    #[test]
    fn fires_once() {
        let sub = Subscription::new(3, SubscriptionKind::Visibility);
        let mut gate = LoadGate::Waiting(Some(sub));
        assert_eq!(gate.trigger(), Some(Some(sub)));
        assert!(gate.is_triggered());
        assert_eq!(gate.trigger(), None);
    }

    #[test]
    fn close_releases_without_firing_twice() {
        let mut gate = LoadGate::Waiting(None);
        assert_eq!(gate.close(), None);
        assert_eq!(gate.trigger(), None);
    }

    #[test]
    fn tickets_are_unique() {
        let a = LoadTicket::next();
        let b = LoadTicket::next();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(LoadTicket::new(7).to_string(), "#7");
    }
}
