//! Observer Hub
//!
//! Typed publish/subscribe between the pet and whatever is drawing it.
//!
//! ```text
//!   PetController ──publish(snapshot)──▶ ObserverHub ──▶ observer 1
//!                                                    ├─▶ observer 2
//!                                                    └─▶ ...
//! ```
//!
//! # Terminal state
//!
//! An observer reports [`SurfaceGone`] when the view it feeds no longer
//! exists. The hub then disables itself for good: every later `publish` is
//! a no-op and the remaining observers are never called again. This is a
//! shutdown signal, not an error to retry.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use crate::state::PetSnapshot;

/// The surface an observer was drawing to has been torn down
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Error)]
#[error("observer surface no longer exists")]
pub struct SurfaceGone;

/// Receives every published pet state
pub trait PetObserver {
    /// Called synchronously after each externally visible change
    fn state_changed(&self, snapshot: &PetSnapshot) -> Result<(), SurfaceGone>;
}

impl<F> PetObserver for F
where
    F: Fn(&PetSnapshot) -> Result<(), SurfaceGone>,
{
    fn state_changed(&self, snapshot: &PetSnapshot) -> Result<(), SurfaceGone> {
        self(snapshot)
    }
}

/// Shared handle to an observer; identity is the allocation
pub type ObserverHandle = Rc<dyn PetObserver>;

/// Ordered, de-duplicated list of observers
#[derive(Default)]
pub struct ObserverHub {
    observers: RefCell<Vec<ObserverHandle>>,
    disabled: Cell<bool>,
}

fn same_observer(a: &ObserverHandle, b: &ObserverHandle) -> bool {
    // Compare data pointers only; vtable pointers are not unique
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}

impl ObserverHub {
    /// Create an empty hub
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer; returns `false` if it was already subscribed
    pub fn subscribe(&self, observer: ObserverHandle) -> bool {
        let mut observers = self.observers.borrow_mut();
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Remove an observer; returns `false` if it was not subscribed
    pub fn unsubscribe(&self, observer: &ObserverHandle) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        observers.len() != before
    }

    /// Deliver a snapshot to every observer in subscription order
    ///
    /// Returns how many observers were reached. Observers may subscribe,
    /// unsubscribe or trigger further publishes from inside the callback;
    /// the delivery list is fixed when this call starts.
    pub fn publish(&self, snapshot: &PetSnapshot) -> usize {
        if self.disabled.get() {
            return 0;
        }

        let observers: Vec<ObserverHandle> = self.observers.borrow().clone();
        let mut delivered = 0;
        for observer in observers {
            if self.disabled.get() {
                break;
            }
            match observer.state_changed(snapshot) {
                Ok(()) => delivered += 1,
                Err(SurfaceGone) => {
                    tracing::info!("Observer surface gone, disabling notifications");
                    self.disabled.set(true);
                    break;
                }
            }
        }
        delivered
    }

    /// Whether a surface-gone signal has shut the hub down
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Number of subscribed observers
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Whether nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }
}

impl std::fmt::Debug for ObserverHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHub")
            .field("observers", &self.len())
            .field("disabled", &self.disabled.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PetState;

    fn snapshot() -> PetSnapshot {
        PetState::default().snapshot(false)
    }

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> ObserverHandle {
        let log = Rc::clone(log);
        Rc::new(move |_: &PetSnapshot| -> Result<(), SurfaceGone> {
            log.borrow_mut().push(tag);
            Ok(())
        })
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hub = ObserverHub::new();
        hub.subscribe(recorder(&log, "a"));
        hub.subscribe(recorder(&log, "b"));
        hub.subscribe(recorder(&log, "c"));

        assert_eq!(hub.publish(&snapshot()), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hub = ObserverHub::new();
        let observer = recorder(&log, "a");

        assert!(hub.subscribe(Rc::clone(&observer)));
        assert!(!hub.subscribe(Rc::clone(&observer)));
        assert_eq!(hub.len(), 1);

        hub.publish(&snapshot());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hub = ObserverHub::new();
        let observer = recorder(&log, "a");
        hub.subscribe(Rc::clone(&observer));

        assert!(hub.unsubscribe(&observer));
        assert!(!hub.unsubscribe(&observer));
        assert!(hub.is_empty());
        assert_eq!(hub.publish(&snapshot()), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_surface_gone_disables_permanently() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hub = ObserverHub::new();
        hub.subscribe(recorder(&log, "before"));
        hub.subscribe(Rc::new(|_: &PetSnapshot| -> Result<(), SurfaceGone> { Err(SurfaceGone) }));
        hub.subscribe(recorder(&log, "after"));

        assert_eq!(hub.publish(&snapshot()), 1);
        assert!(hub.is_disabled());
        assert_eq!(*log.borrow(), vec!["before"]);

        // Later publishes reach nobody, even newly subscribed observers
        hub.subscribe(recorder(&log, "late"));
        assert_eq!(hub.publish(&snapshot()), 0);
        assert_eq!(*log.borrow(), vec!["before"]);
    }

    #[test]
    fn test_observer_may_unsubscribe_during_publish() {
        let hub = Rc::new(ObserverHub::new());
        let calls = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<ObserverHandle>>> = Rc::new(RefCell::new(None));
        let observer: ObserverHandle = {
            let hub = Rc::downgrade(&hub);
            let slot = Rc::clone(&slot);
            let calls = Rc::clone(&calls);
            Rc::new(move |_: &PetSnapshot| -> Result<(), SurfaceGone> {
                calls.set(calls.get() + 1);
                if let (Some(hub), Some(me)) = (hub.upgrade(), slot.borrow().as_ref()) {
                    hub.unsubscribe(me);
                }
                Ok(())
            })
        };
        *slot.borrow_mut() = Some(Rc::clone(&observer));
        hub.subscribe(observer);

        hub.publish(&snapshot());
        hub.publish(&snapshot());
        assert_eq!(calls.get(), 1);
        assert!(hub.is_empty());
    }
}
