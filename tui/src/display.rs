//! Display State Types
//!
//! What the terminal shows, derived from the pet's published snapshots plus
//! a little UI-only state (transient messages, the rename prompt).
//!
//! # Design Philosophy
//!
//! The TUI is a thin client: it never reads the controller's internals, it
//! only renders the last snapshot it was handed. The observer registered
//! with the pet holds a weak reference to this state; once the state is
//! dropped the observer reports the surface as gone and the hub stops
//! publishing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use sekitoritchi_core::{ObserverHandle, PetSnapshot, SurfaceGone};

/// How long a transient message stays up
pub const TOAST_DURATION: Duration = Duration::from_millis(2500);

/// Tone of a transient message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    /// Something happened as asked
    Info,
    /// The pet refused
    Rejected,
}

/// A short message shown above the key help
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Message text
    pub text: String,
    /// Tone
    pub kind: ToastKind,
    /// Time left on screen
    pub remaining: Duration,
}

/// Everything the renderer needs
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Last published pet state
    pub snapshot: PetSnapshot,
    /// A snapshot arrived since the last redraw
    pub dirty: bool,
    /// Transient message, if any
    pub toast: Option<Toast>,
    /// Rename prompt contents while naming
    pub prompt: Option<String>,
    /// Snapshots received so far
    pub updates: u64,
}

impl DisplayState {
    /// Start from an initial snapshot
    pub fn new(snapshot: PetSnapshot) -> Self {
        Self {
            snapshot,
            dirty: true,
            toast: None,
            prompt: None,
            updates: 0,
        }
    }

    /// Take a newly published snapshot
    pub fn apply_snapshot(&mut self, snapshot: &PetSnapshot) {
        if self.snapshot.is_alive && !snapshot.is_alive {
            self.show_toast(format!("{} has passed away", snapshot.name), ToastKind::Rejected);
        }
        self.snapshot = snapshot.clone();
        self.dirty = true;
        self.updates += 1;
    }

    /// Show a transient message
    pub fn show_toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            text: text.into(),
            kind,
            remaining: TOAST_DURATION,
        });
    }

    /// Age transient state by `delta`
    pub fn update(&mut self, delta: Duration) {
        if let Some(toast) = &mut self.toast {
            toast.remaining = toast.remaining.saturating_sub(delta);
            if toast.remaining.is_zero() {
                self.toast = None;
            }
        }
    }

    /// Whether the rename prompt is open
    pub fn is_naming(&self) -> bool {
        self.prompt.is_some()
    }
}

/// Observer that feeds `display` and reports [`SurfaceGone`] once it is dropped
pub fn observer(display: &Rc<RefCell<DisplayState>>) -> ObserverHandle {
    let weak: Weak<RefCell<DisplayState>> = Rc::downgrade(display);
    Rc::new(move |snapshot: &PetSnapshot| -> Result<(), SurfaceGone> {
        let display = weak.upgrade().ok_or(SurfaceGone)?;
        match display.try_borrow_mut() {
            Ok(mut state) => state.apply_snapshot(snapshot),
            Err(_) => tracing::warn!("Display busy, snapshot dropped"),
        }
        Ok(())
    })
}
