//! Scoped re-entrancy guard
//!
//! A flag that can only be set by acquiring a [`FlagGuard`] and is cleared
//! when that guard drops, on every exit path. Single-threaded by construction
//! (`Cell`), which is all the cooperative loop needs.

use std::cell::Cell;

/// Boolean lock against overlapping logical operations on one loop
#[derive(Debug, Default)]
pub struct ReentrancyFlag {
    held: Cell<bool>,
}

impl ReentrancyFlag {
    /// Create an unheld flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag, or return `None` if it is already set
    #[must_use = "the flag is released as soon as the guard is dropped"]
    pub fn try_acquire(&self) -> Option<FlagGuard<'_>> {
        if self.held.replace(true) {
            None
        } else {
            Some(FlagGuard { flag: self })
        }
    }

    /// Whether some guard currently holds the flag
    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// Holds a [`ReentrancyFlag`] until dropped
#[derive(Debug)]
pub struct FlagGuard<'a> {
    flag: &'a ReentrancyFlag,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.held.set(false);
    }
}
