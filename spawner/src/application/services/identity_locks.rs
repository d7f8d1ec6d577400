//! Per-identity mutual exclusion for multi-system operations.
//!
//! The account store serializes its own reads and writes, but create and
//! delete make external calls between `find` and `record`/`remove`. Holding an
//! identity lock for the whole operation keeps two requests for the same
//! identity from interleaving; different identities never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Table of async locks keyed by identity.
///
/// Entries exist only while some task holds or awaits the lock.
#[derive(Default)]
pub struct IdentityLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

/// Held identity lock; releases on drop.
pub struct IdentityGuard<'a> {
    locks: &'a IdentityLocks,
    identity: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl IdentityLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task holds the lock for `identity`, then take it.
    pub async fn acquire(&self, identity: &str) -> IdentityGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(identity.to_owned()).or_default())
        };
        let guard = slot.lock_owned().await;
        IdentityGuard {
            locks: self,
            identity: identity.to_owned(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        // Release before inspecting the table so a waiter's clone is the only
        // other reference left.
        drop(self.guard.take());
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&self.identity)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.identity);
        }
    }
}
