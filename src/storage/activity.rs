//! Shared store state observed from outside the store
//!
//! [`StoreActivity`] tells callers whether a scan or a save is in flight so
//! they can hold back further submissions. [`RescanSignal`] is the
//! single-slot "folder changed" flag a watcher raises and the store drains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// What the store is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    Idle,
    Scanning,
    Saving,
}

/// Advisory busy flags, cloneable so UIs can observe them
#[derive(Debug, Clone, Default)]
pub struct StoreActivity {
    scanning: Arc<AtomicBool>,
    saving: Arc<AtomicBool>,
}

impl StoreActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActivityState {
        if self.scanning.load(Ordering::Acquire) {
            ActivityState::Scanning
        } else if self.saving.load(Ordering::Acquire) {
            ActivityState::Saving
        } else {
            ActivityState::Idle
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Marks a scan as running; `None` if one already is
    pub fn begin_scan(&self) -> Option<BusyGuard> {
        BusyGuard::claim(&self.scanning)
    }

    /// Marks a save as running for as long as the guard lives.
    ///
    /// Saves are not exclusive: a second save simply keeps the flag set.
    pub fn begin_save(&self) -> BusyGuard {
        let was_set = self.saving.swap(true, Ordering::AcqRel);
        BusyGuard {
            flag: Arc::clone(&self.saving),
            release: !was_set,
        }
    }
}

/// Clears its flag when dropped
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
    release: bool,
}

impl BusyGuard {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
                release: true,
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if self.release {
            self.flag.store(false, Ordering::Release);
        }
    }
}

/// Pending "folder changed" notification.
///
/// Any number of [`request`](RescanSignal::request) calls between two
/// [`take`](RescanSignal::take) calls coalesce into one rescan.
#[derive(Debug, Clone, Default)]
pub struct RescanSignal {
    pending: Arc<AtomicBool>,
}

impl RescanSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Clears the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
