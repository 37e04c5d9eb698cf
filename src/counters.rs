//! The event counter table: one press counter per configured button.
//!
//! The table is the only shared mutable state between the interrupt handler
//! and the reader, and it obeys a strict discipline: each slot has exactly
//! one writer (the handler servicing that button's line) and the whole table
//! has exactly one drainer (the read protocol). That discipline, plus atomic
//! per-slot operations, makes the table safe without any lock.

use alloc::vec::Vec;
use arrayvec::ArrayVec;
use core::sync::atomic::{AtomicI32, Ordering};

use crate::config::MAX_BUTTONS;

/// Per-button press counters, index-aligned with the descriptor table.
///
/// Counters are signed to match the wire format; they saturate at
/// `i32::MAX` rather than wrapping, so a stuck-down button can never surface
/// as a negative press count.
pub struct PressCounters {
    slots: Vec<AtomicI32>,
}

impl PressCounters {
    /// Creates a table of `len` zeroed counters.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`MAX_BUTTONS`]. A larger table could not be
    /// drained into a snapshot; the configuration layer validates the bound
    /// before the table is ever built.
    pub fn new(len: usize) -> Self {
        assert!(len <= MAX_BUTTONS, "counter table larger than MAX_BUTTONS");
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || AtomicI32::new(0));
        Self { slots }
    }

    /// Number of counter slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Records one press on `slot` (interrupt side).
    ///
    /// Saturating increment with Release ordering, so the availability-flag
    /// raise that follows publishes the new count to the reader. Out-of-range
    /// slots are ignored.
    #[inline]
    pub fn record(&self, slot: usize) {
        if let Some(counter) = self.slots.get(slot) {
            let _ = counter.fetch_update(Ordering::Release, Ordering::Relaxed, |count| {
                Some(count.saturating_add(1))
            });
        }
    }

    /// Drains the whole table (reader side): snapshots every slot and leaves
    /// it zero, in one atomic swap per slot.
    ///
    /// An increment racing with the drain lands either in this snapshot or
    /// in the slot for the next drain; it is never lost.
    pub fn drain(&self) -> ArrayVec<i32, MAX_BUTTONS> {
        self.slots
            .iter()
            .map(|counter| counter.swap(0, Ordering::AcqRel))
            .collect()
    }

    /// Reads one slot without clearing it. Diagnostic use only.
    pub fn peek(&self, slot: usize) -> i32 {
        self.slots
            .get(slot)
            .map_or(0, |counter| counter.load(Ordering::Acquire))
    }

    /// Zeroes every slot (session open).
    pub fn reset(&self) {
        for counter in &self.slots {
            counter.store(0, Ordering::Release);
        }
    }
}
