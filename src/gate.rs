//! Wait/wake coordination between the interrupt handler and the reader.
//!
//! [`EventGate`] is the availability flag of the design plus the machinery to
//! park a reader on it. The flag is sticky: once an interrupt raises it, it
//! stays raised until the reader consumes it, so any number of presses
//! between two reads coalesce into one wakeup while the individual counts
//! stay in the counter table.
//!
//! There is no missed-wakeup window: the waiting reader re-checks the flag
//! itself on every iteration, and the flag is set *before* the notify token,
//! so a raise at any point after the wait began is observed on the next
//! check. The handler side is a bounded sequence of atomic stores and never
//! blocks.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axerrno::{AxResult, ax_err};

/// Availability flag with waiter bookkeeping.
pub struct EventGate {
    /// The availability flag: unread events exist since the last drain.
    ready: AtomicBool,
    /// Number of readers currently parked in `wait`.
    waiters: AtomicUsize,
    /// Sticky wake token, consumed by waiters to short-circuit the yield.
    notified: AtomicBool,
}

impl EventGate {
    /// Creates a gate with the flag lowered.
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            waiters: AtomicUsize::new(0),
            notified: AtomicBool::new(false),
        }
    }

    /// Raises the flag and wakes waiters (interrupt side).
    ///
    /// Release ordering pairs with the acquire in [`consume`]: every counter
    /// increment sequenced before this raise is visible to the drain that
    /// observes the flag. Raising with no waiter present is the normal case
    /// and loses nothing.
    ///
    /// [`consume`]: EventGate::consume
    #[inline]
    pub fn raise(&self) {
        self.ready.store(true, Ordering::Release);
        if self.waiters.load(Ordering::Acquire) > 0 {
            self.notified.store(true, Ordering::Release);
        }
    }

    /// Whether the flag is currently raised.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Observes and lowers the flag (reader side). Returns the prior state.
    #[inline]
    pub fn consume(&self) -> bool {
        self.ready.swap(false, Ordering::AcqRel)
    }

    /// Lowers the flag without waking anyone (session open).
    pub fn clear(&self) {
        self.ready.store(false, Ordering::Release);
    }

    /// Suspends the caller until the flag is raised or `cancel` fires.
    ///
    /// Returns immediately if the flag is already raised. A cancelled wait
    /// returns `WouldBlock` and leaves both the flag and the counter table
    /// exactly as the interrupts left them.
    pub fn wait(&self, cancel: &CancelToken) -> AxResult {
        if self.is_raised() {
            return Ok(());
        }

        self.waiters.fetch_add(1, Ordering::AcqRel);
        let result = loop {
            if self.is_raised() {
                break Ok(());
            }
            if cancel.is_cancelled() {
                break ax_err!(WouldBlock, "wait for button events cancelled");
            }
            if self.notified.swap(false, Ordering::AcqRel) {
                // Woken; re-check the flag.
                continue;
            }
            // Yield CPU between condition checks.
            for _ in 0..100 {
                core::hint::spin_loop();
            }
        };
        self.waiters.fetch_sub(1, Ordering::AcqRel);
        result
    }
}

impl Default for EventGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation handle for a blocked read.
///
/// Stands in for signal delivery to a sleeping process: the consumer keeps a
/// clone and fires it from another execution context to make a blocked
/// [`wait`] return `WouldBlock`. Cancelling is sticky; callers wanting a
/// timeout arm a token from a timer externally.
///
/// [`wait`]: EventGate::wait
#[derive(Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Fires the token. All clones observe the cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
