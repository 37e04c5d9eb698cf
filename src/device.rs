//! The button device: session lifecycle and the blocking read protocol.
//!
//! [`ButtonDevice`] owns all shared state (counter table, availability gate,
//! line map) and hands references into the interrupt path through the
//! [`LineHandler`] it registers at open; there are no file-scope globals.
//! At most one session is open at a time; `open()` while open fails with
//! `ResourceBusy`, and `close()` is idempotent and infallible.
//!
//! The read protocol is the consumer half of the design: wait on the gate,
//! consume the availability flag, drain the whole counter table, deliver the
//! snapshot. It blocks indefinitely until the next press; cancellation is
//! composed externally via [`CancelToken`].

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use axerrno::{AxResult, ax_err};

use crate::config::{ButtonDesc, ButtonSetConfig};
use crate::counters::PressCounters;
use crate::gate::{CancelToken, EventGate};
use crate::line::{IrqController, LineHandler, LineId, LineMap};
use crate::wire::{CountSink, PressReport};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No session open; interrupt lines are unclaimed.
    Closed = 0,
    /// A session is open; every configured line is registered.
    Open = 1,
}

const STATE_CLOSED: u8 = SessionState::Closed as u8;
const STATE_OPEN: u8 = SessionState::Open as u8;

/// Diagnostic counters for device operations.
#[derive(Debug, Default)]
pub struct DeviceStats {
    /// Successful drains delivered to a reader.
    read_count: AtomicU64,
    /// Failed deliveries.
    error_count: AtomicU64,
    /// Presses recorded by the interrupt handler.
    press_count: AtomicU64,
}

impl DeviceStats {
    #[inline]
    fn record_read(&self) {
        self.read_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_press(&self) {
        self.press_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total successful reads.
    pub fn reads(&self) -> u64 {
        self.read_count.load(Ordering::Relaxed)
    }

    /// Total failed deliveries.
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Total presses recorded since device construction.
    pub fn presses(&self) -> u64 {
        self.press_count.load(Ordering::Relaxed)
    }
}

/// The interrupt half of the device.
///
/// Maps the fired line to its slot, bumps that counter, raises the gate.
/// Runs in interrupt context: a bounded number of atomic operations, no
/// locks, no allocation. Assertions on lines the map does not know are
/// dropped silently.
struct PressSignal {
    map: LineMap,
    counters: Arc<PressCounters>,
    gate: Arc<EventGate>,
    stats: Arc<DeviceStats>,
}

impl LineHandler for PressSignal {
    fn line_asserted(&self, line: LineId) {
        if let Some(slot) = self.map.slot_of(line) {
            self.counters.record(slot);
            self.stats.record_press();
            self.gate.raise();
        }
    }
}

/// A set of physical buttons delivered through one blocking read interface.
pub struct ButtonDevice {
    descs: Vec<ButtonDesc>,
    counters: Arc<PressCounters>,
    gate: Arc<EventGate>,
    controller: Arc<dyn IrqController>,
    handler: Arc<PressSignal>,
    state: AtomicU8,
    stats: Arc<DeviceStats>,
}

impl ButtonDevice {
    /// Creates a device for the configured button set, wired to the given
    /// platform interrupt controller. No line is claimed until `open()`.
    pub fn new(config: ButtonSetConfig, controller: Arc<dyn IrqController>) -> Arc<Self> {
        let counters = Arc::new(PressCounters::new(config.len()));
        let gate = Arc::new(EventGate::new());
        let stats = Arc::new(DeviceStats::default());
        let handler = Arc::new(PressSignal {
            map: LineMap::from_config(&config),
            counters: Arc::clone(&counters),
            gate: Arc::clone(&gate),
            stats: Arc::clone(&stats),
        });

        Arc::new(Self {
            descs: config.into_descriptors(),
            counters,
            gate,
            controller,
            handler,
            state: AtomicU8::new(STATE_CLOSED),
            stats,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.state.load(Ordering::Acquire) {
            STATE_OPEN => SessionState::Open,
            _ => SessionState::Closed,
        }
    }

    /// Number of configured buttons (= length of a read result).
    pub fn button_count(&self) -> usize {
        self.descs.len()
    }

    /// The descriptor table, in slot order.
    pub fn descriptors(&self) -> &[ButtonDesc] {
        &self.descs
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> &DeviceStats {
        &self.stats
    }

    /// Opens a session: zeroes the counters, lowers the gate, and registers
    /// the interrupt handler on every configured line in descriptor order.
    ///
    /// # Errors
    ///
    /// Returns `ResourceBusy` if a session is already open, or if any line
    /// registration fails; in that case every line registered so far is
    /// released again in reverse order and the device stays Closed. Partial
    /// registration never survives this call.
    pub fn open(self: &Arc<Self>) -> AxResult<ButtonSession> {
        if self
            .state
            .compare_exchange(STATE_CLOSED, STATE_OPEN, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return ax_err!(ResourceBusy, "button device is already open");
        }

        // Fresh session: no stale counts, no stale availability.
        self.counters.reset();
        self.gate.clear();

        let handler: Arc<dyn LineHandler> = self.handler.clone();
        for (idx, desc) in self.descs.iter().enumerate() {
            match self
                .controller
                .register_line(desc.line, desc.trigger, Arc::clone(&handler))
            {
                Ok(()) => {
                    debug!("registered {} on {} ({:?})", desc.name, desc.line, desc.trigger);
                }
                Err(e) => {
                    warn!(
                        "registering {} on {} failed ({:?}); rolling back",
                        desc.name, desc.line, e
                    );
                    for prev in self.descs[..idx].iter().rev() {
                        self.controller.unregister_line(prev.line);
                    }
                    self.state.store(STATE_CLOSED, Ordering::Release);
                    return ax_err!(ResourceBusy, "interrupt line unavailable");
                }
            }
        }

        Ok(ButtonSession {
            dev: Arc::clone(self),
            closed: AtomicBool::new(false),
        })
    }

    fn close_session(&self) {
        for desc in &self.descs {
            self.controller.unregister_line(desc.line);
        }
        self.state.store(STATE_CLOSED, Ordering::Release);
        debug!("button device closed");
    }
}

impl core::fmt::Debug for ButtonDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ButtonDevice")
            .field("buttons", &self.descs.len())
            .field("state", &self.state())
            .field("pending", &self.gate.is_raised())
            .finish()
    }
}

/// An open session: the handle press counts are read through.
///
/// Dropping the session closes it.
pub struct ButtonSession {
    dev: Arc<ButtonDevice>,
    closed: AtomicBool,
}

impl ButtonSession {
    /// The device this session belongs to.
    pub fn device(&self) -> &Arc<ButtonDevice> {
        &self.dev
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Non-blocking check whether a read would return without waiting.
    pub fn has_pending(&self) -> bool {
        !self.is_closed() && self.dev.gate.is_raised()
    }

    /// Blocking read: waits for press events, drains the counter table, and
    /// returns the snapshot.
    ///
    /// Blocks indefinitely until the next press; `cancel` makes a blocked
    /// call return `WouldBlock` with flag and counters untouched. After a
    /// successful return the whole table is zero.
    pub fn read_report(&self, cancel: &CancelToken) -> AxResult<PressReport> {
        if self.is_closed() {
            return ax_err!(BadState, "session is closed");
        }

        self.dev.gate.wait(cancel)?;
        self.dev.gate.consume();
        let counts = self.dev.counters.drain();
        self.dev.stats.record_read();
        trace!("drained press counts: {:?}", counts.as_slice());
        Ok(PressReport::new(counts))
    }

    /// Blocking read delivering into `sink`; returns counters delivered
    /// (`min(sink capacity, button_count())`).
    ///
    /// A failed delivery is reported to the caller, but the table was
    /// already drained: the counts are not re-delivered by a later read.
    /// The session itself stays usable.
    pub fn read<S: CountSink + ?Sized>(&self, sink: &mut S, cancel: &CancelToken) -> AxResult<usize> {
        let report = self.read_report(cancel)?;
        sink.deliver(report.counts()).inspect_err(|e| {
            self.dev.stats.record_error();
            warn!("press count delivery failed: {:?}", e);
        })
    }

    /// Closes the session, releasing every interrupt line. Idempotent and
    /// never fails; further reads on this handle return `BadState`.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.dev.close_session();
        }
    }
}

impl Drop for ButtonSession {
    fn drop(&mut self) {
        self.close();
    }
}
