#![no_std]

//! # Button Input Device
//!
//! This crate models a small low-level input subsystem: a handful of physical
//! buttons, each wired to its own hardware interrupt line, whose presses are
//! counted and delivered to a single consumer through a blocking read. It is
//! designed for `no_std` environments and uses the `alloc` crate for the
//! configuration tables.
//!
//! ## Architecture
//!
//! The module is organized around the interrupt-to-reader handoff:
//!
//! ### Core data path
//! - [`PressCounters`]: the event counter table, one atomic counter per
//!   button. Single writer per slot (the interrupt handler), single drainer
//!   (the read protocol), no locks
//! - [`EventGate`]: the availability flag plus the wait/wake coordination
//!   that parks a reader until new events exist
//! - [`CancelToken`]: external cancellation for a blocked read
//!
//! ### Lifecycle and protocol
//! - [`ButtonDevice`]: owns the shared state; `open()` claims every
//!   configured interrupt line (all-or-nothing), `close()` releases them
//! - [`ButtonSession`]: the open/close-bounded handle reads go through
//!
//! ### Platform seam
//! - [`IrqController`] / [`LineHandler`]: the control-plane boundary toward
//!   the platform interrupt dispatcher
//! - [`LineMap`]: explicit interrupt-line → counter-slot mapping built from
//!   the configuration
//!
//! ### Wire format
//! - [`CountSink`] / [`PressReport`] and the [`wire`] codec: one little-endian
//!   signed 32-bit counter per button, in descriptor order
//!
//! ## Concurrency model
//!
//! Two execution contexts share state: the interrupt context (preemptive,
//! must never block) and one blocking reader. The handler increments a
//! counter slot and raises the gate with release ordering; the reader
//! consumes the gate with acquire ordering and drains the slots with atomic
//! swaps. A press racing with a drain lands in either that read's result or
//! the next one, never nowhere.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use axbutton::{ButtonDevice, ButtonSetConfig, CancelToken};
//!
//! // `controller` is the platform's IrqController implementation.
//! let device = ButtonDevice::new(ButtonSetConfig::s3c2440_keys(), controller);
//!
//! let session = device.open()?;
//! let cancel = CancelToken::new();
//! loop {
//!     // Blocks until at least one button has been pressed.
//!     let report = session.read_report(&cancel)?;
//!     print!("{report}"); // "K2 has been pressed 1 times!"
//! }
//! ```

extern crate alloc;
#[macro_use]
extern crate log;

mod config;
mod counters;
mod device;
mod gate;
mod line;
pub mod wire;

pub use config::{ButtonDesc, ButtonSetConfig, MAX_BUTTONS, TriggerMode};
pub use counters::PressCounters;
pub use device::{ButtonDevice, ButtonSession, DeviceStats, SessionState};
pub use gate::{CancelToken, EventGate};
pub use line::{IrqController, LineHandler, LineId, LineMap};
pub use wire::{CountSink, PressReport};
