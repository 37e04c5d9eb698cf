//! Button set configuration.
//!
//! A button set is a small, immutable table of descriptors, one per physical
//! button, fixed at construction time. The position of a descriptor in the
//! table is the button's *slot*: it decides which counter the interrupt
//! handler bumps and the order counters appear in a read result.

use alloc::vec::Vec;

use axerrno::{AxResult, ax_err};

use crate::line::LineId;

/// Maximum number of buttons a single device may carry.
///
/// Fixed-capacity buffers on the read path (snapshots, wire decoding) are
/// sized by this, so the drain never allocates.
pub const MAX_BUTTONS: usize = 8;

/// The edge/level condition that qualifies a line transition as a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Trigger on a high-to-low transition.
    FallingEdge,
    /// Trigger on a low-to-high transition.
    RisingEdge,
    /// Trigger while the line is asserted.
    Level,
}

/// Describes one physical button: which interrupt line it is wired to, how
/// the line is triggered, and a display name for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonDesc {
    /// The hardware interrupt line the button is wired to.
    pub line: LineId,
    /// The trigger condition to arm the line with.
    pub trigger: TriggerMode,
    /// Display name, used in logs.
    pub name: &'static str,
}

impl ButtonDesc {
    /// Creates a descriptor for a button on the given interrupt line.
    pub const fn new(line: u32, trigger: TriggerMode, name: &'static str) -> Self {
        Self {
            line: LineId(line),
            trigger,
            name,
        }
    }
}

/// A validated, ordered button table.
///
/// Validation happens once at construction; every other component may then
/// rely on the table being non-empty, at most [`MAX_BUTTONS`] long, and free
/// of duplicate lines.
#[derive(Debug, Clone)]
pub struct ButtonSetConfig {
    descs: Vec<ButtonDesc>,
}

impl ButtonSetConfig {
    /// Builds a configuration from a descriptor list.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the list is empty, longer than
    /// [`MAX_BUTTONS`], or maps two buttons to the same interrupt line.
    pub fn new(descs: Vec<ButtonDesc>) -> AxResult<Self> {
        if descs.is_empty() {
            return ax_err!(InvalidInput, "button table is empty");
        }
        if descs.len() > MAX_BUTTONS {
            return ax_err!(InvalidInput, "button table exceeds MAX_BUTTONS");
        }
        for (i, desc) in descs.iter().enumerate() {
            if descs[..i].iter().any(|prev| prev.line == desc.line) {
                return ax_err!(InvalidInput, "duplicate interrupt line in button table");
            }
        }
        Ok(Self { descs })
    }

    /// The classic S3C2440 development-board key table: KEY1..KEY4 on
    /// external interrupt lines 19, 11, 2 and 0, all falling-edge.
    pub fn s3c2440_keys() -> Self {
        Self {
            descs: alloc::vec![
                ButtonDesc::new(19, TriggerMode::FallingEdge, "KEY1"),
                ButtonDesc::new(11, TriggerMode::FallingEdge, "KEY2"),
                ButtonDesc::new(2, TriggerMode::FallingEdge, "KEY3"),
                ButtonDesc::new(0, TriggerMode::FallingEdge, "KEY4"),
            ],
        }
    }

    /// The descriptor table, in slot order.
    pub fn descriptors(&self) -> &[ButtonDesc] {
        &self.descs
    }

    /// Consumes the configuration, yielding the descriptor table.
    pub fn into_descriptors(self) -> Vec<ButtonDesc> {
        self.descs
    }

    /// Number of configured buttons.
    pub fn len(&self) -> usize {
        self.descs.len()
    }

    /// A validated configuration is never empty.
    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }
}
