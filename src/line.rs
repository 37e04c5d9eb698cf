//! Interrupt-line plumbing: the platform seam and the line-to-slot map.
//!
//! The platform interrupt controller is an external collaborator reached
//! through the [`IrqController`] trait; the crate hands it an opaque
//! [`LineHandler`] at session open and gets it invoked from interrupt context
//! whenever a registered line fires. Which counter slot a line belongs to is
//! decided by an explicit [`LineMap`] built from the descriptor table, never
//! by positional coincidence between independently declared tables.

use alloc::sync::Arc;
use alloc::vec::Vec;

use axerrno::AxResult;

use crate::config::{ButtonSetConfig, TriggerMode};

/// Identifier of a hardware interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub u32);

impl core::fmt::Display for LineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line{}", self.0)
    }
}

/// Interrupt service entry point.
///
/// # Contract
///
/// `line_asserted` runs in interrupt context, concurrently with any reader
/// and with itself on other lines. It must not block, allocate, or take locks
/// a blocked reader could hold; the implementation in this crate performs a
/// bounded number of atomic operations and returns.
pub trait LineHandler: Send + Sync {
    /// Called by the platform dispatcher when `line` fires.
    fn line_asserted(&self, line: LineId);
}

/// The platform interrupt controller (control-plane collaborator).
///
/// Implementations wrap whatever the platform provides for claiming and
/// releasing external interrupt lines. The crate only assumes the two
/// guarantees documented on the methods.
pub trait IrqController: Send + Sync {
    /// Claims `line` and arms it with `trigger`, routing assertions to
    /// `handler`.
    ///
    /// # Errors
    ///
    /// Fails (typically with `ResourceBusy` or `AlreadyExists`) if the line
    /// is claimed elsewhere or cannot be armed. On failure the line is left
    /// unclaimed.
    fn register_line(
        &self,
        line: LineId,
        trigger: TriggerMode,
        handler: Arc<dyn LineHandler>,
    ) -> AxResult;

    /// Releases `line`. Idempotent per line and never fails; once this
    /// returns, the handler is not invoked again for `line`.
    fn unregister_line(&self, line: LineId);
}

/// Mapping from interrupt line to counter slot, built once from the
/// configuration.
pub struct LineMap {
    entries: Vec<(LineId, usize)>,
}

impl LineMap {
    /// Builds the map from a descriptor table; slot = descriptor position.
    pub fn from_config(config: &ButtonSetConfig) -> Self {
        Self {
            entries: config
                .descriptors()
                .iter()
                .enumerate()
                .map(|(slot, desc)| (desc.line, slot))
                .collect(),
        }
    }

    /// Resolves a line to its slot.
    ///
    /// Linear scan; the table holds at most [`MAX_BUTTONS`] entries.
    ///
    /// [`MAX_BUTTONS`]: crate::MAX_BUTTONS
    #[inline]
    pub fn slot_of(&self, line: LineId) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| *l == line)
            .map(|(_, slot)| *slot)
    }

    /// Number of mapped lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
