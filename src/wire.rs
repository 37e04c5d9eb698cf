//! Read-result wire format and the delivery seam.
//!
//! A read result is the counter vector, one little-endian `i32` per button
//! in descriptor order. Delivery to the caller's memory goes through the
//! [`CountSink`] trait so the copy step can fail (the equivalent of a bad
//! destination address) without the core having to know what the destination
//! is: a slice, a user-space buffer, or a test double.

use arrayvec::ArrayVec;
use axerrno::AxResult;

use crate::config::MAX_BUTTONS;

/// Bytes one counter occupies on the wire.
pub const COUNT_WIRE_SIZE: usize = core::mem::size_of::<i32>();

/// Encodes counters into `dst` as little-endian `i32`, whole counters only.
///
/// Returns the number of counters encoded: `min(counts.len(),
/// dst.len() / COUNT_WIRE_SIZE)`. Trailing bytes of `dst` that cannot hold a
/// full counter are left untouched.
pub fn encode_counts(counts: &[i32], dst: &mut [u8]) -> usize {
    let n = counts.len().min(dst.len() / COUNT_WIRE_SIZE);
    for (chunk, &count) in dst.chunks_exact_mut(COUNT_WIRE_SIZE).zip(&counts[..n]) {
        chunk.copy_from_slice(&count.to_le_bytes());
    }
    n
}

/// Decodes counters from `src`; trailing partial-counter bytes are ignored,
/// as are counters beyond [`MAX_BUTTONS`].
pub fn decode_counts(src: &[u8]) -> ArrayVec<i32, MAX_BUTTONS> {
    src.chunks_exact(COUNT_WIRE_SIZE)
        .take(MAX_BUTTONS)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Destination for a drained counter snapshot.
///
/// The read protocol drains the table *before* delivery, so an error from
/// `deliver` reports the failure to the caller while the drained counts stay
/// gone; already-reported data is never re-delivered. The session remains
/// usable after a failed delivery.
pub trait CountSink {
    /// Accepts up to the sink's capacity from `counts`, in slot order.
    ///
    /// Returns the number of counters accepted. Running out of capacity is
    /// truncation, not an error; `Err` is reserved for delivery faults.
    fn deliver(&mut self, counts: &[i32]) -> AxResult<usize>;
}

impl CountSink for [i32] {
    fn deliver(&mut self, counts: &[i32]) -> AxResult<usize> {
        let n = self.len().min(counts.len());
        self[..n].copy_from_slice(&counts[..n]);
        Ok(n)
    }
}

impl CountSink for [u8] {
    fn deliver(&mut self, counts: &[i32]) -> AxResult<usize> {
        Ok(encode_counts(counts, self))
    }
}

/// Snapshot of the press counts drained by one read.
///
/// `Display` renders one line per pressed button in the consumer harness's
/// format, so a polling loop is just `print!("{report}")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressReport {
    counts: ArrayVec<i32, MAX_BUTTONS>,
}

impl PressReport {
    pub(crate) fn new(counts: ArrayVec<i32, MAX_BUTTONS>) -> Self {
        Self { counts }
    }

    /// The counter vector, one entry per button in descriptor order.
    pub fn counts(&self) -> &[i32] {
        &self.counts
    }

    /// `(slot, count)` pairs for buttons pressed since the previous drain.
    pub fn pressed(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count != 0)
            .map(|(slot, &count)| (slot, count))
    }

    /// Whether no button was pressed in this report.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }
}

impl core::fmt::Display for PressReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (slot, count) in self.pressed() {
            writeln!(f, "K{} has been pressed {} times!", slot + 1, count)?;
        }
        Ok(())
    }
}
