//! Hardware abstraction traits.
//!
//! These are the only seams between the control logic and the board: a
//! byte-level serial port per link and a persistent store for the three
//! preset heights. The firmware crate implements them over buffered
//! UARTs and on-chip flash; tests implement them over in-memory buffers.

use crate::presets::PresetSlots;

/// Byte-level access to one serial link.
///
/// Mirrors the primitives the control loop actually uses; no framing is
/// assumed at this level.
pub trait SerialPort {
    /// Number of bytes ready to read
    fn available(&self) -> usize;

    /// Look at the next byte without consuming it
    fn peek(&mut self) -> Option<u8>;

    /// Consume and return the next byte
    fn read(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` bytes; returns the count actually read
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Queue bytes for transmission
    fn write(&mut self, buf: &[u8]);

    /// Push any queued bytes toward the wire
    fn flush(&mut self);
}

/// Persistent storage for the preset slots.
///
/// Three fixed-size fields at a fixed offset; no versioning. A failed or
/// never-written load returns `None` and the caller falls back to the
/// configured defaults.
pub trait PresetStore {
    /// Load the stored slots, if any valid record exists
    fn load(&mut self) -> Option<PresetSlots>;

    /// Persist the slots; errors are absorbed (the desk keeps running on
    /// the in-memory copy)
    fn save(&mut self, slots: &PresetSlots);
}
