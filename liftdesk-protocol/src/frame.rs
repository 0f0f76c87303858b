//! Fixed-length frame encoding and validation.
//!
//! Unlike length-prefixed protocols, both desk links use frames whose
//! length is fixed per message kind, so the codec here is a pair of free
//! functions over byte slices. Stream resynchronization (scanning for the
//! sync byte, bounding the scan) lives in `liftdesk-core::link`, next to
//! the serial port abstraction.

/// Sync byte for interface reports and drive commands (5-byte frames)
pub const INTERFACE_SYNC: u8 = 0xA5;

/// Sync byte for display frames (6-byte frames)
pub const DISPLAY_SYNC: u8 = 0x5A;

/// Interface report / drive command frame length
pub const INTERFACE_FRAME_LEN: usize = 5;

/// Display frame length
pub const DISPLAY_FRAME_LEN: usize = 6;

/// Errors that can occur during frame validation or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte is not the expected sync byte
    BadSync,
    /// Trailing checksum does not match the interior bytes
    InvalidChecksum,
    /// Frame shorter than sync + checksum
    Truncated,
    /// Output buffer too small for encoding
    BufferTooSmall,
    /// Frame validated but its interior does not match the message layout
    InvalidFrame,
}

/// Additive checksum over the interior bytes of a frame.
///
/// The sync byte and the checksum byte itself are excluded.
pub fn checksum(interior: &[u8]) -> u8 {
    interior
        .iter()
        .fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Encode a frame into `out`: sync byte, interior bytes, checksum.
///
/// Returns the number of bytes written.
pub fn encode_frame(sync: u8, interior: &[u8], out: &mut [u8]) -> Result<usize, FrameError> {
    let len = interior.len() + 2;
    if out.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    out[0] = sync;
    out[1..len - 1].copy_from_slice(interior);
    out[len - 1] = checksum(interior);
    Ok(len)
}

/// Validate a complete candidate frame.
///
/// On success returns the interior bytes (sync and checksum stripped).
/// A checksum failure means the frame must be dropped; the caller rescans
/// the stream from the following byte.
pub fn validate(frame: &[u8], sync: u8) -> Result<&[u8], FrameError> {
    if frame.len() < 3 {
        return Err(FrameError::Truncated);
    }
    if frame[0] != sync {
        return Err(FrameError::BadSync);
    }

    let interior = &frame[1..frame.len() - 1];
    if checksum(interior) != frame[frame.len() - 1] {
        return Err(FrameError::InvalidChecksum);
    }
    Ok(interior)
}
