//! Typed messages for the three desk frames.
//!
//! - `InterfaceReport`: keypad -> board, current button state
//! - `DriveCommand`: board -> motor controller, up/down assertion
//! - `DisplayFrame`: carries three segment digits plus status flags; the
//!   board sends these to the keypad display, and the controllers report
//!   their current height in the same shape

use crate::frame::{
    encode_frame, validate, FrameError, DISPLAY_FRAME_LEN, DISPLAY_SYNC, INTERFACE_FRAME_LEN,
    INTERFACE_SYNC,
};
use crate::keys::KeyMask;
use crate::segment::{digits_to_height, DecodeAnomaly};

/// Command byte carried by interface and drive frames
const CMD_STATE: u8 = 0x00;

/// Trailer byte carried by interface and drive frames
const TRAILER: u8 = 0x01;

/// Drive state byte: bit 5 asserts UP
const DRIVE_UP: u8 = 0x20;

/// Drive state byte: bit 6 asserts DOWN
const DRIVE_DOWN: u8 = 0x40;

/// Display flags: bit 4 = button lights on
const FLAG_LIGHTS: u8 = 0x10;

/// Display flags: bit 0 = timer/error indicator
const FLAG_INDICATOR: u8 = 0x01;

/// Button state reported by the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceReport {
    pub keys: KeyMask,
}

impl InterfaceReport {
    /// Parse a validated 5-byte interface frame
    pub fn from_frame(frame: &[u8; INTERFACE_FRAME_LEN]) -> Result<Self, FrameError> {
        let interior = validate(frame, INTERFACE_SYNC)?;
        if interior[0] != CMD_STATE || interior[2] != TRAILER {
            return Err(FrameError::InvalidFrame);
        }
        Ok(Self {
            keys: KeyMask(interior[1]),
        })
    }

    /// Encode into wire format (used by tests and link simulation)
    pub fn to_frame(self) -> [u8; INTERFACE_FRAME_LEN] {
        let mut buf = [0u8; INTERFACE_FRAME_LEN];
        // Interior always fits; length is a compile-time constant
        let _ = encode_frame(
            INTERFACE_SYNC,
            &[CMD_STATE, self.keys.0, TRAILER],
            &mut buf,
        );
        buf
    }
}

/// Up/down assertion sent to a motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveCommand {
    pub up: bool,
    pub down: bool,
}

impl DriveCommand {
    /// Neither direction asserted
    pub const fn stopped() -> Self {
        Self {
            up: false,
            down: false,
        }
    }

    /// True if either direction is asserted
    pub fn is_moving(self) -> bool {
        self.up || self.down
    }

    /// Encode into wire format
    pub fn to_frame(self) -> [u8; INTERFACE_FRAME_LEN] {
        let mut state = 0u8;
        if self.up {
            state |= DRIVE_UP;
        }
        if self.down {
            state |= DRIVE_DOWN;
        }

        let mut buf = [0u8; INTERFACE_FRAME_LEN];
        let _ = encode_frame(INTERFACE_SYNC, &[CMD_STATE, state, TRAILER], &mut buf);
        buf
    }

    /// Parse a validated 5-byte drive frame
    pub fn from_frame(frame: &[u8; INTERFACE_FRAME_LEN]) -> Result<Self, FrameError> {
        let interior = validate(frame, INTERFACE_SYNC)?;
        if interior[0] != CMD_STATE || interior[2] != TRAILER {
            return Err(FrameError::InvalidFrame);
        }
        Ok(Self {
            up: interior[1] & DRIVE_UP != 0,
            down: interior[1] & DRIVE_DOWN != 0,
        })
    }
}

/// Three segment digits plus status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame {
    /// Raw segment patterns, leftmost first
    pub digits: [u8; 3],
    /// Button backlight on
    pub lights: bool,
    /// Timer/error indicator lit
    pub indicator: bool,
}

impl DisplayFrame {
    pub fn new(digits: [u8; 3]) -> Self {
        Self {
            digits,
            lights: false,
            indicator: false,
        }
    }

    /// Parse a validated 6-byte display frame
    pub fn from_frame(frame: &[u8; DISPLAY_FRAME_LEN]) -> Result<Self, FrameError> {
        let interior = validate(frame, DISPLAY_SYNC)?;
        Ok(Self {
            digits: [interior[0], interior[1], interior[2]],
            lights: interior[3] & FLAG_LIGHTS != 0,
            indicator: interior[3] & FLAG_INDICATOR != 0,
        })
    }

    /// Encode into wire format
    pub fn to_frame(self) -> [u8; DISPLAY_FRAME_LEN] {
        let mut flags = 0u8;
        if self.lights {
            flags |= FLAG_LIGHTS;
        }
        if self.indicator {
            flags |= FLAG_INDICATOR;
        }

        let mut buf = [0u8; DISPLAY_FRAME_LEN];
        let _ = encode_frame(
            DISPLAY_SYNC,
            &[self.digits[0], self.digits[1], self.digits[2], flags],
            &mut buf,
        );
        buf
    }

    /// Decode the digits as a reported height
    pub fn height(&self) -> Result<f32, DecodeAnomaly> {
        digits_to_height(self.digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{height_to_digits, WORD_RESET};

    #[test]
    fn test_interface_report_up_pressed() {
        // The canonical single-press frame: UP alone
        let report = InterfaceReport::from_frame(&[0xA5, 0x00, 0x20, 0x01, 0x21]).unwrap();
        assert_eq!(report.keys, KeyMask::UP);
    }

    #[test]
    fn test_interface_report_roundtrip() {
        let original = InterfaceReport {
            keys: KeyMask::MEMORY,
        };
        let parsed = InterfaceReport::from_frame(&original.to_frame()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_interface_report_bad_checksum() {
        let result = InterfaceReport::from_frame(&[0xA5, 0x00, 0x20, 0x01, 0x99]);
        assert_eq!(result, Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_interface_report_wrong_command() {
        // cmd byte 0x06 is not a state report
        let mut frame = [0xA5, 0x06, 0x20, 0x01, 0x27];
        frame[4] = crate::frame::checksum(&frame[1..4]);
        let result = InterfaceReport::from_frame(&frame);
        assert_eq!(result, Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_drive_command_bits() {
        let up = DriveCommand {
            up: true,
            down: false,
        };
        assert_eq!(up.to_frame(), [0xA5, 0x00, 0x20, 0x01, 0x21]);

        let both = DriveCommand {
            up: true,
            down: true,
        };
        assert_eq!(both.to_frame()[2], 0x60);

        let stopped = DriveCommand::stopped();
        assert!(!stopped.is_moving());
        assert_eq!(stopped.to_frame()[2], 0x00);
    }

    #[test]
    fn test_drive_command_roundtrip() {
        for (up, down) in [(false, false), (true, false), (false, true), (true, true)] {
            let original = DriveCommand { up, down };
            let parsed = DriveCommand::from_frame(&original.to_frame()).unwrap();
            assert_eq!(parsed, original);
        }
    }

    #[test]
    fn test_display_frame_roundtrip() {
        let original = DisplayFrame {
            digits: height_to_digits(740.0),
            lights: true,
            indicator: false,
        };
        let parsed = DisplayFrame::from_frame(&original.to_frame()).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.height(), Ok(740.0));
    }

    #[test]
    fn test_display_frame_reset_word() {
        let frame = DisplayFrame::new(WORD_RESET);
        assert_eq!(frame.height(), Err(DecodeAnomaly::ResetWord));
    }

    #[test]
    fn test_display_frame_flags() {
        let frame = DisplayFrame {
            digits: [0, 0, 0],
            lights: true,
            indicator: true,
        };
        let wire = frame.to_frame();
        assert_eq!(wire[4], 0x11);
    }
}
