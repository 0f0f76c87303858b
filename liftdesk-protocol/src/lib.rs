//! Wire protocols for the liftdesk controller board
//!
//! The board speaks two framed serial protocols:
//!
//! - the **interface link** to the keypad/display unit, and
//! - one or two **controller links** to the black-box motor controllers.
//!
//! Both use fixed-length frames with a leading sync byte and a trailing
//! additive checksum:
//!
//! ```text
//! interface / drive (5 bytes):   ┌──────┬──────┬───────┬──────┬──────┐
//!                                │ 0xA5 │ 0x00 │ state │ 0x01 │ CKSM │
//!                                └──────┴──────┴───────┴──────┴──────┘
//! display (6 bytes):             ┌──────┬────┬────┬────┬───────┬──────┐
//!                                │ 0x5A │ d0 │ d1 │ d2 │ flags │ CKSM │
//!                                └──────┴────┴────┴────┴───────┴──────┘
//! ```
//!
//! CKSM is the wrapping sum of the interior bytes (sync excluded). The
//! display digits d0-d2 are raw seven-segment patterns; the same codec
//! renders the target height for the keypad and decodes the heights the
//! controllers report back.

#![no_std]
#![deny(unsafe_code)]

// Host tests pull in proptest, which needs std.
#[cfg(test)]
extern crate std;

pub mod frame;
pub mod keys;
pub mod messages;
pub mod segment;

pub use frame::{
    checksum, encode_frame, validate, FrameError, DISPLAY_FRAME_LEN, DISPLAY_SYNC,
    INTERFACE_FRAME_LEN, INTERFACE_SYNC,
};
pub use keys::{KeyChord, KeyMask};
pub use messages::{DisplayFrame, DriveCommand, InterfaceReport};
pub use segment::{
    decode_digit, digits_to_height, encode_digit, encode_letter, height_to_digits, memory_word,
    DecodeAnomaly, DP_BIT, WORD_ERROR, WORD_RESET,
};
