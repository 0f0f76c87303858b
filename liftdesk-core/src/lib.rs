//! Board-agnostic control logic for the liftdesk controller firmware
//!
//! This crate contains everything between the raw serial bytes and the
//! drive commands, with no hardware dependencies:
//!
//! - Hardware abstraction traits (serial port, preset store)
//! - Bounded frame reading over a serial port
//! - Key edge/hold/release tracking
//! - Height target ownership (ramping, snapping, recall)
//! - Preset memory programming machine
//! - Per-channel height regulation with reset and error handling
//! - The single tick entry point tying it all together
//!
//! All state is owned by [`controller::DeskController`] and mutated only
//! inside [`controller::DeskController::tick`]; the firmware crate is a
//! thin pump around it.

#![no_std]
#![deny(unsafe_code)]

// Host tests pull in proptest, which needs std.
#[cfg(test)]
extern crate std;

pub mod config;
pub mod controller;
pub mod height;
pub mod input;
pub mod link;
pub mod memory;
pub mod mode;
pub mod presets;
pub mod regulator;
pub mod traits;

pub use config::DeskConfig;
pub use controller::{ChannelInput, DeskController, TickInputs, TickOutputs, MAX_CHANNELS};
pub use link::{poll_channel, poll_interface, write_frame, LinkError};
pub use mode::Mode;
pub use presets::{PresetSlots, SLOT_COUNT};
pub use traits::{PresetStore, SerialPort};
