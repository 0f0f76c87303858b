//! User preset slots.
//!
//! Three heights, 1-indexed on the keypad. The slots live in the
//! controller and are written through [`crate::traits::PresetStore`] when
//! memory mode commits. With the `serde` feature the slots serialize via
//! postcard for the flash-backed store.

use crate::config::DeskConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of preset slots
pub const SLOT_COUNT: usize = 3;

/// Serialized size bound for a postcard-encoded record
#[cfg(feature = "serde")]
pub const ENCODED_SIZE: usize = SLOT_COUNT * 5;

/// The three stored preset heights
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresetSlots {
    pub heights: [f32; SLOT_COUNT],
}

impl PresetSlots {
    /// Factory defaults: bottom, midpoint, top of the height range
    pub fn defaults(config: &DeskConfig) -> Self {
        Self {
            heights: [config.min_height, config.mid_height(), config.max_height],
        }
    }

    /// Height stored in a 1-indexed slot
    pub fn get(&self, slot: u8) -> Option<f32> {
        match slot {
            1..=3 => Some(self.heights[usize::from(slot) - 1]),
            _ => None,
        }
    }

    /// Store a height into a 1-indexed slot; out-of-range slots are ignored
    pub fn set(&mut self, slot: u8, height: f32) {
        if (1..=3).contains(&slot) {
            self.heights[usize::from(slot) - 1] = height;
        }
    }

    /// Serialize into `buf` for the persistent store
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], postcard::Error> {
        postcard::to_slice(self, buf).map(|written| &*written)
    }

    /// Deserialize a stored record
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
