//! Preset persistence in on-chip flash.
//!
//! The last erase sector of the 2MB flash holds one record:
//! a length byte followed by the postcard-encoded preset slots.
//! An erased sector reads as 0xFF, which the loader treats as empty.

use defmt::*;
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;

use liftdesk_core::{PresetSlots, PresetStore};

/// Total flash size of the target board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the preset sector, the last erasable unit
const PRESET_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Largest record the loader accepts; a postcard-encoded slot set is
/// at most 3 * 5 bytes
const MAX_RECORD: usize = 16;

pub struct FlashPresetStore {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl FlashPresetStore {
    pub fn new(flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }
}

impl PresetStore for FlashPresetStore {
    fn load(&mut self) -> Option<PresetSlots> {
        let mut record = [0u8; 1 + MAX_RECORD];
        if self.flash.blocking_read(PRESET_OFFSET, &mut record).is_err() {
            warn!("flash read failed");
            return None;
        }
        let len = record[0] as usize;
        if len == 0 || len > MAX_RECORD {
            // 0xFF length means a freshly erased sector
            return None;
        }
        match PresetSlots::from_bytes(&record[1..1 + len]) {
            Ok(slots) => {
                info!("loaded presets from flash");
                Some(slots)
            }
            Err(_) => {
                warn!("preset record did not decode");
                None
            }
        }
    }

    fn save(&mut self, slots: &PresetSlots) {
        let mut encoded = [0u8; MAX_RECORD];
        let len = match slots.to_bytes(&mut encoded) {
            Ok(written) => written.len(),
            Err(_) => {
                warn!("preset encode failed");
                return;
            }
        };
        let mut record = [0xFFu8; 1 + MAX_RECORD];
        record[0] = len as u8;
        record[1..1 + len].copy_from_slice(&encoded[..len]);

        if self
            .flash
            .blocking_erase(PRESET_OFFSET, PRESET_OFFSET + ERASE_SIZE as u32)
            .is_err()
        {
            warn!("flash erase failed");
            return;
        }
        if self.flash.blocking_write(PRESET_OFFSET, &record).is_err() {
            warn!("flash write failed");
            return;
        }
        info!("presets saved to flash");
    }
}
