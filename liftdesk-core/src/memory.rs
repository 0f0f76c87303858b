//! Preset memory programming machine.
//!
//! Entered from Normal when M goes down; a quick release cancels it
//! again, so an accidental tap never reprograms anything. While
//! selecting, the display blinks "S" plus the chosen slot digit. The
//! first press of a slot key selects it, a repeat press on the same slot
//! stores the current target there, and three seconds after a slot was
//! selected the machine commits all slots to the persistent store and
//! falls back to Normal.

use liftdesk_protocol::segment::memory_word;

use crate::config::DeskConfig;
use crate::presets::PresetSlots;

/// Programming machine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum MemoryState {
    Idle,
    Selecting {
        /// Chosen slot (1-indexed), none until a slot key is released
        slot: Option<u8>,
        /// Time spent selecting, drives blink phase and auto-commit
        elapsed_ms: u32,
    },
}

/// Preset programming machine
#[derive(Debug, Clone)]
pub struct MemoryMachine {
    state: MemoryState,
}

impl Default for MemoryMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMachine {
    pub fn new() -> Self {
        Self {
            state: MemoryState::Idle,
        }
    }

    /// True while the machine owns the display and the slot keys
    pub fn is_selecting(&self) -> bool {
        matches!(self.state, MemoryState::Selecting { .. })
    }

    /// Currently selected slot, if any
    pub fn selected(&self) -> Option<u8> {
        match self.state {
            MemoryState::Selecting { slot, .. } => slot,
            MemoryState::Idle => None,
        }
    }

    /// M went down in Normal mode: start selecting (tentatively)
    pub fn enter(&mut self) {
        self.state = MemoryState::Selecting {
            slot: None,
            elapsed_ms: 0,
        };
    }

    /// M released before the tap threshold: abandon without committing
    pub fn cancel(&mut self) {
        self.state = MemoryState::Idle;
    }

    /// A slot key was released while selecting.
    ///
    /// Returns true when this press stored the current target (repeat
    /// press on the already-selected slot).
    pub fn select(&mut self, slot: u8, target: f32, presets: &mut PresetSlots) -> bool {
        if let MemoryState::Selecting {
            slot: selected, ..
        } = &mut self.state
        {
            if *selected == Some(slot) {
                presets.set(slot, target);
                return true;
            }
            *selected = Some(slot);
        }
        false
    }

    /// Advance timers.
    ///
    /// Returns true when the machine auto-commits: the caller persists
    /// the presets and the machine is Idle again.
    pub fn tick(&mut self, dt_ms: u32, config: &DeskConfig) -> bool {
        if let MemoryState::Selecting { slot, elapsed_ms } = &mut self.state {
            *elapsed_ms = elapsed_ms.saturating_add(dt_ms);
            if slot.is_some() && *elapsed_ms >= config.hide_delay_ms {
                self.state = MemoryState::Idle;
                return true;
            }
        }
        false
    }

    /// Display digits while selecting: lit for the first half of each
    /// blink period, blank for the second half
    pub fn display(&self, config: &DeskConfig) -> Option<[u8; 3]> {
        match self.state {
            MemoryState::Selecting { slot, elapsed_ms } => {
                if elapsed_ms % config.blink_ms < config.blink_ms / 2 {
                    Some(memory_word(slot))
                } else {
                    Some([0x00, 0x00, 0x00])
                }
            }
            MemoryState::Idle => None,
        }
    }
}
