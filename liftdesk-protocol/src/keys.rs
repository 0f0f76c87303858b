//! Keypad state byte and chord classification.
//!
//! The keypad reports one state byte per interface frame: a bitmask of
//! everything currently pressed. Control logic only reacts to a small set
//! of chords, each requiring strict exclusivity - UP means UP and nothing
//! else. The one deliberate combination is UP+DOWN (reset entry); every
//! other multi-key press is unrecognized and produces no chord.

/// Bitmask of keypad buttons as reported in the interface frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMask(pub u8);

impl KeyMask {
    pub const NONE: KeyMask = KeyMask(0x00);
    pub const MEMORY: KeyMask = KeyMask(0x01);
    pub const SLOT1: KeyMask = KeyMask(0x02);
    pub const SLOT2: KeyMask = KeyMask(0x04);
    pub const SLOT3: KeyMask = KeyMask(0x08);
    pub const TIMER: KeyMask = KeyMask(0x10);
    pub const UP: KeyMask = KeyMask(0x20);
    pub const DOWN: KeyMask = KeyMask(0x40);

    /// True if every bit in `keys` is set
    pub fn contains(self, keys: KeyMask) -> bool {
        self.0 & keys.0 == keys.0
    }

    /// True iff exactly the bits in `keys` are set and nothing else
    pub fn only(self, keys: KeyMask) -> bool {
        self.0 == keys.0
    }

    /// True if no button is pressed
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for KeyMask {
    type Output = KeyMask;

    fn bitor(self, rhs: KeyMask) -> KeyMask {
        KeyMask(self.0 | rhs.0)
    }
}

/// A recognized exclusive key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyChord {
    /// M button alone
    Memory,
    /// Preset slot button alone (1-3)
    Slot(u8),
    /// UP alone
    Up,
    /// DOWN alone
    Down,
    /// UP and DOWN together (reset entry)
    UpDown,
}

impl KeyChord {
    /// Classify a state byte into at most one chord.
    ///
    /// Exclusivity is strict: a mask with any extra bit set yields `None`.
    /// The TIMER button carries no chord of its own.
    pub fn classify(mask: KeyMask) -> Option<KeyChord> {
        if mask.only(KeyMask::MEMORY) {
            Some(KeyChord::Memory)
        } else if mask.only(KeyMask::SLOT1) {
            Some(KeyChord::Slot(1))
        } else if mask.only(KeyMask::SLOT2) {
            Some(KeyChord::Slot(2))
        } else if mask.only(KeyMask::SLOT3) {
            Some(KeyChord::Slot(3))
        } else if mask.only(KeyMask::UP) {
            Some(KeyChord::Up)
        } else if mask.only(KeyMask::DOWN) {
            Some(KeyChord::Down)
        } else if mask.only(KeyMask::UP | KeyMask::DOWN) {
            Some(KeyChord::UpDown)
        } else {
            None
        }
    }
}
