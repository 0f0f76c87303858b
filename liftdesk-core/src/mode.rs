//! Desk operating mode.
//!
//! Exactly one mode is active at a time. Normal is the initial mode and
//! the only one from which the other three are entered. Error is
//! terminal: outbound drive halts, inputs keep being polled, and only a
//! power cycle recovers (matching the controllers' own behavior).

/// Reset sequence length: valid channel acknowledgments to wait for
pub const RESET_PHASES: u8 = 2;

/// Global operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Regular height adjustment and preset recall
    #[default]
    Normal,
    /// Preset programming (M held); adjustment keys are repurposed
    Memory,
    /// Calibration drive to limits; exits after `phase` acknowledgments
    Reset { phase: u8 },
    /// Fault latched; drive output halted
    Error,
}

impl Mode {
    /// True while drive frames may be emitted
    pub fn drive_allowed(&self) -> bool {
        !matches!(self, Mode::Error)
    }

    /// True while UP/DOWN adjust the target height
    pub fn adjusts_height(&self) -> bool {
        matches!(self, Mode::Normal)
    }

    /// Start the reset sequence
    pub fn enter_reset() -> Mode {
        Mode::Reset {
            phase: RESET_PHASES,
        }
    }

    /// Count one valid channel acknowledgment toward reset completion.
    ///
    /// No-op outside reset mode.
    pub fn acknowledge(&mut self) {
        if let Mode::Reset { phase } = self {
            *phase = phase.saturating_sub(1);
            if *phase == 0 {
                *self = Mode::Normal;
            }
        }
    }
}
