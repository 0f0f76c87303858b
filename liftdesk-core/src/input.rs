//! Key edge and hold tracking.
//!
//! The keypad reports its full button state in every interface frame;
//! nothing on the wire says "pressed" or "released". This tracker keeps
//! the previous state byte and the uptime at which it last changed, and
//! synthesizes edge events from the differences. Hold durations are
//! wall-clock since the state byte last changed.

use heapless::Vec;
use liftdesk_protocol::{KeyChord, KeyMask};

/// Synthetic event produced by a state-byte change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    /// A recognized chord appeared
    Pressed { chord: KeyChord },
    /// A recognized chord disappeared after being held for `held_ms`
    Released { chord: KeyChord, held_ms: u32 },
}

/// Tracks the latest keypad state and its age
#[derive(Debug, Clone)]
pub struct KeyTracker {
    mask: KeyMask,
    chord: Option<KeyChord>,
    since_ms: u32,
}

impl Default for KeyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTracker {
    pub fn new() -> Self {
        Self {
            mask: KeyMask::NONE,
            chord: None,
            since_ms: 0,
        }
    }

    /// Feed the state byte from a validated interface frame.
    ///
    /// A change emits the release of the old chord (if any) before the
    /// press of the new one. An unchanged byte emits nothing; the hold
    /// duration keeps accumulating.
    pub fn update(&mut self, mask: KeyMask, now_ms: u32) -> Vec<KeyEvent, 2> {
        let mut events = Vec::new();
        if mask == self.mask {
            return events;
        }

        if let Some(old) = self.chord {
            let held_ms = now_ms.saturating_sub(self.since_ms);
            // Capacity 2 always suffices: one release plus one press
            let _ = events.push(KeyEvent::Released {
                chord: old,
                held_ms,
            });
        }

        self.mask = mask;
        self.since_ms = now_ms;
        self.chord = KeyChord::classify(mask);

        if let Some(new) = self.chord {
            let _ = events.push(KeyEvent::Pressed { chord: new });
        }
        events
    }

    /// The live chord and how long the current state byte has persisted
    pub fn current(&self, now_ms: u32) -> Option<(KeyChord, u32)> {
        self.chord
            .map(|chord| (chord, now_ms.saturating_sub(self.since_ms)))
    }

    /// Raw state byte as last reported
    pub fn mask(&self) -> KeyMask {
        self.mask
    }

    /// True if any button is currently down
    pub fn any_pressed(&self) -> bool {
        !self.mask.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_emits_event() {
        let mut tracker = KeyTracker::new();
        let events = tracker.update(KeyMask::UP, 100);
        assert_eq!(events.as_slice(), &[KeyEvent::Pressed {
            chord: KeyChord::Up
        }]);
    }

    #[test]
    fn test_unchanged_state_is_silent() {
        let mut tracker = KeyTracker::new();
        tracker.update(KeyMask::UP, 100);
        assert!(tracker.update(KeyMask::UP, 200).is_empty());
        assert_eq!(tracker.current(300), Some((KeyChord::Up, 200)));
    }

    #[test]
    fn test_release_carries_duration() {
        let mut tracker = KeyTracker::new();
        tracker.update(KeyMask::UP, 100);
        let events = tracker.update(KeyMask::NONE, 850);
        assert_eq!(events.as_slice(), &[KeyEvent::Released {
            chord: KeyChord::Up,
            held_ms: 750,
        }]);
        assert_eq!(tracker.current(900), None);
    }

    #[test]
    fn test_chord_to_chord_transition() {
        // UP while holding turns into UP+DOWN: release then press
        let mut tracker = KeyTracker::new();
        tracker.update(KeyMask::UP, 0);
        let events = tracker.update(KeyMask::UP | KeyMask::DOWN, 400);
        assert_eq!(
            events.as_slice(),
            &[
                KeyEvent::Released {
                    chord: KeyChord::Up,
                    held_ms: 400,
                },
                KeyEvent::Pressed {
                    chord: KeyChord::UpDown
                },
            ]
        );
    }

    #[test]
    fn test_unrecognized_mask_tracks_duration_only() {
        let mut tracker = KeyTracker::new();
        let events = tracker.update(KeyMask::MEMORY | KeyMask::SLOT1, 100);
        assert!(events.is_empty());
        assert_eq!(tracker.current(500), None);
        assert!(tracker.any_pressed());

        // Releasing an unrecognized combination emits nothing either
        assert!(tracker.update(KeyMask::NONE, 600).is_empty());
    }

    #[test]
    fn test_timer_button_invisible_to_chords() {
        let mut tracker = KeyTracker::new();
        assert!(tracker.update(KeyMask::TIMER, 0).is_empty());
        assert_eq!(tracker.current(100), None);
    }
}
