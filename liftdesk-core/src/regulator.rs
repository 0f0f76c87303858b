//! Per-channel height regulation.
//!
//! Each motor controller reports its current height by echoing display
//! frames; the regulator compares the decoded reading against the target
//! and asserts UP/DOWN around a deadband. The channel also watches its
//! own link health: a reported "rSt" word or a run of frame-read
//! timeouts faults the whole desk.

use liftdesk_protocol::segment::DecodeAnomaly;
use liftdesk_protocol::{DisplayFrame, DriveCommand};

use crate::config::DeskConfig;
use crate::mode::Mode;

/// Outcome of feeding one channel frame to the regulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Observation {
    /// Valid height reading; counts as a channel acknowledgment
    Ack,
    /// Controller is showing the reserved reset word
    ResetWord,
    /// Unrecognized segment pattern; reading discarded, not fatal
    Anomaly,
}

/// State of one motor-controller channel
#[derive(Debug, Clone)]
pub struct ChannelRegulator {
    reported: Option<f32>,
    timeouts: u8,
}

impl Default for ChannelRegulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegulator {
    pub fn new() -> Self {
        Self {
            reported: None,
            timeouts: 0,
        }
    }

    /// Most recent valid height reading
    pub fn reported(&self) -> Option<f32> {
        self.reported
    }

    /// Consecutive frame-read timeouts on this channel
    pub fn timeout_run(&self) -> u8 {
        self.timeouts
    }

    /// Feed a validated display frame from this channel
    pub fn observe_frame(&mut self, frame: &DisplayFrame) -> Observation {
        match frame.height() {
            Ok(height) => {
                self.reported = Some(height);
                self.timeouts = 0;
                Observation::Ack
            }
            Err(DecodeAnomaly::ResetWord) => Observation::ResetWord,
            Err(DecodeAnomaly::Unrecognized) => Observation::Anomaly,
        }
    }

    /// Record a frame-read timeout.
    ///
    /// Returns true when the run is long enough to fault the desk.
    pub fn observe_timeout(&mut self, config: &DeskConfig) -> bool {
        self.timeouts = self.timeouts.saturating_add(1);
        self.timeouts >= config.max_timeouts
    }

    /// Drive decision for this channel.
    ///
    /// Reset mode drives both directions (the controller interprets the
    /// pair as its calibration command); Error mode is handled by the
    /// caller never asking.
    pub fn drive(&self, target: f32, mode: Mode, config: &DeskConfig) -> DriveCommand {
        if matches!(mode, Mode::Reset { .. }) {
            return DriveCommand {
                up: true,
                down: true,
            };
        }

        match self.reported {
            Some(height) => DriveCommand {
                up: height < target - config.allowed_diff,
                down: height > target + config.allowed_diff,
            },
            // No reading yet: hold position
            None => DriveCommand::stopped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftdesk_protocol::height_to_digits;
    use liftdesk_protocol::segment::WORD_RESET;

    fn config() -> DeskConfig {
        DeskConfig::default()
    }

    fn frame(height: f32) -> DisplayFrame {
        DisplayFrame::new(height_to_digits(height))
    }

    #[test]
    fn test_valid_frame_updates_reading() {
        let mut channel = ChannelRegulator::new();
        assert_eq!(channel.observe_frame(&frame(700.0)), Observation::Ack);
        assert_eq!(channel.reported(), Some(700.0));
    }

    #[test]
    fn test_reset_word_reported() {
        let mut channel = ChannelRegulator::new();
        channel.observe_frame(&frame(700.0));
        assert_eq!(
            channel.observe_frame(&DisplayFrame::new(WORD_RESET)),
            Observation::ResetWord
        );
        // The stale reading is kept, not overwritten
        assert_eq!(channel.reported(), Some(700.0));
    }

    #[test]
    fn test_anomaly_is_nonfatal() {
        let mut channel = ChannelRegulator::new();
        channel.observe_frame(&frame(700.0));
        assert_eq!(
            channel.observe_frame(&DisplayFrame::new([0x49, 0x49, 0x49])),
            Observation::Anomaly
        );
        assert_eq!(channel.reported(), Some(700.0));
    }

    #[test]
    fn test_timeout_run_escalates() {
        let config = config();
        let mut channel = ChannelRegulator::new();

        assert!(!channel.observe_timeout(&config));
        assert!(!channel.observe_timeout(&config));
        assert!(channel.observe_timeout(&config));
    }

    #[test]
    fn test_valid_frame_clears_timeout_run() {
        let config = config();
        let mut channel = ChannelRegulator::new();

        channel.observe_timeout(&config);
        channel.observe_timeout(&config);
        channel.observe_frame(&frame(700.0));
        assert_eq!(channel.timeout_run(), 0);
    }

    #[test]
    fn test_drive_deadband() {
        let config = config();
        let mut channel = ChannelRegulator::new();
        channel.observe_frame(&frame(700.0));

        // Inside the deadband: hold
        let hold = channel.drive(703.0, Mode::Normal, &config);
        assert!(!hold.is_moving());

        // Below target: drive up
        let up = channel.drive(740.0, Mode::Normal, &config);
        assert!(up.up && !up.down);

        // Above target: drive down
        let down = channel.drive(660.0, Mode::Normal, &config);
        assert!(down.down && !down.up);
    }

    #[test]
    fn test_no_reading_no_drive() {
        let config = config();
        let channel = ChannelRegulator::new();
        assert!(!channel.drive(700.0, Mode::Normal, &config).is_moving());
    }

    #[test]
    fn test_reset_drives_both() {
        let config = config();
        let channel = ChannelRegulator::new();
        let drive = channel.drive(700.0, Mode::Reset { phase: 2 }, &config);
        assert!(drive.up && drive.down);
    }
}
