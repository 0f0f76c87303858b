//! Compiled-in configuration constants.
//!
//! The board exposes no configuration surface at runtime; every threshold
//! is a field here so the control logic can be exercised with shortened
//! timings in tests.

/// Desk control configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeskConfig {
    /// Lowest reachable height in device units (mm)
    pub min_height: f32,
    /// Highest reachable height in device units (mm)
    pub max_height: f32,
    /// Velocity floor, units per millisecond; also the post-release reset value
    pub default_speed: f32,
    /// Velocity ceiling, units per millisecond
    pub max_speed: f32,
    /// Release velocity at or above which the target snaps to the 10-unit grid
    pub snap_threshold: f32,
    /// Multiplicative ramp gain per millisecond of hold
    pub ramp_gain: f32,
    /// Hold duration that distinguishes a tap from a hold
    pub short_tap_ms: u32,
    /// UP+DOWN hold duration that enters the reset sequence
    pub long_tap_ms: u32,
    /// Memory-mode blink period (lit for the first half)
    pub blink_ms: u32,
    /// Memory-mode auto-commit delay after a slot is selected
    pub hide_delay_ms: u32,
    /// Height deadband around the target before a drive direction asserts
    pub allowed_diff: f32,
    /// Cadence for outbound drive and display frames
    pub send_interval_ms: u32,
    /// Maximum bytes scanned per frame-read invocation
    pub loop_bound: usize,
    /// Consecutive frame-read timeouts before a channel faults the desk
    pub max_timeouts: u8,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            min_height: 620.0,
            max_height: 1280.0,
            default_speed: 0.0001,
            max_speed: 0.001,
            snap_threshold: 0.0004,
            ramp_gain: 0.001,
            short_tap_ms: 500,
            long_tap_ms: 1500,
            blink_ms: 700,
            hide_delay_ms: 3000,
            allowed_diff: 5.0,
            send_interval_ms: 10,
            loop_bound: 64,
            max_timeouts: 3,
        }
    }
}

impl DeskConfig {
    /// Midpoint of the height range (default for the middle preset slot)
    pub fn mid_height(&self) -> f32 {
        (self.min_height + self.max_height) / 2.0
    }

    /// Clamp a height into the reachable range
    pub fn clamp_height(&self, height: f32) -> f32 {
        height.clamp(self.min_height, self.max_height)
    }

    /// Clamp a velocity into the configured band
    pub fn clamp_speed(&self, speed: f32) -> f32 {
        speed.clamp(self.default_speed, self.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_ordered() {
        let config = DeskConfig::default();
        assert!(config.min_height < config.max_height);
        assert!(config.default_speed < config.snap_threshold);
        assert!(config.snap_threshold < config.max_speed);
        assert!(config.short_tap_ms < config.long_tap_ms);
    }

    #[test]
    fn test_mid_height() {
        let config = DeskConfig::default();
        assert_eq!(config.mid_height(), 950.0);
    }

    #[test]
    fn test_clamps() {
        let config = DeskConfig::default();
        assert_eq!(config.clamp_height(100.0), 620.0);
        assert_eq!(config.clamp_height(9999.0), 1280.0);
        assert_eq!(config.clamp_speed(1.0), 0.001);
        assert_eq!(config.clamp_speed(0.0), 0.0001);
    }
}
