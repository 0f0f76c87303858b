//! Target height ownership.
//!
//! The height controller is the sole owner of the user-requested target
//! and the hold-ramp velocity. A tap nudges the target by one unit; a
//! hold past the tap threshold compounds the velocity multiplicatively
//! every tick and integrates it into the target; a release from a fast
//! ramp snaps the target onto the 10-unit grid. All bounds are hard
//! clamps, never errors.

use crate::config::DeskConfig;
use crate::presets::PresetSlots;

/// Owns the target height and the ramp velocity
#[derive(Debug, Clone)]
pub struct HeightController {
    target: f32,
    velocity: f32,
}

impl HeightController {
    pub fn new(config: &DeskConfig) -> Self {
        Self {
            target: config.min_height,
            velocity: config.default_speed,
        }
    }

    /// Current target height
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current ramp velocity (units per millisecond)
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Jump the target to an absolute height, clamped
    pub fn set_target(&mut self, height: f32, config: &DeskConfig) {
        self.target = config.clamp_height(height);
    }

    /// Single-unit tap adjustment upward
    pub fn nudge_up(&mut self, config: &DeskConfig) {
        self.set_target(self.target + 1.0, config);
    }

    /// Single-unit tap adjustment downward
    pub fn nudge_down(&mut self, config: &DeskConfig) {
        self.set_target(self.target - 1.0, config);
    }

    /// One tick of a sustained UP hold past the tap threshold
    pub fn hold_up(&mut self, dt_ms: u32, config: &DeskConfig) {
        self.ramp(dt_ms, config);
        self.set_target(self.target + self.velocity * dt_ms as f32, config);
    }

    /// One tick of a sustained DOWN hold past the tap threshold
    pub fn hold_down(&mut self, dt_ms: u32, config: &DeskConfig) {
        self.ramp(dt_ms, config);
        self.set_target(self.target - self.velocity * dt_ms as f32, config);
    }

    /// UP released: snap up to the grid if the ramp got fast enough
    pub fn release_up(&mut self, config: &DeskConfig) {
        if self.velocity >= config.snap_threshold {
            self.set_target(ceil_to_grid(self.target), config);
        }
        self.velocity = config.default_speed;
    }

    /// DOWN released: snap down to the grid if the ramp got fast enough
    pub fn release_down(&mut self, config: &DeskConfig) {
        if self.velocity >= config.snap_threshold {
            self.set_target(floor_to_grid(self.target), config);
        }
        self.velocity = config.default_speed;
    }

    /// Recall a preset slot (1-indexed); unknown slots are ignored
    pub fn recall(&mut self, slot: u8, presets: &PresetSlots, config: &DeskConfig) {
        if let Some(height) = presets.get(slot) {
            self.set_target(height, config);
        }
    }

    /// Drop the ramp back to the floor without snapping
    pub fn reset_velocity(&mut self, config: &DeskConfig) {
        self.velocity = config.default_speed;
    }

    // Velocity compounds by (1 + gain*dt) per tick while held
    fn ramp(&mut self, dt_ms: u32, config: &DeskConfig) {
        let factor = 1.0 + config.ramp_gain * dt_ms as f32;
        self.velocity = config.clamp_speed(self.velocity * factor);
    }
}

/// Next multiple of 10 at or above `x` (heights are always positive)
fn ceil_to_grid(x: f32) -> f32 {
    let base = (x / 10.0) as i32 * 10;
    if (base as f32) < x {
        (base + 10) as f32
    } else {
        base as f32
    }
}

/// Nearest multiple of 10 at or below `x`
fn floor_to_grid(x: f32) -> f32 {
    ((x / 10.0) as i32 * 10) as f32
}
