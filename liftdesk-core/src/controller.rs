//! Desk controller tick entry point.
//!
//! One `DeskController` owns every piece of mutable state: the operating
//! mode, the key tracker, the height target, the preset machine and one
//! regulator per motor channel. A single call per control-loop pass
//! applies the inputs and produces the outbound frames; there are no
//! statics and no I/O here, which is what makes the whole control path
//! testable on the host.

use liftdesk_protocol::segment::{height_to_digits, WORD_ERROR, WORD_RESET};
use liftdesk_protocol::{DisplayFrame, DriveCommand, KeyChord, KeyMask};

use crate::config::DeskConfig;
use crate::height::HeightController;
use crate::link::LinkError;
use crate::input::{KeyEvent, KeyTracker};
use crate::memory::MemoryMachine;
use crate::mode::Mode;
use crate::presets::PresetSlots;
use crate::regulator::{ChannelRegulator, Observation};

/// Maximum motor-controller channels
pub const MAX_CHANNELS: usize = 2;

/// What one channel link delivered this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelInput {
    /// Nothing complete arrived (stream empty or frame still in flight)
    #[default]
    Idle,
    /// A validated display frame
    Frame(DisplayFrame),
    /// The bounded frame read exhausted its scan budget
    Timeout,
}

impl ChannelInput {
    /// Map a link poll result onto a tick input.
    ///
    /// A scan-budget exhaustion counts toward the channel's timeout run;
    /// a corrupt frame is equivalent to nothing arriving (the stream
    /// resynchronizes on the next read).
    pub fn from_poll(polled: Result<Option<DisplayFrame>, LinkError>) -> Self {
        match polled {
            Ok(Some(frame)) => ChannelInput::Frame(frame),
            Ok(None) => ChannelInput::Idle,
            Err(LinkError::Timeout) => ChannelInput::Timeout,
            Err(LinkError::Frame(_)) => ChannelInput::Idle,
        }
    }
}

/// Per-tick inputs, assembled by the link pump
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInputs {
    /// State byte from the latest validated interface frame, if any
    pub keys: Option<KeyMask>,
    pub channels: [ChannelInput; MAX_CHANNELS],
}

impl TickInputs {
    /// A tick on which nothing arrived
    pub fn idle() -> Self {
        Self::default()
    }

    /// A tick carrying only a keypad report
    pub fn keys(mask: KeyMask) -> Self {
        Self {
            keys: Some(mask),
            ..Self::default()
        }
    }
}

/// Per-tick outputs for the link pump to write
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutputs {
    /// Drive command per active channel; all `None` off-cadence or in the
    /// error state
    pub drive: [Option<DriveCommand>; MAX_CHANNELS],
    /// Frame for the keypad display, emitted on the send cadence
    pub display: Option<DisplayFrame>,
    /// Presets to persist (memory-mode commit happened this tick)
    pub save_presets: Option<PresetSlots>,
}

/// The desk control state machine
#[derive(Debug)]
pub struct DeskController {
    config: DeskConfig,
    mode: Mode,
    tracker: KeyTracker,
    height: HeightController,
    memory: MemoryMachine,
    presets: PresetSlots,
    channels: [ChannelRegulator; MAX_CHANNELS],
    channel_count: usize,
    /// First valid reading seeds the target so the desk holds position
    /// at power-on instead of driving toward the range bottom
    target_seeded: bool,
    /// The current UP+DOWN hold already triggered a reset; the pair must
    /// be released before it can arm another one
    reset_hold_spent: bool,
    clock_ms: u32,
    send_elapsed_ms: u32,
}

impl DeskController {
    pub fn new(config: DeskConfig, channel_count: usize) -> Self {
        Self {
            mode: Mode::Normal,
            tracker: KeyTracker::new(),
            height: HeightController::new(&config),
            memory: MemoryMachine::new(),
            presets: PresetSlots::defaults(&config),
            channels: [ChannelRegulator::new(), ChannelRegulator::new()],
            channel_count: channel_count.clamp(1, MAX_CHANNELS),
            target_seeded: false,
            reset_hold_spent: false,
            clock_ms: 0,
            send_elapsed_ms: 0,
            config,
        }
    }

    /// Replace the presets with a record loaded from the persistent store
    pub fn with_presets(mut self, presets: PresetSlots) -> Self {
        self.presets = presets;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> f32 {
        self.height.target()
    }

    pub fn presets(&self) -> &PresetSlots {
        &self.presets
    }

    /// Advance the controller by one pass of the control loop.
    ///
    /// This is the only place any state mutates.
    pub fn tick(&mut self, dt_ms: u32, inputs: &TickInputs) -> TickOutputs {
        self.clock_ms = self.clock_ms.wrapping_add(dt_ms);

        let mut outputs = TickOutputs::default();

        if let Some(mask) = inputs.keys {
            let events = self.tracker.update(mask, self.clock_ms);
            for event in events {
                self.handle_key_event(event);
            }
        }
        self.process_hold(dt_ms);

        // The commit only applies while memory mode still owns the desk;
        // a fault latched in the meantime must not be un-latched here
        if self.memory.tick(dt_ms, &self.config) && self.mode == Mode::Memory {
            self.mode = Mode::Normal;
            outputs.save_presets = Some(self.presets);
        }

        self.process_channels(inputs);

        self.send_elapsed_ms += dt_ms;
        if self.send_elapsed_ms >= self.config.send_interval_ms {
            self.send_elapsed_ms = 0;
            if self.mode.drive_allowed() {
                for (index, channel) in self.channels.iter().enumerate().take(self.channel_count)
                {
                    outputs.drive[index] =
                        Some(channel.drive(self.height.target(), self.mode, &self.config));
                }
            }
            outputs.display = Some(self.render_display());
        }
        outputs
    }

    fn handle_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed { chord } => match (self.mode, chord) {
                (Mode::Normal, KeyChord::Up) => self.height.nudge_up(&self.config),
                (Mode::Normal, KeyChord::Down) => self.height.nudge_down(&self.config),
                (Mode::Normal, KeyChord::Memory) => {
                    self.memory.enter();
                    self.mode = Mode::Memory;
                }
                _ => {}
            },
            KeyEvent::Released { chord, held_ms } => {
                if chord == KeyChord::UpDown {
                    self.reset_hold_spent = false;
                }
                match (self.mode, chord) {
                    (Mode::Normal, KeyChord::Up) => self.height.release_up(&self.config),
                    (Mode::Normal, KeyChord::Down) => self.height.release_down(&self.config),
                    (Mode::Normal, KeyChord::Slot(slot)) => {
                        self.height.recall(slot, &self.presets, &self.config)
                    }
                    (Mode::Memory, KeyChord::Memory) if held_ms < self.config.short_tap_ms => {
                        // Accidental tap: abandon programming
                        self.memory.cancel();
                        self.mode = Mode::Normal;
                    }
                    (Mode::Memory, KeyChord::Slot(slot)) => {
                        self.memory
                            .select(slot, self.height.target(), &mut self.presets);
                    }
                    (Mode::Reset { .. }, KeyChord::UpDown) => {
                        // Early release aborts the reset sequence outright
                        self.mode = Mode::Normal;
                        self.height.reset_velocity(&self.config);
                    }
                    _ => {}
                }
            }
        }
    }

    fn process_hold(&mut self, dt_ms: u32) {
        let Some((chord, held_ms)) = self.tracker.current(self.clock_ms) else {
            return;
        };

        match (self.mode, chord) {
            (Mode::Normal, KeyChord::Up) if held_ms >= self.config.short_tap_ms => {
                self.height.hold_up(dt_ms, &self.config)
            }
            (Mode::Normal, KeyChord::Down) if held_ms >= self.config.short_tap_ms => {
                self.height.hold_down(dt_ms, &self.config)
            }
            (Mode::Normal, KeyChord::UpDown)
                if held_ms >= self.config.long_tap_ms && !self.reset_hold_spent =>
            {
                self.mode = Mode::enter_reset();
                self.reset_hold_spent = true;
                self.height.reset_velocity(&self.config);
            }
            _ => {}
        }
    }

    fn process_channels(&mut self, inputs: &TickInputs) {
        for index in 0..self.channel_count {
            match inputs.channels[index] {
                ChannelInput::Idle => {}
                ChannelInput::Frame(frame) => {
                    match self.channels[index].observe_frame(&frame) {
                        Observation::Ack => {
                            if !self.target_seeded {
                                // Hold the reported position until the user asks
                                // for something else
                                if let Some(height) = self.channels[index].reported() {
                                    self.height.set_target(height, &self.config);
                                }
                                self.target_seeded = true;
                            }
                            self.mode.acknowledge();
                        }
                        Observation::ResetWord => {
                            // Expected while a reset drive is in progress;
                            // anywhere else it means the controller faulted
                            if !matches!(self.mode, Mode::Reset { .. }) {
                                self.latch_fault();
                            }
                        }
                        Observation::Anomaly => {}
                    }
                }
                ChannelInput::Timeout => {
                    if self.channels[index].observe_timeout(&self.config) {
                        self.latch_fault();
                    }
                }
            }
        }
    }

    fn latch_fault(&mut self) {
        self.mode = Mode::Error;
        // An in-flight preset selection must not commit after the fault
        self.memory.cancel();
    }

    fn render_display(&self) -> DisplayFrame {
        let digits = match self.mode {
            Mode::Error => WORD_ERROR,
            Mode::Reset { .. } => WORD_RESET,
            Mode::Memory => self
                .memory
                .display(&self.config)
                .unwrap_or([0x00, 0x00, 0x00]),
            Mode::Normal => height_to_digits(self.height.target()),
        };

        DisplayFrame {
            digits,
            lights: self.tracker.any_pressed(),
            indicator: matches!(self.mode, Mode::Error),
        }
    }
}
