//! Destination for pad output.
//!
//! The virtual pad only ever emits discrete edges: a button went down, a
//! turbo bit was enabled, rewind started. `InputSink` is the boundary to
//! whatever owns controller state (usually the emulation runtime).
//!
//! `PadMask` is a self-contained sink that folds those edges into the
//! per-port controller byte, applying the turbo cadence per frame.

use log::debug;

use crate::button::{BUTTONS, NesButton, PORT_COUNT, Port, SystemAction};

/// Default number of frames for each turbo phase (on, then off).
pub const TURBO_FRAMES_DEFAULT: u8 = 2;

/// Receiver of pad output.
pub trait InputSink {
    /// Press or release a button on a controller port.
    fn set_pressed(&mut self, button: NesButton, pressed: bool, port: Port);

    /// Enable or disable auto-fire for a button on a controller port.
    fn set_turbo_enabled(&mut self, button: NesButton, enabled: bool, port: Port);

    /// Start or stop a front-end action.
    fn set_action(&mut self, _action: SystemAction, _active: bool) {}

    /// Short vibration on a d-pad engage.
    fn haptic_pulse(&mut self) {}
}

/// One recorded sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Pressed {
        button: NesButton,
        pressed: bool,
        port: Port,
    },
    Turbo {
        button: NesButton,
        enabled: bool,
        port: Port,
    },
    Action {
        action: SystemAction,
        active: bool,
    },
    Haptic,
}

/// Records every call in order.
impl InputSink for Vec<SinkEvent> {
    fn set_pressed(&mut self, button: NesButton, pressed: bool, port: Port) {
        self.push(SinkEvent::Pressed {
            button,
            pressed,
            port,
        });
    }

    fn set_turbo_enabled(&mut self, button: NesButton, enabled: bool, port: Port) {
        self.push(SinkEvent::Turbo {
            button,
            enabled,
            port,
        });
    }

    fn set_action(&mut self, action: SystemAction, active: bool) {
        self.push(SinkEvent::Action { action, active });
    }

    fn haptic_pulse(&mut self) {
        self.push(SinkEvent::Haptic);
    }
}

/// Per-port held and turbo masks with frame-based turbo cadence.
#[derive(Debug, Clone)]
pub struct PadMask {
    pressed: [u8; PORT_COUNT],
    turbo: [u8; PORT_COUNT],
    /// Turbo mask seen at the previous `resolve`, for rising-edge detection.
    turbo_prev: [u8; PORT_COUNT],
    /// Frame at which each turbo bit was enabled.
    turbo_start: [[u64; 8]; PORT_COUNT],
    turbo_on_frames: u8,
    turbo_off_frames: u8,
    rewinding: bool,
    fast_forwarding: bool,
    haptic_pulses: u64,
}

impl PadMask {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pressed: [0; PORT_COUNT],
            turbo: [0; PORT_COUNT],
            turbo_prev: [0; PORT_COUNT],
            turbo_start: [[0; 8]; PORT_COUNT],
            turbo_on_frames: TURBO_FRAMES_DEFAULT,
            turbo_off_frames: TURBO_FRAMES_DEFAULT,
            rewinding: false,
            fast_forwarding: false,
            haptic_pulses: 0,
        }
    }

    /// Configure turbo as an ON/OFF cycle. Zero is treated as one frame.
    ///
    /// `on_frames=2, off_frames=1` presses for 2 frames, releases for 1.
    pub fn set_turbo_timing(&mut self, on_frames: u8, off_frames: u8) {
        self.turbo_on_frames = on_frames.max(1);
        self.turbo_off_frames = off_frames.max(1);
    }

    #[must_use]
    pub fn turbo_timing(&self) -> (u8, u8) {
        (self.turbo_on_frames, self.turbo_off_frames)
    }

    /// Buttons currently held on a port (without turbo).
    #[must_use]
    pub fn pressed_mask(&self, port: Port) -> u8 {
        self.pressed.get(port as usize).copied().unwrap_or(0)
    }

    /// Buttons with turbo enabled on a port.
    #[must_use]
    pub fn turbo_mask(&self, port: Port) -> u8 {
        self.turbo.get(port as usize).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_action_active(&self, action: SystemAction) -> bool {
        match action {
            SystemAction::Rewind => self.rewinding,
            SystemAction::FastForward => self.fast_forwarding,
        }
    }

    /// Number of haptic pulses requested so far.
    #[must_use]
    pub fn haptic_pulses(&self) -> u64 {
        self.haptic_pulses
    }

    /// Controller byte for `port` at `frame`: held buttons plus the turbo
    /// buttons that are in the ON phase of their cycle.
    ///
    /// Each turbo bit is anchored to the frame it was first seen enabled, so
    /// the first frame after enabling is always pressed.
    pub fn resolve(&mut self, port: Port, frame: u64) -> u8 {
        let pad = port as usize;
        if pad >= PORT_COUNT {
            return 0;
        }

        let turbo_mask = self.turbo[pad];
        let rising = turbo_mask & !self.turbo_prev[pad];
        for button in BUTTONS {
            if rising & button.mask() != 0 {
                self.turbo_start[pad][button.bit() as usize] = frame;
            }
        }
        self.turbo_prev[pad] = turbo_mask;

        let on = u64::from(self.turbo_on_frames);
        let cycle = (on + u64::from(self.turbo_off_frames)).max(1);

        let mut mask = self.pressed[pad];
        for button in BUTTONS {
            if turbo_mask & button.mask() == 0 {
                continue;
            }
            let start = self.turbo_start[pad][button.bit() as usize];
            if frame.wrapping_sub(start) % cycle < on {
                mask |= button.mask();
            }
        }
        mask
    }

    fn slot(masks: &mut [u8; PORT_COUNT], port: Port) -> Option<&mut u8> {
        let slot = masks.get_mut(port as usize);
        if slot.is_none() {
            debug!("ignoring input for out-of-range port {port}");
        }
        slot
    }
}

impl Default for PadMask {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSink for PadMask {
    fn set_pressed(&mut self, button: NesButton, pressed: bool, port: Port) {
        if let Some(mask) = Self::slot(&mut self.pressed, port) {
            if pressed {
                *mask |= button.mask();
            } else {
                *mask &= !button.mask();
            }
        }
    }

    fn set_turbo_enabled(&mut self, button: NesButton, enabled: bool, port: Port) {
        if let Some(mask) = Self::slot(&mut self.turbo, port) {
            if enabled {
                *mask |= button.mask();
            } else {
                *mask &= !button.mask();
            }
        }
    }

    fn set_action(&mut self, action: SystemAction, active: bool) {
        match action {
            SystemAction::Rewind => self.rewinding = active,
            SystemAction::FastForward => self.fast_forwarding = active,
        }
    }

    fn haptic_pulse(&mut self) {
        self.haptic_pulses += 1;
    }
}
