//! Single-pointer d-pad state machine.

use log::debug;
use vpad_core::{InputSink, Observable, Point, PointerId, Port, Value};

use crate::classifier::{ClassifierConfig, Directions, classify};

/// Per-event inputs that come from settings and the current layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpadParams {
    /// Visual disc diameter in pixels.
    pub diameter: f32,
    pub classifier: ClassifierConfig,
    /// Fire a haptic pulse when a direction first engages.
    pub haptics: bool,
    pub port: Port,
}

/// Tracks the pointer driving a d-pad and the directions it holds.
///
/// Only one pointer is tracked; any other pointer is ignored until the
/// tracked one ends.
#[derive(Debug, Clone, Default)]
pub struct DpadTracker {
    pointer: Option<PointerId>,
    directions: Directions,
    /// Port the held directions were pressed on.
    port: Port,
}

impl DpadTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held directions.
    #[must_use]
    pub fn directions(&self) -> Directions {
        self.directions
    }

    /// Pointer currently driving the pad.
    #[must_use]
    pub fn pointer(&self) -> Option<PointerId> {
        self.pointer
    }

    /// Begin tracking `id`. Returns `false` if another pointer is already
    /// tracked, in which case nothing happens.
    pub fn pointer_down(
        &mut self,
        id: PointerId,
        offset: Point,
        params: &DpadParams,
        sink: &mut impl InputSink,
    ) -> bool {
        if self.pointer.is_some() {
            return false;
        }
        self.pointer = Some(id);
        self.port = params.port;
        self.update(offset, params, sink);
        true
    }

    /// Reclassify for a move of the tracked pointer. Other pointers are
    /// ignored and return `false`.
    pub fn pointer_move(
        &mut self,
        id: PointerId,
        offset: Point,
        params: &DpadParams,
        sink: &mut impl InputSink,
    ) -> bool {
        if self.pointer != Some(id) {
            return false;
        }
        self.update(offset, params, sink);
        true
    }

    /// End the tracked pointer (up or cancel). Every direction is released.
    pub fn pointer_end(&mut self, id: PointerId, sink: &mut impl InputSink) -> bool {
        if self.pointer != Some(id) {
            return false;
        }
        self.release_all(sink);
        true
    }

    /// Drop the pointer and release all four directions, whatever is held.
    pub fn release_all(&mut self, sink: &mut impl InputSink) {
        for button in Directions::all_buttons() {
            sink.set_pressed(button, false, self.port);
        }
        if !self.directions.is_empty() {
            debug!("dpad released {:?}", self.directions.names());
        }
        self.pointer = None;
        self.directions = Directions::empty();
    }

    fn update(&mut self, offset: Point, params: &DpadParams, sink: &mut impl InputSink) {
        let next = classify(offset, params.diameter, params.classifier);
        if next == self.directions {
            return;
        }

        // Release before press so opposite directions never overlap.
        for button in (self.directions - next).buttons() {
            sink.set_pressed(button, false, self.port);
        }
        for button in (next - self.directions).buttons() {
            sink.set_pressed(button, true, self.port);
        }

        if self.directions.is_empty() && params.haptics {
            sink.haptic_pulse();
        }

        debug!(
            "dpad {:?} -> {:?}",
            self.directions.names(),
            next.names()
        );
        self.directions = next;
    }
}

impl Observable for DpadTracker {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pointer" => Some(self.pointer.into()),
            "directions" => Some(Value::Array(
                self.directions.names().into_iter().map(Value::from).collect(),
            )),
            "port" => Some(self.port.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["pointer", "directions", "port"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpad_core::{NesButton, SinkEvent};

    fn params() -> DpadParams {
        DpadParams {
            diameter: 160.0,
            classifier: ClassifierConfig::default(),
            haptics: true,
            port: 0,
        }
    }

    fn presses(events: &[SinkEvent]) -> Vec<(NesButton, bool)> {
        events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Pressed {
                    button, pressed, ..
                } => Some((*button, *pressed)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn second_pointer_is_ignored() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        assert!(pad.pointer_down(1, Point::new(40.0, 0.0), &params(), &mut sink));
        assert!(!pad.pointer_down(2, Point::new(-40.0, 0.0), &params(), &mut sink));
        assert!(!pad.pointer_move(2, Point::new(0.0, 40.0), &params(), &mut sink));
        assert!(!pad.pointer_end(2, &mut sink));
        assert_eq!(pad.directions(), Directions::RIGHT);
        assert_eq!(pad.pointer(), Some(1));
    }

    #[test]
    fn engage_fires_one_haptic_pulse() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        pad.pointer_down(1, Point::new(40.0, 0.0), &params(), &mut sink);
        pad.pointer_move(1, Point::new(40.0, 40.0), &params(), &mut sink);
        pad.pointer_move(1, Point::new(0.0, 40.0), &params(), &mut sink);

        let pulses = sink.iter().filter(|e| **e == SinkEvent::Haptic).count();
        assert_eq!(pulses, 1);
    }

    #[test]
    fn no_haptic_when_disabled() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        let p = DpadParams {
            haptics: false,
            ..params()
        };
        pad.pointer_down(1, Point::new(40.0, 0.0), &p, &mut sink);
        assert!(!sink.contains(&SinkEvent::Haptic));
    }

    #[test]
    fn unchanged_set_emits_nothing() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        pad.pointer_down(1, Point::new(40.0, 0.0), &params(), &mut sink);
        let before = sink.len();
        pad.pointer_move(1, Point::new(60.0, 5.0), &params(), &mut sink);
        assert_eq!(sink.len(), before);
    }

    #[test]
    fn rotation_releases_before_pressing() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        pad.pointer_down(1, Point::new(40.0, 0.0), &params(), &mut sink);
        sink.clear();
        pad.pointer_move(1, Point::new(-40.0, 0.0), &params(), &mut sink);
        assert_eq!(
            presses(&sink),
            vec![(NesButton::Right, false), (NesButton::Left, true)]
        );
    }

    #[test]
    fn end_releases_every_direction() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        pad.pointer_down(1, Point::new(30.0, 30.0), &params(), &mut sink);
        sink.clear();
        assert!(pad.pointer_end(1, &mut sink));
        assert_eq!(presses(&sink).len(), 4);
        assert!(presses(&sink).iter().all(|(_, pressed)| !pressed));
        assert!(pad.directions().is_empty());
        assert_eq!(pad.pointer(), None);
    }

    #[test]
    fn query_reports_state() {
        let mut pad = DpadTracker::new();
        let mut sink: Vec<SinkEvent> = Vec::new();
        pad.pointer_down(7, Point::new(0.0, -40.0), &params(), &mut sink);
        assert_eq!(pad.query("pointer"), Some(Value::U64(7)));
        assert_eq!(
            pad.query("directions"),
            Some(Value::Array(vec![Value::from("Up")]))
        );
        assert_eq!(pad.query("nope"), None);
    }
}
