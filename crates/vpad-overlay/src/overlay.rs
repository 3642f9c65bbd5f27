//! Pointer dispatch for the on-screen pad.
//!
//! The overlay owns one `Region` per element. A region is claimed by the
//! first pointer that lands in its hitbox and stays claimed until that
//! pointer goes up or is cancelled, even if it slides off; other pointers
//! landing on a claimed region are ignored. The d-pad region forwards its
//! pointer to a `DpadTracker`; every other region is a plain hold.
//!
//! In edit mode nothing is dispatched to the sink. Pointers instead drive
//! the layout editor: a touch near a frame corner resizes, anywhere else on
//! an element drags it.

use log::debug;
use serde::Serialize;
use vpad_core::{
    InputSink, NesButton, Observable, Point, PointerEvent, PointerId, PointerPhase, Port, Rect,
    SystemAction, Value,
};
use vpad_dpad::{DpadParams, DpadTracker};
use vpad_layout::{
    Cluster, ControlElement, ControlsSettings, Corner, EditTarget, EditorState, Layout,
    LayoutContext,
};

/// Touch distance from a frame corner that grabs the resize handle.
pub const HANDLE_RADIUS: f32 = 20.0;

/// What holding a region does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Dpad,
    Button(NesButton),
    /// Auto-fire while held.
    Turbo(NesButton),
    Action(SystemAction),
}

impl RegionKind {
    #[must_use]
    pub fn for_element(element: ControlElement) -> Self {
        match element {
            ControlElement::Dpad => Self::Dpad,
            ControlElement::A => Self::Button(NesButton::A),
            ControlElement::B => Self::Button(NesButton::B),
            ControlElement::Select => Self::Button(NesButton::Select),
            ControlElement::Start => Self::Button(NesButton::Start),
            ControlElement::TurboA => Self::Turbo(NesButton::A),
            ControlElement::TurboB => Self::Turbo(NesButton::B),
            ControlElement::Rewind => Self::Action(SystemAction::Rewind),
            ControlElement::FastForward => Self::Action(SystemAction::FastForward),
        }
    }
}

/// Interactive state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub element: ControlElement,
    pub kind: RegionKind,
    pointer: Option<PointerId>,
    active: bool,
}

impl Region {
    fn new(element: ControlElement) -> Self {
        Self {
            element,
            kind: RegionKind::for_element(element),
            pointer: None,
            active: false,
        }
    }

    /// Pointer that owns this region.
    #[must_use]
    pub fn pointer(&self) -> Option<PointerId> {
        self.pointer
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// How edit-mode drags pick their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditScope {
    /// Move and resize whole clusters.
    #[default]
    Cluster,
    /// Move and resize single elements inside their cluster.
    Element,
}

/// The on-screen pad's pointer router.
#[derive(Debug, Clone)]
pub struct Overlay {
    regions: Vec<Region>,
    dpad: DpadTracker,
    port: Port,
    editing: bool,
    edit_scope: EditScope,
    edit_pointer: Option<PointerId>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Overlay {
    #[must_use]
    pub fn new(port: Port) -> Self {
        Self {
            regions: ControlElement::ALL.iter().copied().map(Region::new).collect(),
            dpad: DpadTracker::new(),
            port,
            editing: false,
            edit_scope: EditScope::default(),
            edit_pointer: None,
        }
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn region(&self, element: ControlElement) -> &Region {
        &self.regions[element.index()]
    }

    #[must_use]
    pub fn dpad(&self) -> &DpadTracker {
        &self.dpad
    }

    #[must_use]
    pub fn port(&self) -> Port {
        self.port
    }

    /// Switch controller port. Anything held on the old port is released
    /// first.
    pub fn set_port(&mut self, port: Port, sink: &mut impl InputSink) {
        if port != self.port {
            self.release_all(sink);
            self.port = port;
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Enter or leave edit mode. Entering releases everything held.
    pub fn set_editing(&mut self, editing: bool, sink: &mut impl InputSink) {
        if editing && !self.editing {
            self.release_all(sink);
        }
        self.editing = editing;
        self.edit_pointer = None;
    }

    #[must_use]
    pub fn edit_scope(&self) -> EditScope {
        self.edit_scope
    }

    pub fn set_edit_scope(&mut self, scope: EditScope) {
        self.edit_scope = scope;
    }

    /// Route one pointer event. Returns the element that consumed it, if
    /// any. Does nothing in edit mode.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        layout: &Layout,
        settings: &ControlsSettings,
        sink: &mut impl InputSink,
    ) -> Option<ControlElement> {
        if self.editing {
            return None;
        }
        match event.phase {
            PointerPhase::Down => self.pointer_down(event, layout, settings, sink),
            PointerPhase::Move => {
                let element = self.owner(event.id)?;
                if element == ControlElement::Dpad {
                    let frame = layout.frame(ControlElement::Dpad).visual;
                    let params = self.dpad_params(frame, settings);
                    self.dpad.pointer_move(
                        event.id,
                        event.position - frame.center(),
                        &params,
                        sink,
                    );
                }
                Some(element)
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let element = self.owner(event.id)?;
                self.deactivate(element, sink);
                Some(element)
            }
        }
    }

    /// Release every held region and the d-pad. Used when the overlay is
    /// hidden, the port changes or edit mode starts.
    pub fn release_all(&mut self, sink: &mut impl InputSink) {
        for element in ControlElement::ALL {
            if self.regions[element.index()].pointer.is_some() {
                self.deactivate(element, sink);
            }
        }
        if self.dpad.pointer().is_some() {
            self.dpad.release_all(sink);
        }
    }

    /// Route one pointer event to the layout editor. Only one pointer
    /// edits at a time. Returns `true` if the event was used.
    pub fn handle_edit(
        &mut self,
        event: &PointerEvent,
        layout: &Layout,
        editor: &mut EditorState,
        ctx: &LayoutContext,
    ) -> bool {
        if !self.editing || !editor.is_editing() {
            return false;
        }
        match event.phase {
            PointerPhase::Down => {
                if self.edit_pointer.is_some() {
                    return false;
                }
                let started = match self.pick_handle(event.position, layout) {
                    Some((target, corner)) => {
                        editor.begin_resize(target, corner, event.position, ctx)
                    }
                    None => layout
                        .hit_test(event.position)
                        .map(|element| self.edit_target(element))
                        .is_some_and(|target| editor.begin_drag(target, event.position, ctx)),
                };
                if started {
                    self.edit_pointer = Some(event.id);
                }
                started
            }
            PointerPhase::Move if self.edit_pointer == Some(event.id) => {
                editor.update_gesture(event.position, ctx)
            }
            PointerPhase::Up | PointerPhase::Cancel if self.edit_pointer == Some(event.id) => {
                editor.end_gesture();
                self.edit_pointer = None;
                true
            }
            _ => false,
        }
    }

    fn edit_target(&self, element: ControlElement) -> EditTarget {
        match self.edit_scope {
            EditScope::Cluster => EditTarget::Cluster(element.cluster()),
            EditScope::Element => EditTarget::Element(element),
        }
    }

    /// Frame a target currently occupies.
    fn target_rect(target: EditTarget, layout: &Layout) -> Rect {
        match target.normalized() {
            EditTarget::Cluster(c) => layout.cluster(c),
            EditTarget::Element(e) => layout.frame(e).visual,
        }
    }

    /// Corner handle under `p`, topmost target first.
    fn pick_handle(&self, p: Point, layout: &Layout) -> Option<(EditTarget, Corner)> {
        let targets: Vec<EditTarget> = match self.edit_scope {
            EditScope::Cluster => Cluster::ALL
                .iter()
                .rev()
                .map(|&c| EditTarget::Cluster(c))
                .collect(),
            EditScope::Element => ControlElement::ALL
                .iter()
                .rev()
                .map(|&e| EditTarget::Element(e))
                .collect(),
        };
        targets.into_iter().find_map(|target| {
            let rect = Self::target_rect(target, layout);
            Corner::ALL
                .into_iter()
                .find(|corner| (corner.point(&rect) - p).length() <= HANDLE_RADIUS)
                .map(|corner| (target, corner))
        })
    }

    fn owner(&self, id: PointerId) -> Option<ControlElement> {
        self.regions
            .iter()
            .find(|r| r.pointer == Some(id))
            .map(|r| r.element)
    }

    fn dpad_params(&self, frame: Rect, settings: &ControlsSettings) -> DpadParams {
        DpadParams {
            diameter: frame.size.width,
            classifier: settings.classifier(),
            haptics: settings.haptics,
            port: self.port,
        }
    }

    fn pointer_down(
        &mut self,
        event: &PointerEvent,
        layout: &Layout,
        settings: &ControlsSettings,
        sink: &mut impl InputSink,
    ) -> Option<ControlElement> {
        if self.owner(event.id).is_some() {
            return None;
        }
        let element = layout.hit_test(event.position)?;
        let index = element.index();
        if self.regions[index].pointer.is_some() {
            debug!("{element:?} already held, ignoring pointer {}", event.id);
            return None;
        }

        let region = self.regions[index];
        match region.kind {
            RegionKind::Dpad => {
                let frame = layout.frame(ControlElement::Dpad).visual;
                let params = self.dpad_params(frame, settings);
                if !self
                    .dpad
                    .pointer_down(event.id, event.position - frame.center(), &params, sink)
                {
                    return None;
                }
            }
            RegionKind::Button(button) => sink.set_pressed(button, true, self.port),
            RegionKind::Turbo(button) => sink.set_turbo_enabled(button, true, self.port),
            RegionKind::Action(action) => sink.set_action(action, true),
        }

        let region = &mut self.regions[index];
        region.pointer = Some(event.id);
        region.active = true;
        debug!("{element:?} down (pointer {})", event.id);
        Some(element)
    }

    fn deactivate(&mut self, element: ControlElement, sink: &mut impl InputSink) {
        let region = self.regions[element.index()];
        match region.kind {
            RegionKind::Dpad => {
                if let Some(id) = region.pointer {
                    self.dpad.pointer_end(id, sink);
                }
            }
            RegionKind::Button(button) => sink.set_pressed(button, false, self.port),
            RegionKind::Turbo(button) => sink.set_turbo_enabled(button, false, self.port),
            RegionKind::Action(action) => sink.set_action(action, false),
        }
        let region = &mut self.regions[element.index()];
        region.pointer = None;
        region.active = false;
        debug!("{element:?} up");
    }
}

impl Observable for Overlay {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "port" => Some(self.port.into()),
            "editing" => Some(self.editing.into()),
            "active" => Some(Value::Array(
                self.regions
                    .iter()
                    .filter(|r| r.active)
                    .map(|r| Value::from(r.element.key()))
                    .collect(),
            )),
            "edit_pointer" => Some(self.edit_pointer.into()),
            _ => path
                .strip_prefix("dpad.")
                .and_then(|rest| self.dpad.query(rest)),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "port",
            "editing",
            "active",
            "edit_pointer",
            "dpad.pointer",
            "dpad.directions",
            "dpad.port",
        ]
    }
}
