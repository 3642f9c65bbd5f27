//! Pointer routing from touches to sink calls.

use vpad_core::{
    Insets, NesButton, Orientation, PadMask, Point, PointerEvent, SinkEvent, Size, SystemAction,
};
use vpad_layout::{
    Cluster, ControlElement, ControlsSettings, EditorState, Layout, LayoutContext, compute_layout,
};
use vpad_overlay::{EditScope, Overlay};

fn ctx() -> LayoutContext {
    LayoutContext::new(
        Size::new(800.0, 480.0),
        Insets::ZERO,
        Orientation::Landscape,
    )
}

fn setup() -> (Layout, ControlsSettings) {
    let settings = ControlsSettings::default();
    (compute_layout(&settings, &ctx(), false), settings)
}

fn released(button: NesButton) -> SinkEvent {
    SinkEvent::Pressed {
        button,
        pressed: false,
        port: 0,
    }
}

fn pressed(button: NesButton) -> SinkEvent {
    SinkEvent::Pressed {
        button,
        pressed: true,
        port: 0,
    }
}

#[test]
fn dpad_pointer_is_classified_from_disc_center() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(0);
    let mut sink: Vec<SinkEvent> = Vec::new();

    let dpad = layout.frame(ControlElement::Dpad).visual;
    let center = dpad.center();
    let radius = dpad.size.width / 2.0;

    // Half a radius to the right.
    let hit = overlay.handle(
        &PointerEvent::down(1, center + Point::new(radius * 0.5, 0.0)),
        &layout,
        &settings,
        &mut sink,
    );
    assert_eq!(hit, Some(ControlElement::Dpad));
    assert_eq!(sink, vec![pressed(NesButton::Right), SinkEvent::Haptic]);
    sink.clear();

    // A second finger on the d-pad changes nothing.
    let hit = overlay.handle(
        &PointerEvent::down(2, center - Point::new(radius * 0.5, 0.0)),
        &layout,
        &settings,
        &mut sink,
    );
    assert_eq!(hit, None);
    assert!(sink.is_empty());

    // Slide to the lower-right diagonal.
    overlay.handle(
        &PointerEvent::moved(1, center + Point::new(radius * 0.5, radius * 0.5)),
        &layout,
        &settings,
        &mut sink,
    );
    assert_eq!(sink, vec![pressed(NesButton::Down)]);
    sink.clear();

    // Lifting releases all four directions.
    overlay.handle(&PointerEvent::up(1, center), &layout, &settings, &mut sink);
    assert_eq!(
        sink,
        vec![
            released(NesButton::Up),
            released(NesButton::Down),
            released(NesButton::Left),
            released(NesButton::Right),
        ]
    );
    assert_eq!(overlay.dpad().pointer(), None);
}

#[test]
fn turbo_region_auto_fires_while_held() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(0);
    let mut pad = PadMask::new();
    pad.set_turbo_timing(settings.turbo_on_frames, settings.turbo_off_frames);

    let turbo_a = layout.frame(ControlElement::TurboA).visual.center();
    overlay.handle(&PointerEvent::down(5, turbo_a), &layout, &settings, &mut pad);
    assert_eq!(pad.turbo_mask(0), NesButton::A.mask());
    assert_eq!(pad.pressed_mask(0), 0);

    let frames: Vec<u8> = (0..6).map(|f| pad.resolve(0, f)).collect();
    assert_eq!(frames, vec![1, 1, 0, 0, 1, 1]);

    overlay.handle(&PointerEvent::up(5, turbo_a), &layout, &settings, &mut pad);
    assert_eq!(pad.turbo_mask(0), 0);
    assert_eq!(pad.resolve(0, 6), 0);
}

#[test]
fn system_actions_are_held() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(0);
    let mut pad = PadMask::new();

    let rewind = layout.frame(ControlElement::Rewind).visual.center();
    assert_eq!(
        overlay.handle(&PointerEvent::down(9, rewind), &layout, &settings, &mut pad),
        Some(ControlElement::Rewind)
    );
    assert!(pad.is_action_active(SystemAction::Rewind));
    assert!(!pad.is_action_active(SystemAction::FastForward));

    overlay.handle(&PointerEvent::cancel(9, rewind), &layout, &settings, &mut pad);
    assert!(!pad.is_action_active(SystemAction::Rewind));
}

#[test]
fn simultaneous_buttons_on_separate_pointers() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(2);
    let mut pad = PadMask::new();

    let a = layout.frame(ControlElement::A).visual.center();
    let b = layout.frame(ControlElement::B).visual.center();
    let start = layout.frame(ControlElement::Start).visual.center();
    overlay.handle(&PointerEvent::down(1, a), &layout, &settings, &mut pad);
    overlay.handle(&PointerEvent::down(2, b), &layout, &settings, &mut pad);
    overlay.handle(&PointerEvent::down(3, start), &layout, &settings, &mut pad);
    assert_eq!(pad.pressed_mask(2), 0b1011);
    assert_eq!(pad.pressed_mask(0), 0);

    overlay.handle(&PointerEvent::up(2, b), &layout, &settings, &mut pad);
    assert_eq!(pad.pressed_mask(2), 0b1001);
}

#[test]
fn second_pointer_on_held_button_is_ignored() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(0);
    let mut sink: Vec<SinkEvent> = Vec::new();
    let a = layout.frame(ControlElement::A).visual.center();

    assert_eq!(
        overlay.handle(&PointerEvent::down(1, a), &layout, &settings, &mut sink),
        Some(ControlElement::A)
    );
    assert_eq!(
        overlay.handle(&PointerEvent::down(2, a), &layout, &settings, &mut sink),
        None
    );
    assert_eq!(sink, vec![pressed(NesButton::A)]);
    assert_eq!(overlay.region(ControlElement::A).pointer(), Some(1));

    // Lifting the ignored pointer leaves A held.
    overlay.handle(&PointerEvent::up(2, a), &layout, &settings, &mut sink);
    assert_eq!(sink.len(), 1);
    assert!(overlay.region(ControlElement::A).is_active());

    overlay.handle(&PointerEvent::up(1, a), &layout, &settings, &mut sink);
    assert_eq!(sink, vec![pressed(NesButton::A), released(NesButton::A)]);
}

#[test]
fn tap_on_empty_space_is_ignored() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(0);
    let mut sink: Vec<SinkEvent> = Vec::new();

    let hit = overlay.handle(
        &PointerEvent::down(1, Point::new(400.0, 100.0)),
        &layout,
        &settings,
        &mut sink,
    );
    assert_eq!(hit, None);
    overlay.handle(
        &PointerEvent::up(1, Point::new(400.0, 100.0)),
        &layout,
        &settings,
        &mut sink,
    );
    assert!(sink.is_empty());
}

#[test]
fn entering_edit_mode_releases_and_blocks_dispatch() {
    let (layout, settings) = setup();
    let mut overlay = Overlay::new(0);
    let mut pad = PadMask::new();

    let a = layout.frame(ControlElement::A).visual.center();
    let dpad = layout.frame(ControlElement::Dpad).visual.center();
    overlay.handle(&PointerEvent::down(1, a), &layout, &settings, &mut pad);
    overlay.handle(
        &PointerEvent::down(2, dpad + Point::new(0.0, -50.0)),
        &layout,
        &settings,
        &mut pad,
    );
    assert_eq!(pad.pressed_mask(0), NesButton::A.mask() | NesButton::Up.mask());

    overlay.set_editing(true, &mut pad);
    assert_eq!(pad.pressed_mask(0), 0);
    assert!(overlay.regions().iter().all(|r| !r.is_active()));

    assert_eq!(
        overlay.handle(&PointerEvent::down(3, a), &layout, &settings, &mut pad),
        None
    );
    assert_eq!(pad.pressed_mask(0), 0);
}

#[test]
fn edit_pointer_drags_cluster() {
    let settings = ControlsSettings::default();
    let ctx = ctx();
    let mut editor = EditorState::new();
    editor.enter(&settings);
    let mut overlay = Overlay::new(0);
    let mut sink: Vec<SinkEvent> = Vec::new();
    overlay.set_editing(true, &mut sink);

    let layout = compute_layout(editor.effective(&settings), &ctx, true);
    let grab = layout.cluster(Cluster::Face).center();
    assert!(overlay.handle_edit(&PointerEvent::down(1, grab), &layout, &mut editor, &ctx));
    // Only one edit pointer at a time.
    assert!(!overlay.handle_edit(&PointerEvent::down(2, grab), &layout, &mut editor, &ctx));
    assert!(overlay.handle_edit(
        &PointerEvent::moved(1, grab + Point::new(-100.0, -50.0)),
        &layout,
        &mut editor,
        &ctx
    ));
    assert!(overlay.handle_edit(&PointerEvent::up(1, grab), &layout, &mut editor, &ctx));

    let draft = editor.draft().unwrap();
    let offset = draft.landscape.cluster(Cluster::Face).offset;
    assert!((offset.x + 100.0).abs() < 1e-3 && (offset.y + 50.0).abs() < 1e-3);
    assert!(sink.is_empty());
}

#[test]
fn edit_pointer_on_corner_resizes() {
    let settings = ControlsSettings::default();
    let ctx = ctx();
    let mut editor = EditorState::new();
    editor.enter(&settings);
    let mut overlay = Overlay::new(0);
    let mut sink: Vec<SinkEvent> = Vec::new();
    overlay.set_editing(true, &mut sink);

    let layout = compute_layout(editor.effective(&settings), &ctx, true);
    let face = layout.cluster(Cluster::Face);
    let handle = face.origin + Point::new(2.0, 2.0);
    assert!(overlay.handle_edit(&PointerEvent::down(1, handle), &layout, &mut editor, &ctx));
    overlay.handle_edit(
        &PointerEvent::moved(1, handle - Point::new(20.0, 20.0)),
        &layout,
        &mut editor,
        &ctx,
    );
    overlay.handle_edit(&PointerEvent::up(1, handle), &layout, &mut editor, &ctx);

    let after = compute_layout(editor.draft().unwrap(), &ctx, true).cluster(Cluster::Face);
    assert!(after.size.width > face.size.width);
    assert!((after.right() - face.right()).abs() < 1e-3);
    assert!((after.bottom() - face.bottom()).abs() < 1e-3);
}

#[test]
fn element_scope_moves_single_button() {
    let settings = ControlsSettings::default();
    let ctx = ctx();
    let mut editor = EditorState::new();
    editor.enter(&settings);
    let mut overlay = Overlay::new(0);
    let mut sink: Vec<SinkEvent> = Vec::new();
    overlay.set_editing(true, &mut sink);
    overlay.set_edit_scope(EditScope::Element);

    let layout = compute_layout(editor.effective(&settings), &ctx, true);
    let start = layout.frame(ControlElement::Start).visual;
    let grab = start.center();
    overlay.handle_edit(&PointerEvent::down(4, grab), &layout, &mut editor, &ctx);
    overlay.handle_edit(
        &PointerEvent::moved(4, grab + Point::new(0.0, -60.0)),
        &layout,
        &mut editor,
        &ctx,
    );
    overlay.handle_edit(&PointerEvent::up(4, grab), &layout, &mut editor, &ctx);

    let after = compute_layout(editor.draft().unwrap(), &ctx, true);
    let moved = after.frame(ControlElement::Start).visual;
    assert!((moved.top() - (start.top() - 60.0)).abs() < 1e-3);
    assert_eq!(
        after.frame(ControlElement::Select).visual,
        layout.frame(ControlElement::Select).visual
    );
}
