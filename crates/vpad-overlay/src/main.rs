//! Virtual pad inspection tool.
//!
//! Resolves the pad layout for a viewport and prints it as JSON. With
//! `--touch` it also simulates taps through the overlay and reports the
//! controller byte seen on each frame while the tap is held.

use std::path::PathBuf;
use std::process;

use serde_json::json;
use vpad_core::{Insets, Orientation, PadMask, Point, PointerEvent, Size, SystemAction};
use vpad_layout::{
    ControlsSettings, JsonFileStore, Layout, LayoutContext, SettingsStore, compute_layout,
};
use vpad_overlay::Overlay;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    width: f32,
    height: f32,
    insets: Insets,
    orientation: Option<Orientation>,
    settings_path: Option<PathBuf>,
    touches: Vec<Point>,
    frames: u64,
    port: u8,
    edit: bool,
}

fn parse_floats<const N: usize>(s: &str) -> Option<[f32; N]> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    parts.try_into().ok()
}

fn usage() {
    eprintln!("Usage: vpad [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --width <px>          Viewport width [default: 800]");
    eprintln!("  --height <px>         Viewport height [default: 480]");
    eprintln!("  --insets <l,t,r,b>    Safe-area insets [default: 0,0,0,0]");
    eprintln!("  --landscape           Force landscape layout");
    eprintln!("  --portrait            Force portrait layout");
    eprintln!("  --settings <file>     JSON settings file");
    eprintln!("  --touch <x,y>         Simulate a tap (repeatable)");
    eprintln!("  --frames <n>          Frames to hold each tap [default: 4]");
    eprintln!("  --port <n>            Controller port [default: 0]");
    eprintln!("  --edit                Lay out as in edit mode");
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        width: 800.0,
        height: 480.0,
        insets: Insets::ZERO,
        orientation: None,
        settings_path: None,
        touches: Vec::new(),
        frames: 4,
        port: 0,
        edit: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.width = s.parse().unwrap_or(cli.width);
                }
            }
            "--height" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.height = s.parse().unwrap_or(cli.height);
                }
            }
            "--insets" => {
                i += 1;
                match args.get(i).and_then(|s| parse_floats::<4>(s)) {
                    Some([l, t, r, b]) => cli.insets = Insets::new(l, t, r, b),
                    None => fail("--insets expects l,t,r,b"),
                }
            }
            "--landscape" => {
                cli.orientation = Some(Orientation::Landscape);
            }
            "--portrait" => {
                cli.orientation = Some(Orientation::Portrait);
            }
            "--settings" => {
                i += 1;
                cli.settings_path = args.get(i).map(PathBuf::from);
            }
            "--touch" => {
                i += 1;
                match args.get(i).and_then(|s| parse_floats::<2>(s)) {
                    Some([x, y]) => cli.touches.push(Point::new(x, y)),
                    None => fail("--touch expects x,y"),
                }
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(4);
                }
            }
            "--port" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.port = s.parse().unwrap_or(0);
                }
            }
            "--edit" => {
                cli.edit = true;
            }
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                usage();
                fail(&format!("Unknown argument: {other}"));
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Tap simulation
// ---------------------------------------------------------------------------

fn simulate_tap(
    at: Point,
    cli: &CliArgs,
    layout: &Layout,
    settings: &ControlsSettings,
) -> serde_json::Value {
    let mut overlay = Overlay::new(cli.port);
    let mut pad = PadMask::new();
    pad.set_turbo_timing(settings.turbo_on_frames, settings.turbo_off_frames);

    let element = overlay.handle(&PointerEvent::down(0, at), layout, settings, &mut pad);
    let held: Vec<u8> = (0..cli.frames).map(|f| pad.resolve(cli.port, f)).collect();
    let actions: Vec<&str> = [
        (SystemAction::Rewind, "rewind"),
        (SystemAction::FastForward, "fast_forward"),
    ]
    .into_iter()
    .filter(|(a, _)| pad.is_action_active(*a))
    .map(|(_, name)| name)
    .collect();
    overlay.handle(&PointerEvent::up(0, at), layout, settings, &mut pad);

    json!({
        "at": [at.x, at.y],
        "element": element,
        "frames": held,
        "actions": actions,
        "haptic_pulses": pad.haptic_pulses(),
        "released": pad.resolve(cli.port, cli.frames),
    })
}

fn main() {
    env_logger::init();
    let cli = parse_args();

    let settings = match &cli.settings_path {
        Some(path) => match JsonFileStore::open(path) {
            Ok(backend) => SettingsStore::load(backend).settings().clone(),
            Err(e) => fail(&format!("Settings error ({}): {e}", path.display())),
        },
        None => ControlsSettings::default(),
    };

    let viewport = Size::new(cli.width, cli.height);
    let orientation = cli
        .orientation
        .unwrap_or_else(|| Orientation::from_viewport(viewport));
    let ctx = LayoutContext::new(viewport, cli.insets, orientation);
    let layout = compute_layout(&settings, &ctx, cli.edit);

    let taps: Vec<serde_json::Value> = cli
        .touches
        .iter()
        .map(|&at| simulate_tap(at, &cli, &layout, &settings))
        .collect();

    let out = json!({
        "layout": layout,
        "taps": taps,
    });
    match serde_json::to_string_pretty(&out) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(&format!("JSON error: {e}")),
    }
}
