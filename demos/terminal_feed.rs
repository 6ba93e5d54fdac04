//! Terminal Feed: bullet comments drifting across the terminal.
//!
//! Demonstrates:
//! - DanmakuController driving a TerminalSurface on its own tick thread
//! - A producer thread feeding one line per second through a Producer
//! - Start / stop / pause with the post-stop surface cleanup hook
//!
//! Keyboard:
//!   s       → Start playback
//!   x       → Stop playback
//!   p       → Pause / resume
//!   q, ESC  → Exit
//!
//! Pass a TOML config path as the first argument to override the defaults.
//! Set `DANMAKU_LOG=/path/to/file` to capture scheduler logs.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use danmaku::surface::Rgb;
use danmaku::{
    DanmakuController, FrameWriter, LaneLayout, SchedulerConfig, TerminalGuard, TerminalSurface,
};
use std::error::Error;
use std::fs::File;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const LINES: [&str; 8] = [
    "first comment!",
    "the river flows east",
    "waves wash the heroes away",
    "right and wrong, gain and loss, all turn to nothing",
    "the green hills remain",
    "how many red sunsets",
    "白发渔樵江渚上",
    "一壶浊酒喜相逢",
];

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let config = match std::env::args().nth(1) {
        Some(path) => SchedulerConfig::load(path)?,
        None => demo_config(),
    };

    let guard = TerminalGuard::enter()?;
    let (width, height) = TerminalGuard::size()?;

    // Last row is the status bar
    let surface = TerminalSurface::new(width, height.saturating_sub(1));
    let mut controller = DanmakuController::new(config, surface.clone());
    controller.configure_lanes(surface.bounds())?;

    let cleanup = surface.clone();
    controller.on_surface_cleanup(move || cleanup.clear());

    let feeding = Arc::new(AtomicBool::new(false));
    let quit = Arc::new(AtomicBool::new(false));
    let feeder = spawn_feeder(controller.producer(), Arc::clone(&feeding), Arc::clone(&quit))?;

    let mut paused = false;
    let mut out = FrameWriter::with_capacity(16 * 1024);
    let mut stdout = io::stdout();

    while !quit.load(Ordering::Relaxed) {
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('s') if !controller.is_running() => {
                        controller.start()?;
                        feeding.store(true, Ordering::Relaxed);
                        paused = false;
                    }
                    KeyCode::Char('x') => {
                        feeding.store(false, Ordering::Relaxed);
                        controller.stop()?;
                        paused = false;
                    }
                    KeyCode::Char('p') if controller.is_running() => {
                        if paused {
                            controller.resume()?;
                        } else {
                            controller.pause()?;
                        }
                        paused = !paused;
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        quit.store(true, Ordering::Relaxed);
                    }
                    KeyCode::Char('q') | KeyCode::Esc => quit.store(true, Ordering::Relaxed),
                    _ => {}
                }
            }
        }

        out.clear();
        surface.paint(&mut out);
        draw_status(&controller, &mut out, height.saturating_sub(1), paused)?;
        out.flush_to(&mut stdout)?;
    }

    controller.stop()?;
    let _ = feeder.join();
    drop(guard);
    Ok(())
}

fn demo_config() -> SchedulerConfig {
    SchedulerConfig {
        base_speed: 12.0,
        retire_margin: 1.0,
        layout: LaneLayout {
            item_height: 1.0,
            vertical_gap: 0.0,
            max_lane_count: 12,
        },
        ..SchedulerConfig::default()
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    // Raw mode owns the terminal, so logs only go to a file
    if let Ok(path) = std::env::var("DANMAKU_LOG") {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }
    Ok(())
}

fn spawn_feeder(
    producer: danmaku::Producer<String>,
    feeding: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("demo-feeder".to_string())
        .spawn(move || {
            let mut index = 0;
            while !quit.load(Ordering::Relaxed) {
                if feeding.load(Ordering::Relaxed) {
                    producer.put(LINES[index % LINES.len()].to_string());
                    index += 1;
                }
                thread::sleep(Duration::from_secs(1));
            }
        })
}

fn draw_status(
    controller: &DanmakuController<String, TerminalSurface>,
    out: &mut FrameWriter,
    row: u16,
    paused: bool,
) -> Result<(), danmaku::ControllerError> {
    let snapshot = controller.snapshot()?;
    let state = match (controller.is_running(), paused) {
        (false, _) => "stopped",
        (true, true) => "paused",
        (true, false) => "playing",
    };
    let status = format!(
        " {state} │ lanes {} │ active {} │ pending {} │ dropped {} │ s start · x stop · p pause · q quit",
        snapshot.lanes.len(),
        snapshot.pool_len,
        snapshot.pending,
        snapshot.dropped,
    );

    out.cursor_move(0, row);
    out.clear_line();
    out.set_fg(Rgb::new(150, 150, 150));
    out.write_str(&status);
    out.reset_attrs();
    Ok(())
}
