//! Terminal surface: a crossterm-backed visual layer for the scheduler.
//!
//! One display unit is one terminal column (horizontally) or row
//! (vertically). Visuals are plain strings measured by their Unicode display
//! width. Translations are driven by wall-clock time, independently of the
//! scheduler's own tick, and painted on demand by whoever owns the terminal.

use super::output::{FrameWriter, Rgb};
use crate::render::{Placement, Renderer, Size, Translation};
use crate::scheduler::DisplayBounds;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Foreground colors assigned round-robin to new visuals.
const PALETTE: [Rgb; 6] = [
    Rgb::WHITE,
    Rgb::new(255, 214, 102),
    Rgb::new(129, 212, 250),
    Rgb::new(165, 214, 167),
    Rgb::new(244, 143, 177),
    Rgb::new(206, 147, 216),
];

/// Handle to a visual on a [`TerminalSurface`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct VisualId(pub u64);

/// Where a visual is and where it is going.
#[derive(Clone, Copy, Debug)]
enum Motion {
    Still(f32),
    Running {
        translation: Translation,
        started: Instant,
    },
    Paused {
        translation: Translation,
        elapsed: Duration,
    },
}

impl Motion {
    fn offset_at(&self, now: Instant) -> f32 {
        match *self {
            Self::Still(offset) => offset,
            Self::Running {
                translation,
                started,
            } => translation.offset_at(now.saturating_duration_since(started)),
            Self::Paused {
                translation,
                elapsed,
            } => translation.offset_at(elapsed),
        }
    }
}

#[derive(Debug)]
struct Visual {
    text: String,
    row: u16,
    columns: u16,
    height: f32,
    color: Rgb,
    motion: Motion,
}

#[derive(Debug)]
struct SurfaceState {
    visuals: HashMap<VisualId, Visual>,
    next_id: u64,
    width: u16,
    height: u16,
}

/// Shared, cloneable terminal visual layer.
///
/// The scheduler's tick thread drives it through [`Renderer`] while the UI
/// thread calls [`paint`](Self::paint); both go through the same state.
#[derive(Clone, Debug)]
pub struct TerminalSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl TerminalSurface {
    /// Create a surface covering `width` columns and `height` rows.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                visuals: HashMap::new(),
                next_id: 0,
                width,
                height,
            })),
        }
    }

    /// Bounds to hand to lane configuration.
    pub fn bounds(&self) -> DisplayBounds {
        let state = self.lock();
        DisplayBounds::new(f32::from(state.width), f32::from(state.height))
    }

    /// Number of visuals currently on the surface.
    pub fn len(&self) -> usize {
        self.lock().visuals.len()
    }

    /// Check if the surface holds no visuals.
    pub fn is_empty(&self) -> bool {
        self.lock().visuals.is_empty()
    }

    /// Remove every visual, finished or not.
    pub fn clear(&self) {
        self.lock().visuals.clear();
    }

    /// Paint the current frame into `out`.
    pub fn paint(&self, out: &mut FrameWriter) {
        self.paint_at(Instant::now(), out);
    }

    /// Paint the frame as it looks at `now` into `out`.
    ///
    /// Every surface row is erased first, then each visual is drawn at its
    /// interpolated column, clipped to the visible area.
    #[allow(clippy::cast_possible_truncation)]
    pub fn paint_at(&self, now: Instant, out: &mut FrameWriter) {
        let state = self.lock();

        for row in 0..state.height {
            out.cursor_move(0, row);
            out.clear_line();
        }

        let mut visuals: Vec<_> = state.visuals.iter().collect();
        visuals.sort_unstable_by_key(|(id, _)| **id);

        for (_, visual) in visuals {
            if visual.row >= state.height {
                continue;
            }
            let x = visual.motion.offset_at(now).round() as i32;
            if let Some((column, text)) = clip_to_columns(&visual.text, x, state.width) {
                out.cursor_move(column, visual.row);
                out.set_fg(visual.color);
                out.write_str(&text);
            }
        }
        out.reset_attrs();
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        // Visual state stays usable even if a painter panicked mid-frame
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_motion(&self, id: VisualId, f: impl FnOnce(Motion, Instant) -> Motion) {
        let now = Instant::now();
        if let Some(visual) = self.lock().visuals.get_mut(&id) {
            visual.motion = f(visual.motion, now);
        }
    }
}

impl<T: AsRef<str>> Renderer<T> for TerminalSurface {
    type Handle = VisualId;

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    fn materialize(&mut self, content: &T, placement: Placement) -> VisualId {
        let text = content.as_ref().to_owned();
        let columns = u16::try_from(text.width()).unwrap_or(u16::MAX);

        let mut state = self.lock();
        let id = VisualId(state.next_id);
        state.next_id += 1;

        let color = PALETTE[(id.0 % PALETTE.len() as u64) as usize];
        let start = f32::from(state.width);
        state.visuals.insert(
            id,
            Visual {
                text,
                row: placement.top.round().clamp(0.0, f32::from(u16::MAX)) as u16,
                columns,
                height: placement.height,
                color,
                motion: Motion::Still(start),
            },
        );
        id
    }

    fn measure(&mut self, handle: &VisualId) -> Size {
        self.lock()
            .visuals
            .get(handle)
            .map_or_else(Size::default, |v| Size::new(f32::from(v.columns), v.height))
    }

    fn animate_translation(&mut self, handle: &VisualId, translation: Translation) {
        self.update_motion(*handle, |_, now| Motion::Running {
            translation,
            started: now,
        });
    }

    fn cancel_animation(&mut self, handle: &VisualId) {
        self.update_motion(*handle, |motion, now| Motion::Still(motion.offset_at(now)));
    }

    fn dispose(&mut self, handle: VisualId) {
        self.lock().visuals.remove(&handle);
    }

    fn pause_animation(&mut self, handle: &VisualId) {
        self.update_motion(*handle, |motion, now| match motion {
            Motion::Running {
                translation,
                started,
            } => Motion::Paused {
                translation,
                elapsed: now.saturating_duration_since(started),
            },
            other => other,
        });
    }

    fn resume_animation(&mut self, handle: &VisualId) {
        self.update_motion(*handle, |motion, now| match motion {
            Motion::Paused {
                translation,
                elapsed,
            } => Motion::Running {
                translation,
                started: now.checked_sub(elapsed).unwrap_or(now),
            },
            other => other,
        });
    }
}

/// Clip `text` drawn at column `x` to the columns `[0, width)`.
///
/// Returns the first visible column and the visible graphemes, or `None` if
/// nothing is visible. Wide graphemes straddling either edge are dropped.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub fn clip_to_columns(text: &str, x: i32, width: u16) -> Option<(u16, String)> {
    let right = i32::from(width);
    let mut column = x;
    let mut start: Option<u16> = None;
    let mut visible = String::new();

    for grapheme in text.graphemes(true) {
        if column >= right {
            break;
        }
        let w = i32::try_from(grapheme.width()).unwrap_or(i32::MAX);
        if column >= 0 && column + w <= right {
            start.get_or_insert(column as u16);
            visible.push_str(grapheme);
        } else if start.is_some() {
            break;
        }
        column = column.saturating_add(w);
    }

    start.map(|column| (column, visible))
}

/// Puts the terminal into raw mode for the lifetime of the guard.
///
/// Restores cursor, screen and line discipline on drop.
pub struct TerminalGuard {
    alternate_screen: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen, and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn enter() -> io::Result<Self> {
        Self::with_alternate_screen(true)
    }

    /// Enter raw mode, optionally switching to the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn with_alternate_screen(alternate_screen: bool) -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        if alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(stdout, cursor::Hide)?;

        Ok(Self { alternate_screen })
    }

    /// Current terminal size in columns and rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be queried.
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        if self.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn materialize(surface: &mut TerminalSurface, text: &'static str, top: f32) -> VisualId {
        <TerminalSurface as Renderer<&str>>::materialize(
            surface,
            &text,
            Placement {
                lane: 0,
                top,
                height: 1.0,
            },
        )
    }

    fn frame_at(surface: &TerminalSurface, now: Instant) -> String {
        let mut out = FrameWriter::new();
        surface.paint_at(now, &mut out);
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_clip_to_columns() {
        assert_eq!(clip_to_columns("hello", 0, 10), Some((0, "hello".into())));
        assert_eq!(clip_to_columns("hello", -2, 10), Some((0, "llo".into())));
        assert_eq!(clip_to_columns("hello", 7, 10), Some((7, "hel".into())));
        assert_eq!(clip_to_columns("hello", 10, 10), None);
        assert_eq!(clip_to_columns("hello", -5, 10), None);
    }

    #[test]
    fn test_clip_wide_graphemes() {
        // 日 straddles the left edge and is dropped
        assert_eq!(clip_to_columns("日本", -1, 10), Some((1, "本".into())));
        // 本 would straddle the right edge
        assert_eq!(clip_to_columns("日本", 7, 10), Some((7, "日".into())));
        assert_eq!(clip_to_columns("日本", 9, 10), None);
    }

    #[test]
    fn test_measure_uses_display_width() {
        let mut surface = TerminalSurface::new(40, 4);
        let ascii = materialize(&mut surface, "hello", 0.0);
        let wide = materialize(&mut surface, "弹幕", 1.0);

        let size = <TerminalSurface as Renderer<&str>>::measure(&mut surface, &ascii);
        assert_eq!(size, Size::new(5.0, 1.0));
        let size = <TerminalSurface as Renderer<&str>>::measure(&mut surface, &wide);
        assert_eq!(size, Size::new(4.0, 1.0));
        assert_eq!(surface.len(), 2);
        assert!((surface.bounds().width - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_paint_follows_translation() {
        let mut surface = TerminalSurface::new(20, 3);
        let id = materialize(&mut surface, "hello", 2.0);

        // Before animating, the visual waits off-screen at the right edge
        let before = Instant::now();
        assert!(!frame_at(&surface, before).contains("hello"));

        <TerminalSurface as Renderer<&str>>::animate_translation(
            &mut surface,
            &id,
            Translation {
                from: 10.0,
                to: -5.0,
                duration: Duration::from_secs(60),
            },
        );
        let frame = frame_at(&surface, before);
        assert!(frame.contains("\x1b[3;11H"));
        assert!(frame.contains("hello"));

        let later = frame_at(&surface, Instant::now() + Duration::from_secs(120));
        assert!(!later.contains("hello"));
    }

    #[test]
    fn test_pause_freezes_position() {
        let mut surface = TerminalSurface::new(40, 1);
        let id = materialize(&mut surface, "hi", 0.0);
        <TerminalSurface as Renderer<&str>>::animate_translation(
            &mut surface,
            &id,
            Translation {
                from: 20.0,
                to: -2.0,
                duration: Duration::from_millis(500),
            },
        );
        <TerminalSurface as Renderer<&str>>::pause_animation(&mut surface, &id);

        let now = Instant::now();
        let a = frame_at(&surface, now);
        let b = frame_at(&surface, now + Duration::from_secs(5));
        assert!(a.contains("hi"));
        assert_eq!(a, b);

        <TerminalSurface as Renderer<&str>>::resume_animation(&mut surface, &id);
        let c = frame_at(&surface, Instant::now() + Duration::from_secs(5));
        assert!(!c.contains("hi"));
    }

    #[test]
    fn test_dispose_and_clear() {
        let mut surface = TerminalSurface::new(20, 2);
        let a = materialize(&mut surface, "a", 0.0);
        materialize(&mut surface, "b", 1.0);

        <TerminalSurface as Renderer<&str>>::cancel_animation(&mut surface, &a);
        <TerminalSurface as Renderer<&str>>::dispose(&mut surface, a);
        assert_eq!(surface.len(), 1);

        surface.clear();
        assert!(surface.is_empty());
    }
}
