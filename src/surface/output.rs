//! `FrameWriter`: single-syscall output buffer for one surface frame.

use std::io::{self, Write};

/// A 24-bit color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Plain white.
    pub const WHITE: Self = Self::new(255, 255, 255);
}

/// Byte buffer that collects one painted frame.
///
/// Painting appends escape sequences and text here; the frame reaches the
/// terminal in a single `write_all`, so a lane is never seen half-drawn.
pub struct FrameWriter {
    frame: Vec<u8>,
}

impl FrameWriter {
    /// Writer with room for `capacity` bytes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frame: Vec::with_capacity(capacity),
        }
    }

    /// Writer with 4 KiB reserved.
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Drop the collected frame, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// Bytes collected so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    /// Number of bytes collected so far.
    #[inline]
    pub const fn len(&self) -> usize {
        self.frame.len()
    }

    /// Whether nothing has been collected.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Append literal text at the cursor.
    #[inline]
    pub fn write_str(&mut self, text: &str) {
        self.frame.extend_from_slice(text.as_bytes());
    }

    /// Place the cursor at zero-based `column`, `row`.
    #[inline]
    pub fn cursor_move(&mut self, column: u16, row: u16) {
        // ANSI positions are one-based
        let _ = write!(
            self.frame,
            "\x1b[{};{}H",
            u32::from(row) + 1,
            u32::from(column) + 1
        );
    }

    /// Erase the row the cursor is on.
    #[inline]
    pub fn clear_line(&mut self) {
        self.frame.extend_from_slice(b"\x1b[2K");
    }

    /// Switch the foreground to a 24-bit color.
    #[inline]
    pub fn set_fg(&mut self, color: Rgb) {
        let Rgb { r, g, b } = color;
        let _ = write!(self.frame, "\x1b[38;2;{r};{g};{b}m");
    }

    /// Return to the terminal's default colors.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.frame.extend_from_slice(b"\x1b[0m");
    }

    /// Send the whole frame to `sink` and flush it.
    ///
    /// # Errors
    ///
    /// Propagates any write or flush failure from `sink`.
    pub fn flush_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.frame)?;
        sink.flush()
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}
