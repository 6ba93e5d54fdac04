//! Render collaborator: the capabilities the scheduler needs from a visual layer.
//!
//! The scheduler never looks inside a visual. It asks the renderer to
//! materialize content at a lane's placement, measures the result, starts a
//! linear translation that mirrors its own offset bookkeeping, and disposes
//! the visual once the item retires.

use std::time::Duration;

/// Width and height of a materialized visual.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Where a new visual goes inside the display area.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Placement {
    /// Lane index, top to bottom.
    pub lane: usize,
    /// Distance from the display top to the visual's top edge.
    pub top: f32,
    /// Height reserved for the visual.
    pub height: f32,
}

/// A linear horizontal translation from `from` to `to` over `duration`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Translation {
    /// Starting offset.
    pub from: f32,
    /// Final offset.
    pub to: f32,
    /// Time to travel from `from` to `to`.
    pub duration: Duration,
}

impl Translation {
    /// Offset after `elapsed` of the animation, clamped to the end point.
    pub fn offset_at(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        (self.to - self.from).mul_add(t, self.from)
    }
}

/// The visual layer the scheduler drives.
///
/// `Handle` identifies one materialized visual. The renderer owns whatever
/// the handle refers to; the scheduler only keeps the handle to request
/// animation changes and disposal.
pub trait Renderer<T> {
    /// Identifies a materialized visual.
    type Handle;

    /// Turn `content` into a visual positioned at `placement`.
    fn materialize(&mut self, content: &T, placement: Placement) -> Self::Handle;

    /// Measure a materialized visual.
    fn measure(&mut self, handle: &Self::Handle) -> Size;

    /// Start a linear horizontal translation.
    fn animate_translation(&mut self, handle: &Self::Handle, translation: Translation);

    /// Stop any running animation.
    fn cancel_animation(&mut self, handle: &Self::Handle);

    /// Remove the visual from the display.
    fn dispose(&mut self, handle: Self::Handle);

    /// Freeze a running animation in place.
    fn pause_animation(&mut self, _handle: &Self::Handle) {}

    /// Continue a frozen animation.
    fn resume_animation(&mut self, _handle: &Self::Handle) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_offset() {
        let tr = Translation {
            from: 1000.0,
            to: -100.0,
            duration: Duration::from_secs(2),
        };
        assert!((tr.offset_at(Duration::ZERO) - 1000.0).abs() < 1e-3);
        assert!((tr.offset_at(Duration::from_secs(1)) - 450.0).abs() < 1e-3);
        assert!((tr.offset_at(Duration::from_secs(5)) + 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_translation_zero_duration() {
        let tr = Translation {
            from: 10.0,
            to: -3.0,
            duration: Duration::ZERO,
        };
        assert!((tr.offset_at(Duration::ZERO) + 3.0).abs() < f32::EPSILON);
    }
}
