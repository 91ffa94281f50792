use crate::error::{KinemaError, KinemaResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Discrete time coordinate. Scene-valid indices are `0..num_frames`, but
/// animation attachments may reference frames outside that window (see [`ALWAYS`]).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub i64);

/// A frame far in the past. An attachment spanning `ALWAYS..=ALWAYS` is
/// instantaneous before any renderable frame, so its final value holds for the
/// whole timeline.
pub const ALWAYS: i64 = -9_999_999;

/// Inclusive frame range driving one animation attachment.
///
/// `start == end` is the legal zero-length range: an instantaneous jump at
/// `start` with no interpolated frames in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64, // inclusive
}

impl FrameRange {
    pub fn new(start: i64, end: i64) -> KinemaResult<Self> {
        let r = Self { start, end };
        r.validate()?;
        Ok(r)
    }

    pub fn validate(self) -> KinemaResult<()> {
        if self.end < self.start {
            return Err(KinemaError::config(format!(
                "frame range end ({}) must be >= start ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn len_frames(self) -> i64 {
        self.end - self.start
    }

    /// Raw interpolation progress at `frame`.
    ///
    /// `None` before `start` (pre-roll: the running value passes through
    /// untouched). Clamps to 1.0 after `end` (post-roll holds the final
    /// value). A zero-length range snaps straight to 1.0 at `start`.
    pub fn progress(self, frame: FrameIndex) -> Option<f64> {
        if frame.0 < self.start {
            return None;
        }
        if self.start == self.end {
            return Some(1.0);
        }
        let t = (frame.0 - self.start) as f64 / (self.end - self.start) as f64;
        Some(t.min(1.0))
    }
}

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub fn new(num: u32, den: u32) -> KinemaResult<Self> {
        if num == 0 || den == 0 {
            return Err(KinemaError::config("fps num and den must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }
}

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> KinemaResult<Self> {
        if width == 0 || height == 0 {
            return Err(KinemaError::config("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// A point in the unit square `[-1,1]^2` naming a location on a bounding box.
///
/// Screen coordinates are y-down, so [`DOWN`] is the bottom edge (max y) and
/// [`UP`] the top edge (min y). Used to pick pivots and move-to reference
/// points without the caller computing coordinates by hand.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Direction {
    pub x: f64,
    pub y: f64,
}

/// Center of the bounding box.
pub const ORIGIN: Direction = Direction { x: 0.0, y: 0.0 };
/// Left edge.
pub const LEFT: Direction = Direction { x: -1.0, y: 0.0 };
/// Right edge.
pub const RIGHT: Direction = Direction { x: 1.0, y: 0.0 };
/// Top edge (min y).
pub const UP: Direction = Direction { x: 0.0, y: -1.0 };
/// Bottom edge (max y).
pub const DOWN: Direction = Direction { x: 0.0, y: 1.0 };
/// Top-left corner.
pub const UL: Direction = Direction { x: -1.0, y: -1.0 };
/// Top-right corner.
pub const UR: Direction = Direction { x: 1.0, y: -1.0 };
/// Bottom-left corner.
pub const DL: Direction = Direction { x: -1.0, y: 1.0 };
/// Bottom-right corner.
pub const DR: Direction = Direction { x: 1.0, y: 1.0 };

/// Map a direction onto a concrete point of `rect`.
pub fn critical_point(rect: Rect, d: Direction) -> Point {
    let fx = (d.x + 1.0) * 0.5;
    let fy = (d.y + 1.0) * 0.5;
    Point::new(
        rect.x0 + fx * (rect.x1 - rect.x0),
        rect.y0 + fy * (rect.y1 - rect.y0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_progress_pre_mid_post() {
        let r = FrameRange::new(10, 20).unwrap();
        assert_eq!(r.progress(FrameIndex(9)), None);
        assert_eq!(r.progress(FrameIndex(10)), Some(0.0));
        assert_eq!(r.progress(FrameIndex(15)), Some(0.5));
        assert_eq!(r.progress(FrameIndex(20)), Some(1.0));
        assert_eq!(r.progress(FrameIndex(999)), Some(1.0));
    }

    #[test]
    fn zero_length_range_snaps_without_division() {
        let r = FrameRange::new(5, 5).unwrap();
        assert_eq!(r.progress(FrameIndex(4)), None);
        assert_eq!(r.progress(FrameIndex(5)), Some(1.0));
        assert_eq!(r.progress(FrameIndex(6)), Some(1.0));
    }

    #[test]
    fn inverted_range_is_a_config_error() {
        assert!(FrameRange::new(10, 9).is_err());
    }

    #[test]
    fn critical_point_edges_and_corners() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(critical_point(r, ORIGIN), Point::new(50.0, 25.0));
        assert_eq!(critical_point(r, LEFT), Point::new(0.0, 25.0));
        assert_eq!(critical_point(r, DOWN), Point::new(50.0, 50.0));
        assert_eq!(critical_point(r, UR), Point::new(100.0, 0.0));
    }

    #[test]
    fn canvas_size_rejects_zero() {
        assert!(CanvasSize::new(0, 10).is_err());
        assert!(CanvasSize::new(10, 0).is_err());
    }
}
