use crate::{
    core::{Affine, Direction, FrameIndex, FrameRange, Point, Rect, Vec2, critical_point},
    ease::Ease,
    error::KinemaResult,
};

/// One time-varying transform operation.
///
/// Magnitudes interpolate from the operation's neutral element (0 for
/// translate/rotate, 1 for scale/stretch) toward the attached magnitude, so
/// an operation contributes the identity matrix at its start frame and holds
/// its full effect after its end frame.
#[derive(Clone, Debug)]
pub enum TransformOp {
    Translate {
        x: f64,
        y: f64,
        range: FrameRange,
        ease: Ease,
    },
    Scale {
        amount: f64,
        direction: Direction,
        range: FrameRange,
        ease: Ease,
    },
    Rotate {
        degrees: f64,
        direction: Direction,
        range: FrameRange,
        ease: Ease,
    },
    Stretch {
        sx: f64,
        sy: f64,
        direction: Direction,
        range: FrameRange,
        ease: Ease,
    },
    /// Absolute repositioning: pins the reference point (the critical point of
    /// the running bounding box in `direction`) onto `(x, y)`. Unlike
    /// translate it does not add to earlier displacement — once complete, the
    /// reference point sits at the target no matter what preceded it.
    MoveTo {
        x: f64,
        y: f64,
        direction: Direction,
        range: FrameRange,
        ease: Ease,
    },
}

impl TransformOp {
    pub fn range(&self) -> FrameRange {
        match self {
            Self::Translate { range, .. }
            | Self::Scale { range, .. }
            | Self::Rotate { range, .. }
            | Self::Stretch { range, .. }
            | Self::MoveTo { range, .. } => *range,
        }
    }

    fn ease(&self) -> Ease {
        match self {
            Self::Translate { ease, .. }
            | Self::Scale { ease, .. }
            | Self::Rotate { ease, .. }
            | Self::Stretch { ease, .. }
            | Self::MoveTo { ease, .. } => *ease,
        }
    }

    /// Matrix contribution at `frame`, given the bounding box produced by all
    /// preceding operations (used for pivot and move-to reference points).
    fn matrix(&self, frame: FrameIndex, current_bbox: Rect) -> Affine {
        let Some(t) = self.range().progress(frame) else {
            // Pre-roll: no contribution, whatever the ease does at 0.
            return Affine::IDENTITY;
        };
        let e = self.ease().apply(t);

        match *self {
            Self::Translate { x, y, .. } => Affine::translate(Vec2::new(x * e, y * e)),
            Self::Scale { amount, direction, .. } => {
                let s = 1.0 + (amount - 1.0) * e;
                about_pivot(
                    critical_point(current_bbox, direction),
                    Affine::scale_non_uniform(s, s),
                )
            }
            Self::Rotate { degrees, direction, .. } => about_pivot(
                critical_point(current_bbox, direction),
                Affine::rotate((degrees * e).to_radians()),
            ),
            Self::Stretch { sx, sy, direction, .. } => {
                let sx = 1.0 + (sx - 1.0) * e;
                let sy = 1.0 + (sy - 1.0) * e;
                about_pivot(
                    critical_point(current_bbox, direction),
                    Affine::scale_non_uniform(sx, sy),
                )
            }
            Self::MoveTo { x, y, direction, .. } => {
                let reference = critical_point(current_bbox, direction);
                let delta = Point::new(x, y) - reference;
                Affine::translate(delta * e)
            }
        }
    }
}

fn about_pivot(pivot: Point, m: Affine) -> Affine {
    Affine::translate(pivot.to_vec2()) * m * Affine::translate(-pivot.to_vec2())
}

/// Insertion-ordered sequence of transform operations.
///
/// Resolution is a fold: each operation's pivot is taken from the bounding
/// box *as transformed by the operations before it* at the queried frame, so
/// edge/corner-relative pivots track earlier motion. Operations with
/// overlapping ranges all contribute, in attachment order; the list is never
/// re-sorted.
#[derive(Clone, Debug, Default)]
pub struct TransformStack {
    ops: Vec<TransformOp>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: TransformOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn validate(&self) -> KinemaResult<()> {
        for op in &self.ops {
            op.range().validate()?;
        }
        Ok(())
    }

    /// Resolve the whole stack into one affine matrix for `frame`.
    ///
    /// `raw_bbox` is the untransformed bounding box of the owning geometry.
    pub fn resolve(&self, frame: FrameIndex, raw_bbox: Rect) -> Affine {
        let mut acc = Affine::IDENTITY;
        for op in &self.ops {
            let bbox = acc.transform_rect_bbox(raw_bbox);
            acc = op.matrix(frame, bbox) * acc;
        }
        acc
    }
}
