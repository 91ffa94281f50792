use crate::{
    color::Color,
    core::{FrameIndex, FrameRange, Vec2},
    ease::Ease,
    error::KinemaResult,
};

/// Value types an [`Animation`] can drive.
///
/// `lerp` is the interpolation primitive; `add`/`mul` are the combination
/// primitives for [`AnimationKind::Additive`] and
/// [`AnimationKind::Multiplicative`] attachments.
pub trait Tween: Clone {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
    fn add(a: &Self, b: &Self) -> Self;
    fn mul(a: &Self, b: &Self) -> Self;
}

impl Tween for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }

    fn add(a: &Self, b: &Self) -> Self {
        a + b
    }

    fn mul(a: &Self, b: &Self) -> Self {
        a * b
    }
}

impl Tween for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }

    fn add(a: &Self, b: &Self) -> Self {
        *a + *b
    }

    fn mul(a: &Self, b: &Self) -> Self {
        Vec2::new(a.x * b.x, a.y * b.y)
    }
}

impl Tween for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }

    fn add(a: &Self, b: &Self) -> Self {
        Color {
            r: a.r + b.r,
            g: a.g + b.g,
            b: a.b + b.b,
            a: a.a + b.a,
        }
    }

    fn mul(a: &Self, b: &Self) -> Self {
        Color {
            r: a.r * b.r,
            g: a.g * b.g,
            b: a.b * b.b,
            a: a.a * b.a,
        }
    }
}

/// How an animation's eased value combines with the running value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    /// Replace the running value outright.
    Absolute,
    /// Add to the running value.
    Additive,
    /// Multiply the running value.
    Multiplicative,
}

/// One keyframed attachment: interpolate `from -> to` over `range` with
/// `ease`, then combine with the running value per `kind`.
///
/// Before `range.start` the running value passes through untouched; after
/// `range.end` the value at `range.end` holds (post-roll).
#[derive(Clone, Debug)]
pub struct Animation<T> {
    pub range: FrameRange,
    pub from: T,
    pub to: T,
    pub ease: Ease,
    pub kind: AnimationKind,
}

impl<T: Tween> Animation<T> {
    pub fn new(range: FrameRange, from: T, to: T, ease: Ease, kind: AnimationKind) -> Self {
        Self {
            range,
            from,
            to,
            ease,
            kind,
        }
    }

    pub fn validate(&self) -> KinemaResult<()> {
        self.range.validate()
    }

    /// The eased `from -> to` value at `frame`, ignoring `kind`.
    pub fn eased(&self, frame: FrameIndex) -> Option<T> {
        let t = self.range.progress(frame)?;
        Some(T::lerp(&self.from, &self.to, self.ease.apply(t)))
    }

    /// Combine with the running value at `frame`.
    pub fn apply(&self, running: &T, frame: FrameIndex) -> T {
        match self.eased(frame) {
            None => running.clone(),
            Some(v) => match self.kind {
                AnimationKind::Absolute => v,
                AnimationKind::Additive => T::add(running, &v),
                AnimationKind::Multiplicative => T::mul(running, &v),
            },
        }
    }
}

/// An animated quantity: a base value plus insertion-ordered attachments.
///
/// Evaluation folds the attachments in order — each one sees the *running*
/// value produced by the previous attachment for that frame, never the
/// original base. Overlapping ranges therefore both contribute, and
/// attachment order is observable (no re-sorting ever happens).
#[derive(Clone, Debug)]
pub struct Property<T> {
    base: T,
    entries: Vec<Animation<T>>,
}

impl<T: Tween> Property<T> {
    pub fn new(base: T) -> Self {
        Self {
            base,
            entries: Vec::new(),
        }
    }

    pub fn base(&self) -> &T {
        &self.base
    }

    pub fn animate(&mut self, animation: Animation<T>) -> &mut Self {
        self.entries.push(animation);
        self
    }

    pub fn is_animated(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn validate(&self) -> KinemaResult<()> {
        for e in &self.entries {
            e.validate()?;
        }
        Ok(())
    }

    /// Pure function of the frame index; idempotent across repeated calls.
    pub fn at(&self, frame: FrameIndex) -> T {
        self.entries
            .iter()
            .fold(self.base.clone(), |running, a| a.apply(&running, frame))
    }
}

impl<T: Tween> From<T> for Property<T> {
    fn from(base: T) -> Self {
        Self::new(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim(start: i64, end: i64, from: f64, to: f64, kind: AnimationKind) -> Animation<f64> {
        Animation::new(
            FrameRange { start, end },
            from,
            to,
            Ease::Linear,
            kind,
        )
    }

    #[test]
    fn pre_roll_returns_base_unchanged() {
        let mut p = Property::new(5.0);
        p.animate(anim(10, 20, 0.0, 100.0, AnimationKind::Additive));
        assert_eq!(p.at(FrameIndex(0)), 5.0);
        assert_eq!(p.at(FrameIndex(9)), 5.0);
    }

    #[test]
    fn post_roll_holds_end_value() {
        let mut p = Property::new(5.0);
        p.animate(anim(10, 20, 0.0, 100.0, AnimationKind::Additive));
        assert_eq!(p.at(FrameIndex(20)), 105.0);
        assert_eq!(p.at(FrameIndex(1000)), 105.0);
    }

    #[test]
    fn midpoint_interpolates() {
        let mut p = Property::new(0.0);
        p.animate(anim(0, 10, 0.0, 100.0, AnimationKind::Additive));
        assert_eq!(p.at(FrameIndex(5)), 50.0);
    }

    #[test]
    fn zero_length_animation_snaps() {
        let mut p = Property::new(1.0);
        p.animate(anim(5, 5, 0.0, 9.0, AnimationKind::Additive));
        assert_eq!(p.at(FrameIndex(4)), 1.0);
        assert_eq!(p.at(FrameIndex(5)), 10.0);
    }

    #[test]
    fn chained_attachments_compose_on_running_value() {
        let mut p = Property::new(0.0);
        p.animate(anim(0, 10, 0.0, 100.0, AnimationKind::Additive));
        p.animate(anim(5, 15, 0.0, 10.0, AnimationKind::Additive));
        // At frame 10: first contributes 100, second is halfway (5).
        assert_eq!(p.at(FrameIndex(10)), 105.0);
        // At frame 15 both hold their end values.
        assert_eq!(p.at(FrameIndex(15)), 110.0);
    }

    #[test]
    fn absolute_replaces_running_value() {
        let mut p = Property::new(3.0);
        p.animate(anim(0, 10, 0.0, 100.0, AnimationKind::Additive));
        p.animate(anim(20, 20, 7.0, 7.0, AnimationKind::Absolute));
        assert_eq!(p.at(FrameIndex(19)), 103.0);
        assert_eq!(p.at(FrameIndex(20)), 7.0);
    }

    #[test]
    fn multiplicative_scales_from_one() {
        let mut p = Property::new(10.0);
        p.animate(anim(0, 10, 1.0, 3.0, AnimationKind::Multiplicative));
        assert_eq!(p.at(FrameIndex(0)), 10.0);
        assert_eq!(p.at(FrameIndex(5)), 20.0);
        assert_eq!(p.at(FrameIndex(10)), 30.0);
    }
}
