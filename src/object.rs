use kurbo::Shape as _;

use crate::{
    anim::{Animation, AnimationKind, Property},
    color::Color,
    core::{Affine, BezPath, Direction, FrameIndex, FrameRange, ORIGIN, Point, Rect, Size},
    ease::Ease,
    error::KinemaResult,
    paint::{BlendMode, Paint, ResolvedPaint},
};

const PATH_TOLERANCE: f64 = 0.1;

/// Geometric payload of a drawable object.
///
/// Text carries explicit extents because glyph shaping and measurement live
/// behind the canvas capability; the engine only needs a bounding box to
/// resolve pivots.
#[derive(Clone, Debug)]
pub enum Geometry {
    Circle {
        center: Point,
        radius: f64,
    },
    Rectangle {
        rect: Rect,
        corner_radius: f64,
    },
    /// Open polyline through `points`.
    Line {
        points: Vec<Point>,
    },
    /// Closed polygon through `points`.
    Polygon {
        points: Vec<Point>,
    },
    Text {
        /// Top-left corner of the text box.
        origin: Point,
        content: String,
        size_px: f64,
        extents: Size,
    },
}

impl Geometry {
    /// Outline path in local (untransformed) coordinates. Empty for text,
    /// which is drawn through the canvas's glyph interface instead.
    pub fn to_path(&self) -> BezPath {
        match self {
            Self::Circle { center, radius } => {
                kurbo::Circle::new(*center, radius.max(0.0)).to_path(PATH_TOLERANCE)
            }
            Self::Rectangle { rect, corner_radius } => {
                if *corner_radius > 0.0 {
                    kurbo::RoundedRect::from_rect(*rect, *corner_radius).to_path(PATH_TOLERANCE)
                } else {
                    rect.to_path(PATH_TOLERANCE)
                }
            }
            Self::Line { points } => polyline(points, false),
            Self::Polygon { points } => polyline(points, true),
            Self::Text { .. } => BezPath::new(),
        }
    }

    /// Untransformed bounding box.
    pub fn bbox(&self) -> Rect {
        match self {
            Self::Circle { center, radius } => {
                let r = radius.abs();
                Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
            }
            Self::Rectangle { rect, .. } => *rect,
            Self::Line { points } | Self::Polygon { points } => points
                .iter()
                .fold(None::<Rect>, |acc, p| {
                    let r = Rect::from_points(*p, *p);
                    Some(match acc {
                        Some(a) => a.union(r),
                        None => r,
                    })
                })
                .unwrap_or(Rect::ZERO),
            Self::Text { origin, extents, .. } => Rect::from_origin_size(*origin, *extents),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}

/// Resolved visual state of an object at one frame: the single affine matrix
/// produced by its transform stack plus its evaluated paint.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct FrameState {
    pub transform: Affine,
    pub paint: ResolvedPaint,
}

/// A leaf drawable: geometry + transform stack + paint.
#[derive(Clone, Debug)]
pub struct Object {
    pub id: String,
    pub geometry: Geometry,
    pub stack: crate::transform::TransformStack,
    pub paint: Paint,
}

/// A composite drawable. The group's resolved matrix is prepended to each
/// child's own matrix; group opacity/blend apply to the flattened result (the
/// compositor renders children onto an intermediate surface when needed).
#[derive(Clone, Debug)]
pub struct Group {
    pub id: String,
    pub children: Vec<Node>,
    pub stack: crate::transform::TransformStack,
    pub opacity: Property<f64>,
    pub blend: BlendMode,
}

/// Entry in a scene's paint list.
#[derive(Clone, Debug)]
pub enum Node {
    Object(Object),
    Group(Group),
}

impl From<Object> for Node {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl From<Group> for Node {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}

impl Object {
    pub fn new(id: impl Into<String>, geometry: Geometry, paint: Paint) -> Self {
        Self {
            id: id.into(),
            geometry,
            stack: crate::transform::TransformStack::new(),
            paint,
        }
    }

    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        Self::new(
            "circle",
            Geometry::Circle {
                center: Point::new(cx, cy),
                radius,
            },
            Paint::default(),
        )
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            "rectangle",
            Geometry::Rectangle {
                rect: Rect::new(x, y, x + width, y + height),
                corner_radius: 0.0,
            },
            Paint::default(),
        )
    }

    pub fn line(points: Vec<Point>) -> Self {
        Self::new(
            "line",
            Geometry::Line { points },
            Paint::stroke(Color::WHITE, 2.0),
        )
    }

    pub fn polygon(points: Vec<Point>) -> Self {
        Self::new("polygon", Geometry::Polygon { points }, Paint::default())
    }

    pub fn text(x: f64, y: f64, content: impl Into<String>, size_px: f64, extents: Size) -> Self {
        Self::new(
            "text",
            Geometry::Text {
                origin: Point::new(x, y),
                content: content.into(),
                size_px,
                extents,
            },
            Paint::default(),
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    /// Resolved matrix + paint at `frame`. Pure and idempotent, which is what
    /// makes preview scrubbing safe.
    pub fn frame_state(&self, frame: FrameIndex) -> FrameState {
        FrameState {
            transform: self.stack.resolve(frame, self.geometry.bbox()),
            paint: self.paint.resolve(frame),
        }
    }

    pub fn validate(&self) -> KinemaResult<()> {
        self.stack.validate()?;
        self.paint.validate()
    }
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            stack: crate::transform::TransformStack::new(),
            opacity: Property::new(1.0),
            blend: BlendMode::Normal,
        }
    }

    pub fn add(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Property::new(opacity);
        self
    }

    /// Union of children's transformed bounding boxes, before the group's own
    /// stack. This is the box the group's pivots resolve against.
    pub fn children_bbox(&self, frame: FrameIndex) -> Option<Rect> {
        self.children
            .iter()
            .filter_map(|c| c.bbox(frame))
            .reduce(|a, b| a.union(b))
    }

    pub fn validate(&self) -> KinemaResult<()> {
        self.stack.validate()?;
        self.opacity.validate()?;
        for c in &self.children {
            c.validate()?;
        }
        Ok(())
    }
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Self::Object(o) => &o.id,
            Self::Group(g) => &g.id,
        }
    }

    pub fn validate(&self) -> KinemaResult<()> {
        match self {
            Self::Object(o) => o.validate(),
            Self::Group(g) => g.validate(),
        }
    }

    /// Bounding box after this node's own transforms (parent not applied).
    pub fn bbox(&self, frame: FrameIndex) -> Option<Rect> {
        match self {
            Self::Object(o) => {
                let raw = o.geometry.bbox();
                Some(o.stack.resolve(frame, raw).transform_rect_bbox(raw))
            }
            Self::Group(g) => {
                let union = g.children_bbox(frame)?;
                Some(g.stack.resolve(frame, union).transform_rect_bbox(union))
            }
        }
    }
}

macro_rules! impl_transformable {
    ($ty:ty) => {
        impl $ty {
            /// Translate by `(x, y)` over `start..=end`.
            pub fn translate(mut self, x: f64, y: f64, start: i64, end: i64, ease: Ease) -> Self {
                self.stack.push(crate::transform::TransformOp::Translate {
                    x,
                    y,
                    range: FrameRange { start, end },
                    ease,
                });
                self
            }

            /// Uniform scale toward `amount`, pivoting on the bounding-box
            /// point named by `direction` (e.g. `DOWN` pins the bottom edge).
            pub fn scale(
                mut self,
                amount: f64,
                start: i64,
                end: i64,
                ease: Ease,
                direction: Direction,
            ) -> Self {
                self.stack.push(crate::transform::TransformOp::Scale {
                    amount,
                    direction,
                    range: FrameRange { start, end },
                    ease,
                });
                self
            }

            /// Rotate by `degrees` about the bounding-box point named by
            /// `direction`.
            pub fn rotate(
                mut self,
                degrees: f64,
                start: i64,
                end: i64,
                ease: Ease,
                direction: Direction,
            ) -> Self {
                self.stack.push(crate::transform::TransformOp::Rotate {
                    degrees,
                    direction,
                    range: FrameRange { start, end },
                    ease,
                });
                self
            }

            /// Non-uniform scale, same pivot mechanics as `scale`.
            pub fn stretch(
                mut self,
                sx: f64,
                sy: f64,
                start: i64,
                end: i64,
                ease: Ease,
                direction: Direction,
            ) -> Self {
                self.stack.push(crate::transform::TransformOp::Stretch {
                    sx,
                    sy,
                    direction,
                    range: FrameRange { start, end },
                    ease,
                });
                self
            }

            /// Move the bounding-box reference point to absolute `(x, y)`.
            pub fn move_to(mut self, x: f64, y: f64, start: i64, end: i64, ease: Ease) -> Self {
                self.stack.push(crate::transform::TransformOp::MoveTo {
                    x,
                    y,
                    direction: ORIGIN,
                    range: FrameRange { start, end },
                    ease,
                });
                self
            }
        }
    };
}

impl_transformable!(Object);
impl_transformable!(Group);

impl Object {
    /// Animate opacity toward `to` over `start..=end`.
    pub fn fade(mut self, to: f64, start: i64, end: i64, ease: Ease) -> Self {
        let from = *self.paint.opacity.base();
        self.paint.opacity.animate(Animation::new(
            FrameRange { start, end },
            from,
            to,
            ease,
            AnimationKind::Absolute,
        ));
        self
    }
}

impl Group {
    /// Animate group opacity toward `to` over `start..=end`. Applies to the
    /// flattened group, not to each child independently.
    pub fn fade(mut self, to: f64, start: i64, end: i64, ease: Ease) -> Self {
        let from = *self.opacity.base();
        self.opacity.animate(Animation::new(
            FrameRange { start, end },
            from,
            to,
            ease,
            AnimationKind::Absolute,
        ));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_bbox_is_centered() {
        let g = Geometry::Circle {
            center: Point::new(10.0, 20.0),
            radius: 5.0,
        };
        assert_eq!(g.bbox(), Rect::new(5.0, 15.0, 15.0, 25.0));
    }

    #[test]
    fn empty_line_has_zero_bbox_and_empty_path() {
        let g = Geometry::Line { points: vec![] };
        assert_eq!(g.bbox(), Rect::ZERO);
        assert!(g.to_path().elements().is_empty());
    }

    #[test]
    fn frame_state_is_idempotent() {
        let obj = Object::circle(50.0, 50.0, 10.0).translate(0.0, 100.0, 0, 10, Ease::Linear);
        let a = obj.frame_state(FrameIndex(5));
        let b = obj.frame_state(FrameIndex(5));
        assert_eq!(a.transform, b.transform);
        assert_eq!(a.paint, b.paint);
    }

    #[test]
    fn chained_builders_accumulate_in_order() {
        let obj = Object::circle(0.0, 0.0, 1.0)
            .translate(1.0, 0.0, 0, 1, Ease::Linear)
            .rotate(90.0, 0, 1, Ease::Linear, ORIGIN)
            .scale(2.0, 0, 1, Ease::Linear, ORIGIN);
        assert_eq!(obj.stack.ops().len(), 3);
    }

    #[test]
    fn group_bbox_unions_children() {
        let group = Group::new("g")
            .add(Object::rectangle(0.0, 0.0, 10.0, 10.0))
            .add(Object::rectangle(20.0, 0.0, 10.0, 10.0));
        assert_eq!(
            group.children_bbox(FrameIndex(0)),
            Some(Rect::new(0.0, 0.0, 30.0, 10.0))
        );
    }

    #[test]
    fn fade_holds_after_end() {
        let obj = Object::circle(0.0, 0.0, 1.0).fade(0.0, 0, 10, Ease::Linear);
        assert_eq!(obj.paint.resolve(FrameIndex(20)).opacity, 0.0);
    }
}
