//! Kinema is a declarative keyframed 2D animation engine.
//!
//! A [`Scene`] holds drawable objects; each object carries a stack of
//! time-ranged transform operations and animatable paint attributes. Frames
//! are pure functions of the frame index, so scrubbing, re-rendering and
//! parallel export all produce identical pixels.
//!
//! # Pipeline overview
//!
//! 1. **Animate**: `Property + FrameIndex -> value` (eased keyframe attachments)
//! 2. **Resolve**: `TransformStack + FrameIndex -> Affine` (pivot-aware fold)
//! 3. **Composite**: `Scene + FrameIndex -> FrameRGBA` through a [`Canvas`]
//! 4. **Drive**: export through an [`Encoder`], or scrub with [`Previewer`]
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: evaluation is pure and stable for a given input.
//! - **Premultiplied RGBA8** end-to-end: canvases output premultiplied pixels.
#![forbid(unsafe_code)]

pub mod anim;
pub mod color;
pub mod composite;
pub mod compositor;
pub mod core;
pub mod ease;
pub mod encode;
pub mod error;
pub mod object;
pub mod paint;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod scene;
pub mod transform;

pub use anim::{Animation, AnimationKind, Property, Tween};
pub use color::Color;
pub use compositor::{Canvas, FrameRGBA, TextRun, render_frame};
pub use core::{
    ALWAYS, Affine, BezPath, CanvasSize, DL, DOWN, DR, Direction, Fps, FrameIndex, FrameRange,
    LEFT, ORIGIN, Point, RIGHT, Rect, Size, UL, UP, UR, Vec2, critical_point,
};
pub use ease::Ease;
pub use encode::{EncodeConfig, Encoder, FfmpegEncoder, PngSequenceEncoder, is_ffmpeg_on_path};
pub use error::{KinemaError, KinemaResult};
pub use object::{FrameState, Geometry, Group, Node, Object};
pub use paint::{BlendMode, Paint, ResolvedPaint};
pub use pipeline::{ExportStats, Threading, export, export_to_mp4};
pub use preview::Previewer;
pub use raster::SoftwareCanvas;
pub use scene::Scene;
pub use transform::{TransformOp, TransformStack};
