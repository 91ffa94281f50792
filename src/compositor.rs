use kurbo::{Shape as _, Stroke, StrokeOpts};

use crate::{
    color::Color,
    core::{Affine, BezPath, CanvasSize, FrameIndex, Point},
    error::{KinemaError, KinemaResult},
    object::{Geometry, Group, Node, Object},
    paint::BlendMode,
    scene::Scene,
};

/// One finished frame of premultiplied RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// A positioned text run, ready for a glyph-capable canvas. The transform is
/// the object's fully resolved matrix (parent included).
#[derive(Clone, Debug)]
pub struct TextRun {
    pub origin: Point,
    pub content: String,
    pub size_px: f64,
    pub transform: Affine,
}

/// Drawing capability the compositor renders through.
///
/// Paths handed to [`Canvas::draw_path`] are already transformed into device
/// space and already outline-expanded for strokes, so an implementation only
/// needs nonzero-winding fill, text, and pixel compositing. Implementations
/// must be deterministic: the same calls produce bit-identical surfaces.
pub trait Canvas: Send + Sync {
    /// Start a fresh transparent surface of `size`.
    fn new_surface(&mut self, size: CanvasSize) -> KinemaResult<()>;

    /// Fill `path` (nonzero winding) with `color`. Alpha is straight here;
    /// the canvas premultiplies when it touches pixels.
    fn draw_path(&mut self, path: &BezPath, color: Color) -> KinemaResult<()>;

    /// Draw a text run. Canvases without glyph support return a backend
    /// error rather than drawing a placeholder.
    fn draw_text(&mut self, run: &TextRun, color: Color) -> KinemaResult<()>;

    /// Blend a finished sub-frame onto the current surface.
    fn composite(&mut self, frame: &FrameRGBA, mode: BlendMode, opacity: f64) -> KinemaResult<()>;

    /// Take the finished surface, leaving the canvas reusable.
    fn finish(&mut self) -> KinemaResult<FrameRGBA>;

    /// A fresh canvas of the same backend, for offscreen group surfaces.
    fn fork(&self) -> Box<dyn Canvas>;
}

const FLATTEN_TOLERANCE: f64 = 0.25;

/// Render one frame of `scene` through `canvas`.
///
/// Fails with an evaluation error for frames outside `0..num_frames`;
/// animation attachments may reference such frames, but pixels are only
/// defined inside the scene window.
pub fn render_frame(
    scene: &Scene,
    frame: FrameIndex,
    canvas: &mut dyn Canvas,
) -> KinemaResult<FrameRGBA> {
    scene.validate()?;
    if frame.0 < 0 || frame.0 >= scene.num_frames {
        return Err(KinemaError::evaluation(format!(
            "frame {} outside scene range 0..{}",
            frame.0, scene.num_frames
        )));
    }

    canvas.new_surface(scene.canvas)?;
    if scene.background.a > 0.0 {
        let full = kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(scene.canvas.width),
            f64::from(scene.canvas.height),
        );
        canvas.draw_path(&full.to_path(FLATTEN_TOLERANCE), scene.background)?;
    }
    for node in scene.nodes() {
        draw_node(canvas, scene.canvas, node, Affine::IDENTITY, frame)?;
    }
    canvas.finish()
}

fn draw_node(
    canvas: &mut dyn Canvas,
    size: CanvasSize,
    node: &Node,
    parent: Affine,
    frame: FrameIndex,
) -> KinemaResult<()> {
    match node {
        Node::Object(obj) => draw_object(canvas, size, obj, parent, frame),
        Node::Group(group) => draw_group(canvas, size, group, parent, frame),
    }
}

fn draw_object(
    canvas: &mut dyn Canvas,
    size: CanvasSize,
    obj: &Object,
    parent: Affine,
    frame: FrameIndex,
) -> KinemaResult<()> {
    let state = obj.frame_state(frame);
    if state.paint.opacity <= 0.0 {
        return Ok(());
    }
    let full = parent * state.transform;

    if state.paint.blend == BlendMode::Normal {
        return paint_object(canvas, obj, full, &state.paint);
    }

    // Non-normal blends go through an offscreen surface so the blend applies
    // to the object as a whole against everything below it.
    let mut off = canvas.fork();
    off.new_surface(size)?;
    paint_object(off.as_mut(), obj, full, &state.paint)?;
    let layer = off.finish()?;
    canvas.composite(&layer, state.paint.blend, 1.0)
}

fn paint_object(
    canvas: &mut dyn Canvas,
    obj: &Object,
    full: Affine,
    paint: &crate::paint::ResolvedPaint,
) -> KinemaResult<()> {
    if let Geometry::Text {
        origin,
        content,
        size_px,
        ..
    } = &obj.geometry
    {
        if let Some(fill) = paint.fill {
            let run = TextRun {
                origin: *origin,
                content: content.clone(),
                size_px: *size_px,
                transform: full,
            };
            canvas.draw_text(&run, fill.modulate(paint.opacity))?;
        }
        return Ok(());
    }

    let local = obj.geometry.to_path();

    if let Some(fill) = paint.fill {
        let mut path = local.clone();
        path.apply_affine(full);
        canvas.draw_path(&path, fill.modulate(paint.opacity))?;
    }

    if let (Some(stroke), true) = (paint.stroke, paint.stroke_width > 0.0) {
        // Outline-expand in local space so the stroke scales and shears with
        // the object, like a native vector stroke would.
        let mut outline = kurbo::stroke(
            local.iter(),
            &Stroke::new(paint.stroke_width),
            &StrokeOpts::default(),
            FLATTEN_TOLERANCE,
        );
        outline.apply_affine(full);
        canvas.draw_path(&outline, stroke.modulate(paint.opacity))?;
    }

    Ok(())
}

fn draw_group(
    canvas: &mut dyn Canvas,
    size: CanvasSize,
    group: &Group,
    parent: Affine,
    frame: FrameIndex,
) -> KinemaResult<()> {
    let opacity = group.opacity.at(frame).clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    let own = match group.children_bbox(frame) {
        Some(bbox) => group.stack.resolve(frame, bbox),
        // Empty groups have nothing to pivot on or draw.
        None => return Ok(()),
    };
    let full = parent * own;

    if opacity >= 1.0 && group.blend == BlendMode::Normal {
        for child in &group.children {
            draw_node(canvas, size, child, full, frame)?;
        }
        return Ok(());
    }

    // Group opacity applies to the flattened children, so internally
    // overlapping children must not double-fade. Render them at full opacity
    // offscreen, then composite once.
    let mut off = canvas.fork();
    off.new_surface(size)?;
    for child in &group.children {
        draw_node(off.as_mut(), size, child, full, frame)?;
    }
    let layer = off.finish()?;
    canvas.composite(&layer, group.blend, opacity)
}
