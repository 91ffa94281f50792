use crate::{
    color::Color,
    core::{CanvasSize, Fps, FrameIndex},
    error::{KinemaError, KinemaResult},
    object::Node,
};

/// A timeline of drawable objects over a fixed canvas.
///
/// Paint order is insertion order: later nodes render over earlier ones.
/// Renderable frames are `0..num_frames`.
#[derive(Clone, Debug)]
pub struct Scene {
    pub canvas: CanvasSize,
    pub fps: Fps,
    pub num_frames: i64,
    pub background: Color,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new(canvas: CanvasSize, fps: Fps, num_frames: i64) -> KinemaResult<Self> {
        if num_frames <= 0 {
            return Err(KinemaError::config("scene num_frames must be > 0"));
        }
        Ok(Self {
            canvas,
            fps,
            num_frames,
            background: Color::TRANSPARENT,
            nodes: Vec::new(),
        })
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Append a node at the top of the paint order.
    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.nodes.push(node.into());
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Check the whole scene graph: canvas, frame count, every transform
    /// range and animation attachment.
    pub fn validate(&self) -> KinemaResult<()> {
        if self.num_frames <= 0 {
            return Err(KinemaError::config("scene num_frames must be > 0"));
        }
        for node in &self.nodes {
            node.validate().map_err(|e| {
                KinemaError::animation(format!("node '{}': {e}", node.id()))
            })?;
        }
        Ok(())
    }

    /// Render one frame through `canvas`. See [`crate::compositor::render_frame`].
    pub fn render_frame(
        &self,
        frame: FrameIndex,
        canvas: &mut dyn crate::compositor::Canvas,
    ) -> KinemaResult<crate::compositor::FrameRGBA> {
        crate::compositor::render_frame(self, frame, canvas)
    }

    /// Export every frame in order into `encoder`. See [`crate::pipeline::export`].
    pub fn export(
        &self,
        canvas: &mut dyn crate::compositor::Canvas,
        encoder: Box<dyn crate::encode::Encoder>,
        threading: &crate::pipeline::Threading,
    ) -> KinemaResult<crate::pipeline::ExportStats> {
        crate::pipeline::export(self, canvas, encoder, threading)
    }

    /// Start an interactive preview worker. See [`crate::preview::Previewer`].
    pub fn preview(
        self: std::sync::Arc<Self>,
        canvas: Box<dyn crate::compositor::Canvas>,
        on_frame: impl FnMut(FrameIndex, std::sync::Arc<crate::compositor::FrameRGBA>)
        + Send
        + 'static,
    ) -> KinemaResult<crate::preview::Previewer> {
        crate::preview::Previewer::spawn(self, canvas, on_frame)
    }
}
