//! Pure-CPU canvas implementation.
//!
//! Scanline nonzero-winding fill over a premultiplied RGBA8 buffer. Sampling
//! happens at pixel centers with no antialiasing, which keeps output
//! bit-identical across runs and platforms.

use crate::{
    color::Color,
    composite,
    compositor::{Canvas, FrameRGBA, TextRun},
    core::{BezPath, CanvasSize, Point},
    error::{KinemaError, KinemaResult},
    paint::BlendMode,
};

const FLATTEN_TOLERANCE: f64 = 0.25;

#[derive(Debug, Default)]
pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[derive(Clone, Copy)]
struct Segment {
    p0: Point,
    p1: Point,
}

impl SoftwareCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_surface(&mut self) -> KinemaResult<()> {
        if self.data.is_empty() {
            return Err(KinemaError::backend(
                "software canvas has no active surface",
            ));
        }
        Ok(())
    }

    fn fill_nonzero(&mut self, segments: &[Segment], src: [u8; 4]) {
        if segments.is_empty() || src[3] == 0 {
            return;
        }

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for s in segments {
            y_min = y_min.min(s.p0.y.min(s.p1.y));
            y_max = y_max.max(s.p0.y.max(s.p1.y));
        }
        let row_start = (y_min.floor().max(0.0)) as u32;
        let row_end = (y_max.ceil().min(f64::from(self.height))) as u32;

        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for y in row_start..row_end {
            let sy = f64::from(y) + 0.5;
            crossings.clear();
            for s in segments {
                // Half-open rule per segment direction avoids double-counting
                // at shared vertices.
                let (top, bot, winding) = if s.p0.y < s.p1.y {
                    (s.p0, s.p1, 1)
                } else if s.p1.y < s.p0.y {
                    (s.p1, s.p0, -1)
                } else {
                    continue;
                };
                if sy < top.y || sy >= bot.y {
                    continue;
                }
                let x = top.x + (sy - top.y) * (bot.x - top.x) / (bot.y - top.y);
                crossings.push((x, winding));
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0i32;
            let mut span_start = 0.0f64;
            for &(x, w) in &crossings {
                let was_inside = winding != 0;
                winding += w;
                match (was_inside, winding != 0) {
                    (false, true) => span_start = x,
                    (true, false) => self.fill_span(y, span_start, x, src),
                    _ => {}
                }
            }
        }
    }

    fn fill_span(&mut self, y: u32, x0: f64, x1: f64, src: [u8; 4]) {
        // Pixel centers at x + 0.5 inside [x0, x1).
        let start = (x0 - 0.5).ceil().max(0.0) as u32;
        let end = ((x1 - 0.5).ceil().min(f64::from(self.width))) as u32;
        for x in start..end {
            let i = ((y * self.width + x) * 4) as usize;
            let dst = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
            let out = composite::over(dst, src, 1.0);
            self.data[i..i + 4].copy_from_slice(&out);
        }
    }
}

fn flatten_segments(path: &BezPath) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut subpath_start = Point::ZERO;
    let mut last = Point::ZERO;
    let mut open = false;

    fn close(segments: &mut Vec<Segment>, last: Point, start: Point) {
        if last != start {
            segments.push(Segment { p0: last, p1: start });
        }
    }

    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        kurbo::PathEl::MoveTo(p) => {
            if open {
                close(&mut segments, last, subpath_start);
            }
            subpath_start = p;
            last = p;
            open = true;
        }
        kurbo::PathEl::LineTo(p) => {
            segments.push(Segment { p0: last, p1: p });
            last = p;
        }
        kurbo::PathEl::ClosePath => {
            close(&mut segments, last, subpath_start);
            last = subpath_start;
            open = false;
        }
        // flatten() only emits moves, lines and closes.
        _ => {}
    });
    if open {
        close(&mut segments, last, subpath_start);
    }
    segments
}

impl Canvas for SoftwareCanvas {
    fn new_surface(&mut self, size: CanvasSize) -> KinemaResult<()> {
        self.width = size.width;
        self.height = size.height;
        self.data.clear();
        self.data.resize(size.byte_len(), 0);
        Ok(())
    }

    fn draw_path(&mut self, path: &BezPath, color: Color) -> KinemaResult<()> {
        self.require_surface()?;
        let segments = flatten_segments(path);
        self.fill_nonzero(&segments, color.to_premul_rgba8());
        Ok(())
    }

    fn draw_text(&mut self, _run: &TextRun, _color: Color) -> KinemaResult<()> {
        Err(KinemaError::backend(
            "software canvas has no glyph rasterizer; use a text-capable canvas",
        ))
    }

    fn composite(&mut self, frame: &FrameRGBA, mode: BlendMode, opacity: f64) -> KinemaResult<()> {
        self.require_surface()?;
        if frame.width != self.width || frame.height != self.height {
            return Err(KinemaError::evaluation(format!(
                "composite size mismatch: got {}x{}, surface is {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        composite::blend_in_place(&mut self.data, &frame.data, mode, opacity)
    }

    fn finish(&mut self) -> KinemaResult<FrameRGBA> {
        self.require_surface()?;
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data: std::mem::take(&mut self.data),
            premultiplied: true,
        })
    }

    fn fork(&self) -> Box<dyn Canvas> {
        Box::new(SoftwareCanvas::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    fn canvas(w: u32, h: u32) -> SoftwareCanvas {
        let mut c = SoftwareCanvas::new();
        c.new_surface(CanvasSize::new(w, h).unwrap()).unwrap();
        c
    }

    fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * frame.width + x) * 4) as usize;
        [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
    }

    #[test]
    fn rect_fill_covers_interior_only() {
        let mut c = canvas(8, 8);
        let rect = kurbo::Rect::new(2.0, 2.0, 6.0, 6.0).to_path(0.1);
        c.draw_path(&rect, Color::WHITE).unwrap();
        let frame = c.finish().unwrap();
        assert_eq!(px(&frame, 3, 3), [255, 255, 255, 255]);
        assert_eq!(px(&frame, 5, 5), [255, 255, 255, 255]);
        assert_eq!(px(&frame, 1, 1), [0, 0, 0, 0]);
        assert_eq!(px(&frame, 6, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn unclosed_subpath_fills_as_if_closed() {
        let mut c = canvas(8, 8);
        let mut tri = BezPath::new();
        tri.move_to((1.0, 1.0));
        tri.line_to((7.0, 1.0));
        tri.line_to((7.0, 7.0));
        // No close_path on purpose.
        c.draw_path(&tri, Color::WHITE).unwrap();
        let frame = c.finish().unwrap();
        assert_eq!(px(&frame, 6, 2), [255, 255, 255, 255]);
        assert_eq!(px(&frame, 1, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn draw_without_surface_is_a_backend_error() {
        let mut c = SoftwareCanvas::new();
        let rect = kurbo::Rect::new(0.0, 0.0, 1.0, 1.0).to_path(0.1);
        assert!(c.draw_path(&rect, Color::WHITE).is_err());
    }

    #[test]
    fn identical_draws_are_bit_identical() {
        let shape = kurbo::Circle::new((16.0, 16.0), 10.0).to_path(0.1);
        let render = || {
            let mut c = canvas(32, 32);
            c.draw_path(&shape, Color::rgba(0.3, 0.7, 0.2, 0.8)).unwrap();
            c.finish().unwrap().data
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn text_is_unsupported() {
        let mut c = canvas(8, 8);
        let run = TextRun {
            origin: Point::ZERO,
            content: "hi".into(),
            size_px: 12.0,
            transform: crate::core::Affine::IDENTITY,
        };
        assert!(c.draw_text(&run, Color::WHITE).is_err());
    }
}
