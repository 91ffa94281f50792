//! Pixel-level behavior of the software compositor.

use kinema::{
    CanvasSize, Color, Ease, Fps, FrameIndex, FrameRGBA, Object, Paint, Scene, SoftwareCanvas,
    render_frame,
};

fn scene(width: u32, height: u32, num_frames: i64) -> Scene {
    Scene::new(
        CanvasSize::new(width, height).unwrap(),
        Fps::new(30, 1).unwrap(),
        num_frames,
    )
    .unwrap()
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn re_render_is_bit_identical() {
    let mut s = scene(48, 48, 30);
    s.add(
        Object::circle(12.0, 12.0, 8.0)
            .with_paint(Paint::fill(Color::rgba(0.9, 0.3, 0.1, 0.8)))
            .translate(20.0, 20.0, 0, 29, Ease::CubicInOut)
            .fade(0.2, 10, 25, Ease::Linear),
    );

    for f in [0, 7, 15, 29] {
        let mut canvas_a = SoftwareCanvas::new();
        let mut canvas_b = SoftwareCanvas::new();
        let a = render_frame(&s, FrameIndex(f), &mut canvas_a).unwrap();
        let b = render_frame(&s, FrameIndex(f), &mut canvas_b).unwrap();
        assert_eq!(a.data, b.data, "frame {f}");
    }
}

#[test]
fn later_nodes_paint_over_earlier_ones() {
    let mut s = scene(32, 32, 1);
    s.add(Object::circle(16.0, 16.0, 10.0).with_paint(Paint::fill(Color::rgb(1.0, 0.0, 0.0))));
    s.add(Object::circle(16.0, 16.0, 10.0).with_paint(Paint::fill(Color::rgb(0.0, 0.0, 1.0))));

    let mut canvas = SoftwareCanvas::new();
    let frame = render_frame(&s, FrameIndex(0), &mut canvas).unwrap();
    assert_eq!(pixel(&frame, 16, 16), [0, 0, 255, 255]);
}

#[test]
fn frames_outside_the_scene_window_fail() {
    let mut s = scene(16, 16, 5);
    s.add(Object::circle(8.0, 8.0, 4.0));

    let mut canvas = SoftwareCanvas::new();
    assert!(render_frame(&s, FrameIndex(-1), &mut canvas).is_err());
    assert!(render_frame(&s, FrameIndex(5), &mut canvas).is_err());
    assert!(render_frame(&s, FrameIndex(4), &mut canvas).is_ok());
}

#[test]
fn zero_length_translate_snaps_between_frames() {
    let mut s = scene(32, 16, 10);
    s.add(
        Object::rectangle(2.0, 2.0, 8.0, 8.0)
            .with_paint(Paint::fill(Color::WHITE))
            .translate(16.0, 0.0, 5, 5, Ease::Linear),
    );

    let mut canvas = SoftwareCanvas::new();
    let before = render_frame(&s, FrameIndex(4), &mut canvas).unwrap();
    assert_eq!(pixel(&before, 5, 5), [255, 255, 255, 255]);
    assert_eq!(pixel(&before, 21, 5), [0, 0, 0, 0]);

    let after = render_frame(&s, FrameIndex(5), &mut canvas).unwrap();
    assert_eq!(pixel(&after, 5, 5), [0, 0, 0, 0]);
    assert_eq!(pixel(&after, 21, 5), [255, 255, 255, 255]);
}

#[test]
fn background_fills_uncovered_pixels() {
    let s = scene(8, 8, 1).with_background(Color::rgb(0.0, 1.0, 0.0));
    let mut canvas = SoftwareCanvas::new();
    let frame = render_frame(&s, FrameIndex(0), &mut canvas).unwrap();
    assert_eq!(pixel(&frame, 0, 0), [0, 255, 0, 255]);
}

#[test]
fn multiply_blend_darkens_against_the_layer_below() {
    let mut s = scene(16, 16, 1);
    s.add(Object::rectangle(0.0, 0.0, 16.0, 16.0).with_paint(Paint::fill(Color::rgb(0.5, 0.5, 0.5))));
    s.add(
        Object::rectangle(0.0, 0.0, 16.0, 16.0).with_paint(
            Paint::fill(Color::rgb(0.5, 0.5, 0.5)).with_blend(kinema::BlendMode::Multiply),
        ),
    );

    let mut canvas = SoftwareCanvas::new();
    let frame = render_frame(&s, FrameIndex(0), &mut canvas).unwrap();
    let px = pixel(&frame, 8, 8);
    // 0.5 * 0.5 = 0.25 in each channel.
    assert!((i32::from(px[0]) - 64).abs() <= 2, "got {px:?}");
    assert_eq!(px[3], 255);
}
