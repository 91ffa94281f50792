//! Serialization of evaluated frame state, used by debugging and golden
//! tooling that diffs evaluated scenes without rasterizing.

use kinema::{Color, Direction, Ease, FrameIndex, FrameRange, Object, Paint};

#[test]
fn frame_state_serializes_to_stable_json() {
    let obj = Object::circle(10.0, 10.0, 5.0)
        .with_paint(Paint::fill(Color::rgb(1.0, 0.0, 0.0)))
        .translate(10.0, 0.0, 0, 10, Ease::Linear);

    let state = obj.frame_state(FrameIndex(5));
    let json = serde_json::to_value(state).unwrap();

    let paint = &json["paint"];
    assert_eq!(paint["opacity"], 1.0);
    assert_eq!(paint["blend"], "Normal");
    assert_eq!(paint["fill"]["r"], 1.0);
    assert!(json["transform"].is_array() || json["transform"].is_object());
}

#[test]
fn identical_inputs_snapshot_identically() {
    let build = || {
        Object::circle(10.0, 10.0, 5.0)
            .translate(3.0, 4.0, 0, 10, Ease::BounceOut)
            .fade(0.5, 2, 8, Ease::QuadIn)
    };
    let a = serde_json::to_string(&build().frame_state(FrameIndex(6))).unwrap();
    let b = serde_json::to_string(&build().frame_state(FrameIndex(6))).unwrap();
    assert_eq!(a, b);
}

#[test]
fn plain_data_types_round_trip() {
    let range = FrameRange { start: -3, end: 12 };
    let json = serde_json::to_string(&range).unwrap();
    assert_eq!(serde_json::from_str::<FrameRange>(&json).unwrap(), range);

    let color = Color::rgba(0.25, 0.5, 0.75, 1.0);
    let json = serde_json::to_string(&color).unwrap();
    assert_eq!(serde_json::from_str::<Color>(&json).unwrap(), color);

    let dir = Direction { x: -1.0, y: 0.5 };
    let json = serde_json::to_string(&dir).unwrap();
    assert_eq!(serde_json::from_str::<Direction>(&json).unwrap(), dir);
}
