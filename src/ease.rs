use std::f64::consts::PI;

/// Progress-remapping functions shaping acceleration and deceleration.
///
/// Canonical members satisfy `f(0) = 0` and `f(1) = 1`; elastic/back/bounce
/// variants transiently exceed `[0, 1]` by design. All members are stateless
/// and cheap enough to call once per active attachment per frame.
///
/// `Custom` accepts any user-supplied function with the same contract.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SineIn,
    SineOut,
    SineInOut,
    CircIn,
    CircOut,
    CircInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    Custom(fn(f64) -> f64),
}

impl Default for Ease {
    fn default() -> Self {
        Self::CubicInOut
    }
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => -(t * (t - 2.0)),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    (-2.0 * t * t) + (4.0 * t) - 1.0
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let p = t - 1.0;
                p * p * p + 1.0
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let p = 2.0 * t - 2.0;
                    0.5 * p * p * p + 1.0
                }
            }
            Self::QuarticIn => t * t * t * t,
            Self::QuarticOut => {
                let p = t - 1.0;
                p * p * p * (1.0 - t) + 1.0
            }
            Self::QuarticInOut => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    let p = t - 1.0;
                    -8.0 * p * p * p * p + 1.0
                }
            }
            Self::QuinticIn => t * t * t * t * t,
            Self::QuinticOut => {
                let p = t - 1.0;
                p * p * p * p * p + 1.0
            }
            Self::QuinticInOut => {
                if t < 0.5 {
                    16.0 * t * t * t * t * t
                } else {
                    let p = 2.0 * t - 2.0;
                    0.5 * p * p * p * p * p + 1.0
                }
            }
            Self::SineIn => ((t - 1.0) * PI / 2.0).sin() + 1.0,
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => 0.5 * (1.0 - (t * PI).cos()),
            Self::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Self::CircOut => ((2.0 - t) * t).sqrt(),
            Self::CircInOut => {
                if t < 0.5 {
                    0.5 * (1.0 - (1.0 - 4.0 * t * t).sqrt())
                } else {
                    0.5 * ((-(2.0 * t - 3.0) * (2.0 * t - 1.0)).sqrt() + 1.0)
                }
            }
            Self::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    (2.0f64).powf(10.0 * (t - 1.0))
                }
            }
            Self::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - (2.0f64).powf(-10.0 * t)
                }
            }
            Self::ExpoInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    0.5 * (2.0f64).powf(20.0 * t - 10.0)
                } else {
                    -0.5 * (2.0f64).powf(-20.0 * t + 10.0) + 1.0
                }
            }
            Self::ElasticIn => (13.0 * PI / 2.0 * t).sin() * (2.0f64).powf(10.0 * (t - 1.0)),
            Self::ElasticOut => {
                (-13.0 * PI / 2.0 * (t + 1.0)).sin() * (2.0f64).powf(-10.0 * t) + 1.0
            }
            Self::ElasticInOut => {
                if t < 0.5 {
                    0.5 * (13.0 * PI / 2.0 * (2.0 * t)).sin() * (2.0f64).powf(10.0 * (2.0 * t - 1.0))
                } else {
                    0.5 * ((-13.0 * PI / 2.0 * ((2.0 * t - 1.0) + 1.0)).sin()
                        * (2.0f64).powf(-10.0 * (2.0 * t - 1.0))
                        + 2.0)
                }
            }
            Self::BackIn => t * t * t - t * (t * PI).sin(),
            Self::BackOut => {
                let p = 1.0 - t;
                1.0 - (p * p * p - p * (p * PI).sin())
            }
            Self::BackInOut => {
                if t < 0.5 {
                    let p = 2.0 * t;
                    0.5 * (p * p * p - p * (p * PI).sin())
                } else {
                    let p = 1.0 - (2.0 * t - 1.0);
                    0.5 * (1.0 - (p * p * p - p * (p * PI).sin())) + 0.5
                }
            }
            Self::BounceIn => 1.0 - Self::BounceOut.apply(1.0 - t),
            Self::BounceOut => {
                if t < 4.0 / 11.0 {
                    121.0 * t * t / 16.0
                } else if t < 8.0 / 11.0 {
                    (363.0 / 40.0 * t * t) - (99.0 / 10.0 * t) + 17.0 / 5.0
                } else if t < 9.0 / 10.0 {
                    (4356.0 / 361.0 * t * t) - (35442.0 / 1805.0 * t) + 16061.0 / 1805.0
                } else {
                    (54.0 / 5.0 * t * t) - (513.0 / 25.0 * t) + 268.0 / 25.0
                }
            }
            Self::BounceInOut => {
                if t < 0.5 {
                    0.5 * Self::BounceIn.apply(t * 2.0)
                } else {
                    0.5 * Self::BounceOut.apply(t * 2.0 - 1.0) + 0.5
                }
            }
            Self::Custom(f) => f(t),
        }
    }

    /// Quantize another ease into `n` discrete steps (stepwise motion).
    pub fn discretized(self, n: u32) -> impl Fn(f64) -> f64 {
        let steps = n.max(2) as f64 - 1.0;
        move |t: f64| {
            let current = (t * steps).round();
            self.apply(current / steps)
        }
    }
}
