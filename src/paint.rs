use crate::{
    anim::Property,
    color::Color,
    core::FrameIndex,
    error::KinemaResult,
};

/// Layer blend modes supported by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
}

/// Per-object paint attributes. Colors, stroke width and opacity are all
/// independently animatable.
#[derive(Clone, Debug)]
pub struct Paint {
    pub fill: Option<Property<Color>>,
    pub stroke: Option<Property<Color>>,
    pub stroke_width: Property<f64>,
    pub opacity: Property<f64>,
    pub blend: BlendMode,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: Some(Property::new(Color::WHITE)),
            stroke: None,
            stroke_width: Property::new(2.0),
            opacity: Property::new(1.0),
            blend: BlendMode::Normal,
        }
    }
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(Property::new(color)),
            ..Self::default()
        }
    }

    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(Property::new(color)),
            stroke_width: Property::new(width),
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.stroke = Some(Property::new(color));
        self.stroke_width = Property::new(width);
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn validate(&self) -> KinemaResult<()> {
        if let Some(f) = &self.fill {
            f.validate()?;
        }
        if let Some(s) = &self.stroke {
            s.validate()?;
        }
        self.stroke_width.validate()?;
        self.opacity.validate()
    }

    pub fn resolve(&self, frame: FrameIndex) -> ResolvedPaint {
        ResolvedPaint {
            fill: self.fill.as_ref().map(|p| p.at(frame)),
            stroke: self.stroke.as_ref().map(|p| p.at(frame)),
            stroke_width: self.stroke_width.at(frame).max(0.0),
            opacity: self.opacity.at(frame).clamp(0.0, 1.0),
            blend: self.blend,
        }
    }
}

/// Paint attributes evaluated at one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedPaint {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub blend: BlendMode,
}
