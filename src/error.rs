/// Convenience result type used across Kinema.
pub type KinemaResult<T> = Result<T, KinemaError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum KinemaError {
    /// Invalid user-provided scene or animation configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors while validating animation attachments.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while evaluating or compositing a frame (including
    /// out-of-range frame requests).
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Failures reported by a canvas or encoder capability. The engine does
    /// not retry these; falling back to another backend is a caller decision.
    #[error("backend error: {0}")]
    Backend(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinemaError {
    /// Build a [`KinemaError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`KinemaError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`KinemaError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`KinemaError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(KinemaError::config("x").to_string().contains("config error:"));
        assert!(
            KinemaError::animation("x")
                .to_string()
                .contains("animation error:")
        );
        assert!(
            KinemaError::evaluation("x")
                .to_string()
                .contains("evaluation error:")
        );
        assert!(
            KinemaError::backend("x")
                .to_string()
                .contains("backend error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = KinemaError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
