/// Convenience result type used across Greenroom.
pub type GreenroomResult<T> = Result<T, GreenroomError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The split mirrors how failures propagate: [`GreenroomError::ResourceLoad`] stays local (the
/// affected element renders degraded), everything else is terminal for the operation that
/// produced it.
#[derive(thiserror::Error, Debug)]
pub enum GreenroomError {
    /// Invalid user-provided project data, including timing invariant violations.
    #[error("validation error: {0}")]
    Validation(String),

    /// A clip's image, video, avatar or font failed to load or decode.
    #[error("resource load error: {0}")]
    ResourceLoad(String),

    /// A frame's paint sequence failed.
    #[error("render error: {0}")]
    Render(String),

    /// The stream encoder failed to start, accept frames or produce output.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// The export was cancelled cooperatively via its abort flag.
    #[error("export cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GreenroomError {
    /// Build a [`GreenroomError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GreenroomError::ResourceLoad`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }

    /// Build a [`GreenroomError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GreenroomError::Encoder`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_map_to_variants() {
        assert!(matches!(
            GreenroomError::validation("x"),
            GreenroomError::Validation(_)
        ));
        assert!(matches!(
            GreenroomError::resource("x"),
            GreenroomError::ResourceLoad(_)
        ));
        assert!(matches!(
            GreenroomError::encoder("x"),
            GreenroomError::Encoder(_)
        ));
    }

    #[test]
    fn display_includes_message() {
        let e = GreenroomError::validation("bad range");
        assert_eq!(e.to_string(), "validation error: bad range");
    }
}
