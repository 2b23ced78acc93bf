use crate::pipeline::PipelineDescriptor;

/// Coarse error category, stable across message changes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Malformed stops, degenerate geometry, out-of-range focus.
    InvalidParameter,
    /// Null or expired texture surface handle.
    InvalidHandle,
    /// Operation not valid for the current paint state.
    InvalidState,
    /// The pipeline backend could not build a pipeline for a descriptor.
    BuildFailure,
}

/// Errors reported by paint configuration and pipeline selection.
///
/// Every error is returned synchronously to the immediate caller and none is
/// retried automatically: repeating the call with identical inputs cannot succeed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PaintError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid surface handle: surface is null or has been released")]
    InvalidHandle,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("no active paint: reset or configure a paint before selecting a pipeline")]
    NoActivePaint,

    #[error("pipeline build failed for {descriptor}: {message}")]
    BuildFailure {
        descriptor: PipelineDescriptor,
        message: String,
    },
}

impl PaintError {
    #[inline]
    pub(crate) fn param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::InvalidHandle => ErrorKind::InvalidHandle,
            Self::InvalidState(_) | Self::NoActivePaint => ErrorKind::InvalidState,
            Self::BuildFailure { .. } => ErrorKind::BuildFailure,
        }
    }
}

pub type Result<T, E = PaintError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_paint_is_an_invalid_state() {
        assert_eq!(PaintError::NoActivePaint.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn messages_carry_the_detail() {
        let err = PaintError::param("focus_x must satisfy |focus_x| < 1");
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("focus_x"));
    }
}
