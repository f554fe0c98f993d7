/// Error type for surface construction and asynchronous measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// Probe radius must be non-negative and finite.
    InvalidProbe(f64),
    /// A ball has invalid coordinates or radius.
    InvalidBall {
        /// Index of the invalid ball.
        index: usize,
        /// Description of why the ball is invalid.
        reason: &'static str,
    },
    /// The background computation ended without delivering a result.
    TaskAborted,
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProbe(v) => write!(
                f,
                "invalid probe radius: {v} (must be non-negative and finite)"
            ),
            Self::InvalidBall { index, reason } => {
                write!(f, "invalid ball at index {index}: {reason}")
            }
            Self::TaskAborted => write!(f, "surface computation ended without a result"),
        }
    }
}

impl std::error::Error for SurfaceError {}
