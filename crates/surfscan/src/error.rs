//! Error types surfaced by detection calls and preset runs.

/// Failure of a single detection call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    /// The backend could not allocate its working buffers.
    #[error("memory allocation failed")]
    MemoryAllocation,

    /// A call argument or configuration value is out of its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backend is in a state where the call cannot be performed.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Another call is outstanding on the same detector.
    #[error("detector busy: another detection call is in flight")]
    Busy,

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

impl DetectError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation(reason.into())
    }
}

/// Failure to start a preset run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// A run is already in progress on this runner.
    #[error("a preset run is already in progress")]
    AlreadyRunning,
}

/// Failure to build or load a point cloud.
#[derive(Debug, thiserror::Error)]
pub enum PointCloudError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Flat coordinate buffer whose length is not a multiple of three.
    #[error("flat coordinate buffer length {0} is not a multiple of 3")]
    RaggedBuffer(usize),

    /// Malformed row in a text point file.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A coordinate is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("unsupported point cloud format '{0}' (expected .xyz, .txt, .csv or .json)")]
    UnsupportedFormat(String),
}
