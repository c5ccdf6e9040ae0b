//! Error types and context management for effect operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all effect operations
#[derive(Debug)]
pub enum EffectError {
    /// Configuration or call parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// The layer grids could not be allocated
    ///
    /// This is the only fatal condition of the core: every other bounds
    /// violation is reported through sentinel values.
    GridAllocation {
        /// Requested grid dimensions (width, height)
        dimensions: (usize, usize),
        /// Description of the allocation failure
        reason: String,
    },

    /// A mask operation failed construction-time validation
    InvalidOp {
        /// Kind of the rejected operation
        kind: &'static str,
        /// Explanation of why the operation is invalid
        reason: String,
    },

    /// Failed to save a rendered mask to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Snapshot encoding or decoding failed
    Snapshot {
        /// Underlying serialization error
        source: serde_json::Error,
    },
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::GridAllocation { dimensions, reason } => {
                write!(
                    f,
                    "Failed to allocate {}x{} block grid: {reason}",
                    dimensions.0, dimensions.1
                )
            }
            Self::InvalidOp { kind, reason } => {
                write!(f, "Invalid {kind} mask operation: {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Snapshot { source } => write!(f, "Snapshot serialization failed: {source}"),
        }
    }
}

impl std::error::Error for EffectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Snapshot { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for effect results
pub type Result<T> = std::result::Result<T, EffectError>;

impl From<image::ImageError> for EffectError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageExport {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for EffectError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for EffectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot { source: err }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> EffectError {
    EffectError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid mask operation error
pub fn invalid_op(kind: &'static str, reason: &impl ToString) -> EffectError {
    EffectError::InvalidOp {
        kind,
        reason: reason.to_string(),
    }
}

/// Create a grid allocation error
pub fn allocation_error(width: usize, height: usize, reason: &impl ToString) -> EffectError {
    EffectError::GridAllocation {
        dimensions: (width, height),
        reason: reason.to_string(),
    }
}
