//! Error types for aerosurf.
//!
//! All crates return `AeroResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the surface pipeline.
///
/// `Geometry` and `Mesh` are unrecoverable for the affected surface.
/// `Agglomeration` never escapes the multigrid builder: it caps the
/// number of grid levels instead.
#[derive(Debug, Error)]
pub enum AeroError {
    /// Structured input is too small or collapses (degenerate span section,
    /// fully degenerate surface).
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Triangulation produced a zero-area or inconsistently wound triangle,
    /// or a mesh container is malformed.
    #[error("Mesh error: {0}")]
    Mesh(String),

    /// A coarse multigrid level could not be built.
    #[error("Agglomeration error: {0}")]
    Agglomeration(String),

    /// FEM deformation data is missing or inconsistent.
    #[error("Deformation error: {0}")]
    Deformation(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AeroError {
    /// True for errors that must exclude the surface from the run.
    pub fn is_fatal_for_surface(&self) -> bool {
        matches!(self, AeroError::Geometry(_) | AeroError::Mesh(_))
    }
}

/// Convenience alias for `Result<T, AeroError>`.
pub type AeroResult<T> = Result<T, AeroError>;
