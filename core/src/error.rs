//! Errors

use thiserror::Error;

/// Errors reported by scene construction, integrators and the renderer.
///
/// Numeric degeneracies encountered while sampling are not errors; they yield
/// zero-valued, zero-pdf results instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A constructor was given arguments it cannot build a valid object from.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested capability is not provided by this object.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// An integrator cannot render the given scene.
    #[error("Incompatible scene: {0}")]
    Incompatible(String),

    /// Renderer lifecycle or worker failure.
    #[error("Render error: {0}")]
    Render(String),

    /// Failure while encoding the output image.
    #[error("Image error: {0}")]
    Image(String),

    /// I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the renderer.
pub type Result<T> = std::result::Result<T, Error>;
