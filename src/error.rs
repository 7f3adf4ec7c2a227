//! Error types for the generation pipeline

use std::fmt;

/// Errors reported synchronously by [`crate::generate`] before any work begins.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// `poisson_radius <= 0.0`.
    InvalidPoissonRadius(f64),
    /// A `canvas_size` component was `<= 0`.
    InvalidCanvasSize { width: i32, height: i32 },
    /// `kernel_size < 3` after rounding even values up.
    InvalidKernelSize(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPoissonRadius(r) => {
                write!(f, "poisson_radius must be > 0, got {r}")
            }
            Error::InvalidCanvasSize { width, height } => {
                write!(f, "canvas_size must have positive components, got {width}x{height}")
            }
            Error::InvalidKernelSize(k) => {
                write!(f, "kernel_size must be >= 3, got {k}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for the generation pipeline.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_invalid_poisson_radius() {
        let err = Error::InvalidPoissonRadius(-1.0);
        assert!(err.to_string().contains("poisson_radius"));
    }

    #[test]
    fn displays_invalid_canvas_size() {
        let err = Error::InvalidCanvasSize { width: 0, height: 10 };
        assert!(err.to_string().contains("0x10"));
    }
}
