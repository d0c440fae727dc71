//! Error types for the fallible corners of the core.
//!
//! Almost everything in this crate is a total function over real numbers.
//! The exceptions are building a [`crate::scale::LinearScale`] from a
//! degenerate domain and sizing a minimap against an empty world or an empty
//! pixel surface. Both are rejected up front instead of letting NaN leak into
//! every later draw.

/// Error returned when a [`crate::scale::LinearScale`] cannot be built or inverted.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ScaleError {
    /// Both domain points share the same `x`, so the slope would be infinite.
    #[error("degenerate scale domain: both points have x = {x}")]
    DegenerateDomain { x: f64 },
    /// The slope is zero (or not finite), so no inverse mapping exists.
    #[error("scale with slope {k} has no inverse")]
    NonInvertible { k: f64 },
    /// One of the defining points is NaN or infinite.
    #[error("scale points must be finite")]
    NonFinite,
}

/// Error returned by [`crate::minimap::MinimapCore::new`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MinimapError {
    /// The simulation reported a world side length that is not positive.
    #[error("map size must be positive, got {0}")]
    InvalidMapSize(f64),
    /// The minimap surface has no area.
    #[error("minimap pixel size must be positive, got {width}x{height}")]
    InvalidPixelSize { width: f64, height: f64 },
    /// A world-to-pixel scale could not be built.
    #[error(transparent)]
    Scale(#[from] ScaleError),
}
