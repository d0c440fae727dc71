//! One-dimensional affine maps between coordinate spaces.
//!
//! Every crossing between world units and minimap pixels goes through a
//! [`LinearScale`]. A scale is a cheap `Copy` value built fresh wherever it is
//! needed; the only way to derive a new one from an existing one is
//! [`LinearScale::inverse_scale`].

#[cfg(test)]
#[path = "scale_test.rs"]
mod scale_test;

use crate::error::ScaleError;

/// The map `y = k * x + b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    k: f64,
    b: f64,
}

impl LinearScale {
    /// Build the scale passing through `(x1, y1)` and `(x2, y2)`.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::DegenerateDomain`] when `x1 == x2` and
    /// [`ScaleError::NonFinite`] when any coordinate is NaN or infinite.
    #[allow(clippy::float_cmp)]
    pub fn from_points(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, ScaleError> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(ScaleError::NonFinite);
        }
        if x1 == x2 {
            return Err(ScaleError::DegenerateDomain { x: x1 });
        }
        let k = (y2 - y1) / (x2 - x1);
        let b = y1 - k * x1;
        Ok(Self { k, b })
    }

    /// Apply the map.
    #[must_use]
    pub fn scale(&self, x: f64) -> f64 {
        self.k * x + self.b
    }

    /// The inverse map, so that `s.inverse_scale()?.scale(s.scale(x)) == x`.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::NonInvertible`] for a flat scale.
    pub fn inverse_scale(&self) -> Result<Self, ScaleError> {
        if self.k == 0.0 || !self.k.is_finite() {
            return Err(ScaleError::NonInvertible { k: self.k });
        }
        Ok(Self { k: 1.0 / self.k, b: -self.b / self.k })
    }

    /// The slope. On an inverted world-to-pixel scale this is world units per pixel.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.k
    }

    /// The intercept.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.b
    }
}
