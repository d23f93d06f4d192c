use nalgebra::{Point3, Vector3};
use std::fmt;
use thiserror::Error;

use crate::core::utils::geometry;

/// A particle position. Positions are never wrapped back into the primary cell;
/// periodicity only enters through [`PeriodicBox::distance`].
pub type Position = Point3<f64>;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("Invalid parameter `{name}` = {value}: {reason}")]
pub struct InvalidParameter {
    pub name: &'static str,
    pub value: f64,
    pub reason: &'static str,
}

impl InvalidParameter {
    pub fn new(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self {
            name,
            value,
            reason,
        }
    }
}

/// Requires `value` to be finite and strictly positive.
pub fn require_positive(name: &'static str, value: f64) -> Result<f64, InvalidParameter> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(InvalidParameter::new(
            name,
            value,
            "must be finite and greater than zero",
        ))
    }
}

/// Requires `value` to be finite and not negative.
pub fn require_non_negative(name: &'static str, value: f64) -> Result<f64, InvalidParameter> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(InvalidParameter::new(
            name,
            value,
            "must be finite and not negative",
        ))
    }
}

/// A cubic simulation cell of edge length `L`, periodic along all three axes.
///
/// The primary cell is `[-L/2, L/2]^3`. The edge length is validated once on
/// construction, so every generator can rely on `L > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    length: f64,
}

impl PeriodicBox {
    pub fn new(length: f64) -> Result<Self, InvalidParameter> {
        require_positive("box_length", length)?;
        Ok(Self { length })
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn half_length(&self) -> f64 {
        0.5 * self.length
    }

    pub fn volume(&self) -> f64 {
        self.length.powi(3)
    }

    /// Minimum-image displacement pointing from `b` to `a`.
    #[inline]
    pub fn displacement(&self, a: &Position, b: &Position) -> Vector3<f64> {
        geometry::wrap(&(a - b), self.length)
    }

    /// Minimum-image distance between `a` and `b`.
    #[inline]
    pub fn distance(&self, a: &Position, b: &Position) -> f64 {
        self.displacement(a, b).norm()
    }
}

impl fmt::Display for PeriodicBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cubic periodic box (L = {})", self.length)
    }
}
