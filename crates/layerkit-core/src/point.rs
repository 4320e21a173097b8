//! 2D point value type.

use crate::error::{GeometryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Represents a 2D point (or vector) with X and Y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Creates a new point with the given X and Y coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle_rad` from the +X axis.
    pub fn from_angle(angle_rad: f64) -> Self {
        Self::new(angle_rad.cos(), angle_rad.sin())
    }

    pub fn dot(&self, other: Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(&self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: Point2D) -> f64 {
        (*self - other).length()
    }

    pub fn distance_squared_to(&self, other: Point2D) -> f64 {
        let d = *self - other;
        d.dot(d)
    }

    /// Returns the unit vector in this direction.
    ///
    /// Fails with [`GeometryError::DegenerateGeometry`] for the zero vector.
    pub fn normalized(&self) -> Result<Point2D> {
        let len = self.length();
        if len <= 0.0 || !len.is_finite() {
            return Err(GeometryError::degenerate(format!(
                "cannot normalize vector ({}, {})",
                self.x, self.y
            )));
        }
        Ok(Point2D::new(self.x / len, self.y / len))
    }

    /// Unit direction from `self` towards `other`.
    pub fn direction_to(&self, other: Point2D) -> Result<Point2D> {
        (other - *self).normalized()
    }

    /// Rotates by a unit vector, treating both as complex numbers.
    pub fn rotated(&self, rotation: Point2D) -> Point2D {
        Point2D::new(
            self.x * rotation.x - self.y * rotation.y,
            self.x * rotation.y + self.y * rotation.x,
        )
    }

    /// Inverse of [`Point2D::rotated`] for a unit `rotation`.
    pub fn unrotated(&self, rotation: Point2D) -> Point2D {
        self.rotated(Point2D::new(rotation.x, -rotation.y))
    }

    /// The vector turned a quarter turn widdershins.
    pub fn perpendicular(&self) -> Point2D {
        Point2D::new(-self.y, self.x)
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(&self, other: Point2D, t: f64) -> Point2D {
        *self + (other - *self) * t
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;

    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2D {
    type Output = Point2D;

    fn neg(self) -> Point2D {
        Point2D::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
