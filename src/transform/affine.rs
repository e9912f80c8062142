// src/transform/affine.rs

use nalgebra::{Matrix3, Point2};
use serde::{Deserialize, Serialize};

use crate::error::GeometryResult;
use crate::geometry::Geometry;

/// Affine Abbildung der Ebene als homogene 3x3-Matrix.
///
/// ```text
/// [a c tx]
/// [b d ty]
/// [0 0  1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    matrix: Matrix3<f64>,
}

impl AffineTransform {
    /// Koeffizienten in der Reihenfolge `a, b, c, d, tx, ty`.
    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self {
            matrix: Matrix3::new(a, c, tx, b, d, ty, 0.0, 0.0, 1.0),
        }
    }

    /// Identitäts-Transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn uniform_scale(scale: f64) -> Self {
        Self::scale(scale, scale)
    }

    /// Rotation um den Ursprung, gegen den Uhrzeigersinn
    pub fn rotation(angle_rad: f64) -> Self {
        let (sin_a, cos_a) = angle_rad.sin_cos();
        Self::new(cos_a, sin_a, -sin_a, cos_a, 0.0, 0.0)
    }

    /// Rotation um einen Punkt
    pub fn rotation_around(angle_rad: f64, center_x: f64, center_y: f64) -> Self {
        Self::translation(center_x, center_y)
            .compose(&Self::rotation(angle_rad))
            .compose(&Self::translation(-center_x, -center_y))
    }

    pub fn shear(shx: f64, shy: f64) -> Self {
        Self::new(1.0, shy, shx, 1.0, 0.0, 0.0)
    }

    /// Spiegelung an der X-Achse
    pub fn reflect_x() -> Self {
        Self::scale(1.0, -1.0)
    }

    /// Spiegelung an der Y-Achse
    pub fn reflect_y() -> Self {
        Self::scale(-1.0, 1.0)
    }

    /// `self ∘ other`: erst `other`, dann `self`.
    pub fn compose(&self, other: &AffineTransform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    pub fn inverse(&self) -> Option<Self> {
        if self.determinant().abs() < 1e-10 {
            return None;
        }
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Determinante des linearen Anteils.
    pub fn determinant(&self) -> f64 {
        let m = &self.matrix;
        m[(0, 0)] * m[(1, 1)] - m[(1, 0)] * m[(0, 1)]
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let mapped = self.matrix.transform_point(&Point2::new(x, y));
        (mapped.x, mapped.y)
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Builder für zusammengesetzte Transformationen. Jeder Schritt wirkt nach den vorherigen.
#[derive(Debug, Clone, Default)]
pub struct TransformBuilder {
    transform: AffineTransform,
}

impl TransformBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn then(mut self, step: AffineTransform) -> Self {
        self.transform = step.compose(&self.transform);
        self
    }

    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.then(AffineTransform::translation(tx, ty))
    }

    pub fn scale(self, sx: f64, sy: f64) -> Self {
        self.then(AffineTransform::scale(sx, sy))
    }

    pub fn rotate(self, angle_rad: f64) -> Self {
        self.then(AffineTransform::rotation(angle_rad))
    }

    pub fn rotate_around(self, angle_rad: f64, center_x: f64, center_y: f64) -> Self {
        self.then(AffineTransform::rotation_around(angle_rad, center_x, center_y))
    }

    pub fn shear(self, shx: f64, shy: f64) -> Self {
        self.then(AffineTransform::shear(shx, shy))
    }

    pub fn build(self) -> AffineTransform {
        self.transform
    }
}

impl Geometry {
    /// Strukturelle Transformation mit einer affinen Abbildung.
    pub fn affine(&self, transform: &AffineTransform) -> GeometryResult<Geometry> {
        self.transform(|x, y| transform.apply(x, y))
    }
}
