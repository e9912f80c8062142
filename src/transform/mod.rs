// src/transform/mod.rs

// Koordinatenweise Transformationen ganzer Geometrien.
pub mod affine;
pub mod structural;

pub use self::affine::{AffineTransform, TransformBuilder};
pub use self::structural::{transform, try_transform};
