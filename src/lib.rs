// ./src/lib.rs
pub mod binding;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod transform;

// Re-exports für einfache Verwendung
pub use config::EngineConfig;
pub use error::{ErrorKind, GeometryError, GeometryResult};
pub use geometry::{BufferStyle, CapStyle, Geometry, GeometryKind, JoinStyle, read_wkt, write_wkt};

// Öffentliche API
pub mod prelude {
    pub use super::{
        config::EngineConfig,
        engine::{BinaryPredicate, initialize, initialize_with, last_error, shutdown},
        error::{ErrorKind, GeometryError, GeometryResult},
        geometry::{BufferStyle, CapStyle, Geometry, GeometryKind, JoinStyle, read_wkt, write_wkt},
        transform::{AffineTransform, TransformBuilder},
    };
}
