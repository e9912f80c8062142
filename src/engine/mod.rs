// src/engine/mod.rs

// Die Engine kapselt `geo` (Algorithmen) und `wkt` (Parser) hinter einer
// schmalen Schnittstelle. Alles oberhalb dieses Moduls sieht nur
// `NativeGeometry`, `NativeHandle` und `NativeRef`.
pub mod handle;
pub mod native;
pub mod ops;
pub mod predicates;
pub mod text;

use crate::error::GeometryError;
use thiserror::Error;

pub use self::handle::{
    config, handle_balance, initialize, initialize_with, is_initialized, last_error, shutdown,
};
pub use self::native::{CoordSeq, NativeGeometry, NativeHandle, NativeRef};
pub use self::predicates::BinaryPredicate;

pub const ENGINE_NAME: &str = "geo";
pub const ENGINE_VERSION: &str = "0.30";
pub const CAPI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Von der Engine gemeldeter Fehler eines einzelnen Aufrufs.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn illegal_argument(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("IllegalArgumentException: {detail}"))
    }

    pub(crate) fn topology(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("TopologyException: {detail}"))
    }

    /// Fehler eines Prädikats oder Skalar-Aufrufs.
    pub fn into_error(self) -> GeometryError {
        GeometryError::Engine {
            message: self.message,
        }
    }

    /// Fehler eines Aufrufs, der eine Geometrie liefern sollte (Null-Handle).
    pub fn into_invalid_handle(self, operation: &str) -> GeometryError {
        GeometryError::InvalidHandle {
            operation: operation.to_string(),
            message: self.message,
        }
    }
}

pub type EngineOutcome<T> = Result<T, EngineFault>;

pub(crate) use self::handle::{invoke, report};
