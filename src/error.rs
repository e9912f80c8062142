// src/error.rs
use thiserror::Error;

/// Fehlerklassen, die der Host unterscheiden kann, ohne Meldungstexte zu vergleichen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingArgument,
    InvalidArgumentType,
    InvalidArgument,
    WrongGeometryKind,
    NotApplicable,
    IndexOutOfRange,
    InvalidHandle,
    UnsupportedGeometryKind,
    Engine,
    UnknownExport,
    InvalidConfiguration,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Missing argument: {name}")]
    MissingArgument { name: String },

    #[error("Invalid argument: {name} (expected {expected})")]
    InvalidArgumentType { name: String, expected: String },

    #[error("Invalid argument: {name} ({reason})")]
    InvalidArgument { name: String, reason: String },

    #[error("Unexpected geometry: expected {expected}, got {actual}")]
    WrongGeometryKind { expected: String, actual: String },

    /// Der Accessor existiert für diese Geometrieart nicht (Engine-Sentinel `-1`).
    #[error("{accessor} is not applicable to {kind}")]
    NotApplicable { accessor: String, kind: String },

    #[error("Invalid range: index {index} for {len} element(s)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Engine returned no geometry for {operation}: {message}")]
    InvalidHandle { operation: String, message: String },

    #[error("Unsupported geometry kind: {kind}")]
    UnsupportedGeometryKind { kind: String },

    #[error("{message}")]
    Engine { message: String },

    #[error("Unknown export: {name}")]
    UnknownExport { name: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl GeometryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeometryError::MissingArgument { .. } => ErrorKind::MissingArgument,
            GeometryError::InvalidArgumentType { .. } => ErrorKind::InvalidArgumentType,
            GeometryError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            GeometryError::WrongGeometryKind { .. } => ErrorKind::WrongGeometryKind,
            GeometryError::NotApplicable { .. } => ErrorKind::NotApplicable,
            GeometryError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            GeometryError::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            GeometryError::UnsupportedGeometryKind { .. } => ErrorKind::UnsupportedGeometryKind,
            GeometryError::Engine { .. } => ErrorKind::Engine,
            GeometryError::UnknownExport { .. } => ErrorKind::UnknownExport,
            GeometryError::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        GeometryError::MissingArgument { name: name.into() }
    }

    pub(crate) fn invalid_type(name: impl Into<String>, expected: impl Into<String>) -> Self {
        GeometryError::InvalidArgumentType {
            name: name.into(),
            expected: expected.into(),
        }
    }

    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        GeometryError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn wrong_kind(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        GeometryError::WrongGeometryKind {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

pub type GeometryResult<T> = Result<T, GeometryError>;
