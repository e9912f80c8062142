// src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::BufferStyle;

/// Konfiguration der Geometrie-Engine. Wird bei `engine::initialize_with`
/// übernommen und gilt bis `engine::shutdown()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stil, der beim Puffern gilt, wenn der Aufrufer keine Parameter angibt.
    pub buffer: BufferStyle,
    /// Ob Engine-Notices (z.B. "ist ungültig") an den Tracing-Sink gehen.
    pub emit_notices: bool,
    /// Nachkommastellen beim WKT-Schreiben; `None` = kürzeste exakte Darstellung.
    pub wkt_precision: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer: BufferStyle::default(),
            emit_notices: true,
            wkt_precision: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_style(mut self, style: BufferStyle) -> Self {
        self.buffer = style;
        self
    }

    pub fn with_notices(mut self, emit: bool) -> Self {
        self.emit_notices = emit;
        self
    }

    pub fn with_wkt_precision(mut self, digits: usize) -> Self {
        self.wkt_precision = Some(digits);
        self
    }

    pub fn validate(&self) -> GeometryResult<()> {
        self.buffer.validate()?;
        if let Some(digits) = self.wkt_precision {
            if digits > 17 {
                return Err(GeometryError::InvalidConfiguration {
                    message: format!("WKT precision must be at most 17 digits, got {digits}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CapStyle, JoinStyle};

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer.quadrant_segments, 16);
        assert_eq!(config.buffer.cap, CapStyle::Round);
        assert_eq!(config.buffer.join, JoinStyle::Round);
        assert!(config.emit_notices);
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "emit_notices": false, "wkt_precision": 3 }"#).unwrap();
        assert!(!config.emit_notices);
        assert_eq!(config.wkt_precision, Some(3));
        assert_eq!(config.buffer, BufferStyle::default());
    }

    #[test]
    fn test_invalid_precision_rejected() {
        let config = EngineConfig::new().with_wkt_precision(40);
        assert!(matches!(
            config.validate(),
            Err(GeometryError::InvalidConfiguration { .. })
        ));
    }
}
