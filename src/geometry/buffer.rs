// src/geometry/buffer.rs

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};

/// Form der Linienenden beim Puffern. Die Zahlencodes sind die, die der Host
/// als `CAP_*`-Konstanten sieht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapStyle {
    Round,
    Flat,
    Square,
}

impl CapStyle {
    pub fn code(self) -> i32 {
        match self {
            CapStyle::Round => 1,
            CapStyle::Flat => 2,
            CapStyle::Square => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(CapStyle::Round),
            2 => Some(CapStyle::Flat),
            3 => Some(CapStyle::Square),
            _ => None,
        }
    }
}

/// Form der Ecken beim Puffern (`JOIN_*`-Konstanten).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinStyle {
    Round,
    Mitre,
    Bevel,
}

impl JoinStyle {
    pub fn code(self) -> i32 {
        match self {
            JoinStyle::Round => 1,
            JoinStyle::Mitre => 2,
            JoinStyle::Bevel => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(JoinStyle::Round),
            2 => Some(JoinStyle::Mitre),
            3 => Some(JoinStyle::Bevel),
            _ => None,
        }
    }
}

/// Parameter einer Pufferoperation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferStyle {
    /// Segmente pro Viertelkreis bei runden Enden und Ecken.
    pub quadrant_segments: u32,
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// Maximales Verhältnis von Gehrungslänge zu Pufferbreite bei `JoinStyle::Mitre`.
    pub mitre_limit: f64,
}

impl Default for BufferStyle {
    fn default() -> Self {
        Self {
            quadrant_segments: 16,
            cap: CapStyle::Round,
            join: JoinStyle::Round,
            mitre_limit: 5.0,
        }
    }
}

impl BufferStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quadrant_segments(mut self, segments: u32) -> Self {
        self.quadrant_segments = segments;
        self
    }

    pub fn with_cap(mut self, cap: CapStyle) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: JoinStyle) -> Self {
        self.join = join;
        self
    }

    pub fn with_mitre_limit(mut self, limit: f64) -> Self {
        self.mitre_limit = limit;
        self
    }

    pub fn validate(&self) -> GeometryResult<()> {
        if self.quadrant_segments == 0 {
            return Err(GeometryError::InvalidConfiguration {
                message: "Buffer needs at least one segment per quadrant.".to_string(),
            });
        }
        if !self.mitre_limit.is_finite() || self.mitre_limit <= 0.0 {
            return Err(GeometryError::InvalidConfiguration {
                message: format!(
                    "Mitre limit must be a positive finite number, got {}",
                    self.mitre_limit
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_codes_roundtrip() {
        for cap in [CapStyle::Round, CapStyle::Flat, CapStyle::Square] {
            assert_eq!(CapStyle::from_code(cap.code()), Some(cap));
        }
        for join in [JoinStyle::Round, JoinStyle::Mitre, JoinStyle::Bevel] {
            assert_eq!(JoinStyle::from_code(join.code()), Some(join));
        }
        assert_eq!(CapStyle::from_code(0), None);
        assert_eq!(JoinStyle::from_code(4), None);
    }

    #[test]
    fn test_zero_segments_invalid() {
        let style = BufferStyle::new().with_quadrant_segments(0);
        assert!(style.validate().is_err());
        assert!(BufferStyle::new().with_mitre_limit(-1.0).validate().is_err());
    }
}
