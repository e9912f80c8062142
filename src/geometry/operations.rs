// src/geometry/operations.rs

use super::{BufferStyle, Geometry, GeometryKind};
use crate::engine::{self, ops};
use crate::error::{GeometryError, GeometryResult};

impl Geometry {
    pub fn difference(&self, other: &Geometry) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("difference", |_| {
            ops::difference(self.native(), other.native())
        });
        self.derive("difference", outcome)
    }

    pub fn union(&self, other: &Geometry) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("union", |_| ops::union(self.native(), other.native()));
        self.derive("union", outcome)
    }

    pub fn intersection(&self, other: &Geometry) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("intersection", |_| {
            ops::intersection(self.native(), other.native())
        });
        self.derive("intersection", outcome)
    }

    pub fn convex_hull(&self) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("convexHull", |_| ops::convex_hull(self.native()));
        self.derive("convexHull", outcome)
    }

    pub fn as_boundary(&self) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("asBoundary", |_| ops::boundary(self.native()));
        self.derive("asBoundary", outcome)
    }

    pub fn as_valid(&self) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("asValid", |_| ops::make_valid(self.native()));
        self.derive("asValid", outcome)
    }

    /// Puffert mit dem in der Engine-Konfiguration hinterlegten Stil
    /// (standardmäßig 16 Segmente, runde Enden, runde Ecken). Die
    /// Host-Methode `buffer` nutzt immer die festen Standardwerte.
    pub fn buffer(&self, width: f64) -> GeometryResult<Geometry> {
        check_finite("width", width)?;
        let outcome = engine::invoke("buffer", |session| {
            ops::buffer(self.native(), width, &session.config.buffer)
        });
        self.derive("buffer", outcome)
    }

    pub fn buffer_with_style(&self, width: f64, style: &BufferStyle) -> GeometryResult<Geometry> {
        check_finite("width", width)?;
        style
            .validate()
            .map_err(|error| GeometryError::invalid("style", error.to_string()))?;
        let outcome = engine::invoke("buffer", |_| ops::buffer(self.native(), width, style));
        self.derive("buffer", outcome)
    }

    /// Geschlossener LineString (oder Ring) als Polygon ohne Löcher.
    pub fn as_polygon(&self) -> GeometryResult<Geometry> {
        self.expect_lineal()?;
        let outcome = engine::invoke("asPolygon", |_| ops::as_polygon(self.native()));
        self.derive("asPolygon", outcome)
    }

    /// Punkt in Entfernung `distance` vom Anfang; negative Werte zählen vom Ende.
    pub fn interpolate(&self, distance: f64) -> GeometryResult<Geometry> {
        self.expect_lineal()?;
        check_finite("d", distance)?;
        let outcome = engine::invoke("interpolate", |_| {
            ops::interpolate(self.native(), distance, false)
        });
        self.derive("interpolate", outcome)
    }

    /// Wie `interpolate`, aber `fraction` ist ein Anteil der Gesamtlänge.
    pub fn interpolate_normalized(&self, fraction: f64) -> GeometryResult<Geometry> {
        self.expect_lineal()?;
        check_finite("d", fraction)?;
        let outcome = engine::invoke("interpolateNormalized", |_| {
            ops::interpolate(self.native(), fraction, true)
        });
        self.derive("interpolateNormalized", outcome)
    }

    fn expect_lineal(&self) -> GeometryResult<()> {
        let kind = self.kind();
        if kind.is_lineal() {
            Ok(())
        } else {
            Err(GeometryError::wrong_kind(
                GeometryKind::LineString.label(),
                kind.label(),
            ))
        }
    }
}

fn check_finite(name: &str, value: f64) -> GeometryResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::invalid(name, format!("finite number required, got {value}")))
    }
}
