// src/geometry/constructors.rs

use geo::Coord;
use tracing::debug;

use super::{Geometry, GeometryKind};
use crate::engine::{self, CoordSeq, EngineOutcome, NativeGeometry};
use crate::error::{GeometryError, GeometryResult};

// Direkt gebaute Geometrien laufen nicht über `invoke`; Fehler werden hier
// als letzter Engine-Fehler abgelegt.
fn built(operation: &str, outcome: EngineOutcome<NativeGeometry>) -> GeometryResult<Geometry> {
    if let Err(fault) = &outcome {
        engine::report(operation, fault);
    }
    Geometry::wrap(operation, outcome)
}

impl Geometry {
    /// Liest WKT über den gemeinsamen Parser der Engine.
    pub fn from_wkt(text: &str) -> GeometryResult<Geometry> {
        let outcome = engine::invoke("readWKT", |session| session.reader.read(text));
        Geometry::wrap("readWKT", outcome)
    }

    /// Schreibt WKT über den gemeinsamen Formatter der Engine.
    pub fn to_wkt(&self) -> GeometryResult<String> {
        engine::invoke("writeWKT", |session| Ok(session.writer.write(self.native())))
            .map_err(|fault| fault.into_error())
    }

    pub fn point(x: f64, y: f64) -> Geometry {
        Geometry::from_native(NativeGeometry::point_xy(x, y))
    }

    /// Baut einen LineString aus mindestens zwei Punkten. Alle Eingaben werden
    /// geprüft, bevor die Koordinatensequenz entsteht.
    pub fn line_string(points: &[&Geometry]) -> GeometryResult<Geometry> {
        if points.len() < 2 {
            return Err(GeometryError::invalid(
                "[Point]",
                format!("at least 2 points required, got {}", points.len()),
            ));
        }
        if let Some((index, other)) = points
            .iter()
            .enumerate()
            .find(|(_, point)| point.kind() != GeometryKind::Point)
        {
            debug!(index, kind = %other.kind(), "rejecting non-point line string vertex");
            return Err(GeometryError::invalid_type(
                "[Point]",
                format!("Point at index {index}, got {}", other.kind()),
            ));
        }

        let mut seq = CoordSeq::new(points.len());
        for (index, point) in points.iter().enumerate() {
            seq.set_xy(index, point.x()?, point.y()?)
                .map_err(|fault| fault.into_invalid_handle("createLineString"))?;
        }
        built("createLineString", NativeGeometry::line_string(seq))
    }

    /// Baut eine GeometryCollection aus Klonen der Eingaben. Spätere Änderungen
    /// an den Eingaben wirken nicht auf die Collection zurück.
    pub fn collection(members: &[&Geometry]) -> GeometryResult<Geometry> {
        let clones = members
            .iter()
            .map(|member| member.native().clone())
            .collect();
        built(
            "createCollection",
            NativeGeometry::collection(GeometryKind::GeometryCollection, clones),
        )
    }

    /// LineString direkt aus Koordinaten, ohne Zwischen-Geometrien.
    pub fn line_string_from_coords(coords: &[(f64, f64)]) -> GeometryResult<Geometry> {
        let seq = CoordSeq::from_coords(coords.iter().map(|&(x, y)| Coord { x, y }).collect());
        built("createLineString", NativeGeometry::line_string(seq))
    }
}

/// Freie Funktion wie auf der Host-Seite (`readWKT`).
pub fn read_wkt(text: &str) -> GeometryResult<Geometry> {
    Geometry::from_wkt(text)
}

/// Freie Funktion wie auf der Host-Seite (`writeWKT`).
pub fn write_wkt(geometry: &Geometry) -> GeometryResult<String> {
    geometry.to_wkt()
}
