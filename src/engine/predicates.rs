// src/engine/predicates.rs

// Unäre und binäre Prädikate. Das Dreizustands-Ergebnis der Engine
// (false/true/Fehler) erscheint hier als `EngineOutcome<bool>`.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{
    CoordsIter, Geometry as GeoGeometry, HasDimensions, Line, LineString, Relate, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::handle::Session;
use super::native::{NativeGeometry, NativeRef};
use super::{EngineFault, EngineOutcome};

// ===================================================================================
// Unäre Prädikate
// ===================================================================================

/// Ungültige Geometrien werden zusätzlich als Notice gemeldet.
pub(crate) fn is_valid(session: &Session<'_>, native: &NativeGeometry) -> EngineOutcome<bool> {
    let valid = native.geometry().is_valid();
    if !valid {
        session.notice(format!("{} is not valid", native.kind()));
    }
    Ok(valid)
}

pub(crate) fn is_empty(native: &NativeGeometry) -> EngineOutcome<bool> {
    Ok(native.geometry().is_empty())
}

/// Einfach heißt: keine Selbstschnitte außer am Schließpunkt. Wiederholte
/// Stützpunkte zählen nicht als Selbstschnitt.
pub(crate) fn is_simple(native: &NativeGeometry) -> EngineOutcome<bool> {
    let simple = match native.view() {
        NativeRef::LineString(line) | NativeRef::LinearRing(line) => line_is_simple(line),
        NativeRef::MultiLineString(lines) => lines.0.iter().all(line_is_simple),
        NativeRef::MultiPoint(points) => points
            .0
            .iter()
            .enumerate()
            .all(|(i, point)| !points.0[..i].contains(point)),
        NativeRef::GeometryCollection(_) => {
            return Err(EngineFault::illegal_argument(
                "isSimple is not supported for GeometryCollection",
            ));
        }
        NativeRef::Polygon(polygon) => std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .all(line_is_simple),
        NativeRef::MultiPolygon(polygons) => polygons.0.iter().all(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .all(line_is_simple)
        }),
        NativeRef::Point(_) | NativeRef::Other(_) => true,
    };
    Ok(simple)
}

fn line_is_simple(line: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = line
        .lines()
        .filter(|segment| segment.start != segment.end)
        .collect();
    let closed = line.is_closed() && segments.len() > 1;
    let last = segments.len().saturating_sub(1);

    for (i, a) in segments.iter().enumerate() {
        for (j, b) in segments.iter().enumerate().skip(i + 1) {
            let Some(hit) = line_intersection(*a, *b) else {
                continue;
            };
            let adjacent = j == i + 1;
            let wraps = closed && i == 0 && j == last;
            match hit {
                LineIntersection::Collinear { .. } => return false,
                LineIntersection::SinglePoint { intersection, .. } => {
                    let shared_vertex = (adjacent && intersection == a.end)
                        || (wraps && intersection == a.start);
                    if !shared_vertex {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Geschlossen und einfach; nur LineStrings und Ringe können Ringe sein.
pub(crate) fn is_ring(native: &NativeGeometry) -> EngineOutcome<bool> {
    match native.view() {
        NativeRef::LineString(line) | NativeRef::LinearRing(line) => {
            Ok(!line.0.is_empty() && line.is_closed() && line_is_simple(line))
        }
        _ => Ok(false),
    }
}

/// Die Engine rechnet zweidimensional.
pub(crate) fn has_z(_native: &NativeGeometry) -> EngineOutcome<bool> {
    Ok(false)
}

pub(crate) fn is_closed(native: &NativeGeometry) -> EngineOutcome<bool> {
    match native.view() {
        NativeRef::LineString(line) | NativeRef::LinearRing(line) => {
            Ok(!line.0.is_empty() && line.is_closed())
        }
        NativeRef::MultiLineString(lines) => Ok(!lines.0.is_empty()
            && lines.0.iter().all(|line| !line.0.is_empty() && line.is_closed())),
        other => Err(EngineFault::illegal_argument(format!(
            "Argument is not a LineString or MultiLineString, got {}",
            other.kind()
        ))),
    }
}

// ===================================================================================
// Binäre Prädikate
// ===================================================================================

/// Die DE-9IM-Prädikate, die der Host aufrufen kann.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryPredicate {
    Disjoint,
    Touches,
    Intersects,
    Crosses,
    Within,
    Contains,
    Overlaps,
    Equals,
    Covers,
    CoveredBy,
}

impl BinaryPredicate {
    pub const ALL: [BinaryPredicate; 10] = [
        BinaryPredicate::Disjoint,
        BinaryPredicate::Touches,
        BinaryPredicate::Intersects,
        BinaryPredicate::Crosses,
        BinaryPredicate::Within,
        BinaryPredicate::Contains,
        BinaryPredicate::Overlaps,
        BinaryPredicate::Equals,
        BinaryPredicate::Covers,
        BinaryPredicate::CoveredBy,
    ];

    /// Methodenname auf der Host-Seite.
    pub fn method_name(self) -> &'static str {
        match self {
            BinaryPredicate::Disjoint => "disjoint",
            BinaryPredicate::Touches => "touches",
            BinaryPredicate::Intersects => "intersects",
            BinaryPredicate::Crosses => "crosses",
            BinaryPredicate::Within => "within",
            BinaryPredicate::Contains => "contains",
            BinaryPredicate::Overlaps => "overlaps",
            BinaryPredicate::Equals => "equals",
            BinaryPredicate::Covers => "covers",
            BinaryPredicate::CoveredBy => "coveredBy",
        }
    }

    pub fn from_method_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|predicate| predicate.method_name() == name)
    }
}

impl fmt::Display for BinaryPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Wertet ein Prädikat über die Schnittmatrix aus. Nicht-endliche Koordinaten
/// kann die Engine nicht einordnen; das ist der Fehlerzustand.
pub(crate) fn relate(
    predicate: BinaryPredicate,
    a: &NativeGeometry,
    b: &NativeGeometry,
) -> EngineOutcome<bool> {
    ensure_finite(predicate, a.geometry())?;
    ensure_finite(predicate, b.geometry())?;

    let matrix = a.geometry().relate(b.geometry());
    let result = match predicate {
        BinaryPredicate::Disjoint => matrix.is_disjoint(),
        BinaryPredicate::Touches => matrix.is_touches(),
        BinaryPredicate::Intersects => matrix.is_intersects(),
        BinaryPredicate::Crosses => matrix.is_crosses(),
        BinaryPredicate::Within => matrix.is_within(),
        BinaryPredicate::Contains => matrix.is_contains(),
        BinaryPredicate::Overlaps => matrix.is_overlaps(),
        BinaryPredicate::Equals => matrix.is_equal_topo(),
        BinaryPredicate::Covers => matrix.is_covers(),
        BinaryPredicate::CoveredBy => matrix.is_coveredby(),
    };
    Ok(result)
}

fn ensure_finite(predicate: BinaryPredicate, geometry: &GeoGeometry<f64>) -> EngineOutcome<()> {
    match geometry
        .coords_iter()
        .find(|coord| !coord.x.is_finite() || !coord.y.is_finite())
    {
        Some(coord) => Err(EngineFault::illegal_argument(format!(
            "{predicate}: non-finite coordinate ({} {})",
            coord.x, coord.y
        ))),
        None => Ok(()),
    }
}
