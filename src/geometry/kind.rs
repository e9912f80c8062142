// src/geometry/kind.rs
use geo::Geometry as GeoGeometry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strukturelle Art einer Geometrie.
///
/// Die ersten acht Varianten bilden die geschlossene Artenmenge, auf der die
/// strukturelle Transformation definiert ist. `Line`, `Rect` und `Triangle`
/// existieren nur, weil `geo` sie kennt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    LinearRing,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Line,
    Rect,
    Triangle,
}

impl GeometryKind {
    pub fn label(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::LinearRing => "LinearRing",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
            GeometryKind::Line => "Line",
            GeometryKind::Rect => "Rect",
            GeometryKind::Triangle => "Triangle",
        }
    }

    /// Art einer `geo`-Geometrie; Ringe sind dort nicht unterscheidbar.
    pub fn of_geo(geometry: &GeoGeometry<f64>) -> Self {
        match geometry {
            GeoGeometry::Point(_) => GeometryKind::Point,
            GeoGeometry::LineString(_) => GeometryKind::LineString,
            GeoGeometry::Polygon(_) => GeometryKind::Polygon,
            GeoGeometry::MultiPoint(_) => GeometryKind::MultiPoint,
            GeoGeometry::MultiLineString(_) => GeometryKind::MultiLineString,
            GeoGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            GeoGeometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
            GeoGeometry::Line(_) => GeometryKind::Line,
            GeoGeometry::Rect(_) => GeometryKind::Rect,
            GeoGeometry::Triangle(_) => GeometryKind::Triangle,
        }
    }

    pub fn is_collection(self) -> bool {
        matches!(
            self,
            GeometryKind::MultiPoint
                | GeometryKind::MultiLineString
                | GeometryKind::MultiPolygon
                | GeometryKind::GeometryCollection
        )
    }

    pub fn is_lineal(self) -> bool {
        matches!(self, GeometryKind::LineString | GeometryKind::LinearRing)
    }

    /// Gehört die Art zur geschlossenen Menge der Strukturarten?
    pub fn is_structural(self) -> bool {
        !matches!(
            self,
            GeometryKind::Line | GeometryKind::Rect | GeometryKind::Triangle
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Rect, coord};

    #[test]
    fn test_labels_match_engine_names() {
        assert_eq!(GeometryKind::GeometryCollection.to_string(), "GeometryCollection");
        assert_eq!(GeometryKind::LinearRing.label(), "LinearRing");
    }

    #[test]
    fn test_engine_only_kinds_are_not_structural() {
        let rect = GeoGeometry::Rect(Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }));
        let kind = GeometryKind::of_geo(&rect);
        assert_eq!(kind, GeometryKind::Rect);
        assert!(!kind.is_structural());
        assert!(GeometryKind::MultiPolygon.is_structural());
        assert!(GeometryKind::MultiPolygon.is_collection());
        assert!(!GeometryKind::Polygon.is_collection());
    }
}
