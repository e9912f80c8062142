// src/geometry/accessors.rs

// Lesende Zugriffe. Sie lesen nur das eigene Handle und brauchen daher den
// globalen Engine-Lock nicht. Alles, was einen Teil herausgibt, klont ihn.

use super::{Geometry, GeometryKind};
use crate::engine::{NativeGeometry, NativeRef};
use crate::error::{GeometryError, GeometryResult};

/// Löst einen Index mit Unterstützung für negative Werte auf (`-1` = letztes Element).
pub(crate) fn resolve_index(n: i64, len: usize) -> GeometryResult<usize> {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if n < 0 { signed_len + n } else { n };
    if resolved < 0 || resolved >= signed_len {
        return Err(GeometryError::IndexOutOfRange { index: n, len });
    }
    usize::try_from(resolved).map_err(|_| GeometryError::IndexOutOfRange { index: n, len })
}

impl Geometry {
    fn line_view(&self) -> GeometryResult<&geo::LineString<f64>> {
        match self.native().view() {
            NativeRef::LineString(line) | NativeRef::LinearRing(line) => Ok(line),
            other => Err(GeometryError::wrong_kind(
                GeometryKind::LineString.label(),
                other.kind().label(),
            )),
        }
    }

    fn point_view(&self) -> GeometryResult<&geo::Point<f64>> {
        match self.native().view() {
            NativeRef::Point(point) => Ok(point),
            other => Err(GeometryError::wrong_kind(
                GeometryKind::Point.label(),
                other.kind().label(),
            )),
        }
    }

    fn polygon_view(&self) -> GeometryResult<&geo::Polygon<f64>> {
        match self.native().view() {
            NativeRef::Polygon(polygon) => Ok(polygon),
            other => Err(GeometryError::wrong_kind(
                GeometryKind::Polygon.label(),
                other.kind().label(),
            )),
        }
    }

    /// Punktanzahl eines LineStrings. Für andere Arten liefert die Engine
    /// `-1`; das wird hier zu `NotApplicable`.
    pub fn num_points(&self) -> GeometryResult<usize> {
        let count = self.native().num_points();
        usize::try_from(count).map_err(|_| GeometryError::NotApplicable {
            accessor: "getNumPoints".to_string(),
            kind: self.type_name().to_string(),
        })
    }

    /// Kopie des n-ten Punkts; negative Indizes zählen vom Ende.
    pub fn point_n(&self, n: i64) -> GeometryResult<Geometry> {
        let line = self.line_view()?;
        let index = resolve_index(n, line.0.len())?;
        let coord = line.0[index];
        Ok(self.child(NativeGeometry::point_xy(coord.x, coord.y)))
    }

    pub fn start_point(&self) -> GeometryResult<Geometry> {
        self.point_n(0)
    }

    pub fn end_point(&self) -> GeometryResult<Geometry> {
        self.point_n(-1)
    }

    pub fn x(&self) -> GeometryResult<f64> {
        self.point_view().map(|point| point.x())
    }

    pub fn y(&self) -> GeometryResult<f64> {
        self.point_view().map(|point| point.y())
    }

    /// Die Engine speichert keine Z-Werte.
    pub fn z(&self) -> GeometryResult<f64> {
        self.point_view()?;
        Err(GeometryError::NotApplicable {
            accessor: "getZ".to_string(),
            kind: self.type_name().to_string(),
        })
    }

    /// Mitgliederzahl; Einzelgeometrien zählen als eine.
    pub fn num_geometries(&self) -> usize {
        self.native().view().num_members()
    }

    /// Eigenständige Kopie des n-ten Mitglieds; negative Indizes zählen vom Ende.
    pub fn geometry_n(&self, n: i64) -> GeometryResult<Geometry> {
        let view = self.native().view();
        let index = resolve_index(n, view.num_members())?;
        let member = view
            .member(index)
            .ok_or(GeometryError::IndexOutOfRange {
                index: n,
                len: view.num_members(),
            })?;
        Ok(self.child(member.to_native()))
    }

    pub fn exterior_ring(&self) -> GeometryResult<Geometry> {
        let polygon = self.polygon_view()?;
        Ok(self.child(NativeRef::LinearRing(polygon.exterior()).to_native()))
    }

    pub fn num_interior_rings(&self) -> GeometryResult<usize> {
        self.polygon_view().map(|polygon| polygon.interiors().len())
    }

    pub fn interior_ring_n(&self, n: i64) -> GeometryResult<Geometry> {
        let polygon = self.polygon_view()?;
        let index = resolve_index(n, polygon.interiors().len())?;
        Ok(self.child(NativeRef::LinearRing(&polygon.interiors()[index]).to_native()))
    }

    /// Teile übernehmen die SRID ihres Besitzers.
    fn child(&self, native: NativeGeometry) -> Geometry {
        Geometry::from_native(native.with_srid(self.srid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn line() -> Geometry {
        Geometry::from_wkt("LINESTRING (0 0, 10 0, 10 10)").unwrap()
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(0, 3).unwrap(), 0);
        assert_eq!(resolve_index(-1, 3).unwrap(), 2);
        assert_eq!(resolve_index(-3, 3).unwrap(), 0);
        assert!(resolve_index(3, 3).is_err());
        assert!(resolve_index(-4, 3).is_err());
        assert!(resolve_index(0, 0).is_err());
    }

    #[test]
    fn test_negative_point_index() {
        let line = line();
        assert_eq!(line.num_points().unwrap(), 3);
        assert_eq!(line.point_n(-1).unwrap(), line.point_n(2).unwrap());
        assert_eq!(line.point_n(-1).unwrap().to_string(), "POINT (10 10)");
        assert_eq!(line.start_point().unwrap().to_string(), "POINT (0 0)");
        assert_eq!(line.end_point().unwrap().to_string(), "POINT (10 10)");

        let error = line.point_n(4).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_accessors_on_wrong_kind() {
        let point = Geometry::point(5.0, 10.0);
        assert_eq!(point.x().unwrap(), 5.0);
        assert_eq!(point.y().unwrap(), 10.0);
        assert_eq!(point.num_points().unwrap_err().kind(), ErrorKind::NotApplicable);
        assert_eq!(point.point_n(0).unwrap_err().kind(), ErrorKind::WrongGeometryKind);
        assert_eq!(point.z().unwrap_err().kind(), ErrorKind::NotApplicable);
        assert_eq!(line().x().unwrap_err().kind(), ErrorKind::WrongGeometryKind);
        assert_eq!(
            point.start_point().unwrap_err().to_string(),
            "Unexpected geometry: expected LineString, got Point"
        );
    }

    #[test]
    fn test_geometry_n_clones_member() {
        let collection =
            Geometry::from_wkt("GEOMETRYCOLLECTION (POINT (5 5), POINT (10 10), LINESTRING (5 5, 10 10))")
                .unwrap();
        collection.set_srid(4326);
        assert_eq!(collection.num_geometries(), 3);

        let second = collection.geometry_n(1).unwrap();
        assert_eq!(second.to_string(), "POINT (10 10)");
        assert_eq!(second.srid(), 4326);
        assert_eq!(collection.geometry_n(-1).unwrap().kind(), GeometryKind::LineString);
        assert!(collection.geometry_n(10).is_err());

        drop(collection);
        assert_eq!(second.x().unwrap(), 10.0);
    }

    #[test]
    fn test_ring_extraction() {
        let polygon = Geometry::from_wkt(
            "POLYGON ((0 0, 20 0, 20 20, 0 20, 0 0), (5 5, 6 5, 6 6, 5 5), (10 10, 11 10, 11 11, 10 10))",
        )
        .unwrap();
        assert_eq!(polygon.num_interior_rings().unwrap(), 2);
        assert_eq!(polygon.exterior_ring().unwrap().kind(), GeometryKind::LinearRing);
        assert_eq!(
            polygon.interior_ring_n(-1).unwrap().to_string(),
            "LINEARRING (10 10, 11 10, 11 11, 10 10)"
        );
        assert!(line().exterior_ring().is_err());
    }
}
