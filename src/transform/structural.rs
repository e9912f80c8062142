// src/transform/structural.rs

// Strukturelle Transformation: baut eine Geometrie gleicher Form neu auf und
// schickt dabei jede Koordinate durch eine Abbildung (x, y) -> (x', y').
//
// Aufrufreihenfolge der Abbildung: innerhalb einer Sequenz aufsteigend nach
// Position, bei Polygonen erst die Schale, dann die Löcher in Originalreihenfolge,
// bei Collections Mitglied für Mitglied aufsteigend.

use tracing::{debug, trace};

use crate::engine::{self, CoordSeq, EngineFault, NativeGeometry, NativeRef};
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::Geometry;

const OPERATION: &str = "transform";

fn rejected(fault: EngineFault) -> GeometryError {
    engine::report(OPERATION, &fault);
    fault.into_invalid_handle(OPERATION)
}

fn constructed(outcome: Result<NativeGeometry, EngineFault>) -> GeometryResult<NativeGeometry> {
    outcome.map_err(rejected)
}

/// Transformiert mit einer unfehlbaren Abbildung.
pub fn transform<F>(geometry: &Geometry, mut map: F) -> GeometryResult<Geometry>
where
    F: FnMut(f64, f64) -> (f64, f64),
{
    try_transform(geometry, |x, y| Ok(map(x, y)))
}

/// Transformiert mit einer fehlbaren Abbildung. Der erste Fehler bricht ab;
/// bis dahin gebaute Teile werden freigegeben, nichts wird zurückgegeben.
pub fn try_transform<F>(geometry: &Geometry, mut map: F) -> GeometryResult<Geometry>
where
    F: FnMut(f64, f64) -> GeometryResult<(f64, f64)>,
{
    let mut calls = 0usize;
    let mut counted = |x: f64, y: f64| {
        calls += 1;
        map(x, y)
    };
    let native = transform_ref(geometry.native().view(), &mut counted)?;
    debug!(kind = %native.kind(), coordinates = calls, "structural transform finished");
    Ok(Geometry::from_native(native))
}

fn transform_ref<F>(geometry: NativeRef<'_>, map: &mut F) -> GeometryResult<NativeGeometry>
where
    F: FnMut(f64, f64) -> GeometryResult<(f64, f64)>,
{
    trace!(kind = %geometry.kind(), "transforming");
    match geometry {
        NativeRef::Point(_) => {
            let seq = transform_seq(&geometry, map)?;
            constructed(NativeGeometry::point(seq))
        }
        NativeRef::LineString(_) => {
            let seq = transform_seq(&geometry, map)?;
            constructed(NativeGeometry::line_string(seq))
        }
        NativeRef::LinearRing(_) => {
            let seq = transform_seq(&geometry, map)?;
            constructed(NativeGeometry::linear_ring(seq))
        }
        NativeRef::Polygon(_) => {
            let shell_ref = geometry
                .exterior_ring()
                .ok_or_else(|| unsupported(&geometry))?;
            let shell = transform_ref(shell_ref, map)?;

            let hole_count = geometry.num_interior_rings().unwrap_or(0);
            let mut holes = Vec::with_capacity(hole_count);
            for n in 0..hole_count {
                let hole_ref = geometry
                    .interior_ring_n(n)
                    .ok_or_else(|| unsupported(&geometry))?;
                holes.push(transform_ref(hole_ref, map)?);
            }
            constructed(NativeGeometry::polygon(shell, holes))
        }
        NativeRef::MultiPoint(_)
        | NativeRef::MultiLineString(_)
        | NativeRef::MultiPolygon(_)
        | NativeRef::GeometryCollection(_) => {
            let count = geometry.num_members();
            let mut members = Vec::with_capacity(count);
            for n in 0..count {
                let member = geometry.member(n).ok_or_else(|| unsupported(&geometry))?;
                members.push(transform_ref(member, map)?);
            }
            constructed(NativeGeometry::collection(geometry.kind(), members))
        }
        NativeRef::Other(_) => Err(unsupported(&geometry)),
    }
}

/// Klont die Sequenz und überschreibt jede Position mit dem abgebildeten Paar.
fn transform_seq<F>(geometry: &NativeRef<'_>, map: &mut F) -> GeometryResult<CoordSeq>
where
    F: FnMut(f64, f64) -> GeometryResult<(f64, f64)>,
{
    let mut seq = geometry.coord_seq().ok_or_else(|| unsupported(geometry))?;
    for index in 0..seq.size() {
        let Some((x, y)) = seq.get_xy(index) else {
            break;
        };
        let (mapped_x, mapped_y) = map(x, y)?;
        seq.set_xy(index, mapped_x, mapped_y).map_err(rejected)?;
    }
    Ok(seq)
}

fn unsupported(geometry: &NativeRef<'_>) -> GeometryError {
    GeometryError::UnsupportedGeometryKind {
        kind: geometry.kind().label().to_string(),
    }
}

impl Geometry {
    /// Siehe [`transform`].
    pub fn transform<F>(&self, map: F) -> GeometryResult<Geometry>
    where
        F: FnMut(f64, f64) -> (f64, f64),
    {
        transform(self, map)
    }

    /// Siehe [`try_transform`].
    pub fn try_transform<F>(&self, map: F) -> GeometryResult<Geometry>
    where
        F: FnMut(f64, f64) -> GeometryResult<(f64, f64)>,
    {
        try_transform(self, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::handle_balance;
    use crate::error::ErrorKind;
    use crate::geometry::GeometryKind;
    use geo::{CoordsIter, Rect, coord};
    use rand::Rng;

    #[test]
    fn test_shift_line_string() {
        let line = Geometry::from_wkt("LINESTRING (0 0, 10 0, 10 10)").unwrap();
        assert_eq!(line.num_points().unwrap(), 3);
        assert_eq!(line.point_n(-1).unwrap().to_string(), "POINT (10 10)");

        let shifted = line.transform(|x, y| (x + 1.0, y + 1.0)).unwrap();
        assert_eq!(shifted.to_string(), "LINESTRING (1 1, 11 1, 11 11)");
    }

    #[test]
    fn test_identity_keeps_text() {
        for text in [
            "POINT (1.5 -2)",
            "LINESTRING (0 0, 3 4, 5 5)",
            "LINEARRING (0 0, 4 0, 4 4, 0 0)",
            "POLYGON ((0 0, 20 0, 20 20, 0 20, 0 0), (2 2, 4 2, 4 4, 2 2), (10 10, 12 10, 12 12, 10 10))",
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
            "GEOMETRYCOLLECTION (POINT (1 1), GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1), MULTIPOINT ((2 2), (3 3))))",
        ] {
            let geometry = Geometry::from_wkt(text).unwrap();
            let same = geometry.transform(|x, y| (x, y)).unwrap();
            assert_eq!(same.to_string(), text);
        }
    }

    #[test]
    fn test_shape_is_preserved() {
        let polygon = Geometry::from_wkt(
            "POLYGON ((0 0, 20 0, 20 20, 0 20, 0 0), (2 2, 4 2, 4 4, 2 2), (10 10, 12 10, 12 12, 10 10))",
        )
        .unwrap();
        let moved = polygon.transform(|x, y| (x * 2.0, y - 1.0)).unwrap();
        assert_eq!(moved.num_interior_rings().unwrap(), 2);
        assert_eq!(
            moved.interior_ring_n(1).unwrap().to_string(),
            "LINEARRING (20 9, 24 9, 24 11, 20 9)"
        );

        let mixed = Geometry::from_wkt(
            "GEOMETRYCOLLECTION (POINT (1 1), LINESTRING (0 0, 1 1), POLYGON ((0 0, 1 0, 1 1, 0 0)))",
        )
        .unwrap();
        let moved = mixed.transform(|x, y| (y, x)).unwrap();
        assert_eq!(moved.num_geometries(), 3);
        let kinds: Vec<GeometryKind> = (0..3)
            .map(|n| moved.geometry_n(n).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![GeometryKind::Point, GeometryKind::LineString, GeometryKind::Polygon]
        );
    }

    #[test]
    fn test_mapping_called_once_per_coordinate_in_order() {
        let mut rng = rand::rng();
        let mut coords = Vec::new();
        let mut parts = Vec::new();
        for _ in 0..rng.random_range(1..6) {
            let x: f64 = rng.random_range(-100.0..100.0);
            let y: f64 = rng.random_range(-100.0..100.0);
            parts.push(format!("POINT ({x} {y})"));
            parts.push(format!(
                "POLYGON (({x} {y}, {} {y}, {} {}, {x} {y}))",
                x + 1.0,
                x + 1.0,
                y + 1.0
            ));
        }
        let collection =
            Geometry::from_wkt(&format!("GEOMETRYCOLLECTION ({})", parts.join(", "))).unwrap();
        for coord in collection.to_geo().coords_iter() {
            coords.push((coord.x, coord.y));
        }

        let mut seen = Vec::new();
        collection
            .transform(|x, y| {
                seen.push((x, y));
                (x, y)
            })
            .unwrap();
        assert_eq!(seen, coords);
    }

    #[test]
    fn test_failing_mapping_is_atomic() {
        let before = handle_balance();
        let polygon =
            Geometry::from_wkt("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))")
                .unwrap();
        let mut calls = 0;
        let error = polygon
            .try_transform(|x, y| {
                calls += 1;
                if x >= 5.0 {
                    Err(GeometryError::invalid("fn", "refused"))
                } else {
                    Ok((x, y))
                }
            })
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        assert_eq!(calls, 5);
        drop(polygon);
        assert_eq!(handle_balance(), before);
    }

    #[test]
    fn test_ring_broken_by_mapping_is_invalid_handle() {
        let ring = Geometry::from_wkt("LINEARRING (0 0, 4 0, 4 4, 0 0)").unwrap();
        let mut first = true;
        let error = ring
            .transform(|x, y| {
                let shifted = if first { (x - 1.0, y) } else { (x, y) };
                first = false;
                shifted
            })
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_engine_only_kind_is_unsupported() {
        let rect = Geometry::from_geo(Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 2.0 }));
        let error = rect.transform(|x, y| (x, y)).unwrap_err();
        assert_eq!(
            error,
            GeometryError::UnsupportedGeometryKind {
                kind: "Rect".to_string()
            }
        );
    }
}
