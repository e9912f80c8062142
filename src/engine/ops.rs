// src/engine/ops.rs

// Konstruktive Engine-Operationen. Jede Funktion nimmt geliehene
// Engine-Geometrien und liefert eine neue, eigenständige Geometrie
// (SRID 0; die Aufrufer übernehmen die SRID des Empfängers).

use geo::algorithm::buffer::{Buffer, BufferStyle as GeoBufferStyle, LineCap, LineJoin};
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{
    Area, BooleanOps, ConvexHull, Coord, CoordsIter, Euclidean, Geometry as GeoGeometry,
    GeometryCollection, InterpolatableLine, Intersects, Length, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon,
};
use std::f64::consts::FRAC_PI_2;

use super::native::{NativeGeometry, NativeRef};
use super::{EngineFault, EngineOutcome};
use crate::geometry::{BufferStyle, CapStyle, GeometryKind, JoinStyle};

// ===================================================================================
// Operanden-Klassifikation
// ===================================================================================

/// Operand eines Overlays, nach Dimension zusammengefasst.
enum Operand {
    Puntal(MultiPoint<f64>),
    Lineal(MultiLineString<f64>),
    Areal(MultiPolygon<f64>),
}

impl Operand {
    fn classify(geometry: &GeoGeometry<f64>) -> EngineOutcome<Self> {
        let operand = match geometry {
            GeoGeometry::Point(point) => Operand::Puntal(MultiPoint(vec![*point])),
            GeoGeometry::MultiPoint(points) => Operand::Puntal(points.clone()),
            GeoGeometry::LineString(line) => Operand::Lineal(MultiLineString(vec![line.clone()])),
            GeoGeometry::Line(line) => Operand::Lineal(MultiLineString(vec![LineString::from(
                vec![line.start, line.end],
            )])),
            GeoGeometry::MultiLineString(lines) => Operand::Lineal(lines.clone()),
            GeoGeometry::Polygon(polygon) => Operand::Areal(MultiPolygon(vec![polygon.clone()])),
            GeoGeometry::Rect(rect) => Operand::Areal(MultiPolygon(vec![rect.to_polygon()])),
            GeoGeometry::Triangle(triangle) => {
                Operand::Areal(MultiPolygon(vec![triangle.to_polygon()]))
            }
            GeoGeometry::MultiPolygon(polygons) => Operand::Areal(polygons.clone()),
            GeoGeometry::GeometryCollection(members) => Self::flatten(members)?,
        };
        Ok(operand)
    }

    /// Homogene Collections werden wie ihre Multi-Entsprechung behandelt.
    fn flatten(members: &GeometryCollection<f64>) -> EngineOutcome<Self> {
        let mut points = Vec::new();
        let mut lines = Vec::new();
        let mut polygons = Vec::new();
        for member in &members.0 {
            match Self::classify(member)? {
                Operand::Puntal(p) => points.extend(p.0),
                Operand::Lineal(l) => lines.extend(l.0),
                Operand::Areal(a) => polygons.extend(a.0),
            }
        }
        match (points.is_empty(), lines.is_empty(), polygons.is_empty()) {
            (_, true, true) if !points.is_empty() => Ok(Operand::Puntal(MultiPoint(points))),
            (true, _, true) if !lines.is_empty() => Ok(Operand::Lineal(MultiLineString(lines))),
            (true, true, _) => Ok(Operand::Areal(MultiPolygon(polygons))),
            _ => Err(EngineFault::illegal_argument(
                "mixed-dimension GeometryCollection is not supported in overlay operations",
            )),
        }
    }
}

fn from_areal(polygons: MultiPolygon<f64>) -> GeoGeometry<f64> {
    let mut polygons = polygons.0;
    match polygons.len() {
        0 => GeoGeometry::Polygon(Polygon::new(LineString::new(Vec::new()), Vec::new())),
        1 => GeoGeometry::Polygon(polygons.remove(0)),
        _ => GeoGeometry::MultiPolygon(MultiPolygon(polygons)),
    }
}

fn from_lineal(lines: MultiLineString<f64>) -> GeoGeometry<f64> {
    let mut lines = lines.0;
    match lines.len() {
        0 => GeoGeometry::LineString(LineString::new(Vec::new())),
        1 => GeoGeometry::LineString(lines.remove(0)),
        _ => GeoGeometry::MultiLineString(MultiLineString(lines)),
    }
}

fn from_puntal(points: MultiPoint<f64>) -> GeoGeometry<f64> {
    match points.0.as_slice() {
        [point] => GeoGeometry::Point(*point),
        _ => GeoGeometry::MultiPoint(points),
    }
}

fn points_matching(points: &MultiPoint<f64>, other: &GeoGeometry<f64>, keep: bool) -> MultiPoint<f64> {
    MultiPoint(
        points
            .0
            .iter()
            .filter(|point| GeoGeometry::Point(**point).intersects(other) == keep)
            .copied()
            .collect(),
    )
}

fn push_unique(points: &mut Vec<Point<f64>>, point: Point<f64>) {
    if !points.contains(&point) {
        points.push(point);
    }
}

// ===================================================================================
// Mengenoperationen
// ===================================================================================

pub(crate) fn intersection(
    a: &NativeGeometry,
    b: &NativeGeometry,
) -> EngineOutcome<NativeGeometry> {
    let (ga, gb) = (a.geometry(), b.geometry());
    let geometry = match (Operand::classify(ga)?, Operand::classify(gb)?) {
        (Operand::Areal(pa), Operand::Areal(pb)) => from_areal(pa.intersection(&pb)),
        (Operand::Lineal(lines), Operand::Areal(polygons))
        | (Operand::Areal(polygons), Operand::Lineal(lines)) => {
            from_lineal(polygons.clip(&lines, false))
        }
        (Operand::Puntal(points), _) => from_puntal(points_matching(&points, gb, true)),
        (_, Operand::Puntal(points)) => from_puntal(points_matching(&points, ga, true)),
        (Operand::Lineal(la), Operand::Lineal(lb)) => lineal_intersection(&la, &lb),
    };
    Ok(NativeGeometry::from_geo(geometry))
}

/// Schnitt zweier linearer Operanden: Berührpunkte und gemeinsame Abschnitte.
fn lineal_intersection(a: &MultiLineString<f64>, b: &MultiLineString<f64>) -> GeoGeometry<f64> {
    let mut points = Vec::new();
    let mut shared = Vec::new();
    for la in a.0.iter().flat_map(LineString::lines) {
        for lb in b.0.iter().flat_map(LineString::lines) {
            match line_intersection(la, lb) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    push_unique(&mut points, Point::from(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    if intersection.start == intersection.end {
                        push_unique(&mut points, Point::from(intersection.start));
                    } else {
                        shared.push(LineString::from(vec![intersection.start, intersection.end]));
                    }
                }
                None => {}
            }
        }
    }
    let shared = MultiLineString(shared);
    let overlap = GeoGeometry::MultiLineString(shared.clone());
    points.retain(|point| !GeoGeometry::Point(*point).intersects(&overlap));

    match (points.is_empty(), shared.0.is_empty()) {
        (_, true) => from_puntal(MultiPoint(points)),
        (true, false) => from_lineal(shared),
        (false, false) => GeoGeometry::GeometryCollection(GeometryCollection(vec![
            from_lineal(shared),
            from_puntal(MultiPoint(points)),
        ])),
    }
}

pub(crate) fn difference(a: &NativeGeometry, b: &NativeGeometry) -> EngineOutcome<NativeGeometry> {
    let gb = b.geometry();
    let geometry = match (Operand::classify(a.geometry())?, Operand::classify(gb)?) {
        (Operand::Areal(pa), Operand::Areal(pb)) => from_areal(pa.difference(&pb)),
        (Operand::Lineal(lines), Operand::Areal(polygons)) => {
            from_lineal(polygons.clip(&lines, true))
        }
        (Operand::Puntal(points), _) => from_puntal(points_matching(&points, gb, false)),
        // Niedrigere Dimensionen nehmen einer Fläche nichts weg.
        (Operand::Areal(pa), _) => from_areal(pa),
        (Operand::Lineal(lines), Operand::Puntal(_)) => from_lineal(lines),
        (Operand::Lineal(_), Operand::Lineal(_)) => {
            return Err(EngineFault::topology(
                "difference of two lineal geometries is not supported",
            ));
        }
    };
    Ok(NativeGeometry::from_geo(geometry))
}

pub(crate) fn union(a: &NativeGeometry, b: &NativeGeometry) -> EngineOutcome<NativeGeometry> {
    let geometry = match (Operand::classify(a.geometry())?, Operand::classify(b.geometry())?) {
        (Operand::Areal(pa), Operand::Areal(pb)) => from_areal(pa.union(&pb)),
        (Operand::Puntal(pa), Operand::Puntal(pb)) => {
            let mut points = Vec::new();
            for point in pa.0.into_iter().chain(pb.0) {
                push_unique(&mut points, point);
            }
            from_puntal(MultiPoint(points))
        }
        (Operand::Lineal(la), Operand::Lineal(lb)) => {
            let mut lines = la.0;
            lines.extend(lb.0);
            from_lineal(MultiLineString(lines))
        }
        _ => GeoGeometry::GeometryCollection(GeometryCollection(vec![
            a.geometry().clone(),
            b.geometry().clone(),
        ])),
    };
    Ok(NativeGeometry::from_geo(geometry))
}

// ===================================================================================
// Unäre Konstruktionen
// ===================================================================================

pub(crate) fn convex_hull(native: &NativeGeometry) -> EngineOutcome<NativeGeometry> {
    let mut coords: Vec<Coord<f64>> = native.geometry().coords_iter().collect();
    coords.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    coords.dedup();

    let geometry = match coords.as_slice() {
        [] => GeoGeometry::GeometryCollection(GeometryCollection(Vec::new())),
        [single] => GeoGeometry::Point(Point::from(*single)),
        [first, .., last] => {
            let hull = MultiPoint::from(coords.clone()).convex_hull();
            if hull.unsigned_area() > 0.0 {
                GeoGeometry::Polygon(hull)
            } else {
                // Kollinear: die Hülle entartet zur Strecke zwischen den Extrempunkten.
                GeoGeometry::LineString(LineString::from(vec![*first, *last]))
            }
        }
    };
    Ok(NativeGeometry::from_geo(geometry))
}

/// Topologischer Rand: Flächen liefern ihre Ringe, Linien ihre Endpunkte
/// (Mod-2-Regel), Punkte einen leeren Rand.
pub(crate) fn boundary(native: &NativeGeometry) -> EngineOutcome<NativeGeometry> {
    let geometry = match native.geometry() {
        GeoGeometry::Point(_) | GeoGeometry::MultiPoint(_) => {
            GeoGeometry::GeometryCollection(GeometryCollection(Vec::new()))
        }
        GeoGeometry::LineString(line) => {
            GeoGeometry::MultiPoint(line_boundary(std::slice::from_ref(line)))
        }
        GeoGeometry::Line(line) => GeoGeometry::MultiPoint(MultiPoint(vec![
            Point::from(line.start),
            Point::from(line.end),
        ])),
        GeoGeometry::MultiLineString(lines) => GeoGeometry::MultiPoint(line_boundary(&lines.0)),
        GeoGeometry::Polygon(polygon) => polygon_boundary(std::slice::from_ref(polygon)),
        GeoGeometry::Rect(rect) => polygon_boundary(&[rect.to_polygon()]),
        GeoGeometry::Triangle(triangle) => polygon_boundary(&[triangle.to_polygon()]),
        GeoGeometry::MultiPolygon(polygons) => polygon_boundary(&polygons.0),
        GeoGeometry::GeometryCollection(_) => {
            return Err(EngineFault::illegal_argument(
                "Operation not supported by GeometryCollection",
            ));
        }
    };
    Ok(NativeGeometry::from_geo(geometry))
}

fn line_boundary(lines: &[LineString<f64>]) -> MultiPoint<f64> {
    let mut endpoints: Vec<(Coord<f64>, usize)> = Vec::new();
    for line in lines.iter().filter(|line| !line.0.is_empty()) {
        for coord in [line.0[0], line.0[line.0.len() - 1]] {
            match endpoints.iter_mut().find(|(c, _)| *c == coord) {
                Some((_, count)) => *count += 1,
                None => endpoints.push((coord, 1)),
            }
        }
    }
    MultiPoint(
        endpoints
            .into_iter()
            .filter(|(_, count)| count % 2 == 1)
            .map(|(coord, _)| Point::from(coord))
            .collect(),
    )
}

fn polygon_boundary(polygons: &[Polygon<f64>]) -> GeoGeometry<f64> {
    let mut rings: Vec<LineString<f64>> = polygons
        .iter()
        .filter(|polygon| !polygon.exterior().0.is_empty())
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .cloned()
        .collect();
    if polygons.len() == 1 && rings.len() == 1 {
        GeoGeometry::LineString(rings.remove(0))
    } else {
        GeoGeometry::MultiLineString(MultiLineString(rings))
    }
}

/// Repariert Flächen durch Auflösen gegen die leere Menge; andere Arten bleiben unverändert.
pub(crate) fn make_valid(native: &NativeGeometry) -> EngineOutcome<NativeGeometry> {
    match Operand::classify(native.geometry()) {
        Ok(Operand::Areal(polygons)) => {
            let repaired = polygons.union(&MultiPolygon(Vec::new()));
            Ok(NativeGeometry::from_geo(from_areal(repaired)))
        }
        _ => Ok(native.view().to_native()),
    }
}

pub(crate) fn buffer(
    native: &NativeGeometry,
    width: f64,
    style: &BufferStyle,
) -> EngineOutcome<NativeGeometry> {
    if !width.is_finite() {
        return Err(EngineFault::illegal_argument(format!(
            "buffer width must be finite, got {width}"
        )));
    }
    let angle = FRAC_PI_2 / f64::from(style.quadrant_segments.max(1));
    let cap = match style.cap {
        CapStyle::Round => LineCap::Round(angle),
        CapStyle::Flat => LineCap::Butt,
        CapStyle::Square => LineCap::Square,
    };
    let join = match style.join {
        JoinStyle::Round => LineJoin::Round(angle),
        JoinStyle::Mitre => LineJoin::Miter(style.mitre_limit),
        JoinStyle::Bevel => LineJoin::Bevel,
    };
    let geo_style = GeoBufferStyle::new(width).line_cap(cap).line_join(join);
    let polygons = native.geometry().buffer_with_style(geo_style);
    Ok(NativeGeometry::from_geo(from_areal(polygons)))
}

/// Punkt auf einem LineString in `distance` vom Anfang; negative Werte zählen
/// vom Ende. Das Ergebnis wird auf die Linie begrenzt.
pub(crate) fn interpolate(
    native: &NativeGeometry,
    distance: f64,
    normalized: bool,
) -> EngineOutcome<NativeGeometry> {
    let line = match native.view() {
        NativeRef::LineString(line) | NativeRef::LinearRing(line) => line,
        other => {
            return Err(EngineFault::illegal_argument(format!(
                "interpolation requires a LineString, got {}",
                other.kind()
            )));
        }
    };
    if line.0.is_empty() {
        return Err(EngineFault::illegal_argument(
            "cannot interpolate along an empty LineString",
        ));
    }
    if !distance.is_finite() {
        return Err(EngineFault::illegal_argument(format!(
            "interpolation distance must be finite, got {distance}"
        )));
    }

    let target = if normalized {
        distance * Euclidean.length(line)
    } else {
        distance
    };
    // Über die Länge hinaus liefert `geo` den jeweiligen Endpunkt.
    let point = if target < 0.0 {
        line.point_at_distance_from_end(&Euclidean, -target)
    } else {
        line.point_at_distance_from_start(&Euclidean, target)
    };
    point
        .map(|point| NativeGeometry::point_xy(point.x(), point.y()))
        .ok_or_else(|| EngineFault::illegal_argument("cannot interpolate along an empty LineString"))
}

/// Baut aus einem geschlossenen LineString (oder Ring) ein Polygon ohne Löcher.
pub(crate) fn as_polygon(native: &NativeGeometry) -> EngineOutcome<NativeGeometry> {
    let view = native.view();
    if !view.kind().is_lineal() {
        return Err(EngineFault::illegal_argument(format!(
            "cannot build a Polygon shell from {}",
            view.kind()
        )));
    }
    let seq = view.coord_seq().unwrap_or_default();
    let shell = NativeGeometry::linear_ring(seq)?;
    NativeGeometry::polygon(shell, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::text::{TextReader, TextWriter};
    use crate::engine::native::CoordSeq;
    use approx::assert_relative_eq;
    use geo::HasDimensions;

    fn read(text: &str) -> NativeGeometry {
        TextReader::new().read(text).unwrap()
    }

    fn write(native: &NativeGeometry) -> String {
        TextWriter::default().write(native)
    }

    #[test]
    fn test_polygon_difference_area() {
        let a = read("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))");
        let b = read("POLYGON ((5 0, 15 0, 15 10, 5 10, 5 0))");
        let result = difference(&a, &b).unwrap();
        assert_eq!(result.kind(), GeometryKind::Polygon);
        assert_relative_eq!(result.geometry().unsigned_area(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_intersection_is_empty_polygon() {
        let a = read("POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))");
        let b = read("POLYGON ((5 5, 6 5, 6 6, 5 6, 5 5))");
        let result = intersection(&a, &b).unwrap();
        assert!(result.geometry().is_empty());
        assert_eq!(write(&result), "POLYGON EMPTY");
    }

    #[test]
    fn test_line_clipped_by_polygon() {
        let line = read("LINESTRING (-5 5, 15 5)");
        let square = read("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))");
        let inside = intersection(&line, &square).unwrap();
        assert_eq!(inside.kind(), GeometryKind::LineString);
        let outside = difference(&line, &square).unwrap();
        assert_eq!(outside.kind(), GeometryKind::MultiLineString);
    }

    #[test]
    fn test_crossing_lines_intersect_in_point() {
        let a = read("LINESTRING (0 0, 10 10)");
        let b = read("LINESTRING (0 10, 10 0)");
        assert_eq!(write(&intersection(&a, &b).unwrap()), "POINT (5 5)");
    }

    #[test]
    fn test_point_union_deduplicates() {
        let a = read("MULTIPOINT ((0 0), (1 1))");
        let b = read("POINT (1 1)");
        assert_eq!(write(&union(&a, &b).unwrap()), "MULTIPOINT ((0 0), (1 1))");
    }

    #[test]
    fn test_mixed_collection_rejected() {
        let mixed = read("GEOMETRYCOLLECTION (POINT (0 0), LINESTRING (0 0, 1 1))");
        let square = read("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))");
        let fault = intersection(&mixed, &square).unwrap_err();
        assert!(fault.message.starts_with("IllegalArgumentException"));
    }

    #[test]
    fn test_convex_hull_degenerate_cases() {
        assert_eq!(write(&convex_hull(&read("MULTIPOINT ((1 1), (1 1))")).unwrap()), "POINT (1 1)");
        assert_eq!(
            write(&convex_hull(&read("LINESTRING (0 0, 5 5, 10 10)")).unwrap()),
            "LINESTRING (0 0, 10 10)"
        );
        let hull = convex_hull(&read("MULTIPOINT ((0 0), (10 0), (5 5), (0 10), (10 10))")).unwrap();
        assert_eq!(hull.kind(), GeometryKind::Polygon);
        assert_relative_eq!(hull.geometry().unsigned_area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boundary_rules() {
        assert_eq!(
            write(&boundary(&read("LINESTRING (0 0, 10 0, 10 10)")).unwrap()),
            "MULTIPOINT ((0 0), (10 10))"
        );
        assert_eq!(
            write(&boundary(&read("LINESTRING (0 0, 10 0, 10 10, 0 0)")).unwrap()),
            "MULTIPOINT EMPTY"
        );
        assert_eq!(
            write(&boundary(&read("POLYGON ((0 0, 1 0, 1 1, 0 0))")).unwrap()),
            "LINESTRING (0 0, 1 0, 1 1, 0 0)"
        );
        assert_eq!(
            write(&boundary(&read("POINT (1 1)")).unwrap()),
            "GEOMETRYCOLLECTION EMPTY"
        );
        assert!(boundary(&read("GEOMETRYCOLLECTION (POINT (1 1))")).is_err());
    }

    #[test]
    fn test_interpolate_from_both_ends() {
        let line = read("LINESTRING (0 0, 10 0, 10 10)");
        assert_eq!(write(&interpolate(&line, 15.0, false).unwrap()), "POINT (10 5)");
        assert_eq!(write(&interpolate(&line, -5.0, false).unwrap()), "POINT (10 5)");
        assert_eq!(write(&interpolate(&line, 0.5, true).unwrap()), "POINT (10 0)");
        assert_eq!(write(&interpolate(&line, 99.0, false).unwrap()), "POINT (10 10)");
        assert!(interpolate(&read("POINT (0 0)"), 1.0, false).is_err());
    }

    #[test]
    fn test_interpolate_skips_repeated_vertices() {
        let line = read("LINESTRING (0 0, 10 0, 10 0, 20 0)");
        assert_eq!(write(&interpolate(&line, 15.0, false).unwrap()), "POINT (15 0)");
        assert_eq!(write(&interpolate(&line, -0.25, true).unwrap()), "POINT (15 0)");
        assert_eq!(write(&interpolate(&line, -50.0, false).unwrap()), "POINT (0 0)");
        assert!(interpolate(&line, f64::NAN, false).is_err());
        assert!(interpolate(&read("LINESTRING EMPTY"), 1.0, false).is_err());
    }

    #[test]
    fn test_as_polygon_requires_closed_line() {
        let closed = read("LINESTRING (0 0, 4 0, 4 4, 0 0)");
        assert_eq!(as_polygon(&closed).unwrap().kind(), GeometryKind::Polygon);
        assert!(as_polygon(&read("LINESTRING (0 0, 4 0, 4 4)")).is_err());
    }

    #[test]
    fn test_buffer_of_point_is_round() {
        let point = read("POINT (0 0)");
        let buffered = buffer(&point, 1.0, &BufferStyle::default()).unwrap();
        assert_eq!(buffered.kind(), GeometryKind::Polygon);
        let area = buffered.geometry().unsigned_area();
        assert!(area > 3.0 && area < std::f64::consts::PI + 1e-9);
        assert!(buffer(&point, f64::NAN, &BufferStyle::default()).is_err());
    }

    #[test]
    fn test_make_valid_keeps_non_areal() {
        let line = read("LINESTRING (0 0, 1 1)");
        assert_eq!(make_valid(&line).unwrap(), line);
    }

    #[test]
    fn test_as_polygon_from_ring_sequence() {
        let ring = NativeGeometry::linear_ring(CoordSeq::from_coords(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 2.0, y: 0.0 },
            Coord { x: 2.0, y: 2.0 },
            Coord { x: 0.0, y: 0.0 },
        ]))
        .unwrap();
        assert_eq!(
            write(&as_polygon(&ring).unwrap()),
            "POLYGON ((0 0, 2 0, 2 2, 0 0))"
        );
    }
}
