// src/engine/native.rs

use geo::{
    Coord, Geometry as GeoGeometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::trace;

use super::{EngineFault, EngineOutcome};
use crate::geometry::GeometryKind;

thread_local! {
    // Netto-Anzahl der auf diesem Thread erzeugten minus freigegebenen Handles.
    static HANDLE_BALANCE: Cell<i64> = const { Cell::new(0) };
}

pub(crate) fn balance() -> i64 {
    HANDLE_BALANCE.try_with(Cell::get).unwrap_or(0)
}

fn adjust_balance(delta: i64) {
    // Während des Thread-Abbaus ist der TLS-Slot evtl. schon weg.
    let _ = HANDLE_BALANCE.try_with(|b| b.set(b.get() + delta));
}

// ===================================================================================
// Koordinatensequenz
// ===================================================================================

/// Geordnete (x, y)-Sequenz mit fester Länge, wie sie Punkte, LineStrings und Ringe tragen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordSeq {
    coords: Vec<Coord<f64>>,
}

impl CoordSeq {
    pub fn new(size: usize) -> Self {
        Self {
            coords: vec![Coord { x: 0.0, y: 0.0 }; size],
        }
    }

    pub fn from_coords(coords: Vec<Coord<f64>>) -> Self {
        Self { coords }
    }

    pub fn size(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Die Engine arbeitet zweidimensional.
    pub fn dimensions(&self) -> usize {
        2
    }

    pub fn get_xy(&self, index: usize) -> Option<(f64, f64)> {
        self.coords.get(index).map(|c| (c.x, c.y))
    }

    pub fn set_xy(&mut self, index: usize, x: f64, y: f64) -> EngineOutcome<()> {
        let size = self.coords.len();
        match self.coords.get_mut(index) {
            Some(coord) => {
                coord.x = x;
                coord.y = y;
                Ok(())
            }
            None => Err(EngineFault::illegal_argument(format!(
                "coordinate index {index} out of bounds for sequence of size {size}"
            ))),
        }
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<Coord<f64>> {
        self.coords
    }
}

// ===================================================================================
// Engine-Geometrie
// ===================================================================================

/// Von der Engine besessene Geometrie: `geo`-Geometrie plus SRID-Tag.
///
/// `geo` kennt keinen eigenen LinearRing-Typ; Ringe werden als `LineString`
/// mit gesetztem Ring-Flag gehalten. Innerhalb von Collections geht das Flag
/// verloren, dort sind Ringe gewöhnliche LineStrings.
pub struct NativeGeometry {
    geometry: GeoGeometry<f64>,
    srid: AtomicI32,
    linear_ring: bool,
}

impl NativeGeometry {
    pub fn from_geo(geometry: GeoGeometry<f64>) -> Self {
        Self {
            geometry,
            srid: AtomicI32::new(0),
            linear_ring: false,
        }
    }

    pub fn point_xy(x: f64, y: f64) -> Self {
        Self::from_geo(GeoGeometry::Point(Point::new(x, y)))
    }

    pub fn point(seq: CoordSeq) -> EngineOutcome<Self> {
        match seq.coords() {
            [coord] => Ok(Self::from_geo(GeoGeometry::Point(Point::from(*coord)))),
            other => Err(EngineFault::illegal_argument(format!(
                "Point coordinate list must contain exactly one element, found {}",
                other.len()
            ))),
        }
    }

    pub fn line_string(seq: CoordSeq) -> EngineOutcome<Self> {
        if seq.size() == 1 {
            return Err(EngineFault::illegal_argument(
                "point array must contain 0 or >1 elements",
            ));
        }
        Ok(Self::from_geo(GeoGeometry::LineString(LineString::new(
            seq.into_coords(),
        ))))
    }

    pub fn linear_ring(seq: CoordSeq) -> EngineOutcome<Self> {
        let coords = seq.into_coords();
        if !coords.is_empty() {
            if coords.first() != coords.last() {
                return Err(EngineFault::illegal_argument(
                    "Points of LinearRing do not form a closed linestring",
                ));
            }
            if coords.len() < 4 {
                return Err(EngineFault::illegal_argument(format!(
                    "Invalid number of points in LinearRing found {} - must be 0 or >= 4",
                    coords.len()
                )));
            }
        }
        Ok(Self {
            geometry: GeoGeometry::LineString(LineString::new(coords)),
            srid: AtomicI32::new(0),
            linear_ring: true,
        })
    }

    /// Übernimmt Schale und Löcher; alle müssen Ringe sein.
    pub fn polygon(shell: NativeGeometry, holes: Vec<NativeGeometry>) -> EngineOutcome<Self> {
        let exterior = shell.into_ring("shell")?;
        let interiors = holes
            .into_iter()
            .map(|hole| hole.into_ring("hole"))
            .collect::<EngineOutcome<Vec<_>>>()?;
        Ok(Self::from_geo(GeoGeometry::Polygon(Polygon::new(
            exterior, interiors,
        ))))
    }

    /// Übernimmt die Mitglieder; `kind` muss eine Collection-Art sein.
    pub fn collection(kind: GeometryKind, members: Vec<NativeGeometry>) -> EngineOutcome<Self> {
        let geometry = match kind {
            GeometryKind::MultiPoint => {
                let points = members
                    .into_iter()
                    .map(|member| match member.geometry {
                        GeoGeometry::Point(point) => Ok(point),
                        other => Err(member_mismatch(kind, GeometryKind::Point, &other)),
                    })
                    .collect::<EngineOutcome<Vec<_>>>()?;
                GeoGeometry::MultiPoint(MultiPoint(points))
            }
            GeometryKind::MultiLineString => {
                let lines = members
                    .into_iter()
                    .map(|member| match member.geometry {
                        GeoGeometry::LineString(line) => Ok(line),
                        other => Err(member_mismatch(kind, GeometryKind::LineString, &other)),
                    })
                    .collect::<EngineOutcome<Vec<_>>>()?;
                GeoGeometry::MultiLineString(MultiLineString(lines))
            }
            GeometryKind::MultiPolygon => {
                let polygons = members
                    .into_iter()
                    .map(|member| match member.geometry {
                        GeoGeometry::Polygon(polygon) => Ok(polygon),
                        other => Err(member_mismatch(kind, GeometryKind::Polygon, &other)),
                    })
                    .collect::<EngineOutcome<Vec<_>>>()?;
                GeoGeometry::MultiPolygon(MultiPolygon(polygons))
            }
            GeometryKind::GeometryCollection => GeoGeometry::GeometryCollection(GeometryCollection(
                members.into_iter().map(NativeGeometry::into_geo).collect(),
            )),
            other => {
                return Err(EngineFault::illegal_argument(format!(
                    "{other} is not a collection type"
                )));
            }
        };
        Ok(Self::from_geo(geometry))
    }

    fn into_ring(self, role: &str) -> EngineOutcome<LineString<f64>> {
        let kind = self.kind();
        match self.geometry {
            GeoGeometry::LineString(ring) if self.linear_ring => Ok(ring),
            _ => Err(EngineFault::illegal_argument(format!(
                "{role} must be a LinearRing, got {kind}"
            ))),
        }
    }

    pub fn geometry(&self) -> &GeoGeometry<f64> {
        &self.geometry
    }

    pub fn into_geo(self) -> GeoGeometry<f64> {
        self.geometry
    }

    pub fn srid(&self) -> i32 {
        self.srid.load(Ordering::Relaxed)
    }

    pub fn set_srid(&self, srid: i32) {
        self.srid.store(srid, Ordering::Relaxed);
    }

    pub fn with_srid(self, srid: i32) -> Self {
        self.set_srid(srid);
        self
    }

    pub fn kind(&self) -> GeometryKind {
        self.view().kind()
    }

    /// Geliehene Sicht auf die Struktur, ohne etwas zu kopieren.
    pub fn view(&self) -> NativeRef<'_> {
        match &self.geometry {
            GeoGeometry::LineString(ring) if self.linear_ring => NativeRef::LinearRing(ring),
            geometry => NativeRef::from_geo(geometry),
        }
    }

    /// Punktanzahl eines LineStrings oder Rings, sonst der Engine-Sentinel `-1`.
    pub fn num_points(&self) -> i32 {
        match self.view() {
            NativeRef::LineString(line) | NativeRef::LinearRing(line) => {
                i32::try_from(line.0.len()).unwrap_or(i32::MAX)
            }
            _ => -1,
        }
    }
}

fn member_mismatch(
    collection: GeometryKind,
    expected: GeometryKind,
    found: &GeoGeometry<f64>,
) -> EngineFault {
    EngineFault::illegal_argument(format!(
        "{collection} member must be {expected}, got {}",
        GeometryKind::of_geo(found)
    ))
}

impl Clone for NativeGeometry {
    fn clone(&self) -> Self {
        Self {
            geometry: self.geometry.clone(),
            srid: AtomicI32::new(self.srid()),
            linear_ring: self.linear_ring,
        }
    }
}

impl PartialEq for NativeGeometry {
    fn eq(&self, other: &Self) -> bool {
        self.geometry == other.geometry
            && self.srid() == other.srid()
            && self.linear_ring == other.linear_ring
    }
}

impl fmt::Debug for NativeGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeGeometry")
            .field("kind", &self.kind())
            .field("srid", &self.srid())
            .field("geometry", &self.geometry)
            .finish()
    }
}

// ===================================================================================
// Geliehene Sicht
// ===================================================================================

/// Nicht-besitzende Sicht auf eine Engine-Geometrie oder einen ihrer Teile.
/// Lebt höchstens so lange wie der Besitzer.
#[derive(Debug, Clone, Copy)]
pub enum NativeRef<'a> {
    Point(&'a Point<f64>),
    LineString(&'a LineString<f64>),
    LinearRing(&'a LineString<f64>),
    Polygon(&'a Polygon<f64>),
    MultiPoint(&'a MultiPoint<f64>),
    MultiLineString(&'a MultiLineString<f64>),
    MultiPolygon(&'a MultiPolygon<f64>),
    GeometryCollection(&'a GeometryCollection<f64>),
    /// `Line`, `Rect` und `Triangle` aus `geo`, außerhalb der geschlossenen Artenmenge.
    Other(&'a GeoGeometry<f64>),
}

impl<'a> NativeRef<'a> {
    pub fn from_geo(geometry: &'a GeoGeometry<f64>) -> Self {
        match geometry {
            GeoGeometry::Point(point) => NativeRef::Point(point),
            GeoGeometry::LineString(line) => NativeRef::LineString(line),
            GeoGeometry::Polygon(polygon) => NativeRef::Polygon(polygon),
            GeoGeometry::MultiPoint(points) => NativeRef::MultiPoint(points),
            GeoGeometry::MultiLineString(lines) => NativeRef::MultiLineString(lines),
            GeoGeometry::MultiPolygon(polygons) => NativeRef::MultiPolygon(polygons),
            GeoGeometry::GeometryCollection(members) => NativeRef::GeometryCollection(members),
            GeoGeometry::Line(_) | GeoGeometry::Rect(_) | GeoGeometry::Triangle(_) => {
                NativeRef::Other(geometry)
            }
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            NativeRef::Point(_) => GeometryKind::Point,
            NativeRef::LineString(_) => GeometryKind::LineString,
            NativeRef::LinearRing(_) => GeometryKind::LinearRing,
            NativeRef::Polygon(_) => GeometryKind::Polygon,
            NativeRef::MultiPoint(_) => GeometryKind::MultiPoint,
            NativeRef::MultiLineString(_) => GeometryKind::MultiLineString,
            NativeRef::MultiPolygon(_) => GeometryKind::MultiPolygon,
            NativeRef::GeometryCollection(_) => GeometryKind::GeometryCollection,
            NativeRef::Other(geometry) => GeometryKind::of_geo(geometry),
        }
    }

    /// Kopie der Koordinatensequenz von Punkt, LineString oder Ring.
    pub fn coord_seq(&self) -> Option<CoordSeq> {
        match *self {
            NativeRef::Point(point) => Some(CoordSeq::from_coords(vec![point.0])),
            NativeRef::LineString(line) | NativeRef::LinearRing(line) => {
                Some(CoordSeq::from_coords(line.0.clone()))
            }
            _ => None,
        }
    }

    pub fn exterior_ring(&self) -> Option<NativeRef<'a>> {
        match *self {
            NativeRef::Polygon(polygon) => Some(NativeRef::LinearRing(polygon.exterior())),
            _ => None,
        }
    }

    pub fn num_interior_rings(&self) -> Option<usize> {
        match *self {
            NativeRef::Polygon(polygon) => Some(polygon.interiors().len()),
            _ => None,
        }
    }

    pub fn interior_ring_n(&self, n: usize) -> Option<NativeRef<'a>> {
        match *self {
            NativeRef::Polygon(polygon) => polygon.interiors().get(n).map(NativeRef::LinearRing),
            _ => None,
        }
    }

    /// Mitgliederzahl; Einzelgeometrien zählen als eine.
    pub fn num_members(&self) -> usize {
        match *self {
            NativeRef::MultiPoint(points) => points.0.len(),
            NativeRef::MultiLineString(lines) => lines.0.len(),
            NativeRef::MultiPolygon(polygons) => polygons.0.len(),
            NativeRef::GeometryCollection(members) => members.0.len(),
            _ => 1,
        }
    }

    pub fn member(&self, n: usize) -> Option<NativeRef<'a>> {
        match *self {
            NativeRef::MultiPoint(points) => points.0.get(n).map(NativeRef::Point),
            NativeRef::MultiLineString(lines) => lines.0.get(n).map(NativeRef::LineString),
            NativeRef::MultiPolygon(polygons) => polygons.0.get(n).map(NativeRef::Polygon),
            NativeRef::GeometryCollection(members) => members.0.get(n).map(NativeRef::from_geo),
            single => (n == 0).then_some(single),
        }
    }

    pub fn to_geo(&self) -> GeoGeometry<f64> {
        match *self {
            NativeRef::Point(point) => GeoGeometry::Point(*point),
            NativeRef::LineString(line) | NativeRef::LinearRing(line) => {
                GeoGeometry::LineString(line.clone())
            }
            NativeRef::Polygon(polygon) => GeoGeometry::Polygon(polygon.clone()),
            NativeRef::MultiPoint(points) => GeoGeometry::MultiPoint(points.clone()),
            NativeRef::MultiLineString(lines) => GeoGeometry::MultiLineString(lines.clone()),
            NativeRef::MultiPolygon(polygons) => GeoGeometry::MultiPolygon(polygons.clone()),
            NativeRef::GeometryCollection(members) => {
                GeoGeometry::GeometryCollection(members.clone())
            }
            NativeRef::Other(geometry) => geometry.clone(),
        }
    }

    /// Klont den Teil in eine eigenständige Engine-Geometrie (SRID 0).
    pub fn to_native(&self) -> NativeGeometry {
        NativeGeometry {
            geometry: self.to_geo(),
            srid: AtomicI32::new(0),
            linear_ring: matches!(self, NativeRef::LinearRing(_)),
        }
    }
}

// ===================================================================================
// Besitzendes Handle
// ===================================================================================

/// Besitzt genau eine Engine-Geometrie und gibt sie beim Drop genau einmal frei.
pub struct NativeHandle {
    native: Box<NativeGeometry>,
}

impl NativeHandle {
    pub(crate) fn new(native: NativeGeometry) -> Self {
        adjust_balance(1);
        trace!(kind = %native.kind(), "engine handle acquired");
        Self {
            native: Box::new(native),
        }
    }

    pub fn get(&self) -> &NativeGeometry {
        &self.native
    }

    /// Engine-Clone in ein neues, unabhängiges Handle.
    pub(crate) fn duplicate(&self) -> Self {
        Self::new((*self.native).clone())
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        adjust_balance(-1);
        trace!(kind = %self.native.kind(), "engine handle released");
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeHandle").field(&self.native).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string, polygon};

    fn ring(coords: &[(f64, f64)]) -> NativeGeometry {
        let seq = CoordSeq::from_coords(coords.iter().map(|&(x, y)| coord! { x: x, y: y }).collect());
        NativeGeometry::linear_ring(seq).unwrap()
    }

    #[test]
    fn test_linear_ring_requires_closure() {
        let open = CoordSeq::from_coords(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
        ]);
        let fault = NativeGeometry::linear_ring(open).unwrap_err();
        assert!(fault.message.contains("closed linestring"));

        let short = CoordSeq::from_coords(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 0.0 },
        ]);
        assert!(NativeGeometry::linear_ring(short).is_err());
        assert!(NativeGeometry::linear_ring(CoordSeq::default()).is_ok());
    }

    #[test]
    fn test_polygon_rejects_non_ring_shell() {
        let line = NativeGeometry::from_geo(GeoGeometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0)
        ]));
        let fault = NativeGeometry::polygon(line, Vec::new()).unwrap_err();
        assert!(fault.message.contains("shell must be a LinearRing"));
    }

    #[test]
    fn test_polygon_from_rings_keeps_hole_order() {
        let shell = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let first = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let second = ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]);
        let polygon = NativeGeometry::polygon(shell, vec![first, second]).unwrap();

        let view = polygon.view();
        assert_eq!(view.num_interior_rings(), Some(2));
        let hole = view.interior_ring_n(1).unwrap();
        assert_eq!(hole.kind(), GeometryKind::LinearRing);
        assert_eq!(hole.coord_seq().unwrap().get_xy(0), Some((5.0, 5.0)));
    }

    #[test]
    fn test_collection_member_kinds_checked() {
        let point = NativeGeometry::point_xy(1.0, 2.0);
        let line = NativeGeometry::from_geo(GeoGeometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0)
        ]));
        let fault = NativeGeometry::collection(GeometryKind::MultiPoint, vec![point.clone(), line])
            .unwrap_err();
        assert!(fault.message.contains("MultiPoint member must be Point"));

        let multi = NativeGeometry::collection(GeometryKind::MultiPoint, vec![point]).unwrap();
        assert_eq!(multi.kind(), GeometryKind::MultiPoint);
        assert_eq!(multi.view().num_members(), 1);
    }

    #[test]
    fn test_member_view_of_single_geometry() {
        let polygon = NativeGeometry::from_geo(GeoGeometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0)
        ]));
        let view = polygon.view();
        assert_eq!(view.num_members(), 1);
        assert!(view.member(0).is_some());
        assert!(view.member(1).is_none());
        assert_eq!(view.exterior_ring().unwrap().kind(), GeometryKind::LinearRing);
    }

    #[test]
    fn test_num_points_sentinel() {
        assert_eq!(NativeGeometry::point_xy(0.0, 0.0).num_points(), -1);
        let line = NativeGeometry::from_geo(GeoGeometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 2.0, y: 0.0)
        ]));
        assert_eq!(line.num_points(), 3);
    }

    #[test]
    fn test_handle_balance_tracks_drop() {
        let before = balance();
        let handle = NativeHandle::new(NativeGeometry::point_xy(0.0, 0.0));
        let copy = handle.duplicate();
        assert_eq!(balance(), before + 2);
        drop(handle);
        assert_eq!(balance(), before + 1);
        assert_eq!(copy.get().kind(), GeometryKind::Point);
        drop(copy);
        assert_eq!(balance(), before);
    }

    #[test]
    fn test_coord_seq_set_out_of_bounds() {
        let mut seq = CoordSeq::new(2);
        assert!(seq.set_xy(1, 3.0, 4.0).is_ok());
        assert_eq!(seq.get_xy(1), Some((3.0, 4.0)));
        assert!(seq.set_xy(2, 0.0, 0.0).is_err());
    }
}
