// src/geometry/predicates.rs

use super::Geometry;
use crate::engine::{self, BinaryPredicate, EngineOutcome, predicates};
use crate::error::GeometryResult;

// Fehlerzustand der Engine wird zum `Engine`-Fehler, nie zu `false`.
fn settle(outcome: EngineOutcome<bool>) -> GeometryResult<bool> {
    outcome.map_err(|fault| fault.into_error())
}

impl Geometry {
    pub fn is_valid(&self) -> GeometryResult<bool> {
        settle(engine::invoke("isValid", |session| {
            predicates::is_valid(session, self.native())
        }))
    }

    pub fn is_empty(&self) -> GeometryResult<bool> {
        settle(engine::invoke("isEmpty", |_| predicates::is_empty(self.native())))
    }

    pub fn is_simple(&self) -> GeometryResult<bool> {
        settle(engine::invoke("isSimple", |_| predicates::is_simple(self.native())))
    }

    pub fn is_ring(&self) -> GeometryResult<bool> {
        settle(engine::invoke("isRing", |_| predicates::is_ring(self.native())))
    }

    pub fn has_z(&self) -> GeometryResult<bool> {
        settle(engine::invoke("hasZ", |_| predicates::has_z(self.native())))
    }

    pub fn is_closed(&self) -> GeometryResult<bool> {
        settle(engine::invoke("isClosed", |_| predicates::is_closed(self.native())))
    }

    /// Wertet ein binäres Prädikat `self <predicate> other` aus.
    pub fn relate(&self, predicate: BinaryPredicate, other: &Geometry) -> GeometryResult<bool> {
        settle(engine::invoke(predicate.method_name(), |_| {
            predicates::relate(predicate, self.native(), other.native())
        }))
    }

    pub fn disjoint(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Disjoint, other)
    }

    pub fn touches(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Touches, other)
    }

    pub fn intersects(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Intersects, other)
    }

    pub fn crosses(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Crosses, other)
    }

    pub fn within(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Within, other)
    }

    pub fn contains(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Contains, other)
    }

    pub fn overlaps(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Overlaps, other)
    }

    /// Topologische Gleichheit (nicht Koordinatengleichheit, siehe `exact_eq`).
    pub fn equals(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Equals, other)
    }

    pub fn covers(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::Covers, other)
    }

    pub fn covered_by(&self, other: &Geometry) -> GeometryResult<bool> {
        self.relate(BinaryPredicate::CoveredBy, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_validity_of_known_polygons() {
        for (text, expected) in [
            ("POLYGON ((0 0, 0 1, 1 1, 1 0, 0 0))", true),
            ("POLYGON ((0 0, 0 1, 1 0, 1 1, 0 0))", false),
        ] {
            assert_eq!(Geometry::from_wkt(text).unwrap().is_valid().unwrap(), expected);
        }
    }

    #[test]
    fn test_predicate_error_is_not_false() {
        let nan = Geometry::point(f64::NAN, 1.0);
        let point = Geometry::point(0.0, 0.0);
        let error = nan.intersects(&point).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Engine);
        assert!(error.to_string().contains("non-finite"));
        assert!(crate::engine::last_error().is_some());
    }

    #[test]
    fn test_topological_equality() {
        let a = Geometry::from_wkt("LINESTRING (0 0, 10 0)").unwrap();
        let b = Geometry::from_wkt("LINESTRING (10 0, 5 0, 0 0)").unwrap();
        assert!(a.equals(&b).unwrap());
        assert!(!a.exact_eq(&b));
        assert!(a.covers(&b).unwrap());
        assert!(b.covered_by(&a).unwrap());
    }

    #[test]
    fn test_crossing_lines() {
        let a = Geometry::from_wkt("LINESTRING (0 0, 10 10)").unwrap();
        let b = Geometry::from_wkt("LINESTRING (0 10, 10 0)").unwrap();
        assert!(a.crosses(&b).unwrap());
        assert!(a.intersects(&b).unwrap());
        assert!(!a.disjoint(&b).unwrap());
        assert!(!a.touches(&b).unwrap());
        assert!(!a.within(&b).unwrap());
        assert!(!a.contains(&b).unwrap());
        assert!(!a.overlaps(&b).unwrap());
    }

    #[test]
    fn test_unary_predicates() {
        let ring = Geometry::from_wkt("LINESTRING (0 0, 1 0, 1 1, 0 0)").unwrap();
        assert!(ring.is_closed().unwrap());
        assert!(ring.is_ring().unwrap());
        assert!(ring.is_simple().unwrap());
        assert!(!ring.has_z().unwrap());
        assert!(!ring.is_empty().unwrap());
        assert_eq!(
            Geometry::point(0.0, 0.0).is_closed().unwrap_err().kind(),
            ErrorKind::Engine
        );
    }
}
