// src/binding/exports.rs

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::args::{self, Arguments};
use super::value::Value;
use crate::engine::{self, CAPI_VERSION, ENGINE_NAME, ENGINE_VERSION};
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{CapStyle, Geometry, JoinStyle};

/// Das geladene Modul: Exporttabelle, wie der Host sie sieht.
#[derive(Debug, Clone)]
pub struct Module {
    exports: BTreeMap<&'static str, Value>,
}

impl Module {
    /// Initialisiert die Engine (idempotent) und baut die Exporttabelle.
    pub fn load() -> GeometryResult<Self> {
        engine::initialize()?;

        let mut exports = BTreeMap::new();
        exports.insert("ENGINE_NAME", Value::from(ENGINE_NAME));
        exports.insert("ENGINE_VERSION", Value::from(ENGINE_VERSION));
        exports.insert("CAPI_VERSION", Value::from(CAPI_VERSION));

        for cap in [CapStyle::Round, CapStyle::Flat, CapStyle::Square] {
            exports.insert(cap.export_name(), Value::from(cap.code()));
        }
        for join in [JoinStyle::Round, JoinStyle::Mitre, JoinStyle::Bevel] {
            exports.insert(join.export_name(), Value::from(join.code()));
        }

        exports.insert("readWKT", Value::function(read_wkt));
        exports.insert("writeWKT", Value::function(write_wkt));
        exports.insert("createPoint", Value::function(create_point));
        exports.insert("createLineString", Value::function(create_line_string));
        exports.insert("createCollection", Value::function(create_collection));

        debug!(count = exports.len(), "module exports registered");
        Ok(Self { exports })
    }

    pub fn get(&self, name: &str) -> GeometryResult<&Value> {
        self.exports
            .get(name)
            .ok_or_else(|| GeometryError::UnknownExport {
                name: name.to_string(),
            })
    }

    /// Ruft eine exportierte Funktion auf.
    pub fn call(&self, name: &str, arguments: &[Value]) -> GeometryResult<Value> {
        let f = self
            .get(name)?
            .as_function()
            .ok_or_else(|| GeometryError::invalid_type(name, "function"))?;
        (**f)(arguments)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.exports.keys().copied()
    }
}

/// `readWKT(wkt)`
pub fn read_wkt(values: &[Value]) -> GeometryResult<Value> {
    let args = Arguments::new(values);
    let text = args.string(0, "WKT")?;
    Geometry::from_wkt(text).map(Value::from)
}

/// `writeWKT(geometry)`
pub fn write_wkt(values: &[Value]) -> GeometryResult<Value> {
    let args = Arguments::new(values);
    let geometry = args.geometry(0, "Geometry")?;
    geometry.to_wkt().map(Value::from)
}

/// `createPoint(x, y)`
pub fn create_point(values: &[Value]) -> GeometryResult<Value> {
    let args = Arguments::new(values);
    args.require(&["x", "y"])?;
    let x = args.number(0, "x")?;
    let y = args.number(1, "y")?;
    Ok(Value::from(Geometry::point(x, y)))
}

/// `createLineString([Point])`
pub fn create_line_string(values: &[Value]) -> GeometryResult<Value> {
    let args = Arguments::new(values);
    let items = args.array(0, "[Point]")?;
    let points = args::geometries(items, "[Point]")?;
    Geometry::line_string(&points).map(Value::from)
}

/// `createCollection([Geometry])`
pub fn create_collection(values: &[Value]) -> GeometryResult<Value> {
    let args = Arguments::new(values);
    let items = args.array(0, "[Geometry]")?;
    let members = args::geometries(items, "[Geometry]")?;
    Geometry::collection(&members).map(Value::from)
}

impl CapStyle {
    fn export_name(self) -> &'static str {
        match self {
            CapStyle::Round => "CAP_ROUND",
            CapStyle::Flat => "CAP_FLAT",
            CapStyle::Square => "CAP_SQUARE",
        }
    }
}

impl JoinStyle {
    fn export_name(self) -> &'static str {
        match self {
            JoinStyle::Round => "JOIN_ROUND",
            JoinStyle::Mitre => "JOIN_MITRE",
            JoinStyle::Bevel => "JOIN_BEVEL",
        }
    }
}

/// Bequemer Zugriff auf eine Geometrie im Rückgabewert.
pub fn expect_geometry(value: Value) -> GeometryResult<Arc<Geometry>> {
    match value {
        Value::Geometry(geometry) => Ok(geometry),
        other => Err(GeometryError::invalid_type(
            "result",
            format!("Geometry, got {}", other.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const WKT: [(&str, &str); 8] = [
        ("POINT (10 10)", "Point"),
        ("LINESTRING (10 10, 20 20, 30 40)", "LineString"),
        ("POLYGON ((10 10, 10 20, 20 20, 20 15, 10 10))", "Polygon"),
        (
            "POLYGON ((0 0, 0 20, 20 20, 20 0, 0 0), (5 5, 5 15, 15 15, 15 5, 5 5))",
            "Polygon",
        ),
        ("MULTIPOINT (0 0, 20 20, 60 60)", "MultiPoint"),
        (
            "MULTILINESTRING ((10 10, 20 20, 30 40), (15 15, 25 25, 35 45))",
            "MultiLineString",
        ),
        (
            "MULTIPOLYGON (((0 0, 0 20, 20 20, 20 0, 0 0), (5 5, 5 15, 15 15, 15 5, 5 5)), ((30 30, 30 40, 40 40, 40 30, 30 30)))",
            "MultiPolygon",
        ),
        (
            "GEOMETRYCOLLECTION (POINT (10 10), LINESTRING (10 10, 20 20, 30 40))",
            "GeometryCollection",
        ),
    ];

    fn module() -> Module {
        Module::load().unwrap()
    }

    #[test]
    fn test_exports_have_expected_shapes() {
        let module = module();
        for name in ["ENGINE_NAME", "ENGINE_VERSION", "CAPI_VERSION"] {
            assert!(module.get(name).unwrap().as_str().is_some(), "{name}");
        }
        for name in [
            "CAP_ROUND",
            "CAP_FLAT",
            "CAP_SQUARE",
            "JOIN_ROUND",
            "JOIN_MITRE",
            "JOIN_BEVEL",
        ] {
            let code = module.get(name).unwrap().as_number().unwrap();
            assert_eq!(code.fract(), 0.0, "{name}");
        }
        for name in [
            "readWKT",
            "writeWKT",
            "createLineString",
            "createPoint",
            "createCollection",
        ] {
            assert!(module.get(name).unwrap().as_function().is_some(), "{name}");
        }
        assert_eq!(
            module.get("GEOS_VERSION").unwrap_err().kind(),
            ErrorKind::UnknownExport
        );
    }

    #[test]
    fn test_read_wkt_any_kind() {
        let module = module();
        for (text, kind) in WKT {
            let geometry = expect_geometry(module.call("readWKT", &[text.into()]).unwrap()).unwrap();
            assert_eq!(geometry.type_name(), kind);
            let written = module.call("writeWKT", &[geometry.into()]).unwrap();
            assert!(written.as_str().is_some());
        }
    }

    #[test]
    fn test_read_wkt_errors() {
        let module = module();
        assert_eq!(
            module.call("readWKT", &[]).unwrap_err().to_string(),
            "Missing argument: WKT"
        );
        assert_eq!(
            module.call("readWKT", &[42.0.into()]).unwrap_err().kind(),
            ErrorKind::InvalidArgumentType
        );
        let error = module.call("readWKT", &["GARBAGE".into()]).unwrap_err();
        assert!(error.to_string().contains("ParseException: Unknown type: 'GARBAGE'"));
    }

    #[test]
    fn test_write_wkt_errors() {
        let module = module();
        assert_eq!(
            module.call("writeWKT", &[]).unwrap_err().to_string(),
            "Missing argument: Geometry"
        );
        assert_eq!(
            module.call("writeWKT", &[42.0.into()]).unwrap_err().kind(),
            ErrorKind::InvalidArgumentType
        );
    }

    #[test]
    fn test_create_point_and_line_string() {
        let module = module();
        assert_eq!(
            module.call("createPoint", &[1.0.into()]).unwrap_err().to_string(),
            "Missing argument: x, y"
        );
        assert_eq!(
            module
                .call("createPoint", &["1".into(), 2.0.into()])
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArgumentType
        );

        let a = module.call("createPoint", &[0.0.into(), 0.0.into()]).unwrap();
        let b = module.call("createPoint", &[10.0.into(), 10.0.into()]).unwrap();
        let c = module.call("createPoint", &[15.0.into(), 10.0.into()]).unwrap();
        let line = expect_geometry(
            module
                .call("createLineString", &[vec![a.clone(), b, c].into()])
                .unwrap(),
        )
        .unwrap();
        assert_eq!(line.type_name(), "LineString");
        assert_eq!(line.num_points().unwrap(), 3);

        assert_eq!(
            module.call("createLineString", &[]).unwrap_err().to_string(),
            "Missing argument: [Point]"
        );
        assert_eq!(
            module
                .call("createLineString", &[Vec::new().into()])
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            module
                .call("createLineString", &[vec![a.clone()].into()])
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            module
                .call("createLineString", &[vec![a, line.into()].into()])
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArgumentType
        );
    }

    #[test]
    fn test_create_collection_validates_before_cloning() {
        let module = module();
        let before = engine::handle_balance();
        let a = module.call("createPoint", &[5.0.into(), 5.0.into()]).unwrap();
        let error = module
            .call("createCollection", &[vec![a.clone(), 42.0.into()].into()])
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgumentType);
        assert_eq!(engine::handle_balance(), before + 1);

        let b = module.call("createPoint", &[10.0.into(), 10.0.into()]).unwrap();
        let collection =
            expect_geometry(module.call("createCollection", &[vec![a, b].into()]).unwrap()).unwrap();
        assert_eq!(collection.type_name(), "GeometryCollection");
        assert_eq!(collection.num_geometries(), 2);
    }
}
