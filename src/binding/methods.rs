// src/binding/methods.rs

// Methodentabelle der Host-Klasse `Geometry`. Jeder Eintrag prüft seine
// Argumente, ruft die typisierte API auf und verpackt das Ergebnis.

use std::sync::Arc;
use tracing::trace;

use super::args::Arguments;
use super::value::{HostFunction, Value};
use crate::engine::BinaryPredicate;
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{BufferStyle, CapStyle, Geometry, JoinStyle};

/// Alle Methodennamen, die `call_method` kennt.
pub const METHODS: &[&str] = &[
    "getSRID",
    "setSRID",
    "getType",
    "getNumPoints",
    "getPointN",
    "getStartPoint",
    "getEndPoint",
    "getX",
    "getY",
    "getZ",
    "getNumGeometries",
    "getGeometryN",
    "getExteriorRing",
    "getNumInteriorRings",
    "getInteriorRingN",
    "difference",
    "union",
    "intersection",
    "convexHull",
    "buffer",
    "asPolygon",
    "asBoundary",
    "asValid",
    "interpolate",
    "interpolateNormalized",
    "transform",
    "isValid",
    "isEmpty",
    "isSimple",
    "isRing",
    "hasZ",
    "isClosed",
    "disjoint",
    "touches",
    "intersects",
    "crosses",
    "within",
    "contains",
    "overlaps",
    "equals",
    "covers",
    "coveredBy",
];

/// Ruft die Methode `name` auf `this` auf.
pub fn call_method(this: &Arc<Geometry>, name: &str, values: &[Value]) -> GeometryResult<Value> {
    trace!(method = name, args = values.len(), "geometry method call");
    let args = Arguments::new(values);

    if let Some(predicate) = BinaryPredicate::from_method_name(name) {
        let other = args.operand(0, "Geometry")?;
        return this.relate(predicate, other).map(Value::from);
    }

    match name {
        "getSRID" => Ok(Value::from(this.srid())),
        "setSRID" => {
            let srid = args.int32(0, "SRID")?;
            this.set_srid(srid);
            Ok(Value::Undefined)
        }
        "getType" => Ok(Value::from(this.type_name())),

        "getNumPoints" => this.num_points().map(Value::from),
        "getPointN" => this.point_n(index(&args)?).map(Value::from),
        "getStartPoint" => this.start_point().map(Value::from),
        "getEndPoint" => this.end_point().map(Value::from),
        "getX" => this.x().map(Value::from),
        "getY" => this.y().map(Value::from),
        "getZ" => this.z().map(Value::from),
        "getNumGeometries" => Ok(Value::from(this.num_geometries())),
        "getGeometryN" => this.geometry_n(index(&args)?).map(Value::from),
        "getExteriorRing" => this.exterior_ring().map(Value::from),
        "getNumInteriorRings" => this.num_interior_rings().map(Value::from),
        "getInteriorRingN" => this.interior_ring_n(index(&args)?).map(Value::from),

        "difference" => this.difference(args.operand(0, "geometry")?).map(Value::from),
        "union" => this.union(args.operand(0, "geometry")?).map(Value::from),
        "intersection" => this
            .intersection(args.operand(0, "geometry")?)
            .map(Value::from),
        "convexHull" => this.convex_hull().map(Value::from),
        "buffer" => buffer(this, &args),
        "asPolygon" => this.as_polygon().map(Value::from),
        "asBoundary" => this.as_boundary().map(Value::from),
        "asValid" => this.as_valid().map(Value::from),
        "interpolate" => this.interpolate(args.number(0, "d")?).map(Value::from),
        "interpolateNormalized" => this
            .interpolate_normalized(args.number(0, "d")?)
            .map(Value::from),
        "transform" => {
            let f = args.function(0, "fn")?;
            this.try_transform(|x, y| call_mapping(f, x, y))
                .map(Value::from)
        }

        "isValid" => this.is_valid().map(Value::from),
        "isEmpty" => this.is_empty().map(Value::from),
        "isSimple" => this.is_simple().map(Value::from),
        "isRing" => this.is_ring().map(Value::from),
        "hasZ" => this.has_z().map(Value::from),
        "isClosed" => this.is_closed().map(Value::from),

        other => Err(GeometryError::UnknownExport {
            name: format!("Geometry.{other}"),
        }),
    }
}

fn index(args: &Arguments<'_>) -> GeometryResult<i64> {
    args.int32(0, "n").map(i64::from)
}

/// `buffer(width[, quadsegs[, cap[, join[, mitreLimit]]]])`.
fn buffer(this: &Geometry, args: &Arguments<'_>) -> GeometryResult<Value> {
    let width = args.number(0, "width")?;
    let style = buffer_style(args)?;
    this.buffer_with_style(width, &style).map(Value::from)
}

/// Fehlende Stil-Parameter sind die dokumentierten Konstanten
/// (16 Segmente, `CAP_ROUND`, `JOIN_ROUND`, Gehrungsgrenze 5),
/// unabhängig von der Engine-Konfiguration.
fn buffer_style(args: &Arguments<'_>) -> GeometryResult<BufferStyle> {
    let mut style = BufferStyle::default();
    if let Some(segments) = args.optional_int32(1, "quadsegs")? {
        let segments = u32::try_from(segments)
            .map_err(|_| GeometryError::invalid("quadsegs", format!("must be positive, got {segments}")))?;
        style = style.with_quadrant_segments(segments);
    }
    if let Some(code) = args.optional_int32(2, "cap")? {
        let cap = CapStyle::from_code(code)
            .ok_or_else(|| GeometryError::invalid("cap", format!("unknown cap style {code}")))?;
        style = style.with_cap(cap);
    }
    if let Some(code) = args.optional_int32(3, "join")? {
        let join = JoinStyle::from_code(code)
            .ok_or_else(|| GeometryError::invalid("join", format!("unknown join style {code}")))?;
        style = style.with_join(join);
    }
    if let Some(limit) = args.optional_number(4, "mitreLimit")? {
        style = style.with_mitre_limit(limit);
    }
    Ok(style)
}

/// Ruft die Host-Abbildung mit `(x, y)` auf; erwartet `[x', y']` zurück.
fn call_mapping(f: &HostFunction, x: f64, y: f64) -> GeometryResult<(f64, f64)> {
    let result = (**f)(&[Value::from(x), Value::from(y)])?;
    match result.as_array() {
        Some([Value::Number(mapped_x), Value::Number(mapped_y), ..]) => Ok((*mapped_x, *mapped_y)),
        _ => Err(GeometryError::invalid_type(
            "fn",
            format!("function returning [x, y], got {}", result.type_name()),
        )),
    }
}
