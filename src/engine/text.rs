// src/engine/text.rs

// WKT-Leser und -Schreiber der Engine. Gelesen wird über das `wkt`-Crate,
// geschrieben im kompakten Format "POINT (10 10)", "MULTIPOINT ((0 0), (1 1))".

use geo::{Coord, Geometry as GeoGeometry, Polygon};
use std::fmt::Write as _;
use std::str::FromStr;
use wkt::Wkt;
use wkt::types::Dimension;

use super::native::{CoordSeq, NativeGeometry, NativeRef};
use super::{EngineFault, EngineOutcome};
use crate::geometry::GeometryKind;

const RING_KEYWORD: &str = "LINEARRING";

const KNOWN_TYPES: [&str; 8] = [
    "POINT",
    "LINESTRING",
    "LINEARRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

fn parse_fault(detail: impl std::fmt::Display) -> EngineFault {
    EngineFault::new(format!("ParseException: {detail}"))
}

/// Liest WKT in Engine-Geometrien. `LINEARRING` auf oberster Ebene wird
/// als Ring erkannt; `wkt` selbst kennt das Schlüsselwort nicht.
#[derive(Debug, Default)]
pub struct TextReader {
    parsed: u64,
}

impl TextReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parsed(&self) -> u64 {
        self.parsed
    }

    pub fn read(&mut self, text: &str) -> EngineOutcome<NativeGeometry> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(parse_fault("Expected word but encountered end of stream"));
        }

        let word: String = trimmed
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect();
        if !KNOWN_TYPES.iter().any(|known| known.eq_ignore_ascii_case(&word)) {
            return Err(parse_fault(format!("Unknown type: '{}'", word.to_ascii_uppercase())));
        }

        let native = match strip_keyword(trimmed, RING_KEYWORD) {
            Some(rest) => read_ring(rest)?,
            None => NativeGeometry::from_geo(parse(trimmed)?),
        };
        self.parsed += 1;
        Ok(native)
    }
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &text[keyword.len()..])
}

fn read_ring(body: &str) -> EngineOutcome<NativeGeometry> {
    match parse(&format!("LINESTRING{body}"))? {
        GeoGeometry::LineString(line) => NativeGeometry::linear_ring(CoordSeq::from_coords(line.0)),
        other => Err(parse_fault(format!(
            "Expected LINEARRING coordinates, got {}",
            GeometryKind::of_geo(&other)
        ))),
    }
}

/// WKT über `wkt::Wkt` lesen, damit Dimension und leere Punkte sichtbar
/// bleiben, bevor nach `geo` konvertiert wird.
fn parse(text: &str) -> EngineOutcome<GeoGeometry<f64>> {
    let parsed = Wkt::<f64>::from_str(text).map_err(parse_fault)?;
    ensure_planar(&parsed)?;
    GeoGeometry::try_from(parsed).map_err(parse_fault)
}

// `geo` kennt weder Z/M noch leere Punkte; beides würde still verfälscht.
fn ensure_planar(parsed: &Wkt<f64>) -> EngineOutcome<()> {
    if parsed.dimension() != Dimension::XY {
        return Err(parse_fault(format!(
            "{:?} coordinates, 3D not supported",
            parsed.dimension()
        )));
    }
    match parsed {
        Wkt::Point(point) if point.coord().is_none() => {
            Err(parse_fault("POINT EMPTY not supported"))
        }
        Wkt::MultiPoint(points) if points.points().iter().any(|p| p.coord().is_none()) => {
            Err(parse_fault("POINT EMPTY not supported"))
        }
        Wkt::GeometryCollection(collection) => {
            collection.geometries().iter().try_for_each(ensure_planar)
        }
        _ => Ok(()),
    }
}

/// Schreibt Engine-Geometrien als WKT. Ohne Präzision wird jede Zahl in der
/// kürzesten Form ausgegeben, die beim Zurücklesen denselben Wert ergibt.
#[derive(Debug, Default)]
pub struct TextWriter {
    precision: Option<usize>,
}

impl TextWriter {
    pub fn new(precision: Option<usize>) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    pub fn write(&self, native: &NativeGeometry) -> String {
        let mut out = String::new();
        self.write_ref(&mut out, native.view());
        out
    }

    fn write_ref(&self, out: &mut String, geometry: NativeRef<'_>) {
        match geometry {
            NativeRef::Point(point) => {
                out.push_str("POINT ");
                self.write_coords(out, &[point.0]);
            }
            NativeRef::LineString(line) => {
                out.push_str("LINESTRING ");
                self.write_coords(out, &line.0);
            }
            NativeRef::LinearRing(ring) => {
                out.push_str("LINEARRING ");
                self.write_coords(out, &ring.0);
            }
            NativeRef::Polygon(polygon) => {
                out.push_str("POLYGON ");
                self.write_polygon_body(out, polygon);
            }
            NativeRef::MultiPoint(points) => {
                out.push_str("MULTIPOINT ");
                self.write_list(out, &points.0, |writer, out, point| {
                    writer.write_coords(out, &[point.0]);
                });
            }
            NativeRef::MultiLineString(lines) => {
                out.push_str("MULTILINESTRING ");
                self.write_list(out, &lines.0, |writer, out, line| {
                    writer.write_coords(out, &line.0);
                });
            }
            NativeRef::MultiPolygon(polygons) => {
                out.push_str("MULTIPOLYGON ");
                self.write_list(out, &polygons.0, |writer, out, polygon| {
                    writer.write_polygon_body(out, polygon);
                });
            }
            NativeRef::GeometryCollection(members) => {
                out.push_str("GEOMETRYCOLLECTION ");
                self.write_list(out, &members.0, |writer, out, member| {
                    writer.write_ref(out, NativeRef::from_geo(member));
                });
            }
            NativeRef::Other(GeoGeometry::Line(line)) => {
                out.push_str("LINESTRING ");
                self.write_coords(out, &[line.start, line.end]);
            }
            NativeRef::Other(GeoGeometry::Rect(rect)) => {
                out.push_str("POLYGON ");
                self.write_polygon_body(out, &rect.to_polygon());
            }
            NativeRef::Other(GeoGeometry::Triangle(triangle)) => {
                out.push_str("POLYGON ");
                self.write_polygon_body(out, &triangle.to_polygon());
            }
            NativeRef::Other(other) => {
                self.write_ref(out, NativeRef::from_geo(other));
            }
        }
    }

    fn write_list<T>(
        &self,
        out: &mut String,
        items: &[T],
        mut item: impl FnMut(&Self, &mut String, &T),
    ) {
        if items.is_empty() {
            out.push_str("EMPTY");
            return;
        }
        out.push('(');
        for (i, value) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            item(self, out, value);
        }
        out.push(')');
    }

    fn write_polygon_body(&self, out: &mut String, polygon: &Polygon<f64>) {
        if polygon.exterior().0.is_empty() {
            out.push_str("EMPTY");
            return;
        }
        out.push('(');
        self.write_coords(out, &polygon.exterior().0);
        for hole in polygon.interiors() {
            out.push_str(", ");
            self.write_coords(out, &hole.0);
        }
        out.push(')');
    }

    fn write_coords(&self, out: &mut String, coords: &[Coord<f64>]) {
        if coords.is_empty() {
            out.push_str("EMPTY");
            return;
        }
        out.push('(');
        for (i, coord) in coords.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.number(coord.x));
            out.push(' ');
            out.push_str(&self.number(coord.y));
        }
        out.push(')');
    }

    fn number(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "Inf" } else { "-Inf" }.to_string();
        }
        match self.precision {
            None => format!("{value}"),
            Some(digits) => {
                let mut text = String::new();
                let _ = write!(text, "{value:.digits$}");
                if text.contains('.') {
                    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
                    text.truncate(trimmed.len());
                }
                if text == "-0" {
                    text.remove(0);
                }
                text
            }
        }
    }
}
