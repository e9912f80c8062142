// src/debug/svg.rs

// Debug-Ausgabe: zeichnet Geometrien in eine SVG-Datei.
// Y zeigt in SVG nach unten, daher wird beim Zeichnen gespiegelt.

use geo::{BoundingRect, Geometry as GeoGeometry, LineString, Polygon, Rect};
use std::path::Path as FsPath;
use svg::{Document, Node};
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Path, Rectangle, Style};
use tracing::info;

use crate::geometry::Geometry;

/// Einstellungen der SVG-Ausgabe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgOptions {
    /// Breite und Höhe in Pixeln.
    pub pixel_size: f64,
    /// Rand um die Bounding Box, relativ zu ihrer Ausdehnung.
    pub margin: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            pixel_size: 512.0,
            margin: 0.05,
        }
    }
}

// ===================================================================================
// Hilfs-Struct für die SVG-Erstellung
// ===================================================================================
struct SvgBuilder {
    layer: Group,
    stroke_w_normal: f64,
    point_radius: f64,
}

impl SvgBuilder {
    fn new(view: &Rect<f64>) -> Self {
        let extent = (view.width() + view.height()) / 2.0;
        Self {
            layer: Group::new(),
            stroke_w_normal: extent * 0.005,
            point_radius: extent * 0.008,
        }
    }

    fn ring_data(data: Data, ring: &LineString<f64>) -> Data {
        let mut data = data;
        for (index, coord) in ring.0.iter().enumerate() {
            let position = (coord.x as f32, -coord.y as f32);
            data = if index == 0 {
                data.move_to(position)
            } else {
                data.line_to(position)
            };
        }
        data.close()
    }

    fn draw_polygon(&mut self, polygon: &Polygon<f64>) {
        if polygon.exterior().0.is_empty() {
            return;
        }
        let mut data = Self::ring_data(Data::new(), polygon.exterior());
        for hole in polygon.interiors() {
            data = Self::ring_data(data, hole);
        }
        let path = Path::new()
            .set("class", "polygon")
            .set("fill-rule", "evenodd")
            .set("stroke-width", self.stroke_w_normal)
            .set("d", data);
        self.layer.append(path);
    }

    fn draw_line(&mut self, line: &LineString<f64>) {
        if line.0.len() < 2 {
            return;
        }
        let mut data = Data::new();
        for (index, coord) in line.0.iter().enumerate() {
            let position = (coord.x as f32, -coord.y as f32);
            data = if index == 0 {
                data.move_to(position)
            } else {
                data.line_to(position)
            };
        }
        let path = Path::new()
            .set("class", "line")
            .set("stroke-width", self.stroke_w_normal)
            .set("d", data);
        self.layer.append(path);
    }

    fn draw_point(&mut self, x: f64, y: f64) {
        let circle = Circle::new()
            .set("class", "point")
            .set("cx", x)
            .set("cy", -y)
            .set("r", self.point_radius);
        self.layer.append(circle);
    }

    fn draw(&mut self, geometry: &GeoGeometry<f64>) {
        match geometry {
            GeoGeometry::Point(point) => self.draw_point(point.x(), point.y()),
            GeoGeometry::Line(line) => self.draw_line(&LineString::from(vec![line.start, line.end])),
            GeoGeometry::LineString(line) => self.draw_line(line),
            GeoGeometry::Polygon(polygon) => self.draw_polygon(polygon),
            GeoGeometry::MultiPoint(points) => {
                for point in points {
                    self.draw_point(point.x(), point.y());
                }
            }
            GeoGeometry::MultiLineString(lines) => {
                for line in lines {
                    self.draw_line(line);
                }
            }
            GeoGeometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    self.draw_polygon(polygon);
                }
            }
            GeoGeometry::GeometryCollection(members) => {
                for member in members {
                    self.draw(member);
                }
            }
            GeoGeometry::Rect(rect) => self.draw_polygon(&rect.to_polygon()),
            GeoGeometry::Triangle(triangle) => self.draw_polygon(&triangle.to_polygon()),
        }
    }
}

/// Kleinste Bounding Box über alle Geometrien.
fn calculate_bounds(geometries: &[GeoGeometry<f64>]) -> Option<Rect<f64>> {
    geometries
        .iter()
        .filter_map(|geometry| geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

/// Zeichnet alle Geometrien in ein SVG-Dokument, skaliert auf ihre Bounding Box.
pub fn render(geometries: &[&Geometry], options: &SvgOptions) -> Document {
    let shapes: Vec<GeoGeometry<f64>> = geometries.iter().map(|g| g.to_geo()).collect();
    let bounds = calculate_bounds(&shapes)
        .unwrap_or_else(|| Rect::new(geo::coord! { x: 0.0, y: 0.0 }, geo::coord! { x: 1.0, y: 1.0 }));

    // Ausgeartete Boxen (Punkt, horizontale Linie) bekommen eine Mindestausdehnung.
    let width = bounds.width().max(1e-9);
    let height = bounds.height().max(1e-9);
    let pad = width.max(height) * options.margin;
    let view = Rect::new(
        geo::coord! { x: bounds.min().x - pad, y: bounds.min().y - pad },
        geo::coord! { x: bounds.min().x + width + pad, y: bounds.min().y + height + pad },
    );

    let mut builder = SvgBuilder::new(&view);
    for shape in &shapes {
        builder.draw(shape);
    }

    let min_x = view.min().x;
    let min_y = -view.max().y;
    let style = Style::new(
        ".polygon { fill: rgba(200, 150, 255, 0.6); stroke: #5500aa; }
.line { fill: none; stroke: #0000cc; }
.point { fill: #cc0000; }
.background { fill: #f0f0f0; }",
    );
    let background = Rectangle::new()
        .set("class", "background")
        .set("x", min_x)
        .set("y", min_y)
        .set("width", view.width())
        .set("height", view.height());

    Document::new()
        .set("width", options.pixel_size)
        .set("height", options.pixel_size)
        .set(
            "viewBox",
            format!("{} {} {} {}", min_x, min_y, view.width(), view.height()),
        )
        .add(style)
        .add(background)
        .add(builder.layer)
}

/// Schreibt `render(...)` nach `path`.
pub fn save(
    path: impl AsRef<FsPath>,
    geometries: &[&Geometry],
    options: &SvgOptions,
) -> std::io::Result<()> {
    let document = render(geometries, options);
    svg::save(path.as_ref(), &document)?;
    info!("Debug SVG '{}' wurde erstellt.", path.as_ref().display());
    Ok(())
}
