// src/binding/args.rs

// Prüft Host-Argumente Position für Position. Fehlt ein Argument, ist das
// `MissingArgument`; hat es die falsche Art, `InvalidArgumentType`.

use std::sync::Arc;

use super::value::{HostFunction, Value, to_int32};
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::Geometry;

#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Verlangt mindestens `names.len()` Argumente; die Meldung nennt alle Namen.
    pub fn require(&self, names: &[&str]) -> GeometryResult<()> {
        if self.values.len() < names.len() {
            return Err(GeometryError::missing(names.join(", ")));
        }
        Ok(())
    }

    fn present(&self, index: usize, name: &str) -> GeometryResult<&'a Value> {
        self.values
            .get(index)
            .ok_or_else(|| GeometryError::missing(name))
    }

    /// Optionale Argumente: fehlend und `undefined` sind gleichwertig.
    fn optional(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_undefined())
    }

    pub fn number(&self, index: usize, name: &str) -> GeometryResult<f64> {
        let value = self.present(index, name)?;
        value
            .as_number()
            .ok_or_else(|| GeometryError::invalid_type(name, "number"))
    }

    pub fn optional_number(&self, index: usize, name: &str) -> GeometryResult<Option<f64>> {
        match self.optional(index) {
            None => Ok(None),
            Some(value) => value
                .as_number()
                .map(Some)
                .ok_or_else(|| GeometryError::invalid_type(name, "number")),
        }
    }

    pub fn int32(&self, index: usize, name: &str) -> GeometryResult<i32> {
        self.number(index, name).map(to_int32)
    }

    pub fn optional_int32(&self, index: usize, name: &str) -> GeometryResult<Option<i32>> {
        Ok(self.optional_number(index, name)?.map(to_int32))
    }

    pub fn string(&self, index: usize, name: &str) -> GeometryResult<&'a str> {
        let value = self.present(index, name)?;
        value
            .as_str()
            .ok_or_else(|| GeometryError::invalid_type(name, "string"))
    }

    pub fn array(&self, index: usize, name: &str) -> GeometryResult<&'a [Value]> {
        let value = self.present(index, name)?;
        value
            .as_array()
            .ok_or_else(|| GeometryError::invalid_type(name, "array"))
    }

    pub fn function(&self, index: usize, name: &str) -> GeometryResult<&'a HostFunction> {
        let value = self.present(index, name)?;
        value
            .as_function()
            .ok_or_else(|| GeometryError::invalid_type(name, "function"))
    }

    /// Geometrie als Argument einer freien Funktion (falsche Art: `InvalidArgumentType`).
    pub fn geometry(&self, index: usize, name: &str) -> GeometryResult<&'a Arc<Geometry>> {
        let value = self.present(index, name)?;
        value
            .as_geometry()
            .ok_or_else(|| GeometryError::invalid_type(name, "Geometry"))
    }

    /// Zweiter Operand einer binären Operation (falsche Art: `InvalidArgument`).
    pub fn operand(&self, index: usize, name: &str) -> GeometryResult<&'a Arc<Geometry>> {
        let value = self.present(index, name)?;
        value.as_geometry().ok_or_else(|| {
            GeometryError::invalid(name, format!("expected Geometry, got {}", value.type_name()))
        })
    }
}

/// Alle Elemente eines Arrays als Geometrien, geprüft bevor irgendetwas gebaut wird.
pub fn geometries<'a>(items: &'a [Value], name: &str) -> GeometryResult<Vec<&'a Geometry>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_geometry().map(|geometry| &**geometry).ok_or_else(|| {
                GeometryError::invalid_type(
                    name,
                    format!("Geometry at index {index}, got {}", item.type_name()),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_missing_and_wrong_kind() {
        let values = [Value::from("POINT (0 0)")];
        let args = Arguments::new(&values);
        assert_eq!(args.string(0, "WKT").unwrap(), "POINT (0 0)");
        assert_eq!(
            args.number(0, "x").unwrap_err().kind(),
            ErrorKind::InvalidArgumentType
        );
        let error = args.number(1, "y").unwrap_err();
        assert_eq!(error.to_string(), "Missing argument: y");
    }

    #[test]
    fn test_require_lists_all_names() {
        let args = Arguments::new(&[]);
        assert_eq!(
            args.require(&["x", "y"]).unwrap_err().to_string(),
            "Missing argument: x, y"
        );
    }

    #[test]
    fn test_optional_treats_undefined_as_absent() {
        let values = [Value::from(1.0), Value::Undefined, Value::from(2.7)];
        let args = Arguments::new(&values);
        assert_eq!(args.optional_int32(1, "quadsegs").unwrap(), None);
        assert_eq!(args.optional_int32(2, "cap").unwrap(), Some(2));
        assert_eq!(args.optional_int32(5, "join").unwrap(), None);
    }

    #[test]
    fn test_operand_is_invalid_argument() {
        let values = [Value::from(42.0)];
        let args = Arguments::new(&values);
        assert_eq!(
            args.operand(0, "geometry").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            args.geometry(0, "Geometry").unwrap_err().kind(),
            ErrorKind::InvalidArgumentType
        );
    }

    #[test]
    fn test_geometries_rejects_foreign_element() {
        let items = [Value::from(Geometry::point(0.0, 0.0)), Value::Null];
        let error = geometries(&items, "[Geometry]").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgumentType);
        assert!(error.to_string().contains("index 1"));
    }
}
