// src/geometry/value.rs

use geo::Geometry as GeoGeometry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::GeometryKind;
use crate::engine::{self, EngineOutcome, NativeGeometry, NativeHandle};
use crate::error::{GeometryError, GeometryResult};

/// Eine Geometrie, die genau eine Engine-Geometrie besitzt.
///
/// Das Handle wird beim Drop genau einmal freigegeben. Teile anderer
/// Geometrien (Mitglieder, Ringe, Punkte) werden immer geklont, bevor sie
/// in eine neue `Geometry` gewickelt werden.
pub struct Geometry {
    handle: NativeHandle,
}

impl Geometry {
    pub(crate) fn from_native(native: NativeGeometry) -> Self {
        Self {
            handle: NativeHandle::new(native),
        }
    }

    /// Übernimmt das Ergebnis eines Engine-Aufrufs; ein Fehlschlag ist ein Null-Handle.
    pub(crate) fn wrap(operation: &str, outcome: EngineOutcome<NativeGeometry>) -> GeometryResult<Self> {
        outcome
            .map(Self::from_native)
            .map_err(|fault| fault.into_invalid_handle(operation))
    }

    /// Wie `wrap`, aber das Ergebnis übernimmt die SRID von `self`.
    pub(crate) fn derive(
        &self,
        operation: &str,
        outcome: EngineOutcome<NativeGeometry>,
    ) -> GeometryResult<Self> {
        let srid = self.srid();
        Self::wrap(operation, outcome.map(|native| native.with_srid(srid)))
    }

    pub fn from_geo(geometry: impl Into<GeoGeometry<f64>>) -> Self {
        Self::from_native(NativeGeometry::from_geo(geometry.into()))
    }

    pub fn to_geo(&self) -> GeoGeometry<f64> {
        self.native().geometry().clone()
    }

    /// Geliehene Engine-Geometrie, gültig solange `self` lebt.
    pub(crate) fn native(&self) -> &NativeGeometry {
        self.handle.get()
    }

    pub fn srid(&self) -> i32 {
        self.native().srid()
    }

    /// Setzt die SRID. Der Wert wird nicht interpretiert; 0 heißt "nicht gesetzt".
    pub fn set_srid(&self, srid: i32) {
        self.native().set_srid(srid);
    }

    pub fn kind(&self) -> GeometryKind {
        self.native().kind()
    }

    /// Artbezeichnung, wie sie der Host sieht (`"Point"`, `"LineString"`, ...).
    pub fn type_name(&self) -> &'static str {
        self.kind().label()
    }

    /// Sind beide Geometrien Punkt für Punkt gleich (inklusive SRID und Art)?
    pub fn exact_eq(&self, other: &Geometry) -> bool {
        self.native() == other.native()
    }
}

impl Clone for Geometry {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.duplicate(),
        }
    }
}

impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.exact_eq(other)
    }
}

impl fmt::Debug for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("kind", &self.kind())
            .field("srid", &self.srid())
            .field("wkt", &self.to_string())
            .finish()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = engine::invoke("writeWKT", |session| Ok(session.writer.write(self.native())))
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Geometry {
    type Err = GeometryError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Geometry::from_wkt(text)
    }
}

impl From<GeoGeometry<f64>> for Geometry {
    fn from(geometry: GeoGeometry<f64>) -> Self {
        Geometry::from_geo(geometry)
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_wkt().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Geometry::from_wkt(&text).map_err(serde::de::Error::custom)
    }
}
