// src/geometry/mod.rs

// Die Geometrie als Wert: besitzt genau ein Engine-Handle und bietet die
// typisierte Oberfläche (Accessoren, Operationen, Prädikate, Konstruktoren).
pub mod accessors;
pub mod buffer;
pub mod constructors;
pub mod kind;
pub mod operations;
pub mod predicates;
pub mod value;

pub use self::buffer::{BufferStyle, CapStyle, JoinStyle};
pub use self::constructors::{read_wkt, write_wkt};
pub use self::kind::GeometryKind;
pub use self::value::Geometry;
