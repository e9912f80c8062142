// src/binding/mod.rs

// Host-Oberfläche: dynamische Werte, Argumentprüfung, Exporttabelle und die
// Methoden der Klasse `Geometry`.
pub mod args;
pub mod exports;
pub mod methods;
pub mod value;

pub use self::args::Arguments;
pub use self::exports::{Module, expect_geometry};
pub use self::methods::{METHODS, call_method};
pub use self::value::{HostFunction, Value};
