// src/debug/mod.rs
pub mod svg;

pub use self::svg::{SvgOptions, render, save};
