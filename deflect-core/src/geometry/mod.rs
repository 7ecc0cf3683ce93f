//! Control surface geometry

pub mod chord;

pub use chord::{travel, DEFAULT_CHORD_MM};
