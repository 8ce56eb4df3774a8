//! Report rendering: graph summaries, detail views and the render export.

pub mod cards;
pub mod export;
pub mod generator;

pub use generator::*;
