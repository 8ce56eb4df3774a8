//! Analysis modules.
//!
//! The filter/aggregation pipeline and the visual encoding derived from its
//! output.

pub mod aggregator;
pub mod encoding;

pub use aggregator::*;
