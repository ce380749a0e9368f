//! Probabilistic halftoning engine for pcadither.
//!
//! [`pascal`] builds the cumulative distribution table, [`sampling`] turns
//! uniform samples into stochastic indices, and [`engine`] runs the
//! serpentine pass.

pub mod engine;
pub mod pascal;
pub mod sampling;

pub use engine::{PassStats, dither, dither_with_stats};
pub use pascal::{CumulativeTable, build_table, build_table_for};
pub use sampling::{RandomSampleGrid, ReplaySampler, SeededSampler};
