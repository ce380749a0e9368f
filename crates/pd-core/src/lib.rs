//! Shared types, configuration and errors for pcadither.
//!
//! Every other crate of the workspace builds on the grids, the [`Mode`]
//! selector and the [`PdError`] taxonomy defined here.

pub mod config;
pub mod error;
pub mod grid;
pub mod traits;

pub use config::{Mode, PdConfig};
pub use error::PdError;
pub use grid::{HalftoneGrid, IntensityGrid};
pub use traits::SampleSource;
