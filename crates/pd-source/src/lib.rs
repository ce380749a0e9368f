//! Image I/O for pcadither: load any supported file as an intensity grid,
//! write halftone grids back to disk.

pub mod image;

pub use crate::image::{LoadedImage, load_intensity, save_halftone};
