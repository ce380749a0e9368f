//! Moteur de tramage probabiliste à balayage serpentin.
//!
//! Each interior pixel draws a stochastic index between its upper neighbour
//! and the neighbour visited just before it, then applies the [`Mode`]
//! policy. Row 0 and the two border columns are never visited.

use pd_core::config::Mode;
use pd_core::error::PdError;
use pd_core::grid::{HalftoneGrid, IntensityGrid};

use crate::pascal::{CumulativeTable, rows_for};
use crate::sampling::{RandomSampleGrid, stochastic_index};

/// One visited pixel and the direction of its row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanStep {
    pub y: u32,
    pub x: u32,
    /// `+1` left→right (even rows), `-1` right→left (odd rows).
    pub direction: i32,
}

impl ScanStep {
    /// Column of the neighbour visited just before this pixel.
    #[inline(always)]
    #[must_use]
    pub fn behind(&self) -> u32 {
        if self.direction > 0 {
            self.x - 1
        } else {
            self.x + 1
        }
    }
}

/// Serpentine visiting order over the interior of a `height × width` grid.
///
/// # Example
/// ```
/// use pd_dither::engine::serpentine;
/// let xs: Vec<(u32, u32)> = serpentine(3, 4).map(|s| (s.y, s.x)).collect();
/// assert_eq!(xs, vec![(1, 2), (1, 1), (2, 1), (2, 2)]);
/// ```
pub fn serpentine(height: u32, width: u32) -> impl Iterator<Item = ScanStep> {
    let interior = width.saturating_sub(2);
    (1..height).flat_map(move |y| {
        let direction = if y % 2 == 0 { 1 } else { -1 };
        (1..=interior).map(move |i| ScanStep {
            y,
            x: if direction > 0 { i } else { width - 1 - i },
            direction,
        })
    })
}

/// Counters collected during one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Interior pixels visited.
    pub visited: usize,
    /// Pixels whose neighbours differed, each consuming one sample.
    pub samples_consumed: usize,
    /// Pixels set to 255 in `Dithered` mode.
    pub marks: usize,
}

/// Run one pass and return the halftone grid.
///
/// `grid` is used as scratch state: `Dithered` and `SmoothedWithFeedback`
/// leave residuals in it, `SmoothedWithoutFeedback` leaves it untouched.
///
/// # Errors
/// - [`PdError::InvalidParameter`] for a negative threshold, an empty grid,
///   a sample grid of a different size, or a table too short for
///   `threshold` and `mode` (see [`rows_for`]).
/// - [`PdError::Processing`] if a neighbour difference has no table row or a
///   value leaves its storage range.
///
/// # Example
/// ```
/// use pd_core::config::Mode;
/// use pd_core::grid::IntensityGrid;
/// use pd_dither::engine::dither;
/// use pd_dither::pascal::build_table;
/// use pd_dither::sampling::{RandomSampleGrid, SeededSampler};
///
/// let table = build_table(255).unwrap();
/// let mut grid = IntensityGrid::filled(4, 3, 128);
/// let samples = RandomSampleGrid::generate(3, 4, &mut SeededSampler::new(5));
/// let out = dither(&mut grid, &table, &samples, 255, Mode::SmoothedWithoutFeedback).unwrap();
/// assert_eq!(out.get(1, 1), 128);
/// ```
pub fn dither(
    grid: &mut IntensityGrid,
    table: &CumulativeTable,
    samples: &RandomSampleGrid,
    threshold: i32,
    mode: Mode,
) -> Result<HalftoneGrid, PdError> {
    dither_with_stats(grid, table, samples, threshold, mode).map(|(out, _)| out)
}

/// Same as [`dither`], also returning the pass counters.
///
/// # Errors
/// See [`dither`].
pub fn dither_with_stats(
    grid: &mut IntensityGrid,
    table: &CumulativeTable,
    samples: &RandomSampleGrid,
    threshold: i32,
    mode: Mode,
) -> Result<(HalftoneGrid, PassStats), PdError> {
    validate(grid, table, samples, threshold, mode)?;

    let mut out = HalftoneGrid::new(grid.width, grid.height);
    let mut stats = PassStats::default();

    for step in serpentine(grid.height, grid.width) {
        let ScanStep { y, x, .. } = step;
        let a = i32::from(grid.get(y - 1, x));
        let b = i32::from(grid.get(y, step.behind()));
        if a != b {
            stats.samples_consumed += 1;
        }
        let index = stochastic_index(a, b, table, samples.get(y, x))?;
        let current = i32::from(grid.get(y, x));

        match mode {
            Mode::Dithered => {
                let sum = current + index;
                if sum > threshold {
                    out.set(y, x, u8::MAX);
                    grid.set(y, x, to_sample(sum - 255, step)?);
                    stats.marks += 1;
                } else {
                    grid.set(y, x, to_sample(sum, step)?);
                }
            }
            Mode::SmoothedWithFeedback => {
                let index = index.max(0);
                out.set(y, x, to_output(index, step)?);
                grid.set(y, x, to_sample(current - index, step)?);
            }
            Mode::SmoothedWithoutFeedback => {
                out.set(y, x, to_output(index, step)?);
            }
        }
        stats.visited += 1;
    }

    log::debug!(
        "Passe {mode:?} {}×{} : {} pixels, {} tirages, {} points",
        grid.width,
        grid.height,
        stats.visited,
        stats.samples_consumed,
        stats.marks
    );
    Ok((out, stats))
}

fn validate(
    grid: &IntensityGrid,
    table: &CumulativeTable,
    samples: &RandomSampleGrid,
    threshold: i32,
    mode: Mode,
) -> Result<(), PdError> {
    let Ok(t) = u32::try_from(threshold) else {
        return Err(PdError::invalid(format!("seuil négatif : {threshold}")));
    };
    let needed = rows_for(t, mode);
    if table.len() < needed {
        return Err(PdError::invalid(format!(
            "table de {} lignes, {needed} requises pour {mode:?} au seuil {threshold}",
            table.len()
        )));
    }
    if grid.is_empty() {
        return Err(PdError::invalid(format!(
            "image vide ({}×{})",
            grid.width, grid.height
        )));
    }
    if samples.width() != grid.width || samples.height() != grid.height {
        return Err(PdError::invalid(format!(
            "échantillons {}×{} pour une image {}×{}",
            samples.width(),
            samples.height(),
            grid.width,
            grid.height
        )));
    }
    Ok(())
}

#[inline(always)]
fn to_sample(v: i32, at: ScanStep) -> Result<i16, PdError> {
    i16::try_from(v).map_err(|_| {
        PdError::processing(format!("résidu {v} hors plage en ({}, {})", at.y, at.x))
    })
}

#[inline(always)]
fn to_output(v: i32, at: ScanStep) -> Result<u8, PdError> {
    u8::try_from(v).map_err(|_| {
        PdError::processing(format!("sortie {v} hors plage en ({}, {})", at.y, at.x))
    })
}
