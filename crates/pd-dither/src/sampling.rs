//! Échantillons uniformes et tirage par CDF inverse.

use pd_core::error::PdError;
use pd_core::traits::SampleSource;
use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;

use crate::pascal::CumulativeTable;

/// Reproducible sample stream backed by `StdRng`.
///
/// # Example
/// ```
/// use pd_core::traits::SampleSource;
/// use pd_dither::sampling::SeededSampler;
///
/// let mut a = SeededSampler::new(7);
/// let mut b = SeededSampler::new(7);
/// assert_eq!(a.next_sample(), b.next_sample());
/// ```
pub struct SeededSampler {
    rng: StdRng,
    seed: u64,
}

impl SeededSampler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Fresh seed from the thread-local generator. The seed stays readable
    /// through [`SeededSampler::seed`] so a run can be replayed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SampleSource for SeededSampler {
    #[inline(always)]
    fn next_sample(&mut self) -> f64 {
        StandardUniform.sample(&mut self.rng)
    }
}

/// Replays a recorded sequence, wrapping around at the end.
///
/// # Example
/// ```
/// use pd_core::traits::SampleSource;
/// use pd_dither::sampling::ReplaySampler;
///
/// let mut s = ReplaySampler::new(vec![0.1, 0.9]).unwrap();
/// assert_eq!(s.next_sample(), 0.1);
/// assert_eq!(s.next_sample(), 0.9);
/// assert_eq!(s.next_sample(), 0.1);
/// ```
pub struct ReplaySampler {
    samples: Vec<f64>,
    cursor: usize,
}

impl ReplaySampler {
    /// # Errors
    /// Returns [`PdError::InvalidParameter`] if `samples` is empty or holds a
    /// value outside `[0, 1)`.
    pub fn new(samples: Vec<f64>) -> Result<Self, PdError> {
        if samples.is_empty() {
            return Err(PdError::invalid("séquence d'échantillons vide"));
        }
        check_unit_range(&samples)?;
        Ok(Self { samples, cursor: 0 })
    }
}

impl SampleSource for ReplaySampler {
    fn next_sample(&mut self) -> f64 {
        let v = self.samples[self.cursor];
        self.cursor = (self.cursor + 1) % self.samples.len();
        v
    }
}

/// One uniform sample per pixel, generated before the scan starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomSampleGrid {
    data: Vec<f64>,
    width: u32,
    height: u32,
}

impl RandomSampleGrid {
    /// Fill a `height × width` grid row-major from `source`.
    ///
    /// # Example
    /// ```
    /// use pd_dither::sampling::{RandomSampleGrid, SeededSampler};
    /// let grid = RandomSampleGrid::generate(3, 4, &mut SeededSampler::new(1));
    /// assert_eq!(grid.width(), 4);
    /// assert!((0.0..1.0).contains(&grid.get(2, 3)));
    /// ```
    pub fn generate(height: u32, width: u32, source: &mut impl SampleSource) -> Self {
        let len = width as usize * height as usize;
        let data = (0..len).map(|_| source.next_sample()).collect();
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap pre-recorded samples.
    ///
    /// # Errors
    /// Returns [`PdError::InvalidParameter`] on a length mismatch or a value
    /// outside `[0, 1)`.
    pub fn from_samples(height: u32, width: u32, data: Vec<f64>) -> Result<Self, PdError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(PdError::invalid(format!(
                "{} échantillons pour une grille {width}×{height} (attendu {expected})",
                data.len()
            )));
        }
        check_unit_range(&data)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, y: u32, x: u32) -> f64 {
        debug_assert!(x < self.width && y < self.height, "sample out of bounds");
        self.data[(y * self.width + x) as usize]
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}

fn check_unit_range(samples: &[f64]) -> Result<(), PdError> {
    match samples.iter().position(|v| !(0.0..1.0).contains(v)) {
        None => Ok(()),
        Some(i) => Err(PdError::invalid(format!(
            "échantillon {i} hors de [0, 1) : {}",
            samples[i]
        ))),
    }
}

/// First position whose cumulative value exceeds `u`, or the last position
/// when none does.
///
/// `cdf` must be non-decreasing and non-empty.
///
/// # Example
/// ```
/// use pd_dither::sampling::first_exceeding;
/// let cdf = [0.25, 0.75, 1.0];
/// assert_eq!(first_exceeding(&cdf, 0.0), 0);
/// assert_eq!(first_exceeding(&cdf, 0.25), 1);
/// assert_eq!(first_exceeding(&cdf, 0.9), 2);
/// assert_eq!(first_exceeding(&cdf, 1.0), 2);
/// ```
#[inline(always)]
#[must_use]
pub fn first_exceeding(cdf: &[f64], u: f64) -> usize {
    let k = cdf.partition_point(|&c| c <= u);
    k.min(cdf.len().saturating_sub(1))
}

/// Stochastic index for a pixel whose neighbours are `a` (above) and `b`
/// (previous in scan order).
///
/// Equal neighbours give `a` without looking at `u`. Otherwise the index is
/// `min(a, b)` plus a binomial draw over `|a - b|` steps.
///
/// # Errors
/// Returns [`PdError::Processing`] if `|a - b|` has no row in `table`.
///
/// # Example
/// ```
/// use pd_dither::pascal::build_table;
/// use pd_dither::sampling::stochastic_index;
///
/// let table = build_table(255).unwrap();
/// assert_eq!(stochastic_index(90, 90, &table, 0.99).unwrap(), 90);
/// assert_eq!(stochastic_index(10, 12, &table, 0.0).unwrap(), 10);
/// assert_eq!(stochastic_index(12, 10, &table, 0.5).unwrap(), 11);
/// ```
#[inline(always)]
pub fn stochastic_index(a: i32, b: i32, table: &CumulativeTable, u: f64) -> Result<i32, PdError> {
    if a == b {
        return Ok(a);
    }
    let diff = a.abs_diff(b) as usize;
    let cdf = table.row(diff).ok_or_else(|| {
        PdError::processing(format!(
            "écart {diff} hors table (max {})",
            table.max_difference()
        ))
    })?;
    Ok(first_exceeding(cdf, u) as i32 + a.min(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pascal::build_table;

    #[test]
    fn equal_neighbours_ignore_the_sample() {
        let table = build_table(255).unwrap();
        for i in 0..1000 {
            let u = f64::from(i) / 1000.0;
            assert_eq!(stochastic_index(42, 42, &table, u).unwrap(), 42);
            assert_eq!(stochastic_index(-5, -5, &table, u).unwrap(), -5);
        }
    }

    #[test]
    fn index_stays_between_the_neighbours() {
        let table = build_table(255).unwrap();
        let mut sampler = SeededSampler::new(3);
        for _ in 0..2000 {
            let u = sampler.next_sample();
            let idx = stochastic_index(200, 40, &table, u).unwrap();
            assert!((40..=200).contains(&idx), "index {idx}");
        }
    }

    #[test]
    fn lookup_is_symmetric_in_the_neighbours() {
        let table = build_table(255).unwrap();
        for u in [0.0, 0.1, 0.5, 0.77, 0.999_999] {
            assert_eq!(
                stochastic_index(7, 19, &table, u).unwrap(),
                stochastic_index(19, 7, &table, u).unwrap()
            );
        }
    }

    #[test]
    fn draws_follow_the_binomial_mean() {
        let table = build_table(255).unwrap();
        let mut sampler = SeededSampler::new(11);
        let n = 20_000;
        let total: i64 = (0..n)
            .map(|_| i64::from(stochastic_index(0, 100, &table, sampler.next_sample()).unwrap()))
            .sum();
        let mean = total as f64 / f64::from(n);
        assert!((mean - 50.0).abs() < 0.5, "moyenne {mean}");
    }

    #[test]
    fn sample_above_the_tail_falls_back_to_last_index() {
        let cdf = [0.2, 0.6, 0.999_999];
        assert_eq!(first_exceeding(&cdf, 0.999_999_5), 2);
    }

    #[test]
    fn difference_outside_the_table_is_a_processing_error() {
        let table = build_table(255).unwrap();
        let err = stochastic_index(-300, 255, &table, 0.5).unwrap_err();
        assert!(matches!(err, PdError::Processing(_)));
    }

    #[test]
    fn generate_consumes_one_sample_per_pixel() {
        let mut calls = 0;
        let mut counting = || {
            calls += 1;
            0.25
        };
        let grid = RandomSampleGrid::generate(3, 5, &mut counting);
        assert_eq!(calls, 15);
        assert_eq!(grid.get(2, 4), 0.25);
    }

    #[test]
    fn seeded_grids_are_reproducible() {
        let a = RandomSampleGrid::generate(8, 8, &mut SeededSampler::new(99));
        let b = RandomSampleGrid::generate(8, 8, &mut SeededSampler::new(99));
        let c = RandomSampleGrid::generate(8, 8, &mut SeededSampler::new(100));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn from_samples_validates_shape_and_range() {
        assert!(RandomSampleGrid::from_samples(2, 2, vec![0.5; 4]).is_ok());
        assert!(RandomSampleGrid::from_samples(2, 2, vec![0.5; 3]).is_err());
        assert!(RandomSampleGrid::from_samples(1, 2, vec![0.5, 1.0]).is_err());
        assert!(RandomSampleGrid::from_samples(1, 1, vec![-0.1]).is_err());
    }

    #[test]
    fn replay_rejects_empty_sequences() {
        assert!(ReplaySampler::new(Vec::new()).is_err());
    }
}
