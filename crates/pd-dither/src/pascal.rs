//! Table de distributions cumulées issue du triangle de Pascal.
//!
//! Row `r` of the table is the CDF of a binomial(r, 1/2) variable: row `r` of
//! Pascal's Triangle divided by `2^r`, then summed left to right. The engine
//! indexes it by the absolute difference between two neighbouring samples.

use std::fmt::Write as _;

use pd_core::config::Mode;
use pd_core::error::PdError;

/// Rows covering every difference between two residuals in `[-255, 255]`.
pub const FULL_RANGE_ROWS: usize = 511;

/// Number of rows needed for `threshold`.
///
/// Large enough to cover every difference between two 8-bit samples for
/// any threshold in `[0, 510]`.
///
/// # Example
/// ```
/// use pd_dither::pascal::table_size;
/// assert_eq!(table_size(255), 256);
/// assert_eq!(table_size(0), 511);
/// assert_eq!(table_size(510), 511);
/// ```
#[must_use]
pub fn table_size(threshold: u32) -> usize {
    let t = threshold as usize + 1;
    t.max(512 - t.min(512))
}

/// Number of rows needed to run `mode` at `threshold`.
///
/// `SmoothedWithFeedback` leaves residuals down to `-255` next to neighbours
/// up to `255`, so it always needs the full range.
///
/// # Example
/// ```
/// use pd_core::config::Mode;
/// use pd_dither::pascal::rows_for;
/// assert_eq!(rows_for(255, Mode::Dithered), 256);
/// assert_eq!(rows_for(255, Mode::SmoothedWithFeedback), 511);
/// ```
#[must_use]
pub fn rows_for(threshold: u32, mode: Mode) -> usize {
    match mode {
        Mode::SmoothedWithFeedback => table_size(threshold).max(FULL_RANGE_ROWS),
        Mode::Dithered | Mode::SmoothedWithoutFeedback => table_size(threshold),
    }
}

/// First `n` rows of Pascal's Triangle, each divided by `2^row`.
///
/// Built directly in normalised form with `p[i][j] = (p[i-1][j-1] + p[i-1][j]) / 2`.
/// Raw coefficients reach `2^510` near the bottom of the table, beyond any
/// fixed-width integer; halving is exact in binary floating point, so the
/// edges stay exactly `0.5^i`.
///
/// # Example
/// ```
/// use pd_dither::pascal::normalized_rows;
/// let rows = normalized_rows(3);
/// assert_eq!(rows[2], vec![0.25, 0.5, 0.25]);
/// ```
#[must_use]
pub fn normalized_rows(n: usize) -> Vec<Vec<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(n);
    for i in 0..n {
        let row = match rows.last() {
            None => vec![1.0],
            Some(prev) => {
                let mut row = Vec::with_capacity(i + 1);
                row.push(prev[0] * 0.5);
                for pair in prev.windows(2) {
                    row.push((pair[0] + pair[1]) * 0.5);
                }
                row.push(prev[i - 1] * 0.5);
                row
            }
        };
        rows.push(row);
    }
    rows
}

/// Running sum of each row, left to right.
///
/// # Example
/// ```
/// use pd_dither::pascal::{cumulative_rows, normalized_rows};
/// let rows = cumulative_rows(normalized_rows(3));
/// assert_eq!(rows[2], vec![0.25, 0.75, 1.0]);
/// ```
#[must_use]
pub fn cumulative_rows(mut rows: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    for row in &mut rows {
        let mut acc = 0.0;
        for v in row.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
    rows
}

/// Immutable CDF table, built once per threshold and shared by reference
/// between passes.
#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeTable {
    threshold: i32,
    rows: Vec<Vec<f64>>,
}

/// Build the CDF table for `threshold`.
///
/// # Errors
/// Returns [`PdError::InvalidParameter`] if `threshold` is negative.
///
/// # Example
/// ```
/// use pd_dither::pascal::build_table;
/// let table = build_table(255).unwrap();
/// assert_eq!(table.len(), 256);
/// assert_eq!(table.row(1).unwrap(), &[0.5, 1.0]);
/// ```
pub fn build_table(threshold: i32) -> Result<CumulativeTable, PdError> {
    let t = checked_threshold(threshold)?;
    Ok(build_rows(threshold, table_size(t)))
}

/// Build the table `mode` needs at `threshold`, see [`rows_for`].
///
/// # Errors
/// Returns [`PdError::InvalidParameter`] if `threshold` is negative.
///
/// # Example
/// ```
/// use pd_core::config::Mode;
/// use pd_dither::pascal::build_table_for;
/// let table = build_table_for(255, Mode::SmoothedWithFeedback).unwrap();
/// assert_eq!(table.threshold(), 255);
/// assert_eq!(table.max_difference(), 510);
/// ```
pub fn build_table_for(threshold: i32, mode: Mode) -> Result<CumulativeTable, PdError> {
    let t = checked_threshold(threshold)?;
    Ok(build_rows(threshold, rows_for(t, mode)))
}

fn checked_threshold(threshold: i32) -> Result<u32, PdError> {
    u32::try_from(threshold).map_err(|_| PdError::invalid(format!("seuil négatif : {threshold}")))
}

fn build_rows(threshold: i32, n: usize) -> CumulativeTable {
    let rows = cumulative_rows(normalized_rows(n));
    log::debug!("Table de Pascal : {n} lignes pour le seuil {threshold}");
    CumulativeTable { threshold, rows }
}

impl CumulativeTable {
    /// CDF row for a given neighbour difference, `diff + 1` entries long.
    #[inline(always)]
    #[must_use]
    pub fn row(&self, diff: usize) -> Option<&[f64]> {
        self.rows.get(diff).map(Vec::as_slice)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Threshold the table was built for.
    #[must_use]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Largest neighbour difference the table can answer.
    #[must_use]
    pub fn max_difference(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Render the first `rows` rows, five decimals per entry.
    ///
    /// Lines are centred on the width of the last rendered row written at
    /// full precision (`{:?}`), so wide rows overflow it and start at column 0.
    ///
    /// # Example
    /// ```
    /// use pd_dither::pascal::build_table;
    /// let text = build_table(255).unwrap().render(3);
    /// assert_eq!(text, "   1.00000\n0.50000 1.00000\n0.25000 0.75000 1.00000\n");
    /// ```
    #[must_use]
    pub fn render(&self, rows: usize) -> String {
        let shown = &self.rows[..rows.min(self.rows.len())];
        let width = shown.last().map_or(0, |row| {
            row.iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join(" ")
                .len()
        });

        let mut out = String::new();
        for row in shown {
            let line = row
                .iter()
                .map(|v| format!("{v:.5}"))
                .collect::<Vec<_>>()
                .join(" ");
            let margin = width.saturating_sub(line.len());
            let left = margin / 2 + (margin & width & 1);
            let _ = writeln!(out, "{:left$}{line}", "");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn rows_have_the_right_length_and_shape() {
        for threshold in [0, 127, 255, 300, 510] {
            let table = build_table(threshold).unwrap();
            for r in 0..table.len() {
                let row = table.row(r).unwrap();
                assert_eq!(row.len(), r + 1);
                assert!(
                    row.windows(2).all(|w| w[0] <= w[1]),
                    "ligne {r} non monotone pour le seuil {threshold}"
                );
                let last = *row.last().unwrap();
                assert!((last - 1.0).abs() < TOLERANCE, "ligne {r} finit à {last}");
            }
        }
    }

    #[test]
    fn first_bin_is_a_power_of_one_half() {
        let table = build_table(255).unwrap();
        for r in 0..table.len() {
            let expected = 0.5f64.powi(r as i32);
            assert_eq!(table.row(r).unwrap()[0], expected, "ligne {r}");
        }
    }

    #[test]
    fn normalized_rows_match_binomial_coefficients() {
        let rows = normalized_rows(6);
        let expected = [1.0, 5.0, 10.0, 10.0, 5.0, 1.0].map(|c| c / 32.0);
        assert_eq!(rows[5], expected);
        for (i, row) in rows.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < TOLERANCE, "ligne {i} somme à {sum}");
        }
    }

    #[test]
    fn size_covers_every_byte_difference() {
        for t in 0..=510 {
            assert!(table_size(t) >= 256, "seuil {t}");
        }
        assert_eq!(table_size(127), 384);
        assert_eq!(table_size(600), 601);
    }

    #[test]
    fn construction_is_deterministic() {
        assert_eq!(build_table(200).unwrap(), build_table(200).unwrap());
    }

    #[test]
    fn negative_threshold_is_rejected() {
        assert!(matches!(
            build_table(-1),
            Err(PdError::InvalidParameter(_))
        ));
    }

    #[test]
    fn accessors_reflect_construction() {
        let table = build_table(100).unwrap();
        assert_eq!(table.threshold(), 100);
        assert_eq!(table.len(), 411);
        assert_eq!(table.max_difference(), 410);
        assert!(table.row(411).is_none());
        assert!(!table.is_empty());
    }

    #[test]
    fn render_clamps_to_table_length() {
        let table = build_table(255).unwrap();
        let text = table.render(10_000);
        assert_eq!(text.lines().count(), table.len());
        assert!(table.render(0).is_empty());
    }

    #[test]
    fn render_centres_on_the_last_row_at_full_precision() {
        // Last row "0.5 1.0" is 7 wide; the formatted rows do not fit in it.
        let text = build_table(255).unwrap().render(2);
        assert_eq!(text, "1.00000\n0.50000 1.00000\n");
    }

    #[test]
    fn feedback_smoothing_gets_the_full_range() {
        for threshold in [0, 127, 255, 510] {
            let table = build_table_for(threshold, Mode::SmoothedWithFeedback).unwrap();
            assert_eq!(table.len(), FULL_RANGE_ROWS.max(table_size(u32::try_from(threshold).unwrap())));
            assert_eq!(table.threshold(), threshold);
        }
        assert_eq!(
            build_table_for(127, Mode::Dithered).unwrap(),
            build_table(127).unwrap()
        );
        assert!(build_table_for(-1, Mode::SmoothedWithFeedback).is_err());
    }
}
