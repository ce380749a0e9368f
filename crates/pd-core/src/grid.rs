use crate::error::PdError;

/// Grille d'intensités signées, row-major.
///
/// Input values are 0..=255, but the engine writes residuals back into it
/// during a pass, so the storage is signed.
///
/// # Example
/// ```
/// use pd_core::grid::IntensityGrid;
/// let grid = IntensityGrid::filled(4, 3, 128);
/// assert_eq!(grid.get(2, 3), 128);
/// assert_eq!(grid.data.len(), 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntensityGrid {
    /// Samples, row-major.
    pub data: Vec<i16>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl IntensityGrid {
    /// Grid of the given size with every sample set to `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: i16) -> Self {
        Self {
            data: vec![value; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap existing samples.
    ///
    /// # Errors
    /// Returns [`PdError::InvalidParameter`] if `data.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<i16>) -> Result<Self, PdError> {
        check_len(data.len(), width, height)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build from 8-bit luma samples.
    ///
    /// # Errors
    /// Returns [`PdError::InvalidParameter`] if `luma.len() != width * height`.
    ///
    /// # Example
    /// ```
    /// use pd_core::grid::IntensityGrid;
    /// let grid = IntensityGrid::from_luma(2, 1, &[0, 255]).unwrap();
    /// assert_eq!(grid.get(0, 1), 255);
    /// ```
    pub fn from_luma(width: u32, height: u32, luma: &[u8]) -> Result<Self, PdError> {
        check_len(luma.len(), width, height)?;
        Ok(Self {
            data: luma.iter().map(|&v| i16::from(v)).collect(),
            width,
            height,
        })
    }

    /// Échantillon en (y, x).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, y: u32, x: u32) -> i16 {
        debug_assert!(x < self.width && y < self.height, "sample out of bounds");
        self.data[(y * self.width + x) as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, y: u32, x: u32, value: i16) {
        debug_assert!(x < self.width && y < self.height, "sample out of bounds");
        self.data[(y * self.width + x) as usize] = value;
    }

    /// True when the grid holds no sample at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Grille de sortie 8 bits. Zéro partout tant que le moteur n'y a pas écrit.
///
/// # Example
/// ```
/// use pd_core::grid::HalftoneGrid;
/// let mut out = HalftoneGrid::new(3, 2);
/// out.set(1, 1, 255);
/// assert_eq!(out.get(1, 1), 255);
/// assert_eq!(out.get(0, 0), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HalftoneGrid {
    /// Output values, row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl HalftoneGrid {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize],
            width,
            height,
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, y: u32, x: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[(y * self.width + x) as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, y: u32, x: u32, value: u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Number of pixels set to 255.
    #[must_use]
    pub fn count_on(&self) -> usize {
        self.data.iter().filter(|&&v| v == u8::MAX).count()
    }
}

fn check_len(len: usize, width: u32, height: u32) -> Result<(), PdError> {
    let expected = width as usize * height as usize;
    if len == expected {
        Ok(())
    } else {
        Err(PdError::invalid(format!(
            "{len} échantillons pour une grille {width}×{height} (attendu {expected})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_luma_widens_without_changing_values() {
        let grid = IntensityGrid::from_luma(3, 1, &[0, 128, 255]).unwrap();
        assert_eq!(grid.data, vec![0, 128, 255]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = IntensityGrid::from_vec(2, 2, vec![0; 3]).unwrap_err();
        assert!(matches!(err, PdError::InvalidParameter(_)));
    }

    #[test]
    fn set_is_row_major() {
        let mut grid = IntensityGrid::filled(3, 2, 0);
        grid.set(1, 2, -7);
        assert_eq!(grid.data[5], -7);
    }

    #[test]
    fn halftone_starts_black() {
        let out = HalftoneGrid::new(4, 4);
        assert_eq!(out.count_on(), 0);
        assert!(out.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn empty_detection() {
        assert!(IntensityGrid::filled(0, 5, 0).is_empty());
        assert!(IntensityGrid::filled(5, 0, 0).is_empty());
        assert!(!IntensityGrid::filled(1, 1, 0).is_empty());
    }
}
