use std::path::Path;

use image::GrayImage;
use pd_core::error::PdError;
use pd_core::grid::{HalftoneGrid, IntensityGrid};

/// Image chargée, prête pour une passe.
pub struct LoadedImage {
    /// Luma samples widened to the engine's signed type.
    pub grid: IntensityGrid,
    /// True if the file was already single-channel.
    pub was_grayscale: bool,
}

/// Load an image from disk as an intensity grid, converting to 8-bit luma
/// when the source has more than one channel.
///
/// # Errors
/// Returns [`PdError::ImageLoad`] if the file is missing or cannot be decoded.
///
/// # Example
/// ```no_run
/// use pd_source::image::load_intensity;
/// use std::path::Path;
/// let loaded = load_intensity(Path::new("IMAGE_PNG/Lion.png")).unwrap();
/// println!("{}×{}", loaded.grid.width, loaded.grid.height);
/// ```
pub fn load_intensity(path: &Path) -> Result<LoadedImage, PdError> {
    let img = image::open(path).map_err(|e| PdError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let was_grayscale = img.color().channel_count() == 1;
    if was_grayscale {
        log::info!("Image déjà en niveaux de gris : {}", path.display());
    } else {
        log::info!(
            "Image {:?} convertie en niveaux de gris : {}",
            img.color(),
            path.display()
        );
    }

    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    let grid = IntensityGrid::from_luma(width, height, luma.as_raw())?;
    Ok(LoadedImage {
        grid,
        was_grayscale,
    })
}

/// Write a halftone grid as an 8-bit grayscale image. The format follows
/// the file extension.
///
/// # Errors
/// Returns [`PdError::ImageSave`] if the buffer is inconsistent or the
/// encoder/filesystem fails.
pub fn save_halftone(grid: &HalftoneGrid, path: &Path) -> Result<(), PdError> {
    let save_err = |reason: String| PdError::ImageSave {
        path: path.display().to_string(),
        reason,
    };
    let img = GrayImage::from_raw(grid.width, grid.height, grid.data.clone())
        .ok_or_else(|| save_err(format!("buffer incohérent pour {}×{}", grid.width, grid.height)))?;
    img.save(path).map_err(|e| save_err(e.to_string()))?;
    log::info!("Demi-teinte écrite : {}", path.display());
    Ok(())
}
