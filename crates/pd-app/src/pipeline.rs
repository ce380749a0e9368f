use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pd_core::config::PdConfig;
use pd_dither::engine::{PassStats, dither_with_stats};
use pd_dither::pascal::{CumulativeTable, build_table_for};
use pd_dither::sampling::{RandomSampleGrid, SeededSampler};

use crate::output::output_path;

/// Result of one processed image.
#[derive(Debug)]
pub struct PassOutcome {
    /// Where the halftone was written.
    pub output: PathBuf,
    pub stats: PassStats,
    /// Seed of the sample grid, enough to replay the pass.
    pub seed: u64,
    pub was_grayscale: bool,
}

/// Table + configuration, built once and reused for every image.
pub struct Pipeline {
    config: PdConfig,
    table: CumulativeTable,
}

impl Pipeline {
    /// Build the table for the configuration's effective threshold and mode.
    ///
    /// # Errors
    /// Returns an error if the threshold is rejected by the generator.
    pub fn new(config: PdConfig) -> Result<Self> {
        let threshold = config.effective_threshold();
        let table = build_table_for(threshold, config.mode)
            .with_context(|| format!("Construction de la table pour le seuil {threshold}"))?;
        Ok(Self { config, table })
    }

    #[must_use]
    pub fn table(&self) -> &CumulativeTable {
        &self.table
    }

    /// Load `input`, run one pass, save the halftone.
    ///
    /// `output` overrides the path derived from the input name.
    ///
    /// # Errors
    /// Returns an error if loading, the pass or saving fails. Nothing is
    /// written on failure.
    pub fn process(&self, input: &Path, output: Option<&Path>) -> Result<PassOutcome> {
        let mut loaded = pd_source::load_intensity(input)?;
        let grid = &mut loaded.grid;

        let mut sampler = match self.config.seed {
            Some(seed) => SeededSampler::new(seed),
            None => SeededSampler::from_entropy(),
        };
        log::info!("Graine des échantillons : {}", sampler.seed());
        let samples = RandomSampleGrid::generate(grid.height, grid.width, &mut sampler);

        let mode = self.config.mode;
        let (halftone, stats) = dither_with_stats(
            grid,
            &self.table,
            &samples,
            self.config.effective_threshold(),
            mode,
        )
        .with_context(|| format!("Passe {mode:?} sur {}", input.display()))?;

        let path = output.map_or_else(
            || output_path(input, mode, &self.config.output),
            Path::to_path_buf,
        );
        pd_source::save_halftone(&halftone, &path)?;

        Ok(PassOutcome {
            output: path,
            stats,
            seed: sampler.seed(),
            was_grayscale: loaded.was_grayscale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::config::Mode;
    use pd_core::grid::HalftoneGrid;

    fn write_input(dir: &Path, width: u32, height: u32, level: u8) -> PathBuf {
        let mut grid = HalftoneGrid::new(width, height);
        grid.data.fill(level);
        write_grid(dir, &grid)
    }

    fn write_grid(dir: &Path, grid: &HalftoneGrid) -> PathBuf {
        let path = dir.join("input.png");
        pd_source::save_halftone(grid, &path).unwrap();
        path
    }

    fn config_in(dir: &Path, mode: Mode) -> PdConfig {
        let mut config = PdConfig {
            mode,
            seed: Some(3),
            ..PdConfig::default()
        };
        config.output.directory = Some(dir.to_path_buf());
        config
    }

    #[test]
    fn pass_writes_named_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 6, 4, 128);
        let pipeline = Pipeline::new(config_in(dir.path(), Mode::SmoothedWithoutFeedback)).unwrap();

        let outcome = pipeline.process(&input, None).unwrap();
        assert_eq!(outcome.output, dir.path().join("input_HT3.png"));
        assert_eq!(outcome.stats.visited, 3 * 4);
        assert_eq!(outcome.seed, 3);
        assert!(outcome.was_grayscale);

        let written = pd_source::load_intensity(&outcome.output).unwrap().grid;
        assert_eq!(written.get(1, 1), 128);
        assert_eq!(written.get(0, 1), 0);
        assert_eq!(written.get(2, 5), 0);
    }

    #[test]
    fn seeded_passes_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 16, 16, 90);
        let pipeline = Pipeline::new(config_in(dir.path(), Mode::Dithered)).unwrap();

        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        pipeline.process(&input, Some(a.as_path())).unwrap();
        pipeline.process(&input, Some(b.as_path())).unwrap();
        assert_eq!(
            pd_source::load_intensity(&a).unwrap().grid,
            pd_source::load_intensity(&b).unwrap().grid
        );
    }

    #[test]
    fn smoothing_modes_build_the_255_table() {
        let table_len = |mode| {
            let config = PdConfig {
                mode,
                threshold: 40,
                ..PdConfig::default()
            };
            let pipeline = Pipeline::new(config).unwrap();
            assert_eq!(pipeline.table().threshold(), 255);
            pipeline.table().len()
        };
        assert_eq!(table_len(Mode::SmoothedWithoutFeedback), 256);
        assert_eq!(table_len(Mode::SmoothedWithFeedback), 511);
    }

    #[test]
    fn feedback_smoothing_runs_on_black_and_white_stripes() {
        let dir = tempfile::tempdir().unwrap();
        let mut grid = HalftoneGrid::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                if (x / 3 + y / 2) % 2 == 0 {
                    grid.set(y, x, 255);
                }
            }
        }
        let input = write_grid(dir.path(), &grid);
        let pipeline = Pipeline::new(config_in(dir.path(), Mode::SmoothedWithFeedback)).unwrap();

        let outcome = pipeline.process(&input, None).unwrap();
        assert_eq!(outcome.output, dir.path().join("input_HT2.png"));
        assert_eq!(outcome.stats.visited, 31 * 30);
        assert!(outcome.output.exists());
    }

    #[test]
    fn missing_input_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config_in(dir.path(), Mode::Dithered)).unwrap();
        let err = pipeline
            .process(&dir.path().join("absent.png"), None)
            .unwrap_err();
        assert!(err.to_string().contains("absent.png"));
        assert!(!dir.path().join("absent_IPCA.png").exists());
    }
}
