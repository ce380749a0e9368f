use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::PdError;

/// Largest threshold accepted from configuration.
pub const MAX_THRESHOLD: i32 = 510;

/// Threshold forced on the smoothing modes.
pub const SMOOTHING_THRESHOLD: i32 = 255;

/// Output policy applied to each scanned pixel.
///
/// # Example
/// ```
/// use pd_core::config::Mode;
/// assert_eq!(Mode::default(), Mode::Dithered);
/// assert_eq!(Mode::from_selector(3).unwrap(), Mode::SmoothedWithoutFeedback);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum Mode {
    /// Binary 0/255 output, residual fed back into the scan.
    #[default]
    Dithered,
    /// Grayscale stochastic output, residual fed back into the scan.
    SmoothedWithFeedback,
    /// Grayscale stochastic output, source samples left untouched.
    SmoothedWithoutFeedback,
}

impl Mode {
    /// Map the numeric CLI selector (`1`, `2`, `3`) to a mode.
    ///
    /// # Errors
    /// Returns [`PdError::InvalidParameter`] for any other selector.
    pub fn from_selector(selector: u8) -> Result<Self, PdError> {
        match selector {
            1 => Ok(Self::Dithered),
            2 => Ok(Self::SmoothedWithFeedback),
            3 => Ok(Self::SmoothedWithoutFeedback),
            other => Err(PdError::invalid(format!(
                "mode {other} inconnu (attendu 1, 2 ou 3)"
            ))),
        }
    }

    /// Numeric CLI selector, inverse of [`Mode::from_selector`].
    #[must_use]
    pub fn selector(self) -> u8 {
        match self {
            Self::Dithered => 1,
            Self::SmoothedWithFeedback => 2,
            Self::SmoothedWithoutFeedback => 3,
        }
    }
}

/// Configuration complète d'une passe.
///
/// Lue depuis TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use pd_core::config::{PdConfig, Mode};
/// let config = PdConfig::default();
/// assert_eq!(config.mode, Mode::Dithered);
/// assert_eq!(config.threshold, 255);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PdConfig {
    // === Tramage ===
    pub mode: Mode,
    /// Seuil de binarisation [0, 510]. Only read in `Dithered` mode.
    pub threshold: i32,
    /// Seed for the sample grid. `None` = fresh entropy every run.
    pub seed: Option<u64>,

    // === Sortie ===
    pub output: OutputConfig,
}

/// Where the halftone is written and how it is named.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Output directory. `None` = current directory.
    pub directory: Option<PathBuf>,
    pub suffix_dithered: String,
    pub suffix_smoothed_feedback: String,
    pub suffix_smoothed: String,
}

impl OutputConfig {
    /// File-name suffix for the given mode.
    #[must_use]
    pub fn suffix(&self, mode: Mode) -> &str {
        match mode {
            Mode::Dithered => &self.suffix_dithered,
            Mode::SmoothedWithFeedback => &self.suffix_smoothed_feedback,
            Mode::SmoothedWithoutFeedback => &self.suffix_smoothed,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            suffix_dithered: "_IPCA".into(),
            suffix_smoothed_feedback: "_HT2".into(),
            suffix_smoothed: "_HT3".into(),
        }
    }
}

impl Default for PdConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Dithered,
            threshold: 255,
            seed: None,
            output: OutputConfig::default(),
        }
    }
}

impl PdConfig {
    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization and after CLI overrides.
    pub fn clamp_all(&mut self) {
        let clamped = self.threshold.clamp(0, MAX_THRESHOLD);
        if clamped != self.threshold {
            log::warn!(
                "Seuil {} hors plage, ramené à {clamped}",
                self.threshold
            );
            self.threshold = clamped;
        }
    }

    /// Threshold actually used by the pass: the configured one in
    /// `Dithered` mode, 255 otherwise.
    ///
    /// # Example
    /// ```
    /// use pd_core::config::{PdConfig, Mode};
    /// let mut config = PdConfig { threshold: 100, ..PdConfig::default() };
    /// assert_eq!(config.effective_threshold(), 100);
    /// config.mode = Mode::SmoothedWithFeedback;
    /// assert_eq!(config.effective_threshold(), 255);
    /// ```
    #[must_use]
    pub fn effective_threshold(&self) -> i32 {
        match self.mode {
            Mode::Dithered => self.threshold,
            Mode::SmoothedWithFeedback | Mode::SmoothedWithoutFeedback => SMOOTHING_THRESHOLD,
        }
    }
}

/// Structure TOML intermédiaire, toutes sections optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    dither: Option<DitherSection>,
    output: Option<OutputSection>,
}

#[derive(Deserialize)]
struct DitherSection {
    mode: Option<Mode>,
    threshold: Option<i32>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct OutputSection {
    directory: Option<PathBuf>,
    suffix_dithered: Option<String>,
    suffix_smoothed_feedback: Option<String>,
    suffix_smoothed: Option<String>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use pd_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PdConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse TOML text into a config, merged over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use pd_core::config::{parse_config, Mode};
/// let config = parse_config("[dither]\nmode = \"SmoothedWithFeedback\"").unwrap();
/// assert_eq!(config.mode, Mode::SmoothedWithFeedback);
/// assert_eq!(config.threshold, 255);
/// ```
pub fn parse_config(content: &str) -> Result<PdConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = PdConfig::default();

    if let Some(d) = file.dither {
        if let Some(v) = d.mode {
            config.mode = v;
        }
        if let Some(v) = d.threshold {
            config.threshold = v;
        }
        if d.seed.is_some() {
            config.seed = d.seed;
        }
    }

    if let Some(o) = file.output {
        if o.directory.is_some() {
            config.output.directory = o.directory;
        }
        if let Some(v) = o.suffix_dithered {
            config.output.suffix_dithered = v;
        }
        if let Some(v) = o.suffix_smoothed_feedback {
            config.output.suffix_smoothed_feedback = v;
        }
        if let Some(v) = o.suffix_smoothed {
            config.output.suffix_smoothed = v;
        }
    }

    config.clamp_all();
    Ok(config)
}
