use std::path::PathBuf;

use clap::Parser;
use pd_core::config::{Mode, PdConfig};

/// Image used when none is given on the command line.
pub const DEFAULT_IMAGE: &str = "IMAGE_PNG/Lion.png";

/// pcadither — tramage probabiliste par triangle de Pascal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, allow_negative_numbers = true)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF). Défaut : IMAGE_PNG/Lion.png.
    pub image: Option<PathBuf>,

    /// Mode : 1 = tramage, 2 = lissage avec rétroaction, 3 = lissage sans rétroaction.
    pub mode: Option<String>,

    /// Seuil de binarisation [0, 510]. Lu uniquement en mode 1.
    pub threshold: Option<String>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Graine des échantillons aléatoires, pour rejouer une passe.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Chemin de sortie explicite (sinon <stem><suffixe>.png).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Afficher les N premières lignes de la table cumulée et quitter.
    #[arg(long, value_name = "ROWS")]
    pub print_table: Option<usize>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Input path, falling back to [`DEFAULT_IMAGE`].
    #[must_use]
    pub fn image_path(&self) -> PathBuf {
        self.image
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE))
    }

    /// Apply positional and flag overrides on top of `config`.
    ///
    /// Unparsable mode or threshold values keep the configured value and log
    /// a warning. The threshold is only read in mode 1.
    pub fn apply_overrides(&self, config: &mut PdConfig) {
        if let Some(ref raw) = self.mode {
            match raw.trim().parse::<u8>().map(Mode::from_selector) {
                Ok(Ok(mode)) => config.mode = mode,
                _ => log::warn!(
                    "Mode inconnu '{raw}', utilisation de {:?}.",
                    config.mode
                ),
            }
        }

        if let (Mode::Dithered, Some(raw)) = (config.mode, self.threshold.as_ref()) {
            match raw.trim().parse::<i32>() {
                Ok(t) => config.threshold = t,
                Err(_) => log::warn!(
                    "Seuil illisible '{raw}', utilisation de {}.",
                    config.threshold
                ),
            }
        }

        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.clamp_all();
    }
}
