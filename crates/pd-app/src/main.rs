use anyhow::Result;
use clap::Parser;
use pd_core::config::PdConfig;

pub mod cli;
pub mod output;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);
    log::info!(
        "Mode {} ({:?}), seuil effectif {}",
        config.mode.selector(),
        config.mode,
        config.effective_threshold()
    );

    // 4. Table unique pour la passe
    let pipeline = pipeline::Pipeline::new(config)?;

    if let Some(rows) = cli.print_table {
        print!("{}", pipeline.table().render(rows));
        return Ok(());
    }

    // 5. Passe complète : chargement, tramage, écriture
    let input = cli.image_path();
    let outcome = pipeline.process(&input, cli.output.as_deref())?;
    if !outcome.was_grayscale {
        log::debug!("Source couleur convertie avant tramage");
    }
    log::info!(
        "{} pixels traités, {} tirages, {} points (graine {})",
        outcome.stats.visited,
        outcome.stats.samples_consumed,
        outcome.stats.marks,
        outcome.seed
    );
    println!("{}", outcome.output.display());
    Ok(())
}

/// Load `--config` if it exists, defaults otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<PdConfig> {
    if cli.config.exists() {
        pd_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(PdConfig::default())
    }
}
