mod args;
mod config;
mod game;
mod gamelog;
mod ratings;
mod scrim;
mod summary;

use std::error::Error;
use std::path::PathBuf;

use args::Args;
use clap::Parser;
use config::{ScrimConfig, ScrimPaths};
use log::LevelFilter;
use scrim::ScrimController;
use simplelog::{Config, SimpleLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::init(level, Config::default())?;

    let config = ScrimConfig::load(&args.config)?;

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => args
            .config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let paths = ScrimPaths::resolve(&base_dir, &config.settings.name);

    let controller = ScrimController::new(&config, &paths)?;
    controller.run(&paths)?;

    log::info!("Results written to {}", paths.results_file.display());

    Ok(())
}
