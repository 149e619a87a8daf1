mod app;
mod cat;
mod chase;
mod config;
mod error;
mod facts;
mod game;
mod hud;
mod logging;
mod particles;
mod pointer;
mod render;
mod schedule;

use clap::Parser;

use crate::config::Args;

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);
    log::info!("Laser Chase starting up");

    let result = args
        .chase_config()
        .map_err(error::AppError::from)
        .and_then(|config| {
            log::info!("Pursuit: {}", config.variant.label());
            app::run(config)
        });

    if let Err(e) = result {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
