//! This crate contains the source code for the binary for the game mazechase.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use mazechase::{config::Config, logging, App};

fn main() -> Result<()> {
    install()?;

    let config = Config::parse();
    config.validate()?;
    let _guard = logging::init(&config.log_dir)?;

    let mut terminal = ratatui::init();
    let result = App::new(config).run(&mut terminal);
    ratatui::restore();

    result
}
