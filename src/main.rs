use anyhow::{Context, Result};
use clap::{Args, FromArgMatches, crate_version};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use env_logger::Builder;

use ebi_unfolding::ebi_framework::ebi_command::EBI_COMMANDS;

pub fn main() -> Result<()> {
    let command = EBI_COMMANDS.build_cli();
    let command = Verbosity::<InfoLevel>::augment_args(command.version(crate_version!()));
    let cli_matches = command.get_matches();

    let verbosity = Verbosity::<InfoLevel>::from_arg_matches(&cli_matches).context("reading the verbosity")?;
    Builder::new().filter_level(verbosity.log_level_filter()).init();

    log::info!("ebi_unfolding starting");

    EBI_COMMANDS.execute(&cli_matches).context("Executing ebi_unfolding")
}
