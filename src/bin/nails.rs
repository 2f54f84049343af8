use anyhow::Result;
use clap::Parser;
use std::env;

use nails_console::{
    cli::{Cli, dispatcher, handlers::commons},
    constants::ENVIRONMENT_VAR,
    state::{self, AppContext},
};

/// The main entry point of the `nails` application.
/// It sets up logging, parses arguments, bootstraps the app context once and
/// performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Per-command argument errors (and `--help`) are printed by clap itself.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }

        let message = e
            .chain()
            .map(|cause| cause.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        commons::print_error_block(&message);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let app_root = state::resolve_app_root(cli.app_path.as_deref())?;
    let environment_override = env::var(ENVIRONMENT_VAR).ok();
    let ctx = AppContext::bootstrap(&app_root, !cli.no_interaction, environment_override)?;

    dispatcher::dispatch(cli.args, &ctx)
}
