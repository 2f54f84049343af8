// src/cli/handlers/services_sort.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::args::ServicesSortArgs,
    core::{paths, service_registry},
    state::AppContext,
};

/// The main handler for the `services:sort` command.
/// Re-sorts every section of the services file without adding anything.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let sort_args = ServicesSortArgs::try_parse_from(&args)?;
    let token = sort_args
        .token
        .as_deref()
        .unwrap_or(&ctx.config.services_token);
    let path = &ctx.config.paths.services;

    service_registry::rewrite(path, token, &[]).with_context(|| {
        format!(t!("services_sort.error.failed"), path = paths::display(path))
    })?;

    println!(
        "{}",
        format!(t!("services_sort.success.sorted"), path = paths::display(path)).green()
    );
    Ok(())
}
