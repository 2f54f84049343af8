// src/cli/handlers/list.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use super::commons;
use crate::{
    cli::{args::ListArgs, dispatcher::CommandRegistry},
    models::DiscoveredCommand,
    state::AppContext,
};

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
}

/// What `list` prints, in both its text and JSON forms.
#[derive(Serialize, Debug)]
pub struct Listing<'a> {
    pub environment: String,
    pub commands: Vec<CommandSummary>,
    /// Classes found on disk that the console cannot run itself.
    pub external: &'a [DiscoveredCommand],
}

/// Collects registered commands (sorted by name) together with their built-in
/// and configured aliases.
pub fn summarize(registry: &CommandRegistry) -> Vec<CommandSummary> {
    let mut commands: Vec<CommandSummary> = registry
        .definitions()
        .map(|def| {
            let mut aliases: Vec<String> = def.aliases.iter().map(|a| a.to_string()).collect();
            aliases.extend(
                registry
                    .aliases()
                    .iter()
                    .filter(|(_, target)| target.as_str() == def.name)
                    .map(|(alias, _)| alias.clone()),
            );
            CommandSummary {
                name: def.name.to_string(),
                aliases,
                description: def.description.to_string(),
            }
        })
        .collect();
    commands.sort_by(|a, b| a.name.cmp(&b.name));
    commands
}

/// The main handler for the `list` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;

    let listing = Listing {
        environment: ctx.config.environment.to_string(),
        commands: summarize(&ctx.registry),
        external: ctx.registry.external(),
    };

    if list_args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    commons::banner(t!("list.title"));
    println!(
        "{}",
        format!(t!("list.info.environment"), environment = listing.environment).dimmed()
    );

    println!("\n{}", t!("list.header.available").yellow().bold());
    let width = listing
        .commands
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);
    for command in &listing.commands {
        let aliases = if command.aliases.is_empty() {
            String::new()
        } else {
            format!(" [{}]", command.aliases.join("|"))
        };
        println!(
            "  {:<width$}  {}{}",
            command.name.cyan(),
            command.description,
            aliases.dimmed(),
            width = width
        );
    }

    if !listing.external.is_empty() {
        println!("\n{}", t!("list.header.external").yellow().bold());
        for class in listing.external {
            println!("  {}", class.as_str().dimmed());
        }
    }
    Ok(())
}
