// src/cli/handlers/make_console.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::commons;
use crate::{
    cli::args::MakeConsoleArgs,
    constants::{MODULE_COMMANDS_NAMESPACE, SOURCE_EXTENSION},
    core::{
        errors::{ConsoleError, ConsoleResult},
        maker, paths,
        template::{self, Template},
    },
    state::AppContext,
};

/// Everything needed to generate one command class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub namespace: String,
    pub class_name: String,
    pub class_name_full: String,
    /// The command name without the `app:` prefix, e.g. `sync:users`.
    pub command: String,
    pub file_path: PathBuf,
    pub directory: PathBuf,
}

impl CommandPlan {
    /// Template fields, keyed the way the `console` template expects them.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("NAMESPACE", self.namespace.clone()),
            ("CLASS_NAME", self.class_name.clone()),
            ("CLASS_NAME_FULL", self.class_name_full.clone()),
            ("COMMAND", self.command.clone()),
            ("FILE_PATH", paths::display(&self.file_path)),
            (
                "DIRECTORY",
                format!("{}{}", paths::display(&self.directory), std::path::MAIN_SEPARATOR),
            ),
        ]
    }
}

/// The main handler for the `make:console` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let make_args = MakeConsoleArgs::try_parse_from(&args)?;
    commons::banner(t!("maker.title"));
    commons::ensure_development(ctx)?;

    let commands_dir = &ctx.config.paths.commands;
    paths::create_path(commands_dir)?;

    let input = match make_args.command_name {
        Some(name) => name,
        None => commons::ask_until_valid(ctx, t!("make_console.prompt.name"), validate_input)?,
    };

    let names = maker::parse_class_names(&input, true);
    if names.is_empty() {
        return Err(anyhow!(t!("maker.error.no_names")));
    }
    let plans = plan_commands(&names, &ctx.config.app_namespace, commands_dir)?;

    println!("{}", t!("make_console.info.will_create"));
    for plan in &plans {
        commons::key_value_list(&[
            ("Class", plan.class_name_full.clone()),
            ("Command", format!("app:{}", plan.command)),
            ("Path", paths::display(&plan.file_path)),
        ]);
    }

    if !commons::confirm(ctx, t!("common.prompt.continue"), true, make_args.yes)? {
        println!("{}", t!("common.info.aborted").yellow());
        return Ok(());
    }

    let source = template::load(Template::Console, ctx.config.paths.resources.as_deref())?;
    let mut created = maker::track_created_files();
    for plan in &plans {
        print!("{}", format!(t!("make_console.info.creating"), command = plan.command));
        std::io::stdout().flush()?;

        if let Err(e) = write_command(plan, &source) {
            println!("{}", t!("common.fail").red());
            return Err(e.into());
        }
        created.push(plan.file_path.clone());
        println!("{}", t!("common.done").green());
    }
    let created = maker::commit(created);

    log::debug!("Created {} command file(s)", created.len());
    println!("\n{}", t!("common.success"));
    Ok(())
}

fn validate_input(input: &str) -> std::result::Result<(), String> {
    let names = maker::parse_class_names(input, false);
    if names.is_empty() {
        return Err(t!("maker.error.no_names").to_string());
    }
    for name in &names {
        maker::validate_class_name(name).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Works out namespace, command name and target file for each normalized name
/// (as produced by [`maker::parse_class_names`]). A name given twice is
/// planned once.
///
/// # Errors
/// `Validation` for an invalid class name, `FileExists` if a target file is
/// already on disk.
pub fn plan_commands(
    names: &[String],
    app_namespace: &str,
    commands_dir: &Path,
) -> ConsoleResult<Vec<CommandPlan>> {
    let root_namespace = format!("{}\\{}", app_namespace, MODULE_COMMANDS_NAMESPACE);
    let mut plans = Vec::with_capacity(names.len());
    let mut seen = HashSet::new();

    for name in names {
        maker::validate_class_name(name)?;
        if !seen.insert(name.as_str()) {
            log::debug!("Skipping repeated command name '{}'", name);
            continue;
        }
        let bits: Vec<&str> = name.split('/').collect();
        let Some((class_name, parents)) = bits.split_last() else {
            continue;
        };

        let namespace = std::iter::once(root_namespace.as_str())
            .chain(parents.iter().copied())
            .collect::<Vec<_>>()
            .join("\\");
        let class_name_full = format!("{}\\{}", namespace, class_name);
        let command = bits
            .iter()
            .map(|bit| bit.to_lowercase())
            .collect::<Vec<_>>()
            .join(":");

        let directory = parents
            .iter()
            .fold(commands_dir.to_path_buf(), |dir, bit| dir.join(bit));
        let file_path = directory.join(format!("{}.{}", class_name, SOURCE_EXTENSION));

        if file_path.exists() {
            return Err(ConsoleError::FileExists { path: file_path });
        }

        plans.push(CommandPlan {
            namespace,
            class_name: class_name.to_string(),
            class_name_full,
            command,
            file_path,
            directory,
        });
    }
    Ok(plans)
}

fn write_command(plan: &CommandPlan, source: &str) -> ConsoleResult<()> {
    paths::create_path(&plan.directory)?;
    maker::create_file(&plan.file_path, &template::render(source, plan.fields()))
}
