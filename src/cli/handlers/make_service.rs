// src/cli/handlers/make_service.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::commons;
use crate::{
    cli::args::MakeServiceArgs,
    constants::{SERVICE_NAMESPACE, SOURCE_EXTENSION},
    core::{
        errors::{ConsoleError, ConsoleResult},
        maker, paths,
        service_registry::ServiceRegistry,
        template::{self, Template},
    },
    models::SectionKind,
    state::AppContext,
};

/// One service class plus its registry definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePlan {
    /// The identifier used in `services.php`, e.g. `BillingInvoice`.
    pub service_name: String,
    pub namespace: String,
    pub class_name: String,
    pub class_name_full: String,
    pub file_path: PathBuf,
    pub directory: PathBuf,
}

impl ServicePlan {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("SERVICE_NAME", self.service_name.clone()),
            ("NAMESPACE", self.namespace.clone()),
            ("CLASS_NAME", self.class_name.clone()),
            ("CLASS_NAME_FULL", self.class_name_full.clone()),
            ("FILE_PATH", paths::display(&self.file_path)),
        ]
    }

    /// The factory definition inserted into the `services` section, indented
    /// to sit next to the generator token.
    pub fn definition(&self, indent: usize) -> String {
        let outer = " ".repeat(indent);
        let inner = format!("{}{}", outer, maker::tabs(1));
        format!(
            "{outer}'{name}' => function () {{\n{inner}return new \\{class}();\n{outer}}},",
            name = self.service_name,
            class = self.class_name_full,
        )
    }
}

/// The main handler for the `make:service` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let make_args = MakeServiceArgs::try_parse_from(&args)?;
    commons::banner(t!("maker.title"));
    commons::ensure_development(ctx)?;

    // The registry has to be editable before anything is generated.
    let mut registry =
        ServiceRegistry::open(&ctx.config.paths.services, &ctx.config.services_token)?;

    let input = match make_args.service_name {
        Some(name) => name,
        None => commons::ask_until_valid(ctx, t!("make_service.prompt.name"), |input| {
            let names = maker::parse_class_names(input, false);
            if names.is_empty() {
                return Err(t!("maker.error.no_names").to_string());
            }
            names
                .iter()
                .try_for_each(|name| maker::validate_class_name(name))
                .map_err(|e| e.to_string())
        })?,
    };

    let names = maker::parse_class_names(&input, true);
    if names.is_empty() {
        return Err(anyhow!(t!("maker.error.no_names")));
    }

    let plans = plan_services(&names, &ctx.config.app_namespace, &ctx.config.paths.src)?;
    for plan in &plans {
        if registry.contains(SectionKind::Services, &plan.service_name)? {
            return Err(ConsoleError::Validation(format!(
                t!("make_service.error.already_registered"),
                name = plan.service_name,
                path = paths::display(registry.path())
            ))
            .into());
        }
    }

    println!("{}", t!("make_service.info.will_create"));
    for plan in &plans {
        commons::key_value_list(&[
            ("Service", plan.service_name.clone()),
            ("Class", plan.class_name_full.clone()),
            ("Path", paths::display(&plan.file_path)),
        ]);
    }

    if !commons::confirm(ctx, t!("common.prompt.continue"), true, make_args.yes)? {
        println!("{}", t!("common.info.aborted").yellow());
        return Ok(());
    }

    let source = template::load(Template::Service, ctx.config.paths.resources.as_deref())?;
    let mut created = maker::track_created_files();
    for plan in &plans {
        paths::create_path(&plan.directory)?;
        maker::create_file(&plan.file_path, &template::render(&source, plan.fields()))?;
        created.push(plan.file_path.clone());
        println!(
            "{} {}",
            format!(t!("make_service.info.created"), name = plan.service_name),
            t!("common.done").green()
        );
    }

    let indent = registry.indent();
    let blocks: Vec<String> = plans.iter().map(|plan| plan.definition(indent)).collect();
    registry.write(&blocks)?;
    let created = maker::commit(created);

    log::debug!("Created {} service file(s)", created.len());
    println!(
        "{}",
        format!(
            t!("make_service.info.registered"),
            count = blocks.len(),
            path = paths::display(&ctx.config.paths.services)
        )
    );
    println!("\n{}", t!("common.success"));
    Ok(())
}

/// Computes the class, file and registry id for each normalized service name.
/// A name given twice is planned once.
///
/// # Errors
/// `Validation` for an invalid class name or when two names map to the same
/// service id, `FileExists` if the class file is already on disk.
pub fn plan_services(
    names: &[String],
    app_namespace: &str,
    src_dir: &Path,
) -> ConsoleResult<Vec<ServicePlan>> {
    let root_namespace = format!("{}\\{}", app_namespace, SERVICE_NAMESPACE);
    let mut plans = Vec::with_capacity(names.len());
    let mut seen_names = HashSet::new();
    let mut seen = HashSet::new();

    for name in names {
        maker::validate_class_name(name)?;
        if !seen_names.insert(name.as_str()) {
            log::debug!("Skipping repeated service name '{}'", name);
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
        let directory = parents
            .iter()
            .fold(src_dir.join(SERVICE_NAMESPACE), |dir, bit| dir.join(bit));
        let file_path = directory.join(format!("{}.{}", class_name, SOURCE_EXTENSION));

        let service_name = bits.concat();
        if !seen.insert(service_name.clone()) {
            return Err(ConsoleError::Validation(format!(
                t!("make_service.error.duplicate_name"),
                name = service_name
            )));
        }
        if file_path.exists() {
            return Err(ConsoleError::FileExists { path: file_path });
        }

        plans.push(ServicePlan {
            service_name,
            class_name_full: format!("{}\\{}", namespace, class_name),
            namespace,
            class_name: class_name.to_string(),
            file_path,
            directory,
        });
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_plan_nested_service() {
        let dir = tempdir().unwrap();
        let plans = plan_services(&["Billing/Invoice".to_string()], "App", dir.path()).unwrap();

        let plan = &plans[0];
        assert_eq!(plan.service_name, "BillingInvoice");
        assert_eq!(plan.namespace, "App\\Service\\Billing");
        assert_eq!(plan.class_name_full, "App\\Service\\Billing\\Invoice");
        assert_eq!(
            plan.file_path,
            dir.path().join("Service").join("Billing").join("Invoice.php")
        );
    }

    #[test]
    fn test_plan_refuses_existing_class_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Service")).unwrap();
        fs::write(dir.path().join("Service/Mailer.php"), "<?php").unwrap();
        let result = plan_services(&["Mailer".to_string()], "App", dir.path());
        assert!(matches!(result, Err(ConsoleError::FileExists { .. })));
    }

    #[test]
    fn test_plan_refuses_names_sharing_a_service_id() {
        let dir = tempdir().unwrap();
        let names = maker::parse_class_names("Billing/Invoice, BillingInvoice", true);
        assert_eq!(names.len(), 2);
        match plan_services(&names, "App", dir.path()) {
            Err(ConsoleError::Validation(msg)) => assert!(msg.contains("BillingInvoice")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_repeated_name_once() {
        let dir = tempdir().unwrap();
        let names = maker::parse_class_names("Mailer, Billing/Invoice, Mailer", true);
        let plans = plan_services(&names, "App", dir.path()).unwrap();
        let ids: Vec<&str> = plans.iter().map(|p| p.service_name.as_str()).collect();
        assert_eq!(ids, vec!["Mailer", "BillingInvoice"]);
    }

    #[test]
    fn test_definition_is_indented_from_token() {
        let dir = tempdir().unwrap();
        let plans = plan_services(&["Mailer".to_string()], "App", dir.path()).unwrap();
        assert_eq!(
            plans[0].definition(8),
            "        'Mailer' => function () {\n            return new \\App\\Service\\Mailer();\n        },"
        );
    }

    #[test]
    fn test_definition_round_trips_through_registry() {
        let dir = tempdir().unwrap();
        let services = dir.path().join("services.php");
        fs::write(
            &services,
            "<?php\n\nreturn [\n    'services' => [\n        'Zed' => function () {\n            return 1;\n        },\n        // GENERATOR[SERVICES]\n    ],\n];\n",
        )
        .unwrap();

        let plans = plan_services(&["Mailer".to_string()], "App", dir.path()).unwrap();
        let mut registry = ServiceRegistry::open(&services, "SERVICES").unwrap();
        assert!(!registry.contains(SectionKind::Services, "Mailer").unwrap());
        let block = plans[0].definition(registry.indent());
        registry.write(&[block]).unwrap();

        let content = fs::read_to_string(&services).unwrap();
        let mailer = content.find("'Mailer'").unwrap();
        let zed = content.find("'Zed'").unwrap();
        assert!(mailer < zed);
        assert!(content.contains("return new \\App\\Service\\Mailer();"));

        let mut reopened = ServiceRegistry::open(&services, "SERVICES").unwrap();
        assert!(reopened.contains(SectionKind::Services, "Mailer").unwrap());
    }
}
