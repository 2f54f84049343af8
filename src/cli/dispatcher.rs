use anyhow::{Result, anyhow};
use std::collections::BTreeMap;

use crate::{
    cli::handlers,
    core::command_locator,
    models::{ConsoleConfig, DiscoveredCommand},
    state::AppContext,
};

// --- Command Definition and Registry ---

/// Signature shared by every command handler.
pub type Handler = fn(Vec<String>, &AppContext) -> Result<()>;

/// A command the console can run natively.
#[derive(Debug)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// The class id this handler stands in for. Discovered classes with the same
    /// id are treated as provided by this definition.
    pub class: &'static str,
    pub description: &'static str,
    pub handler: Handler,
}

/// Commands shipped with the console itself.
pub static BUILTIN_COMMANDS: &[CommandDefinition] = &[
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        class: "Symfony\\Component\\Console\\Command\\ListCommand",
        description: t!("command.list.description"),
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "make:console",
        aliases: &[],
        class: "Nails\\Console\\Console\\Command\\Make\\Console",
        description: t!("command.make_console.description"),
        handler: handlers::make_console::handle,
    },
    CommandDefinition {
        name: "make:service",
        aliases: &[],
        class: "Nails\\Console\\Console\\Command\\Make\\Service",
        description: t!("command.make_service.description"),
        handler: handlers::make_service::handle,
    },
    CommandDefinition {
        name: "services:sort",
        aliases: &[],
        class: "Nails\\Console\\Console\\Command\\Services\\Sort",
        description: t!("command.services_sort.description"),
        handler: handlers::services_sort::handle,
    },
];

/// Name of the module that owns [`BUILTIN_COMMANDS`].
pub const BUILTIN_MODULE: &str = "nails/module-console";

/// A lookup result. `alias` is set when the name was a configured alias.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCommand<'a> {
    pub definition: &'static CommandDefinition,
    pub alias: Option<&'a str>,
}

/// Name to handler mapping built once at startup.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<(&'static str, &'static CommandDefinition)>,
    aliases: BTreeMap<String, String>,
    external: Vec<DiscoveredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry for `config`: built-in commands, discovered classes
    /// and configured aliases.
    pub fn build(config: &ConsoleConfig) -> Self {
        let mut registry = Self::new();
        registry.register_module(BUILTIN_MODULE, BUILTIN_COMMANDS);
        registry.register_discovered(command_locator::locate(&config.locations));
        registry.register_aliases(&config.aliases);
        registry
    }

    /// Registers a module's command table. A name registered again replaces the
    /// earlier definition.
    pub fn register_module(&mut self, module: &'static str, table: &'static [CommandDefinition]) {
        for definition in table {
            if let Some(slot) = self
                .commands
                .iter_mut()
                .find(|(_, existing)| existing.name == definition.name)
            {
                log::warn!(
                    "Command '{}' from '{}' replaces the one registered by '{}'",
                    definition.name,
                    module,
                    slot.0
                );
                *slot = (module, definition);
            } else {
                log::debug!("Registered '{}' from '{}'", definition.name, module);
                self.commands.push((module, definition));
            }
        }
    }

    /// Sorts discovered classes into native (a definition claims the class id)
    /// and external ones. A class found in several locations is kept once, at
    /// the position of its last occurrence.
    pub fn register_discovered(&mut self, discovered: Vec<DiscoveredCommand>) {
        for class in discovered {
            if self.definitions().any(|def| def.class == class.as_str()) {
                log::debug!("Discovered class '{}' is handled natively", class);
                continue;
            }
            if let Some(pos) = self.external.iter().position(|known| *known == class) {
                log::warn!(
                    "Class '{}' was discovered in more than one location; the later one wins",
                    class
                );
                self.external.remove(pos);
            } else {
                log::debug!("Discovered class '{}' has no native handler", class);
            }
            self.external.push(class);
        }
    }

    /// Adds `alias -> command` forwards. Aliases pointing at unknown commands
    /// or shadowing a real command are ignored.
    pub fn register_aliases(&mut self, aliases: &BTreeMap<String, String>) {
        for (alias, target) in aliases {
            if self.lookup(target).is_none() {
                log::warn!("Alias '{}' points to unknown command '{}', ignoring it", alias, target);
                continue;
            }
            if self.lookup(alias).is_some() {
                log::warn!("Alias '{}' would shadow an existing command, ignoring it", alias);
                continue;
            }
            self.aliases.insert(alias.clone(), target.clone());
        }
    }

    fn lookup(&self, name: &str) -> Option<&'static CommandDefinition> {
        self.definitions()
            .find(|def| def.name == name || def.aliases.contains(&name))
    }

    /// Finds a command by name, built-in alias or configured alias.
    pub fn find<'a>(&'a self, name: &'a str) -> Option<ResolvedCommand<'a>> {
        if let Some(definition) = self.lookup(name) {
            return Some(ResolvedCommand {
                definition,
                alias: None,
            });
        }
        let target = self.aliases.get(name)?;
        self.lookup(target).map(|definition| ResolvedCommand {
            definition,
            alias: Some(name),
        })
    }

    /// Registered definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &'static CommandDefinition> + '_ {
        self.commands.iter().map(|(_, def)| *def)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Discovered classes with no native handler, in discovery order.
    pub fn external(&self) -> &[DiscoveredCommand] {
        &self.external
    }
}

/// Routes `args` (command name first) to its handler. No command runs `list`.
pub fn dispatch(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    log::debug!("Dispatching args: {:?}", args);

    let mut args = args.into_iter();
    let name = args.next().unwrap_or_else(|| "list".to_string());
    let rest: Vec<String> = args.collect();

    let resolved = ctx
        .registry
        .find(&name)
        .ok_or_else(|| anyhow!(t!("dispatch.error.unknown_command"), name = name))?;

    if let Some(alias) = resolved.alias {
        log::debug!("'{}' is an alias of '{}'", alias, resolved.definition.name);
    }
    (resolved.definition.handler)(rest, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: Vec<String>, _: &AppContext) -> Result<()> {
        Ok(())
    }

    static OVERRIDES: &[CommandDefinition] = &[CommandDefinition {
        name: "list",
        aliases: &[],
        class: "App\\Console\\Command\\ListAll",
        description: "app list",
        handler: noop,
    }];

    fn builtin_registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register_module(BUILTIN_MODULE, BUILTIN_COMMANDS);
        registry
    }

    #[test]
    fn test_find_by_name_and_builtin_alias() {
        let registry = builtin_registry();
        assert_eq!(registry.find("make:console").unwrap().definition.name, "make:console");
        let by_alias = registry.find("ls").unwrap();
        assert_eq!(by_alias.definition.name, "list");
        assert!(by_alias.alias.is_none());
        assert!(registry.find("make:nothing").is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = builtin_registry();
        registry.register_module("app", OVERRIDES);

        let names: Vec<&str> = registry.definitions().map(|d| d.name).collect();
        assert_eq!(names.iter().filter(|n| **n == "list").count(), 1);
        assert_eq!(registry.find("list").unwrap().definition.description, "app list");
        // Built-in aliases go with the replaced definition.
        assert!(registry.find("ls").is_none());
    }

    #[test]
    fn test_discovered_classes_are_split() {
        let mut registry = builtin_registry();
        registry.register_discovered(vec![
            DiscoveredCommand::new("Nails\\Console\\Console\\Command\\Make\\Console"),
            DiscoveredCommand::new("App\\Console\\Command\\Sync"),
            DiscoveredCommand::new("App\\Console\\Command\\Report"),
            DiscoveredCommand::new("App\\Console\\Command\\Sync"),
        ]);
        let external: Vec<&str> = registry.external().iter().map(|c| c.as_str()).collect();
        assert_eq!(
            external,
            vec!["App\\Console\\Command\\Report", "App\\Console\\Command\\Sync"]
        );
    }

    #[test]
    fn test_configured_aliases() {
        let mut registry = builtin_registry();
        let aliases = BTreeMap::from([
            ("mc".to_string(), "make:console".to_string()),
            ("broken".to_string(), "make:widget".to_string()),
            ("list".to_string(), "services:sort".to_string()),
        ]);
        registry.register_aliases(&aliases);

        let resolved = registry.find("mc").unwrap();
        assert_eq!(resolved.definition.name, "make:console");
        assert_eq!(resolved.alias, Some("mc"));
        assert!(registry.find("broken").is_none());
        assert_eq!(registry.find("list").unwrap().definition.name, "list");
        assert_eq!(registry.aliases().len(), 1);
    }
}
