// src/constants.rs

/// The name of the per-application configuration file (in the app root).
pub const APP_CONFIG_FILENAME: &str = "console.toml";

/// The directory under the user's config dir holding the user-level configuration.
pub const USER_CONFIG_DIR: &str = "nails";

/// The name of the user-level configuration file.
pub const USER_CONFIG_FILENAME: &str = "console.toml";

/// Environment variable that overrides the configured environment.
pub const ENVIRONMENT_VAR: &str = "NAILS_ENV";

/// The number of spaces which comprise a tab in generated code.
pub const TAB_WIDTH: usize = 4;

/// Default location of the services file, relative to the app root.
pub const DEFAULT_SERVICES_PATH: &str = "application/services/services.php";

/// Default location of app console commands, relative to the app root.
pub const DEFAULT_COMMANDS_PATH: &str = "src/Console/Command";

/// Default location of app sources, relative to the app root.
pub const DEFAULT_SRC_PATH: &str = "src";

/// Default namespace of the application.
pub const DEFAULT_APP_NAMESPACE: &str = "App";

/// Token of the section new service definitions are inserted into.
pub const DEFAULT_SERVICES_TOKEN: &str = "SERVICES";

/// Relative path, inside a module, where its console commands live.
pub const MODULE_COMMANDS_DIR: &str = "src/Console/Command";

/// Namespace suffix, appended to a module namespace, for its console commands.
pub const MODULE_COMMANDS_NAMESPACE: &str = "Console\\Command";

/// Extension given to generated PHP sources.
pub const SOURCE_EXTENSION: &str = "php";

/// Namespace segment (and directory under `src`) for generated services.
pub const SERVICE_NAMESPACE: &str = "Service";
