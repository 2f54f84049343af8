//! # Config Loader
//!
//! Builds the [`ConsoleConfig`] the console runs with. Layers are applied in order,
//! later ones winning:
//!
//! 1. built-in defaults,
//! 2. the user file (`<config dir>/nails/console.toml`),
//! 3. the app file (`<app root>/console.toml`),
//! 4. the `NAILS_ENV` environment variable, for the environment only.
//!
//! Lists (`locations`, `modules`) are concatenated, `aliases` are merged key by key.

use crate::{
    constants::{
        APP_CONFIG_FILENAME, DEFAULT_APP_NAMESPACE, DEFAULT_COMMANDS_PATH, DEFAULT_SERVICES_PATH,
        DEFAULT_SERVICES_TOKEN, DEFAULT_SRC_PATH, ENVIRONMENT_VAR, MODULE_COMMANDS_DIR,
        MODULE_COMMANDS_NAMESPACE,
    },
    core::paths::{self, PathError},
    models::{
        CommandLocation, ConfigFile, ConsoleConfig, Environment, LocationEntry, ResolvedPaths,
    },
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Where the framework's own commands live, relative to the app root.
const COMMON_COMMANDS_PATH: &str = "vendor/nails/common/src/Common/Console/Command";
const COMMON_COMMANDS_NAMESPACE: &str = "Nails\\Common\\Console\\Command";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value in {origin}: {reason}")]
    InvalidEnvironment { origin: String, reason: String },
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Loads and merges the configuration layers for one app root.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    app_root: PathBuf,
    user_config: Option<PathBuf>,
    environment_override: Option<String>,
}

impl ConfigLoader {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            user_config: paths::user_config_path(),
            environment_override: None,
        }
    }

    /// Replaces the user-level config file (or disables it with `None`).
    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    /// Sets the value read from `NAILS_ENV`, if any.
    pub fn with_environment_override(mut self, value: Option<String>) -> Self {
        self.environment_override = value;
        self
    }

    pub fn load(&self) -> Result<ConsoleConfig, ConfigError> {
        let mut merged = ConfigFile::default();

        if let Some(user_path) = &self.user_config {
            if let Some(layer) = read_layer(user_path)? {
                log::debug!("Loaded user configuration from '{}'", user_path.display());
                merged = merge(merged, layer);
            }
        }

        let app_path = self.app_root.join(APP_CONFIG_FILENAME);
        if let Some(layer) = read_layer(&app_path)? {
            log::debug!("Loaded app configuration from '{}'", app_path.display());
            merged = merge(merged, layer);
        }

        resolve(&self.app_root, merged, self.environment_override.as_deref())
    }
}

/// Reads one layer. A missing file is not an error.
pub fn read_layer(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: paths::display(path),
        source: e,
    })?;
    let layer = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: paths::display(path),
        source: e,
    })?;
    Ok(Some(layer))
}

/// Applies `overlay` on top of `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let mut locations = base.locations;
    locations.extend(overlay.locations);
    let mut modules = base.modules;
    modules.extend(overlay.modules);
    let mut aliases = base.aliases;
    aliases.extend(overlay.aliases);

    ConfigFile {
        environment: overlay.environment.or(base.environment),
        app_namespace: overlay.app_namespace.or(base.app_namespace),
        services_token: overlay.services_token.or(base.services_token),
        paths: crate::models::PathsFile {
            services: overlay.paths.services.or(base.paths.services),
            commands: overlay.paths.commands.or(base.paths.commands),
            src: overlay.paths.src.or(base.paths.src),
            resources: overlay.paths.resources.or(base.paths.resources),
        },
        locations,
        modules,
        aliases,
    }
}

/// Turns a merged layer into the final configuration: fills defaults, expands
/// and resolves paths, and builds the ordered command locations (framework,
/// configured, modules, app).
pub fn resolve(
    app_root: &Path,
    file: ConfigFile,
    environment_override: Option<&str>,
) -> Result<ConsoleConfig, ConfigError> {
    let environment = match environment_override {
        Some(value) if !value.trim().is_empty() => {
            value
                .parse::<Environment>()
                .map_err(|reason| ConfigError::InvalidEnvironment {
                    origin: ENVIRONMENT_VAR.to_string(),
                    reason,
                })?
        }
        _ => file.environment.unwrap_or_default(),
    };

    let app_namespace = file
        .app_namespace
        .unwrap_or_else(|| DEFAULT_APP_NAMESPACE.to_string())
        .trim_end_matches('\\')
        .to_string();

    let resolve_or = |value: Option<String>, default: &str| -> Result<PathBuf, PathError> {
        paths::resolve_path(value.as_deref().unwrap_or(default), app_root)
    };

    let resolved_paths = ResolvedPaths {
        services: resolve_or(file.paths.services, DEFAULT_SERVICES_PATH)?,
        commands: resolve_or(file.paths.commands, DEFAULT_COMMANDS_PATH)?,
        src: resolve_or(file.paths.src, DEFAULT_SRC_PATH)?,
        resources: match file.paths.resources {
            Some(dir) => Some(paths::resolve_path(&dir, app_root)?),
            None => None,
        },
    };

    let mut locations = vec![CommandLocation::new(
        paths::resolve_path(COMMON_COMMANDS_PATH, app_root)?,
        COMMON_COMMANDS_NAMESPACE,
    )];
    for LocationEntry { path, namespace } in file.locations {
        locations.push(CommandLocation::new(
            paths::resolve_path(&path, app_root)?,
            namespace,
        ));
    }
    for module in file.modules {
        let module_root = paths::resolve_path(&module.path, app_root)?;
        let namespace = format!(
            "{}\\{}",
            module.namespace.trim_end_matches('\\'),
            MODULE_COMMANDS_NAMESPACE
        );
        log::debug!("Module '{}' contributes namespace '{}'", module.name, namespace);
        locations.push(CommandLocation::new(
            module_root.join(MODULE_COMMANDS_DIR),
            namespace,
        ));
    }
    locations.push(CommandLocation::new(
        resolved_paths.commands.clone(),
        format!("{}\\{}", app_namespace, MODULE_COMMANDS_NAMESPACE),
    ));

    Ok(ConsoleConfig {
        app_root: app_root.to_path_buf(),
        environment,
        app_namespace,
        services_token: file
            .services_token
            .unwrap_or_else(|| DEFAULT_SERVICES_TOKEN.to_string()),
        paths: resolved_paths,
        locations,
        aliases: file.aliases,
    })
}
