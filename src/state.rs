// src/state.rs

use crate::cli::dispatcher::CommandRegistry;
use crate::core::config_loader::ConfigLoader;
use crate::core::errors::ConsoleResult;
use crate::core::paths::{self, PathError};
use crate::models::ConsoleConfig;
use std::path::{Path, PathBuf};

/// Everything a command handler needs. Built once by the binary and passed down
/// by reference.
#[derive(Debug)]
pub struct AppContext {
    pub config: ConsoleConfig,
    /// `false` when `--no-interaction` was given; prompts then take their defaults.
    pub interactive: bool,
    pub registry: CommandRegistry,
}

impl AppContext {
    /// Loads the configuration for `app_root` and builds the command registry.
    pub fn bootstrap(
        app_root: &Path,
        interactive: bool,
        environment_override: Option<String>,
    ) -> ConsoleResult<Self> {
        let config = ConfigLoader::new(app_root)
            .with_environment_override(environment_override)
            .load()?;
        log::debug!(
            "Bootstrapped '{}' in {} mode",
            config.app_root.display(),
            config.environment
        );
        Ok(Self::with_config(config, interactive))
    }

    pub fn with_config(config: ConsoleConfig, interactive: bool) -> Self {
        let registry = CommandRegistry::build(&config);
        Self {
            config,
            interactive,
            registry,
        }
    }
}

/// Resolves the app root: `--app-path` if given, else the working directory.
pub fn resolve_app_root(app_path: Option<&Path>) -> ConsoleResult<PathBuf> {
    let candidate = match app_path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|_| PathError::DoesNotExist {
            path: ".".to_string(),
        })?,
    };
    if !candidate.exists() {
        return Err(PathError::DoesNotExist {
            path: paths::display(&candidate),
        }
        .into());
    }
    if !candidate.is_dir() {
        return Err(PathError::NotADirectory {
            path: paths::display(&candidate),
        }
        .into());
    }
    let root = dunce::canonicalize(&candidate).map_err(|_| PathError::DoesNotExist {
        path: paths::display(&candidate),
    })?;
    Ok(root)
}
