// src/core/paths.rs

use crate::constants::{USER_CONFIG_DIR, USER_CONFIG_FILENAME};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Path \"{path}\" does not exist")]
    DoesNotExist { path: String },
    #[error("Path \"{path}\" does not exist and could not be created: {source}")]
    NotCreatable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Path \"{path}\" exists, but is not writable")]
    NotWritable { path: String },
    #[error("Path \"{path}\" exists, but is not a directory")]
    NotADirectory { path: String },
    #[error("Failed to expand path template '{template}': {reason}")]
    Expansion { template: String, reason: String },
}

/// Returns the path of the user-level configuration file, if the platform has
/// a config directory at all.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILENAME))
}

/// Expands `~` and environment variables in a configured path, then resolves
/// it against `base` when it is relative.
pub fn resolve_path(template: &str, base: &Path) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    let path = PathBuf::from(expanded.into_owned());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base.join(path))
    }
}

/// Renders a path for humans, without Windows UNC noise.
pub fn display(path: &Path) -> String {
    dunce::simplified(path).display().to_string()
}

/// Ensures `path` exists as a writable directory, creating it (and its
/// parents) if needed.
pub fn create_path(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        log::debug!("Creating directory '{}'", path.display());
        fs::create_dir_all(path).map_err(|e| PathError::NotCreatable {
            path: display(path),
            source: e,
        })?;
    }

    let metadata = fs::metadata(path).map_err(|e| PathError::NotCreatable {
        path: display(path),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(PathError::NotADirectory {
            path: display(path),
        });
    }
    if metadata.permissions().readonly() {
        return Err(PathError::NotWritable {
            path: display(path),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_relative_path_against_base() {
        let base = Path::new("/srv/app");
        let resolved = resolve_path("src/Console/Command", base).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/app/src/Console/Command"));
    }

    #[test]
    fn test_resolve_absolute_path_is_kept() {
        let resolved = resolve_path("/opt/nails/services.php", Path::new("/srv/app")).unwrap();
        assert_eq!(resolved, PathBuf::from("/opt/nails/services.php"));
    }

    #[test]
    fn test_resolve_path_with_unknown_variable_fails() {
        let result = resolve_path("$NAILS_CONSOLE_SURELY_UNDEFINED_VAR/x", Path::new("/"));
        assert!(matches!(result, Err(PathError::Expansion { .. })));
    }

    #[test]
    fn test_create_path_creates_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        create_path(&nested).unwrap();
        assert!(nested.is_dir());
        // A second call on an existing directory is fine.
        create_path(&nested).unwrap();
    }

    #[test]
    fn test_create_path_rejects_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            create_path(&file),
            Err(PathError::NotADirectory { .. })
        ));
    }
}
