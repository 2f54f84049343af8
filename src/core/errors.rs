// src/core/errors.rs

use crate::core::config_loader::ConfigError;
use crate::core::paths::PathError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the scaffolding and registry-rewriting operations. They are
/// always propagated to the command that triggered them.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The services file or a template could not be opened or read.
    #[error("Failed to open '{}' for reading: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The services file has no `// GENERATOR[<token>]` line.
    #[error(
        "Services file '{}' does not contain the generator token (i.e // GENERATOR[{token}]). This token is required so that the tool can safely insert new definitions.",
        .path.display()
    )]
    TokenNotFound { path: PathBuf, token: String },
    /// Writing or moving a generated file failed.
    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A required directory is missing, cannot be created or is read-only.
    #[error(transparent)]
    Path(#[from] PathError),
    /// User supplied input is not acceptable (e.g. an invalid class name).
    #[error("{0}")]
    Validation(String),
    /// A file the tool was about to generate is already present.
    #[error("A file at \"{}\" already exists", .path.display())]
    FileExists { path: PathBuf },
    /// The configuration layers could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
