//! # Maker
//!
//! Building blocks shared by the `make:*` commands: turning user input into class
//! names, validating them, writing files, and undoing a half-finished run.

use crate::constants::TAB_WIDTH;
use crate::core::errors::{ConsoleError, ConsoleResult};
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use scopeguard::ScopeGuard;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref LIST_SEPARATOR_RE: Regex = Regex::new(r"[,; ]").expect("list regex is valid");
    static ref SEGMENT_SEPARATOR_RE: Regex = Regex::new(r"[:\\/]").expect("segment regex is valid");
    static ref IDENTIFIER_RE: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid");
}

/// Generates `n` levels of indentation.
pub fn tabs(n: usize) -> String {
    " ".repeat(TAB_WIDTH * n)
}

/// Uppercases the first character of `s`.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits a user-supplied list of class names (`,`, `;` or space separated) into
/// `/`-joined paths with each segment capitalised. `foo:bar, baz` becomes
/// `["Baz", "Foo/Bar"]` when sorted.
pub fn parse_class_names(input: &str, sort: bool) -> Vec<String> {
    let mut classes: Vec<String> = LIST_SEPARATOR_RE
        .split(input)
        .filter_map(|item| {
            let segments: Vec<String> = SEGMENT_SEPARATOR_RE
                .split(item.trim())
                .filter(|segment| !segment.is_empty())
                .map(ucfirst)
                .collect();
            if segments.is_empty() {
                None
            } else {
                Some(segments.join("/"))
            }
        })
        .collect();

    if sort {
        classes.sort();
    }
    classes
}

/// Checks that every `/` or `\` separated segment of `class_name` is a valid
/// identifier.
///
/// # Errors
/// Returns `Validation` with a message pointing at the offending segment.
pub fn validate_class_name(class_name: &str) -> ConsoleResult<()> {
    let normalized = class_name.replace('/', "\\");
    let mut position = 0;
    for segment in normalized.split('\\') {
        if !IDENTIFIER_RE.is_match(segment) {
            let pad = " ".repeat(position);
            return Err(ConsoleError::Validation(format!(
                "Invalid class name\n{pad}↓\n{normalized}\n{pad}↑"
            )));
        }
        position += segment.len() + 1;
    }
    Ok(())
}

/// Creates (or replaces) a file with `contents`.
///
/// # Errors
/// Returns `Write` if the file cannot be opened or written.
pub fn create_file(path: &Path, contents: &str) -> ConsoleResult<()> {
    let mut file = File::create(path).map_err(|e| ConsoleError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.write_all(contents.as_bytes())
        .map_err(|e| ConsoleError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    log::debug!("Created '{}'", path.display());
    Ok(())
}

/// Files written during one maker run. Unless [`commit`] is called, every
/// tracked file is deleted when the guard goes out of scope.
pub type CreatedFiles = ScopeGuard<Vec<PathBuf>, fn(Vec<PathBuf>)>;

/// Starts tracking created files.
pub fn track_created_files() -> CreatedFiles {
    scopeguard::guard(Vec::new(), remove_created_files as fn(Vec<PathBuf>))
}

/// Keeps the tracked files and returns their paths.
pub fn commit(created: CreatedFiles) -> Vec<PathBuf> {
    ScopeGuard::into_inner(created)
}

fn remove_created_files(paths: Vec<PathBuf>) {
    if paths.is_empty() {
        return;
    }
    println!(
        "{}",
        t!("maker.info.rolling_back").red()
    );
    for path in paths.iter().rev() {
        match std::fs::remove_file(path) {
            Ok(()) => log::debug!("Removed '{}'", path.display()),
            Err(e) => log::warn!("Could not remove '{}': {}", path.display(), e),
        }
    }
}
