//! # Command Locator
//!
//! Turns directories of command sources into fully-qualified class names. A file at
//! `<root>/Make/Console.php` under the namespace `Nails\Console\Command` becomes
//! `Nails\Console\Command\Make\Console`.
//!
//! Nothing here checks that a class can actually be run; that decision belongs to
//! the command registry.

use crate::models::{CommandLocation, DiscoveredCommand};
use std::path::{Component, Path};
use walkdir::WalkDir;

/// The separator used between namespace segments.
pub const NAMESPACE_SEPARATOR: &str = "\\";

/// Walks every location in order and returns the class names found, in
/// traversal order. Duplicates across locations are kept.
pub fn locate(locations: &[CommandLocation]) -> Vec<DiscoveredCommand> {
    let mut discovered = Vec::new();
    for location in locations {
        let found = locate_in(location);
        log::debug!(
            "Found {} command class(es) in '{}' ({})",
            found.len(),
            location.root.display(),
            location.namespace
        );
        discovered.extend(found);
    }
    discovered
}

/// Scans a single location. A missing root directory yields nothing.
pub fn locate_in(location: &CommandLocation) -> Vec<DiscoveredCommand> {
    if !location.root.is_dir() {
        log::debug!(
            "Command location '{}' does not exist, skipping.",
            location.root.display()
        );
        return Vec::new();
    }

    let walker = WalkDir::new(&location.root).sort_by_file_name();

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry while locating commands: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&location.root) else {
            continue;
        };
        if let Some(class) = class_name_for(&location.namespace, relative) {
            found.push(DiscoveredCommand::new(class));
        }
    }
    found
}

/// Builds the class name for a file path relative to its location root:
/// namespace, then each directory, then the file stem.
pub fn class_name_for(namespace: &str, relative: &Path) -> Option<String> {
    let stem = relative.file_stem()?.to_str()?;

    let mut segments: Vec<&str> = namespace
        .split(NAMESPACE_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            if let Component::Normal(segment) = component {
                segments.push(segment.to_str()?);
            }
        }
    }
    segments.push(stem);

    Some(segments.join(NAMESPACE_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php\n").unwrap();
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        let location = CommandLocation::new(dir.path(), "App\\Console\\Command");
        assert!(locate(&[location]).is_empty());
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        let location = CommandLocation::new(dir.path().join("nope"), "App\\Console\\Command");
        assert!(locate(&[location]).is_empty());
    }

    #[test]
    fn test_nested_files_map_to_namespaces() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Install.php");
        touch(dir.path(), "Make/Console.php");
        touch(dir.path(), "Make/Model/Admin.php");

        let location = CommandLocation::new(dir.path(), "Nails\\Console\\Command");
        let names: Vec<String> = locate(&[location])
            .into_iter()
            .map(|c| c.to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "Nails\\Console\\Command\\Install",
                "Nails\\Console\\Command\\Make\\Console",
                "Nails\\Console\\Command\\Make\\Model\\Admin",
            ]
        );
    }

    #[test]
    fn test_one_class_per_regular_file() {
        let dir = tempdir().unwrap();
        let files = ["A.php", "b/B.php", "b/c/C.inc", "d/D"];
        for f in files {
            touch(dir.path(), f);
        }
        fs::create_dir_all(dir.path().join("empty/dir")).unwrap();

        let location = CommandLocation::new(dir.path(), "App");
        let found = locate(&[location]);

        assert_eq!(found.len(), files.len());
        let mut short: Vec<&str> = found.iter().map(|c| c.short_name()).collect();
        short.sort();
        assert_eq!(short, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_overlapping_locations_are_not_deduplicated() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Sync.php");

        let locations = vec![
            CommandLocation::new(dir.path(), "App\\Console\\Command"),
            CommandLocation::new(dir.path(), "App\\Console\\Command"),
        ];
        let found = locate(&locations);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0], found[1]);
    }

    #[test]
    fn test_trailing_namespace_separator_is_ignored() {
        let name = class_name_for("Nails\\Auth\\", Path::new("Reset.php")).unwrap();
        assert_eq!(name, "Nails\\Auth\\Reset");
    }

    #[test]
    fn test_empty_namespace_has_no_leading_separator() {
        let name = class_name_for("", Path::new("Tools/Clean.php")).unwrap();
        assert_eq!(name, "Tools\\Clean");
    }

    #[test]
    fn test_only_last_extension_is_dropped() {
        let name = class_name_for("App", Path::new("Archive.tar.gz")).unwrap();
        assert_eq!(name, "App\\Archive.tar");
    }
}
