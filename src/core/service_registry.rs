//! # Service Registry
//!
//! Safe, token-anchored edits of the app's `services.php` file.
//!
//! An edit happens in two phases, mirroring how the makers use it:
//!
//! 1. [`ServiceRegistry::open`] finds the `// GENERATOR[<token>]` line and remembers
//!    where it is. Without the token nothing is ever written.
//! 2. [`ServiceRegistry::write`] splices the new blocks in front of the token, re-sorts
//!    every section through [`ServiceDocument`], and replaces the file atomically via a
//!    temporary file in the same directory.
//!
//! The original file stays open (read-only) between the two phases and is closed
//! before the temporary file is moved over it.

use crate::core::errors::{ConsoleError, ConsoleResult};
use crate::core::service_document::ServiceDocument;
use crate::models::SectionKind;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = ".services.";
const TEMP_SUFFIX: &str = ".tmp";

/// An open services file with a located generator token.
#[derive(Debug)]
pub struct ServiceRegistry {
    path: PathBuf,
    token: String,
    indent: usize,
    token_offset: usize,
    handle: File,
}

impl ServiceRegistry {
    /// Opens `path` and locates the first `// GENERATOR[<token>]` line.
    ///
    /// # Errors
    /// * `FileAccess` if the file cannot be opened or read.
    /// * `TokenNotFound` if no line carries the token.
    pub fn open(path: &Path, token: &str) -> ConsoleResult<Self> {
        if token.trim().is_empty() {
            return Err(ConsoleError::Validation(
                "A generator token is required to edit the services file".to_string(),
            ));
        }

        let file = File::open(path).map_err(|e| ConsoleError::FileAccess {
            path: path.to_path_buf(),
            source: e,
        })?;

        let pattern = format!(r"^(\s*)// GENERATOR\[{}\]", regex::escape(token));
        let token_re = Regex::new(&pattern)
            .map_err(|e| ConsoleError::Validation(format!("Invalid generator token: {}", e)))?;

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        let mut offset = 0usize;
        let mut located = None;

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| ConsoleError::FileAccess {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            if read == 0 {
                break;
            }
            if let Some(indent) = token_re.captures(&line).and_then(|caps| caps.get(1)) {
                located = Some((indent.as_str().len(), offset));
                break;
            }
            offset += read;
        }

        let Some((indent, token_offset)) = located else {
            return Err(ConsoleError::TokenNotFound {
                path: path.to_path_buf(),
                token: token.to_string(),
            });
        };

        log::debug!(
            "Located GENERATOR[{}] in '{}' at byte {} (indent {})",
            token,
            path.display(),
            token_offset,
            indent
        );

        Ok(Self {
            path: path.to_path_buf(),
            token: token.to_string(),
            indent,
            token_offset,
            handle: reader.into_inner(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Width of the token line's indentation.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Parses the file's current content.
    pub fn document(&mut self) -> ConsoleResult<ServiceDocument> {
        let content = self.read_all()?;
        Ok(ServiceDocument::parse(&content))
    }

    /// Whether `id` is already defined in a section of the given kind.
    pub fn contains(&mut self, kind: SectionKind, id: &str) -> ConsoleResult<bool> {
        Ok(self.document()?.contains(kind, id))
    }

    /// Inserts `new_blocks` at the token, normalizes every section and replaces
    /// the file. Passing no blocks only normalizes.
    ///
    /// # Errors
    /// * `FileAccess` if the file can no longer be read.
    /// * `Write` if the temporary file cannot be written or moved into place. The
    ///   temporary file is left on disk and its path is reported.
    pub fn write(mut self, new_blocks: &[String]) -> ConsoleResult<()> {
        let content = self.read_all()?;
        let spliced = splice(&content, self.token_offset, new_blocks).ok_or_else(|| {
            ConsoleError::Validation(format!(
                "'{}' changed while it was being edited; aborting.",
                self.path.display()
            ))
        })?;

        let mut document = ServiceDocument::parse(&spliced);
        document.normalize();
        let rendered = document.render(self.indent);

        let Self { path, handle, .. } = self;
        let directory = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&directory)
            .map_err(|e| ConsoleError::Write {
                path: directory.clone(),
                source: e,
            })?;

        let written = temp
            .write_all(rendered.as_bytes())
            .and_then(|()| temp.as_file().sync_all());
        if let Err(e) = written {
            return Err(ConsoleError::Write {
                path: keep_for_diagnosis(temp),
                source: e,
            });
        }

        // Release the original before replacing it.
        drop(handle);

        temp.persist(&path).map_err(|e| ConsoleError::Write {
            path: keep_for_diagnosis(e.file),
            source: e.error,
        })?;

        log::debug!("Rewrote services file '{}'", path.display());
        Ok(())
    }

    fn read_all(&mut self) -> ConsoleResult<String> {
        let mut content = String::new();
        self.handle
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.handle.read_to_string(&mut content))
            .map_err(|e| ConsoleError::FileAccess {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(content)
    }
}

/// Opens, splices and rewrites in one go.
pub fn rewrite(path: &Path, token: &str, new_blocks: &[String]) -> ConsoleResult<()> {
    ServiceRegistry::open(path, token)?.write(new_blocks)
}

/// Inserts each block, followed by a line break, at byte `offset` of `content`.
/// Returns `None` if `offset` does not fall on a character boundary inside
/// `content`.
pub fn splice(content: &str, offset: usize, new_blocks: &[String]) -> Option<String> {
    let head = content.get(..offset)?;
    let tail = content.get(offset..)?;

    let mut out = String::with_capacity(content.len() + new_blocks.iter().map(|b| b.len() + 1).sum::<usize>());
    out.push_str(head);
    for block in new_blocks {
        out.push_str(block);
        if !block.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(tail);
    Some(out)
}

fn keep_for_diagnosis(temp: NamedTempFile) -> PathBuf {
    match temp.into_temp_path().keep() {
        Ok(kept) => {
            log::warn!(
                "Left temporary services file at '{}' for inspection.",
                kept.display()
            );
            kept
        }
        Err(e) => e.path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SERVICES: &str = "<?php

return [
    'services'  => [
        'zeta' => function () {
            return new \\App\\Service\\Zeta();
        },
        'alpha' => function () {
            return new \\App\\Service\\Alpha();
        },
        'mike' => function () {
            return new \\App\\Service\\Mike();
        },
        // GENERATOR[SERVICES]
    ],
    'models'    => [
        // GENERATOR[MODELS]
    ],
    'factories' => [
        // GENERATOR[FACTORIES]
    ],
    'resources' => [
        // GENERATOR[RESOURCES]
    ],
];
";

    fn write_fixture(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("services.php");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn section_ids(content: &str, kind: SectionKind) -> Vec<String> {
        ServiceDocument::parse(content)
            .sections()
            .filter(|b| b.kind == kind)
            .flat_map(|b| b.identifiers().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_open_records_indent_and_offset() {
        let (_dir, path) = write_fixture(SERVICES);
        let registry = ServiceRegistry::open(&path, "MODELS").unwrap();
        assert_eq!(registry.indent(), 8);
        assert_eq!(registry.token(), "MODELS");
        let offset = SERVICES.find("        // GENERATOR[MODELS]").unwrap();
        assert_eq!(registry.token_offset, offset);
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let dir = tempdir().unwrap();
        let result = ServiceRegistry::open(&dir.path().join("services.php"), "SERVICES");
        assert!(matches!(result, Err(ConsoleError::FileAccess { .. })));
    }

    #[test]
    fn test_missing_token_fails_and_leaves_file_untouched() {
        let content = SERVICES.replace("        // GENERATOR[SERVICES]\n", "");
        let (_dir, path) = write_fixture(&content);

        let result = rewrite(&path, "SERVICES", &["        'new' => function () {},".to_string()]);

        assert!(matches!(result, Err(ConsoleError::TokenNotFound { ref token, .. }) if token == "SERVICES"));
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_rewrite_sorts_section() {
        let (_dir, path) = write_fixture(SERVICES);
        rewrite(&path, "SERVICES", &[]).unwrap();

        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(section_ids(&out, SectionKind::Services), vec!["alpha", "mike", "zeta"]);

        // Exactly one token line, directly after the last definition.
        assert_eq!(out.matches("// GENERATOR[SERVICES]").count(), 1);
        assert!(out.contains(
            "            return new \\App\\Service\\Zeta();\n        },\n        // GENERATOR[SERVICES]\n    ],\n"
        ));
    }

    #[test]
    fn test_rewrite_without_blocks_is_idempotent() {
        let (_dir, path) = write_fixture(SERVICES);
        rewrite(&path, "SERVICES", &[]).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        rewrite(&path, "SERVICES", &[]).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        for kind in SectionKind::ALL {
            let mut before = section_ids(SERVICES, kind);
            before.sort();
            assert_eq!(section_ids(&second, kind), before);
        }
    }

    #[test]
    fn test_rewrite_inserts_blocks_in_sorted_position() {
        let (_dir, path) = write_fixture(SERVICES);
        let block = "        'kilo' => function () {\n            return new \\App\\Service\\Kilo();\n        },".to_string();

        rewrite(&path, "SERVICES", &[block]).unwrap();

        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(
            section_ids(&out, SectionKind::Services),
            vec!["alpha", "kilo", "mike", "zeta"]
        );
        assert!(out.contains("return new \\App\\Service\\Kilo();"));
    }

    #[test]
    fn test_rewrite_into_another_section() {
        let (_dir, path) = write_fixture(SERVICES);
        let blocks = vec![
            "        'Widget' => function () {\n            return 1;\n        },".to_string(),
            "        'Gadget' => function () {\n            return 2;\n        },".to_string(),
        ];

        rewrite(&path, "FACTORIES", &blocks).unwrap();

        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(section_ids(&out, SectionKind::Factories), vec!["Gadget", "Widget"]);
        assert!(out.contains("        },\n        // GENERATOR[FACTORIES]\n    ],\n    'resources'"));
        // Other sections keep their single token.
        assert_eq!(out.matches("// GENERATOR[MODELS]").count(), 1);
    }

    #[test]
    fn test_token_lines_use_recorded_indent() {
        let content = SERVICES.replace("        // GENERATOR[SERVICES]", "      // GENERATOR[SERVICES]");
        let (_dir, path) = write_fixture(&content);
        rewrite(&path, "SERVICES", &[]).unwrap();
        let out = fs::read_to_string(&path).unwrap();
        assert!(out.contains("\n      // GENERATOR[MODELS]\n"));
    }

    #[test]
    fn test_contains_reports_existing_identifier() {
        let (_dir, path) = write_fixture(SERVICES);
        let mut registry = ServiceRegistry::open(&path, "SERVICES").unwrap();
        assert!(registry.contains(SectionKind::Services, "mike").unwrap());
        assert!(!registry.contains(SectionKind::Models, "mike").unwrap());
    }

    #[test]
    fn test_no_temporary_files_left_on_success() {
        let (dir, path) = write_fixture(SERVICES);
        rewrite(&path, "SERVICES", &[]).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_replace_keeps_temporary_file() {
        let (dir, path) = write_fixture(SERVICES);
        let registry = ServiceRegistry::open(&path, "SERVICES").unwrap();

        // A non-empty directory cannot be renamed over.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "x").unwrap();

        match registry.write(&[]) {
            Err(ConsoleError::Write { path: kept, .. }) => {
                assert!(kept.is_file());
                assert_eq!(kept.parent(), Some(dir.path()));
                let name = kept.file_name().unwrap().to_string_lossy().to_string();
                assert!(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX));
                assert_eq!(section_ids(&fs::read_to_string(&kept).unwrap(), SectionKind::Services).len(), 3);
            }
            other => panic!("expected a write error, got {other:?}"),
        }
        assert!(path.is_dir());
    }

    #[test]
    fn test_splice_rejects_out_of_range_offset() {
        assert!(splice("abc", 10, &[]).is_none());
        assert_eq!(splice("ab\ncd\n", 3, &["X".to_string()]).unwrap(), "ab\nX\ncd\n");
    }
}
