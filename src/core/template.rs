// src/core/template.rs

use crate::core::errors::{ConsoleError, ConsoleResult};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

lazy_static! {
    // `{{FIELD_NAME}}` placeholders.
    static ref FIELD_RE: Regex = Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("field regex is valid");
}

/// The source templates shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Console,
    Service,
}

impl Template {
    /// File name looked up in an override directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Console => "console.php",
            Self::Service => "service.php",
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            Self::Console => include_str!("../../resources/templates/console.php"),
            Self::Service => include_str!("../../resources/templates/service.php"),
        }
    }
}

/// Loads a template, preferring `<resources>/template/<file>` when a resources
/// directory is configured and the file exists there.
///
/// # Errors
/// Returns `FileAccess` if an override exists but cannot be read.
pub fn load(template: Template, resources: Option<&Path>) -> ConsoleResult<Cow<'static, str>> {
    if let Some(dir) = resources {
        let candidate = dir.join("template").join(template.file_name());
        if candidate.is_file() {
            log::debug!("Using template override '{}'", candidate.display());
            let content = fs::read_to_string(&candidate).map_err(|e| ConsoleError::FileAccess {
                path: candidate.clone(),
                source: e,
            })?;
            return Ok(Cow::Owned(content));
        }
    }
    Ok(Cow::Borrowed(template.embedded()))
}

/// Substitutes `{{FIELD}}` placeholders. Field names are matched on their
/// uppercase form and values are inserted verbatim. Unknown placeholders are
/// left as they are.
pub fn render<I, K, V>(template: &str, fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let values: HashMap<String, String> = fields
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_uppercase(), v.into()))
        .collect();

    FIELD_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| values.get(name.as_str()))
                .cloned()
                .unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}
