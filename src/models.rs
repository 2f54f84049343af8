// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// --- COMMAND DISCOVERY MODELS ---

/// A directory to scan for console commands, paired with the namespace its
/// files live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLocation {
    pub root: PathBuf,
    pub namespace: String,
}

impl CommandLocation {
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }
}

/// A fully-qualified class identifier found on disk, e.g.
/// `App\Console\Command\Foo\Bar`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DiscoveredCommand(String);

impl DiscoveredCommand {
    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last namespace segment, i.e. the bare class name.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for DiscoveredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- SERVICE REGISTRY MODELS ---

/// The four top-level sections of a `services.php` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Services,
    Models,
    Factories,
    Resources,
}

impl SectionKind {
    pub const ALL: [Self; 4] = [
        Self::Services,
        Self::Models,
        Self::Factories,
        Self::Resources,
    ];

    /// The array key used in the file, e.g. `services`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Models => "models",
            Self::Factories => "factories",
            Self::Resources => "resources",
        }
    }

    /// The generator token re-emitted at the end of the section, e.g. `SERVICES`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Services => "SERVICES",
            Self::Models => "MODELS",
            Self::Factories => "FACTORIES",
            Self::Resources => "RESOURCES",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// --- CONFIGURATION MODELS (FOR TOML) ---

/// The environment the application runs in. Maker commands are restricted to
/// `Development`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "DEVELOPMENT",
            Self::Staging => "STAGING",
            Self::Production => "PRODUCTION",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("Unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A statically configured command location.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LocationEntry {
    pub path: String,
    pub namespace: String,
}

/// An installed framework module. Each one contributes a command location.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ModuleEntry {
    pub name: String,
    pub path: String,
    /// Root namespace of the module, e.g. `Nails\Auth\`.
    pub namespace: String,
}

/// The `[paths]` table of a config file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PathsFile {
    pub services: Option<String>,
    pub commands: Option<String>,
    pub src: Option<String>,
    pub resources: Option<String>,
}

/// One configuration layer as written on disk. Every field is optional so
/// layers can be merged.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub environment: Option<Environment>,
    pub app_namespace: Option<String>,
    pub services_token: Option<String>,
    #[serde(default)]
    pub paths: PathsFile,
    #[serde(default)]
    pub locations: Vec<LocationEntry>,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Paths after expansion and resolution against the app root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub services: PathBuf,
    pub commands: PathBuf,
    pub src: PathBuf,
    pub resources: Option<PathBuf>,
}

/// The final, merged configuration the console runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub app_root: PathBuf,
    pub environment: Environment,
    pub app_namespace: String,
    pub services_token: String,
    pub paths: ResolvedPaths,
    pub locations: Vec<CommandLocation>,
    pub aliases: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_command_short_name() {
        let cmd = DiscoveredCommand::new("App\\Console\\Command\\Foo\\Bar");
        assert_eq!(cmd.short_name(), "Bar");
        assert_eq!(DiscoveredCommand::new("Bare").short_name(), "Bare");
    }

    #[test]
    fn test_section_kind_lookup() {
        assert_eq!(SectionKind::from_key("models"), Some(SectionKind::Models));
        assert_eq!(SectionKind::from_token("RESOURCES"), Some(SectionKind::Resources));
        assert_eq!(SectionKind::from_key("widgets"), None);
    }

    #[test]
    fn test_environment_parsing_is_lenient() {
        assert_eq!("DEVELOPMENT".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!(" prod ".parse::<Environment>(), Ok(Environment::Production));
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_config_file_rejects_unknown_fields() {
        let result: Result<ConfigFile, _> = toml::from_str("enviroment = \"production\"");
        assert!(result.is_err());
    }
}
