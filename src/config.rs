//! Per-package settings read from `.symindex.toml`.

use std::path::Path;

use crate::error::Error;

/// Name of the per-package configuration file.
pub const CONFIG_FILE: &str = ".symindex.toml";

/// Package-level extraction settings loaded from `.symindex.toml`.
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extension (without dot) that marks semantic artifact files.
    pub artifact_extension: String,
    /// Build-output directory used when nothing is found under `dist_layout`.
    pub dist_default: String,
    /// Directory whose first entry is guessed as the build-output directory.
    pub dist_layout: String,
    /// Component whose flags configure the front-end.
    pub library_component: String,
    /// Extension (without dot) of module source files.
    pub source_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            artifact_extension: "sema".to_string(),
            dist_default: "dist/build/default".to_string(),
            dist_layout: "dist/build".to_string(),
            library_component: "lib".to_string(),
            source_extension: "rs".to_string(),
        };
    }
}

impl Config {
    /// Load config from `.symindex.toml` in the given package root.
    /// Returns defaults if the file doesn't exist. A file that exists but is
    /// malformed is an error; it never silently falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        return Ok(toml::from_str(&content)?);
    }
}
