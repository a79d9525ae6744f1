//! Build-system metadata: per-component compiler flags.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;

/// Metadata file expected inside the build-output directory.
pub const COMPONENTS_FILE: &str = "components.toml";

/// What a component builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Benchmark suite.
    Benchmark,
    /// Executable.
    Executable,
    /// Library; its flags configure extraction.
    Library,
    /// Test suite.
    Test,
}

/// Compiler flags recorded for one component.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ComponentFlags {
    /// Flags passed to the front-end.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Component kind.
    pub kind: ComponentKind,
    /// Component name.
    pub name: String,
}

/// Source of per-component flags for a package.
pub trait BuildMetadata {
    /// Flags for every component of the package at `package_root`, read from
    /// the build-output directory `dist_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is missing or malformed.
    fn component_flags(&self, package_root: &Path, dist_dir: &Path) -> Result<Vec<ComponentFlags>, Error>;
}

/// Reads `components.toml` from the build-output directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistDirMetadata;

/// Raw TOML structure for `components.toml`.
#[derive(serde::Deserialize)]
struct ComponentsFile {
    /// One table per component.
    #[serde(default)]
    component: Vec<ComponentFlags>,
}

impl BuildMetadata for DistDirMetadata {
    fn component_flags(&self, package_root: &Path, dist_dir: &Path) -> Result<Vec<ComponentFlags>, Error> {
        let path = package_root.join(dist_dir).join(COMPONENTS_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| return Error::BuildMetadata {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let file: ComponentsFile = toml::from_str(&content).map_err(|e| return Error::BuildMetadata {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        return Ok(file.component);
    }
}

/// Guess the build-output directory: the first entry (by name) under the
/// configured layout directory, else the configured default. Relative to
/// `package_root`.
pub fn guess_dist_dir(package_root: &Path, config: &Config) -> PathBuf {
    let layout = PathBuf::from(&config.dist_layout);
    let first = std::fs::read_dir(package_root.join(&layout)).ok().and_then(|entries| {
        return entries
            .filter_map(Result::ok)
            .filter(|e| return e.path().is_dir())
            .map(|e| return e.file_name())
            .min();
    });

    let guessed = first.map_or_else(|| return PathBuf::from(&config.dist_default), |name| return layout.join(name));
    tracing::debug!("build output directory guessed as {}", guessed.display());
    return guessed;
}

/// Flags of the library component: the one named like the configured
/// library, else the first library. `None` if the package has no library.
pub fn library_flags(components: &[ComponentFlags], config: &Config) -> Option<Vec<String>> {
    let libraries = || return components.iter().filter(|c| return c.kind == ComponentKind::Library);
    return libraries()
        .find(|c| return c.name == config.library_component)
        .or_else(|| return libraries().next())
        .map(|c| return c.flags.clone());
}
