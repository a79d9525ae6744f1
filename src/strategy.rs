//! Choice between artifact-based and token-based symbol extraction.

use std::path::{Path, PathBuf};

use crate::discovery;

/// How symbols for a module are extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Identifier tokens from the front-end: literal names, no resolution.
    Lexical,
    /// Name-resolved occurrences from semantic artifacts under a root.
    Semantic {
        /// Directory (or single file) holding the package's artifacts.
        artifact_root: PathBuf,
    },
}

impl ExtractionStrategy {
    /// Semantic when at least one artifact exists under `artifact_root`,
    /// lexical otherwise. Modules missing from a semantic root still get
    /// token extraction from `Environment::extract`.
    pub fn choose(artifact_root: &Path, extension: &str) -> Self {
        if discovery::discover_artifacts(artifact_root, extension).is_empty() {
            tracing::debug!("no artifacts under {}, using token extraction", artifact_root.display());
            return Self::Lexical;
        }
        return Self::Semantic {
            artifact_root: artifact_root.to_path_buf(),
        };
    }
}
