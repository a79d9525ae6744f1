/// Crate-level error types for symbol extraction.
use std::path::PathBuf;

/// Every failure names the artifact, module, or file it concerns so a
/// package-level indexing run can report it without a debugger.
///
/// `InternalInvariant` is a separate category: it signals a logic bug in the
/// crate, never bad input.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as symindex::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Artifact exists but its contents are inconsistent.
    #[error("artifact corrupt: {}: {reason}", path.display())]
    ArtifactCorrupt {
        /// Artifact file that failed validation.
        path: PathBuf,
        /// Description of the inconsistency.
        reason: String,
    },

    /// Artifact could not be read or decoded.
    #[error("artifact unreadable: {}: {reason}", path.display())]
    ArtifactRead {
        /// Artifact file that failed to load.
        path: PathBuf,
        /// Underlying read or decode failure.
        reason: String,
    },

    /// Artifact was written by an incompatible producer.
    #[error("artifact version {found} (expected {expected}): {}", path.display())]
    ArtifactVersion {
        /// Version this crate understands.
        expected: u32,
        /// Version recorded in the artifact.
        found: u32,
        /// Artifact file with the mismatched version.
        path: PathBuf,
    },

    /// Build metadata exists but cannot be used.
    #[error("build metadata: {}: {reason}", path.display())]
    BuildMetadata {
        /// Metadata file that failed.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Front-end session failed outside of parsing.
    #[error("front-end: {reason}")]
    FrontEnd {
        /// Description of the failure.
        reason: String,
    },

    /// A lexer token and the identifier extractor disagree.
    #[error("internal invariant `{invariant}` violated: {detail}")]
    InternalInvariant {
        /// Description of the offending value.
        detail: String,
        /// Name of the invariant that failed.
        invariant: &'static str,
    },

    /// A dotted module name has an empty or non-identifier segment.
    #[error("invalid module name: `{name}`")]
    InvalidModuleName {
        /// Text that failed to parse.
        name: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// No source file for a module under the component root or search path.
    #[error("module `{module}` not found (searched {})", searched.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(", "))]
    ModuleNotFound {
        /// Dotted module name that was targeted.
        module: String,
        /// Candidate files that were tried.
        searched: Vec<PathBuf>,
    },

    /// Tree-sitter failed to parse a source file.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No tree-sitter grammar (or no summary support) for this extension.
    #[error("no grammar for extension: .{ext}")]
    UnsupportedLanguage {
        /// File extension without the leading dot.
        ext: String,
    },
}

impl Error {
    /// True for errors that indicate a bug in this crate rather than bad input.
    pub const fn is_internal_invariant(&self) -> bool {
        return matches!(self, Self::InternalInvariant { .. });
    }
}
