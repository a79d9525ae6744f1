//! Symbol occurrence extraction for corpus-wide code indexing.
//!
//! Two strategies produce the same [`LocatedSym`] records:
//!
//! - **Semantic**: persisted, name-resolved artifacts are discovered under a
//!   root, read in order with one [`NameResolutionContext`], and every
//!   resolved, module-scoped occurrence becomes a `Module.name` record.
//! - **Lexical**: a module's token stream is filtered to lower-case
//!   identifiers, recorded with their literal text.
//!
//! [`Environment`] runs front-end sessions and exposes both, plus a module's
//! declared imports and exports.

mod artifact;
mod build_meta;
mod collector;
mod config;
mod discovery;
mod environment;
mod error;
mod frontend;
mod grammar;
mod interface;
mod legacy;
mod lexer;
mod outline;
mod strategy;
mod types;

pub use artifact::{
    ARTIFACT_FORMAT_VERSION, Identifier, LoadedArtifact, Name, NameId, NameResolutionContext, Occurrence,
    OccurrenceBucket, read_artifact, read_artifacts,
};
pub use build_meta::{BuildMetadata, ComponentFlags, ComponentKind, DistDirMetadata, guess_dist_dir, library_flags};
pub use collector::{collect_module, collect_occurrences, collect_package};
pub use config::{CONFIG_FILE, Config};
pub use discovery::discover_artifacts;
pub use environment::{Environment, ErrorLog, ModuleTarget, TracingErrorLog};
pub use error::Error;
pub use frontend::{FrontEnd, TreeSitterFrontEnd};
pub use grammar::{language_for_extension, language_for_path};
pub use interface::{ExportItem, ModuleSummary, exports, imports};
pub use legacy::{extract_from_tokens, identifier_text, is_identifier_token};
pub use lexer::{Token, TokenKind};
pub use strategy::ExtractionStrategy;
pub use types::{LocatedSym, ModuleName, Package, RefKind, Span, SymName};
