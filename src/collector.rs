//! Turn loaded artifacts into qualified, located symbol occurrences.

use std::path::Path;

use crate::artifact::{self, Identifier, LoadedArtifact, NameResolutionContext};
use crate::discovery;
use crate::error::Error;
use crate::types::{LocatedSym, ModuleName, Package, SymName};

/// Every located occurrence of a module-scoped, resolved name in `artifact`.
///
/// Unresolved identifiers and names without an owning module (locals) are
/// dropped without comment: one bad name must not stop a module from being
/// indexed. Spans are copied through as recorded, unhelpful ones included.
/// Use and binding occurrences are both emitted.
pub fn collect_occurrences(
    package: &Package,
    artifact: &LoadedArtifact,
    ctx: &NameResolutionContext,
) -> Vec<LocatedSym> {
    let mut located = Vec::new();

    for bucket in &artifact.occurrences {
        let Identifier::Resolved(id) = &bucket.identifier else {
            continue;
        };
        let Some(name) = ctx.name(*id) else {
            continue;
        };
        let Some(module) = &name.module else {
            continue;
        };
        if name.occurrence.is_empty() {
            continue;
        }

        let qualified = SymName::qualified(module, &name.occurrence);
        for occurrence in &bucket.occurrences {
            located.push(LocatedSym {
                file: artifact.source_file.clone(),
                name: qualified.clone(),
                package: package.clone(),
                span: occurrence.span.clone(),
            });
        }
    }

    tracing::trace!(
        "{}: {} located symbols from {} buckets",
        artifact.module,
        located.len(),
        artifact.occurrences.len()
    );
    return located;
}

/// Discover, read, and collect every artifact under `root` for `package`.
/// Results are concatenated in discovery order with one fresh context for
/// the whole batch.
///
/// # Errors
///
/// Returns the first artifact read failure; nothing is returned for the batch
/// in that case.
pub fn collect_package(package: &Package, root: &Path, extension: &str) -> Result<Vec<LocatedSym>, Error> {
    let paths = discovery::discover_artifacts(root, extension);
    let (loaded, ctx) = artifact::read_artifacts(&paths, NameResolutionContext::new())?;

    let located: Vec<LocatedSym> = loaded
        .iter()
        .flat_map(|artifact| return collect_occurrences(package, artifact, &ctx))
        .collect();

    tracing::debug!(
        "{}: {} located symbols from {} artifacts",
        package.name,
        located.len(),
        loaded.len()
    );
    return Ok(located);
}

/// Like [`collect_package`], restricted to artifacts produced for `module`.
/// Every artifact is still read so identities match a whole-package run.
///
/// Returns `None` when no artifact was produced for `module`, so the caller
/// can fall back to token extraction.
///
/// # Errors
///
/// Returns the first artifact read failure.
pub fn collect_module(
    package: &Package,
    root: &Path,
    extension: &str,
    module: &ModuleName,
) -> Result<Option<Vec<LocatedSym>>, Error> {
    let paths = discovery::discover_artifacts(root, extension);
    let (loaded, ctx) = artifact::read_artifacts(&paths, NameResolutionContext::new())?;

    let mut matching = loaded.iter().filter(|artifact| return artifact.module == *module).peekable();
    if matching.peek().is_none() {
        return Ok(None);
    }
    return Ok(Some(
        matching
            .flat_map(|artifact| return collect_occurrences(package, artifact, &ctx))
            .collect(),
    ));
}
