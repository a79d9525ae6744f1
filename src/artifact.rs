//! Semantic artifact loading and the name-resolution context threaded across loads.
//!
//! An artifact is a JSON document written by a compiler pass. Its names live
//! in a per-file table; loading interns each one into a shared
//! [`NameResolutionContext`] so the same module-scoped name gets the same
//! [`NameId`] in every artifact of a batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::types::{ModuleName, RefKind, Span};

/// Artifact format version this crate reads.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Batch-wide identity of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameId(usize);

/// A resolved name: the module that owns it (none for local bindings) and
/// its occurrence text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Name {
    /// Owning module, absent for locals.
    pub module: Option<ModuleName>,
    /// Unqualified occurrence text.
    pub occurrence: String,
}

/// Sequential accumulator of name identities for one extraction batch.
///
/// Passed by value through [`read_artifacts`]; the context returned by one
/// read is the input of the next. It is not meant to be shared between threads.
#[derive(Debug, Default)]
pub struct NameResolutionContext {
    /// Module-scoped names already seen, keyed by identity.
    ids: HashMap<(ModuleName, String), NameId>,
    /// Every interned name, indexed by `NameId`.
    names: Vec<Name>,
}

impl NameResolutionContext {
    /// An empty context for a new batch.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Identity for `name`. Module-scoped names are shared across artifacts;
    /// locals always get a fresh identity since two files' `x` are unrelated.
    pub fn intern(&mut self, name: Name) -> NameId {
        let Some(module) = name.module.clone() else {
            return self.push(name);
        };
        let key = (module, name.occurrence.clone());
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = self.push(name);
        self.ids.insert(key, id);
        return id;
    }

    /// Look up a previously interned name.
    pub fn name(&self, id: NameId) -> Option<&Name> {
        return self.names.get(id.0);
    }

    /// Number of identities handed out so far.
    pub fn len(&self) -> usize {
        return self.names.len();
    }

    /// True before anything has been interned.
    pub fn is_empty(&self) -> bool {
        return self.names.is_empty();
    }

    /// Append without deduplication.
    fn push(&mut self, name: Name) -> NameId {
        let id = NameId(self.names.len());
        self.names.push(name);
        return id;
    }
}

/// The name an occurrence refers to, after loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Resolution succeeded.
    Resolved(NameId),
    /// Resolution failed or was ambiguous; carries the source text.
    Unresolved(String),
}

/// One occurrence of a name: where, and how it was referenced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Occurrence {
    /// Reference kind recorded by the producer.
    pub kind: RefKind,
    /// Location, possibly unhelpful.
    pub span: Span,
}

/// All occurrences of one identifier within an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceBucket {
    /// The name the occurrences refer to.
    pub identifier: Identifier,
    /// Occurrences in artifact order.
    pub occurrences: Vec<Occurrence>,
}

/// A fully-materialized artifact with identities from the batch context.
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    /// Module the artifact was produced for.
    pub module: ModuleName,
    /// Buckets in first-appearance order; each identifier appears once.
    pub occurrences: Vec<OccurrenceBucket>,
    /// Source file the artifact describes, as recorded by the producer.
    pub source_file: PathBuf,
}

// ── On-disk format ─────────────────────────────────────────────────────

/// Just enough of an artifact to check compatibility before a full decode.
#[derive(Deserialize)]
struct VersionHeader {
    /// Producer's format version.
    version: u32,
}

/// Artifact as written to disk.
#[derive(Deserialize)]
struct RawArtifact {
    /// Module the artifact describes.
    module: ModuleName,
    /// Per-file name table referenced by index.
    #[serde(default)]
    names: Vec<Name>,
    /// Occurrence entries, possibly repeating identifiers.
    #[serde(default)]
    occurrences: Vec<RawOccurrence>,
    /// Source path recorded by the producer.
    source_file: PathBuf,
}

/// Occurrence entry as written to disk.
#[derive(Deserialize)]
struct RawOccurrence {
    /// Name-table index or unresolved text.
    identifier: RawIdentifier,
    /// Occurrences of this identifier.
    #[serde(default)]
    spans: Vec<Occurrence>,
}

/// Identifier as written to disk.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawIdentifier {
    /// Index into the artifact's `names` table.
    Resolved(usize),
    /// Text of a name that did not resolve.
    Unresolved(String),
}

// ── Reading ────────────────────────────────────────────────────────────

/// Read one artifact, interning its names into `ctx`.
/// Returns the artifact together with the advanced context.
///
/// # Errors
///
/// Returns `Error::ArtifactRead` if the file can't be read or decoded,
/// `Error::ArtifactVersion` if it was written in another format version,
/// or `Error::ArtifactCorrupt` if it references names it doesn't define.
pub fn read_artifact(
    path: &Path,
    mut ctx: NameResolutionContext,
) -> Result<(LoadedArtifact, NameResolutionContext), Error> {
    let raw = decode_artifact(path)?;

    if raw.source_file.as_os_str().is_empty() {
        return Err(Error::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: "empty source_file".to_string(),
        });
    }

    let local_ids: Vec<NameId> = raw.names.into_iter().map(|name| return ctx.intern(name)).collect();

    let mut buckets: Vec<OccurrenceBucket> = Vec::new();
    let mut bucket_index: HashMap<Identifier, usize> = HashMap::new();
    for entry in raw.occurrences {
        let identifier = match entry.identifier {
            RawIdentifier::Resolved(index) => {
                let Some(id) = local_ids.get(index) else {
                    return Err(Error::ArtifactCorrupt {
                        path: path.to_path_buf(),
                        reason: format!("name index {index} out of range ({} names)", local_ids.len()),
                    });
                };
                Identifier::Resolved(*id)
            },
            RawIdentifier::Unresolved(text) => Identifier::Unresolved(text),
        };

        if let Some(existing) = bucket_index.get(&identifier).and_then(|i| return buckets.get_mut(*i)) {
            existing.occurrences.extend(entry.spans);
            continue;
        }
        bucket_index.insert(identifier.clone(), buckets.len());
        buckets.push(OccurrenceBucket {
            identifier,
            occurrences: entry.spans,
        });
    }

    let artifact = LoadedArtifact {
        module: raw.module,
        occurrences: buckets,
        source_file: raw.source_file,
    };
    return Ok((artifact, ctx));
}

/// Read artifacts in order, threading one context through every read.
/// The first failure aborts the batch; no partial result is returned.
///
/// # Errors
///
/// Returns the first error from [`read_artifact`].
pub fn read_artifacts(
    paths: &[PathBuf],
    ctx: NameResolutionContext,
) -> Result<(Vec<LoadedArtifact>, NameResolutionContext), Error> {
    return paths.iter().try_fold((Vec::with_capacity(paths.len()), ctx), |(mut loaded, ctx), path| -> Result<_, Error> {
        let (artifact, ctx) = read_artifact(path, ctx)?;
        loaded.push(artifact);
        return Ok((loaded, ctx));
    });
}

/// Read the file, check its version, and decode the raw structure.
///
/// # Errors
///
/// Returns `Error::ArtifactRead` or `Error::ArtifactVersion`.
fn decode_artifact(path: &Path) -> Result<RawArtifact, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| return Error::ArtifactRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let header: VersionHeader = serde_json::from_str(&content).map_err(|e| return Error::ArtifactRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if header.version != ARTIFACT_FORMAT_VERSION {
        return Err(Error::ArtifactVersion {
            expected: ARTIFACT_FORMAT_VERSION,
            found: header.version,
            path: path.to_path_buf(),
        });
    }

    return serde_json::from_str(&content).map_err(|e| return Error::ArtifactRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    });
}
