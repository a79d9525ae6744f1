//! Recursive discovery of semantic artifact files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Collect every artifact file reachable from `root`, as absolute paths.
///
/// A missing root yields nothing: an unindexed package is not an error. A
/// root that is itself an artifact file yields just that file. Directories
/// are walked recursively in file-name order, so the result is deterministic
/// for one filesystem snapshot. Symlinks are not followed and anything that
/// is neither a regular file nor a directory is skipped.
pub fn discover_artifacts(root: &Path, extension: &str) -> Vec<PathBuf> {
    if std::fs::symlink_metadata(root).is_err() {
        tracing::debug!("artifact root {} does not exist", root.display());
        return Vec::new();
    }
    let root = std::path::absolute(root).unwrap_or_else(|_err| return root.to_path_buf());

    let found: Vec<PathBuf> = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return has_extension(e.path(), extension))
        .map(walkdir::DirEntry::into_path)
        .collect();

    tracing::debug!("discovered {} artifacts under {}", found.len(), root.display());
    return found;
}

/// Whether `path` ends in `.<extension>`.
fn has_extension(path: &Path, extension: &str) -> bool {
    return path.extension().is_some_and(|ext| return ext == extension);
}
